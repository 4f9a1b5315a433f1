use crate::core::reorder::{DragState, Move, RankedList};
use crate::core::session::Route;
use crate::domain::model::{CollectionId, RankableItem, RankingSubmission};
use crate::domain::ports::RankingSource;
use crate::utils::error::{ClientError, Result};
use crate::utils::validation::Validate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Idle,
    Loading,
    Ready,
    /// Terminal for this view; the user has to reload.
    LoadFailed { message: String },
    /// A request came back 401. The list is left as it was.
    ReauthRequired,
    /// Saved and discarded.
    Saved,
}

/// Stamp for one `load` request. Only the most recently issued ticket may
/// apply its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadApplied {
    Applied { items: usize },
    Stale,
}

/// Drives one ranking view: loads the items for a collection, applies drag
/// gestures and submits the final order.
pub struct RankingController<S: RankingSource> {
    source: S,
    collection: CollectionId,
    list: RankedList,
    drag: DragState,
    state: ViewState,
    inline_error: Option<String>,
    latest_load: u64,
    loaded_once: bool,
    saving: bool,
}

impl<S: RankingSource> RankingController<S> {
    pub fn new(source: S, collection: CollectionId) -> Self {
        Self {
            source,
            collection,
            list: RankedList::default(),
            drag: DragState::default(),
            state: ViewState::Idle,
            inline_error: None,
            latest_load: 0,
            loaded_once: false,
            saving: false,
        }
    }

    pub fn collection(&self) -> CollectionId {
        self.collection
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn list(&self) -> &RankedList {
        &self.list
    }

    pub fn items(&self) -> &[RankableItem] {
        self.list.items()
    }

    pub fn drag(&self) -> &DragState {
        &self.drag
    }

    /// Message for the last recoverable failure, shown next to the list.
    pub fn inline_error(&self) -> Option<&str> {
        self.inline_error.as_deref()
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    pub fn can_save(&self) -> bool {
        self.state == ViewState::Ready && !self.saving && !self.list.is_empty()
    }

    pub fn redirect(&self) -> Option<Route> {
        match self.state {
            ViewState::ReauthRequired => Some(Route::Login),
            ViewState::Saved => Some(Route::Catalog),
            _ => None,
        }
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.latest_load += 1;
        self.state = ViewState::Loading;
        self.inline_error = None;
        tracing::debug!(collection = %self.collection, ticket = self.latest_load, "Loading items");
        LoadTicket(self.latest_load)
    }

    /// Applies a load response. Responses for superseded tickets are dropped
    /// without touching any state.
    pub fn apply_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<RankableItem>>,
    ) -> Result<LoadApplied> {
        if ticket.0 != self.latest_load {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.latest_load,
                "Discarding stale load response"
            );
            return Ok(LoadApplied::Stale);
        }

        match result.and_then(RankedList::new) {
            Ok(mut list) => {
                if !self.loaded_once {
                    list.sort_by_ordinal();
                    self.loaded_once = true;
                }
                let count = list.len();
                self.list = list;
                self.drag.abort();
                self.state = ViewState::Ready;
                tracing::info!(collection = %self.collection, "Loaded {} items", count);
                Ok(LoadApplied::Applied { items: count })
            }
            Err(err) => {
                self.list = RankedList::default();
                self.drag.abort();
                self.state = if err.requires_reauthentication() {
                    ViewState::ReauthRequired
                } else {
                    ViewState::LoadFailed {
                        message: err.user_friendly_message(),
                    }
                };
                tracing::error!(collection = %self.collection, "Load failed: {}", err);
                Err(err)
            }
        }
    }

    pub async fn load(&mut self) -> Result<LoadApplied> {
        let ticket = self.begin_load();
        let result = self.source.fetch_items(self.collection).await;
        self.apply_load(ticket, result)
    }

    pub fn begin_drag(&mut self, index: usize) {
        self.drag.begin(index, self.list.len());
    }

    pub fn update_drag_target(&mut self, index: usize) {
        self.drag.hover(index, self.list.len());
    }

    pub fn commit_drag(&mut self) -> Option<Move> {
        let moved = self.drag.commit(&mut self.list);
        if let Some(m) = moved {
            tracing::debug!("Moved item from {} to {}", m.from, m.to);
        }
        moved
    }

    pub fn abort_drag(&mut self) {
        self.drag.abort();
    }

    /// Builds the payload and marks a save as in flight. Rejected while
    /// another save is pending or when there is nothing loaded to save.
    pub fn begin_save(&mut self) -> Result<RankingSubmission> {
        if self.saving {
            return Err(ClientError::SaveDisabled {
                reason: "a save is already in progress".to_string(),
            });
        }
        if self.state != ViewState::Ready {
            return Err(ClientError::SaveDisabled {
                reason: "the list is not loaded".to_string(),
            });
        }
        if self.list.is_empty() {
            return Err(ClientError::SaveDisabled {
                reason: "there is nothing to rank".to_string(),
            });
        }

        let submission = self.list.to_submission(self.collection);
        submission.validate()?;
        self.saving = true;
        self.inline_error = None;
        Ok(submission)
    }

    /// On success the list is discarded and the caller should navigate to
    /// the returned route. On failure the list is kept for a retry.
    pub fn finish_save(&mut self, result: Result<()>) -> Result<Route> {
        self.saving = false;
        match result {
            Ok(()) => {
                tracing::info!(collection = %self.collection, "Ranking saved ({} items)", self.list.len());
                self.list = RankedList::default();
                self.drag.abort();
                self.state = ViewState::Saved;
                Ok(Route::Catalog)
            }
            Err(err) if err.requires_reauthentication() => {
                tracing::warn!(collection = %self.collection, "Save rejected, session expired");
                self.state = ViewState::ReauthRequired;
                Err(err)
            }
            Err(err) => {
                tracing::error!(collection = %self.collection, "Save failed: {}", err);
                self.inline_error = Some(err.user_friendly_message());
                Err(err)
            }
        }
    }

    pub async fn save(&mut self) -> Result<Route> {
        let submission = self.begin_save()?;
        let result = self.source.submit_ranking(&submission).await;
        self.finish_save(result)
    }
}
