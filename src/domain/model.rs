use crate::utils::error::{ClientError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Server-side identifier of the album (or any collection) a ranking is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollectionId(pub i64);

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A track as served by the tracks endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankableItem {
    pub id: i64,
    pub title: String,
    /// Position on the source album. Informational only.
    #[serde(rename = "track_number")]
    pub ordinal: i64,
    #[serde(rename = "album", default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<CollectionId>,
}

impl RankableItem {
    pub fn new(id: i64, title: impl Into<String>, ordinal: i64) -> Self {
        Self {
            id,
            title: title.into(),
            ordinal,
            collection: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    #[serde(rename = "track_id")]
    pub item_id: i64,
    pub position: u32,
}

/// Body of the save request. Always covers the whole list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingSubmission {
    #[serde(rename = "album_id")]
    pub collection_id: CollectionId,
    pub rankings: Vec<RankingEntry>,
}

impl RankingSubmission {
    pub fn positions_are_contiguous(&self) -> bool {
        let mut positions: Vec<u32> = self.rankings.iter().map(|r| r.position).collect();
        positions.sort_unstable();
        positions
            .iter()
            .enumerate()
            .all(|(index, position)| *position as usize == index + 1)
    }
}

impl Validate for RankingSubmission {
    fn validate(&self) -> Result<()> {
        if !self.positions_are_contiguous() {
            return Err(ClientError::InvalidRanking {
                reason: "positions must be a permutation of 1..=N".to_string(),
            });
        }
        let mut ids: Vec<i64> = self.rankings.iter().map(|r| r.item_id).collect();
        ids.sort_unstable();
        if ids.windows(2).any(|w| w[0] == w[1]) {
            return Err(ClientError::InvalidRanking {
                reason: "an item appears more than once".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: i64,
    pub title: String,
}

/// The user's own stored track ranking for one album. Entries are opaque to
/// the client; only their presence matters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoredRanking {
    #[serde(default)]
    pub rankings: Vec<serde_json::Value>,
}

impl StoredRanking {
    pub fn is_complete(&self) -> bool {
        !self.rankings.is_empty()
    }
}

/// Album eras. Doubles as the profile theme key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Theme {
    #[serde(rename = "TS")]
    TaylorSwift,
    #[serde(rename = "FEARLESS")]
    Fearless,
    #[serde(rename = "SPEAK_NOW")]
    SpeakNow,
    #[serde(rename = "RED")]
    Red,
    #[serde(rename = "1989")]
    NineteenEightyNine,
    #[serde(rename = "REPUTATION")]
    Reputation,
    #[serde(rename = "LOVER")]
    Lover,
    #[serde(rename = "FOLKLORE")]
    Folklore,
    #[serde(rename = "EVERMORE")]
    Evermore,
    #[serde(rename = "MIDNIGHTS")]
    Midnights,
    #[serde(rename = "TTPD")]
    TorturedPoets,
    #[serde(rename = "SHOWGIRL")]
    Showgirl,
}

impl Theme {
    pub const ALL: [Theme; 12] = [
        Theme::TaylorSwift,
        Theme::Fearless,
        Theme::SpeakNow,
        Theme::Red,
        Theme::NineteenEightyNine,
        Theme::Reputation,
        Theme::Lover,
        Theme::Folklore,
        Theme::Evermore,
        Theme::Midnights,
        Theme::TorturedPoets,
        Theme::Showgirl,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Theme::TaylorSwift => "TS",
            Theme::Fearless => "FEARLESS",
            Theme::SpeakNow => "SPEAK_NOW",
            Theme::Red => "RED",
            Theme::NineteenEightyNine => "1989",
            Theme::Reputation => "REPUTATION",
            Theme::Lover => "LOVER",
            Theme::Folklore => "FOLKLORE",
            Theme::Evermore => "EVERMORE",
            Theme::Midnights => "MIDNIGHTS",
            Theme::TorturedPoets => "TTPD",
            Theme::Showgirl => "SHOWGIRL",
        }
    }

    pub fn album_title(&self) -> &'static str {
        match self {
            Theme::TaylorSwift => "Taylor Swift",
            Theme::Fearless => "Fearless",
            Theme::SpeakNow => "Speak Now",
            Theme::Red => "Red",
            Theme::NineteenEightyNine => "1989",
            Theme::Reputation => "Reputation",
            Theme::Lover => "Lover",
            Theme::Folklore => "Folklore",
            Theme::Evermore => "Evermore",
            Theme::Midnights => "Midnights",
            Theme::TorturedPoets => "The Tortured Poets Department",
            Theme::Showgirl => "The Life of a Showgirl",
        }
    }

    pub fn from_album_title(title: &str) -> Option<Theme> {
        let wanted = normalize_title(title);
        Theme::ALL
            .into_iter()
            .map(|theme| (theme.album_title(), theme))
            .chain(TITLE_ALIASES.iter().copied())
            .find(|(known, _)| normalize_title(known) == wanted)
            .map(|(_, theme)| theme)
    }
}

/// Alternative titles the catalog uses for an era.
const TITLE_ALIASES: &[(&str, Theme)] = &[("Taylor Swift (Debut)", Theme::TaylorSwift)];

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Theme {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_ascii_uppercase().replace([' ', '-'], "_");
        Theme::ALL
            .into_iter()
            .find(|theme| theme.key() == key)
            .or_else(|| Theme::from_album_title(s))
            .ok_or_else(|| ClientError::InvalidConfigValueError {
                field: "theme".to_string(),
                value: s.to_string(),
                reason: "unknown album era".to_string(),
            })
    }
}

/// Strips diacritics, lowercases, maps anything that is not a letter or
/// digit to a space and collapses whitespace, so "Fólklore!" and "folklore"
/// compare equal.
pub fn normalize_title(title: &str) -> String {
    title
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Exact normalized match first, then "contains", then "is contained in".
pub fn find_album<'a>(albums: &'a [Album], title: &str) -> Option<&'a Album> {
    let wanted = normalize_title(title);
    if wanted.is_empty() {
        return None;
    }
    let normalized: Vec<(String, &Album)> = albums
        .iter()
        .filter(|album| !album.title.trim().is_empty())
        .map(|album| (normalize_title(&album.title), album))
        .collect();

    normalized
        .iter()
        .find(|(norm, _)| *norm == wanted)
        .or_else(|| normalized.iter().find(|(norm, _)| norm.contains(&wanted)))
        .or_else(|| normalized.iter().find(|(norm, _)| wanted.contains(norm.as_str())))
        .map(|(_, album)| *album)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Option<i64>,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub profile_picture_url: Option<String>,
    pub profile_picture: Option<String>,
    pub profile_photo: Option<String>,
    pub cover_picture_url: Option<String>,
    pub cover_url: Option<String>,
    pub cover_image: Option<String>,
    #[serde(default)]
    pub friends_count: u32,
    #[serde(default)]
    pub groups_count: u32,
    pub tema: Option<String>,
}

impl UserProfile {
    pub fn theme(&self) -> Option<Theme> {
        self.tema.as_deref().and_then(|t| t.parse().ok())
    }

    pub fn avatar_url(&self, base_url: &str) -> Option<String> {
        self.profile_picture_url
            .as_deref()
            .or(self.profile_picture.as_deref())
            .or(self.profile_photo.as_deref())
            .and_then(|url| absolutize_media_url(base_url, url))
    }

    pub fn cover_url(&self, base_url: &str) -> Option<String> {
        self.cover_picture_url
            .as_deref()
            .or(self.cover_url.as_deref())
            .or(self.cover_image.as_deref())
            .and_then(|url| absolutize_media_url(base_url, url))
    }

    pub fn initials(&self) -> String {
        if let Some(name) = self.first_name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            return name
                .split_whitespace()
                .take(2)
                .filter_map(|part| part.chars().next())
                .collect::<String>()
                .to_uppercase();
        }
        match self.username.as_deref() {
            Some(username) if !username.is_empty() => {
                username.chars().take(2).collect::<String>().to_uppercase()
            }
            _ => "U".to_string(),
        }
    }
}

fn absolutize_media_url(base_url: &str, url: &str) -> Option<String> {
    if url.is_empty() {
        return None;
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        return Some(url.to_string());
    }
    if url.starts_with('/') {
        return Some(format!("{}{}", base_url.trim_end_matches('/'), url));
    }
    Some(url.to_string())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct RawRankedTitles {
    #[serde(default)]
    albums_ranked_via_albums: Vec<Option<String>>,
    #[serde(default)]
    albums_ranked_via_tracks: Vec<Option<String>>,
    #[serde(default)]
    combined_albums: Vec<Option<String>>,
}

/// Album titles a user has ranked, trimmed and de-duplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RankedTitles {
    pub via_albums: Vec<String>,
    pub via_tracks: Vec<String>,
    pub combined: Vec<String>,
}

impl RankedTitles {
    pub fn has_any(&self) -> bool {
        !self.via_albums.is_empty() || !self.via_tracks.is_empty()
    }
}

impl RankedTitles {
    pub(crate) fn from_raw(raw: RawRankedTitles) -> Self {
        let combined = if raw.combined_albums.is_empty() {
            raw.albums_ranked_via_albums
                .iter()
                .chain(raw.albums_ranked_via_tracks.iter())
                .cloned()
                .collect()
        } else {
            raw.combined_albums
        };
        Self {
            via_albums: dedupe_titles(raw.albums_ranked_via_albums),
            via_tracks: dedupe_titles(raw.albums_ranked_via_tracks),
            combined: dedupe_titles(combined),
        }
    }
}

fn dedupe_titles(titles: Vec<Option<String>>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    titles
        .into_iter()
        .flatten()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

/// Payload for `POST /api/users/register/`.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub country: String,
}

impl Validate for RegistrationRequest {
    fn validate(&self) -> Result<()> {
        use crate::utils::validation::validate_non_empty_string;
        validate_non_empty_string("username", &self.username)?;
        validate_non_empty_string("password", &self.password)?;
        validate_non_empty_string("email", &self.email)?;
        if !self.email.contains('@') {
            return Err(ClientError::InvalidConfigValueError {
                field: "email".to_string(),
                value: self.email.clone(),
                reason: "not an email address".to_string(),
            });
        }
        Ok(())
    }
}
