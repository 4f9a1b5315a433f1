use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Per-country aggregate computed by the analytics service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRanking {
    pub id: i64,
    pub country_name: String,
    pub user_count: u32,
    pub consensus_album: Option<i64>,
    pub consensus_album_title: Option<String>,
    pub polarization_album: Option<i64>,
    pub polarization_album_title: Option<String>,
    pub global_consensus_track_id: Option<i64>,
    #[serde(default)]
    pub analysis_data: Option<BTreeMap<String, serde_json::Value>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// RFC 3339 first, then a naive timestamp read as UTC. Anything else is
/// dropped instead of failing the whole row.
fn lenient_timestamp<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<serde_json::Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let Some(text) = raw.as_str() else {
        tracing::debug!("Ignoring non-string updated_at: {}", raw);
        return Ok(None);
    };

    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(Some(naive.and_utc()));
        }
    }
    tracing::debug!("Ignoring unparseable updated_at: {}", text);
    Ok(None)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlbumStat {
    pub album_id: i64,
    pub album_title: String,
    pub avg_rank: Option<f64>,
    pub std_dev_rank: f64,
    pub votes: u32,
}

#[derive(Debug, Deserialize)]
struct RawAlbumStat {
    album_title: Option<String>,
    avg_rank: Option<f64>,
    std_dev_rank: Option<f64>,
    votes: Option<u32>,
}

impl CountryRanking {
    /// Album entries of `analysis_data` (numeric keys only), best average
    /// rank first and unranked albums last.
    pub fn album_stats(&self) -> Vec<AlbumStat> {
        let Some(data) = &self.analysis_data else {
            return Vec::new();
        };

        let mut stats: Vec<AlbumStat> = data
            .iter()
            .filter_map(|(key, value)| {
                let album_id = key.parse::<i64>().ok()?;
                match RawAlbumStat::deserialize(value) {
                    Ok(raw) => Some(AlbumStat {
                        album_id,
                        album_title: raw.album_title.unwrap_or_default(),
                        avg_rank: raw.avg_rank,
                        std_dev_rank: raw.std_dev_rank.unwrap_or(0.0),
                        votes: raw.votes.unwrap_or(0),
                    }),
                    Err(e) => {
                        tracing::warn!(
                            country = %self.country_name,
                            album_id,
                            "Skipping malformed album stat: {}",
                            e
                        );
                        None
                    }
                }
            })
            .collect();

        stats.sort_by(|a, b| match (a.avg_rank, b.avg_rank) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        stats
    }

    pub fn consensus_stat(&self) -> Option<AlbumStat> {
        let consensus = self.consensus_album?;
        self.album_stats()
            .into_iter()
            .find(|stat| stat.album_id == consensus)
    }
}
