// 📊 Video Statistics - Provider records, lookup index and snapshot history
//
// The fetcher appends one snapshot per run; we only ever read the latest.

use anyhow::{bail, Context, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Max identifiers per provider request
pub const PROVIDER_BATCH_LIMIT: usize = 50;

const WATCH_URL_PREFIX: &str = "https://www.youtube.com/watch?v=";

// ============================================================================
// VIDEO STAT
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoStat {
    #[serde(alias = "id", default)]
    pub video_id: String,

    /// Missing or malformed counts become 0
    #[serde(default, deserialize_with = "count_or_zero")]
    pub view_count: u64,

    /// None when the provider hides likes
    #[serde(default, deserialize_with = "optional_count")]
    pub like_count: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl VideoStat {
    pub fn new(video_id: &str, view_count: u64, like_count: Option<u64>) -> Self {
        VideoStat {
            video_id: video_id.to_string(),
            view_count,
            like_count,
            ..Default::default()
        }
    }

    /// Zero-valued stand-in for a video the provider did not return
    pub fn placeholder(video_id: &str) -> Self {
        VideoStat::new(video_id, 0, Some(0))
    }

    /// Builder pattern: add publish timestamp
    pub fn with_published_at(mut self, published_at: &str) -> Self {
        self.published_at = Some(published_at.to_string());
        self
    }

    /// Supplied URL, or the canonical watch URL for the id
    pub fn canonical_url(&self) -> String {
        match self.url.as_deref().filter(|u| !u.is_empty()) {
            Some(url) => url.to_string(),
            None => watch_url(&self.video_id),
        }
    }
}

pub fn watch_url(video_id: &str) -> String {
    format!("{}{}", WATCH_URL_PREFIX, video_id)
}

/// Counts arrive as numbers or as numeric strings ("12345")
fn parse_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

fn count_or_zero<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_count).unwrap_or(0))
}

fn optional_count<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(v) => Some(parse_count(&v).unwrap_or(0)),
    })
}

// ============================================================================
// STATS INDEX
// ============================================================================

/// StatsIndex - videoId → VideoStat
///
/// Duplicate ids: last write wins. Lookups never invent a default record.
#[derive(Debug, Clone, Default)]
pub struct StatsIndex {
    by_id: HashMap<String, VideoStat>,
}

impl StatsIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_stats<I>(stats: I) -> Self
    where
        I: IntoIterator<Item = VideoStat>,
    {
        let mut index = StatsIndex::new();
        for stat in stats {
            index.insert(stat);
        }
        index
    }

    pub fn insert(&mut self, stat: VideoStat) {
        self.by_id.insert(stat.video_id.clone(), stat);
    }

    pub fn get(&self, video_id: &str) -> Option<&VideoStat> {
        self.by_id.get(video_id)
    }

    pub fn contains(&self, video_id: &str) -> bool {
        self.by_id.contains_key(video_id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

// ============================================================================
// SNAPSHOTS
// ============================================================================

/// One fetch run: the date it ran and what the provider returned
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub date: String,
    pub videos: Vec<VideoStat>,
}

impl StatsSnapshot {
    pub fn index(&self) -> StatsIndex {
        StatsIndex::from_stats(self.videos.iter().cloned())
    }

    /// "2025年10月01日(水)", or the raw date when it does not parse
    pub fn display_date_ja(&self) -> String {
        match parse_snapshot_date(&self.date) {
            Some(date) => {
                let weekday = ['月', '火', '水', '木', '金', '土', '日']
                    [date.weekday().num_days_from_monday() as usize];
                format!("{}({})", date.format("%Y年%m月%d日"), weekday)
            }
            None => self.date.clone(),
        }
    }
}

fn parse_snapshot_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    None
}

/// Load the latest snapshot from a statistics file
pub fn load_latest_snapshot(path: &Path) -> Result<StatsSnapshot> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read statistics file: {:?}", path))?;

    parse_latest_snapshot(&content).with_context(|| format!("Invalid statistics file: {:?}", path))
}

/// Parse either a snapshot history (list) or an all-rounds document (object)
pub fn parse_latest_snapshot(content: &str) -> Result<StatsSnapshot> {
    let value: Value = serde_json::from_str(content).context("Failed to parse statistics JSON")?;

    let snapshot = match value {
        Value::Array(entries) => latest_from_history(entries)?,
        Value::Object(_) => snapshot_from_entry(&value)?,
        _ => bail!("top level of the statistics file must be a list or an object"),
    };

    tracing::debug!(
        date = %snapshot.date,
        videos = snapshot.videos.len(),
        "selected statistics snapshot"
    );
    Ok(snapshot)
}

fn latest_from_history(entries: Vec<Value>) -> Result<StatsSnapshot> {
    if entries.is_empty() {
        bail!("statistics history is empty");
    }
    if entries.iter().any(|e| !e.is_object()) {
        bail!("every statistics history entry must be an object");
    }

    // Unparsable dates rank as the oldest; on equal dates the later entry wins
    let latest = entries
        .iter()
        .max_by_key(|entry| {
            entry
                .get("date")
                .and_then(Value::as_str)
                .and_then(parse_snapshot_date)
                .unwrap_or(NaiveDate::MIN)
        })
        .context("statistics history is empty")?;

    snapshot_from_entry(latest)
}

fn snapshot_from_entry(entry: &Value) -> Result<StatsSnapshot> {
    let date = entry
        .get("date")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let videos = match entry.get("videos") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                serde_json::from_value::<VideoStat>(item.clone())
                    .context("Video record has an unexpected shape")
            })
            .collect::<Result<Vec<_>>>()?,
        Some(Value::Object(by_id)) => by_id
            .iter()
            .map(|(id, item)| {
                let mut stat: VideoStat = serde_json::from_value(item.clone())
                    .with_context(|| format!("Video record {} has an unexpected shape", id))?;
                stat.video_id = id.clone();
                Ok(stat)
            })
            .collect::<Result<Vec<_>>>()?,
        Some(_) => bail!("\"videos\" must be a list or an object keyed by video id"),
    };

    let total = videos.len();
    let videos: Vec<VideoStat> = videos
        .into_iter()
        .filter(|v| !v.video_id.trim().is_empty())
        .collect();
    if videos.len() < total {
        tracing::warn!(skipped = total - videos.len(), "video records without an id were skipped");
    }

    Ok(StatsSnapshot { date, videos })
}

/// Split ids into comma-joined batches the provider accepts in one request
pub fn id_batches(ids: &[String], batch_size: usize) -> Vec<String> {
    ids.chunks(batch_size.clamp(1, PROVIDER_BATCH_LIMIT))
        .map(|chunk| chunk.join(","))
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_last_write_wins() {
        let index = StatsIndex::from_stats(vec![
            VideoStat::new("a", 10, Some(1)),
            VideoStat::new("b", 20, None),
            VideoStat::new("a", 30, Some(3)),
        ]);

        assert_eq!(index.len(), 2);
        assert_eq!(index.get("a").unwrap().view_count, 30);
        assert_eq!(index.get("b").unwrap().like_count, None);
    }

    #[test]
    fn test_index_missing_id_is_not_found() {
        let index = StatsIndex::from_stats(vec![VideoStat::new("a", 10, Some(1))]);
        assert!(index.get("zzz").is_none());
        assert!(!index.contains("zzz"));
    }

    #[test]
    fn test_canonical_url() {
        let stat = VideoStat::new("BOCTW4qyDqY", 0, None);
        assert_eq!(stat.canonical_url(), "https://www.youtube.com/watch?v=BOCTW4qyDqY");

        let mut supplied = VideoStat::new("x", 0, None);
        supplied.url = Some("https://youtu.be/x".to_string());
        assert_eq!(supplied.canonical_url(), "https://youtu.be/x");
    }

    #[test]
    fn test_counts_from_strings_and_garbage() {
        let json = r#"{"videoId": "a", "viewCount": "12345", "likeCount": "n/a"}"#;
        let stat: VideoStat = serde_json::from_str(json).unwrap();
        assert_eq!(stat.view_count, 12345);
        assert_eq!(stat.like_count, Some(0));

        let json = r#"{"id": "b", "likeCount": null}"#;
        let stat: VideoStat = serde_json::from_str(json).unwrap();
        assert_eq!(stat.video_id, "b");
        assert_eq!(stat.view_count, 0);
        assert_eq!(stat.like_count, None);
    }

    #[test]
    fn test_latest_snapshot_from_history() {
        let json = r#"[
            {"date": "2025-10-20", "videos": [{"videoId": "a", "viewCount": 100}]},
            {"date": "garbage", "videos": [{"videoId": "a", "viewCount": 999999}]},
            {"date": "2025-10-22", "videos": [{"videoId": "a", "viewCount": 300, "likeCount": 7}]},
            {"date": "2025-10-21", "videos": [{"videoId": "a", "viewCount": 200}]}
        ]"#;

        let snapshot = parse_latest_snapshot(json).unwrap();
        assert_eq!(snapshot.date, "2025-10-22");
        assert_eq!(snapshot.videos.len(), 1);
        assert_eq!(snapshot.videos[0].view_count, 300);
        assert_eq!(snapshot.videos[0].like_count, Some(7));
    }

    #[test]
    fn test_all_rounds_document() {
        let json = r#"{
            "date": "2025-11-01",
            "videos": {
                "v1": {"viewCount": 10, "likeCount": 2},
                "v2": {"viewCount": 20, "likeCount": 4}
            },
            "rounds": {"final": ["v1", "v2"]}
        }"#;

        let snapshot = parse_latest_snapshot(json).unwrap();
        let index = snapshot.index();
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("v2").unwrap().view_count, 20);
    }

    #[test]
    fn test_structurally_invalid_statistics_rejected() {
        assert!(parse_latest_snapshot("[]").is_err());
        assert!(parse_latest_snapshot("42").is_err());
        assert!(parse_latest_snapshot(r#"[1, 2]"#).is_err());
        assert!(parse_latest_snapshot(r#"[{"date": "2025-10-01", "videos": "oops"}]"#).is_err());
    }

    #[test]
    fn test_records_without_id_skipped() {
        let json = r#"[{"date": "2025-10-01", "videos": [{"viewCount": 5}, {"videoId": "ok"}]}]"#;
        let snapshot = parse_latest_snapshot(json).unwrap();
        assert_eq!(snapshot.videos.len(), 1);
        assert_eq!(snapshot.videos[0].video_id, "ok");
    }

    #[test]
    fn test_display_date_ja() {
        let snapshot = StatsSnapshot {
            date: "2025-10-01".to_string(),
            videos: vec![],
        };
        assert_eq!(snapshot.display_date_ja(), "2025年10月01日(水)");

        let raw = StatsSnapshot {
            date: "someday".to_string(),
            videos: vec![],
        };
        assert_eq!(raw.display_date_ja(), "someday");
    }

    #[test]
    fn test_id_batches() {
        let ids: Vec<String> = (0..120).map(|i| format!("v{}", i)).collect();
        let batches = id_batches(&ids, PROVIDER_BATCH_LIMIT);
        assert_eq!(batches.len(), 3);
        assert!(batches[0].starts_with("v0,v1,"));
        assert_eq!(batches[2].split(',').count(), 20);

        // Oversized batches are capped at the provider limit
        assert_eq!(id_batches(&ids, 500).len(), 3);
    }
}
