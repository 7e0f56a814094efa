// ⚙️ Configuration - Paths and parameters for one aggregation run
//
// Lives with the I/O layer only; the engine receives plain values.

use crate::age::default_reference_date;
use crate::classifier::ResultLabels;
use crate::entrant::Round;
use crate::sorter::SortSpec;
use crate::stats::PROVIDER_BATCH_LIMIT;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Looked up in the working directory when no --config is given
pub const DEFAULT_CONFIG_FILE: &str = "ranking.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RankingConfig {
    /// Competitor list (JSON)
    pub competitors_path: PathBuf,

    /// Statistics history written by the fetcher (JSON)
    pub stats_path: PathBuf,

    /// Date ages are computed at
    pub reference_date: NaiveDate,

    pub round: Round,

    pub sort: SortSpec,

    /// Ids per line for `ids`
    pub batch_size: usize,

    pub labels: ResultLabels,
}

impl Default for RankingConfig {
    fn default() -> Self {
        RankingConfig {
            competitors_path: PathBuf::from("competitors.json"),
            stats_path: PathBuf::from("stats.json"),
            reference_date: default_reference_date(),
            round: Round::Final,
            sort: SortSpec::default(),
            batch_size: PROVIDER_BATCH_LIMIT,
            labels: ResultLabels::default(),
        }
    }
}

impl RankingConfig {
    /// Load config from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let mut config: RankingConfig =
            serde_json::from_str(&content).context("Failed to parse config JSON")?;

        config.sort = SortSpec::declared(config.sort.field, config.sort.direction, config.sort.value_type)
            .context("Invalid default sort in config")?;

        Ok(config)
    }

    /// Explicit path, else `ranking.json` if present, else defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    tracing::debug!(path = %fallback.display(), "using config from working directory");
                    Self::from_file(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sorter::{SortDirection, SortField};

    #[test]
    fn test_defaults() {
        let config = RankingConfig::default();
        assert_eq!(config.reference_date, NaiveDate::from_ymd_opt(2025, 10, 1).unwrap());
        assert_eq!(config.round, Round::Final);
        assert_eq!(config.sort.field, SortField::ViewCount);
        assert_eq!(config.sort.direction, SortDirection::Desc);
        assert_eq!(config.batch_size, 50);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranking.json");
        fs::write(
            &path,
            r#"{
                "statsPath": "2025_3rd.json",
                "round": "round3",
                "referenceDate": "2020-10-01",
                "sort": {"field": "resultCategory", "direction": "asc", "valueType": "number"}
            }"#,
        )
        .unwrap();

        let config = RankingConfig::load(Some(&path)).unwrap();
        assert_eq!(config.stats_path, PathBuf::from("2025_3rd.json"));
        assert_eq!(config.competitors_path, PathBuf::from("competitors.json"));
        assert_eq!(config.round, Round::Round3);
        assert_eq!(config.reference_date, NaiveDate::from_ymd_opt(2020, 10, 1).unwrap());
        assert_eq!(config.sort.field, SortField::ResultCategory);
        assert_eq!(config.labels.finalist, "ファイナリスト");
    }

    #[test]
    fn test_bad_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranking.json");
        fs::write(&path, r#"{"round": "semifinal"}"#).unwrap();

        assert!(RankingConfig::from_file(&path).is_err());
    }

    #[test]
    fn test_contradictory_sort_type_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranking.json");
        fs::write(
            &path,
            r#"{"sort": {"field": "viewCount", "direction": "desc", "valueType": "string"}}"#,
        )
        .unwrap();

        assert!(RankingConfig::from_file(&path).is_err());
    }
}
