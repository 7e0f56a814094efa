// 🎹 Entrant Model - Competitors and their per-round videos
// Strongly typed view over the competitor list (one record per entrant)

use crate::error::RankingError;
use anyhow::{bail, Context, Result};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

// ============================================================================
// ROUND
// ============================================================================

/// Round - One stage of the competition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Round {
    Round1,
    Round2,
    Round3,
    Final,
}

impl Round {
    pub const ALL: [Round; 4] = [Round::Round1, Round::Round2, Round::Round3, Round::Final];

    /// Short code used in CLI flags, URLs and file names
    pub fn code(&self) -> &'static str {
        match self {
            Round::Round1 => "round1",
            Round::Round2 => "round2",
            Round::Round3 => "round3",
            Round::Final => "final",
        }
    }

    /// Column name in the original competitor file
    pub fn label_ja(&self) -> &'static str {
        match self {
            Round::Round1 => "第1",
            Round::Round2 => "第2",
            Round::Round3 => "第3",
            Round::Final => "ファイナル",
        }
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Round {
    type Err = RankingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "round1" | "1st" | "first" | "1" | "第1" => Ok(Round::Round1),
            "round2" | "2nd" | "second" | "2" | "第2" => Ok(Round::Round2),
            "round3" | "3rd" | "third" | "3" | "第3" => Ok(Round::Round3),
            "final" | "finals" | "ファイナル" => Ok(Round::Final),
            _ => Err(RankingError::UnknownRound(s.to_string())),
        }
    }
}

// ============================================================================
// ENTRANT
// ============================================================================

/// Entrant - One competitor with metadata and per-round video identifiers
///
/// Accepts both the original column names (名前, 国, 最終順位, ...) and
/// camelCase English keys. Scalars may be strings, numbers or null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entrant {
    #[serde(alias = "名前", default, deserialize_with = "loose_text")]
    pub name: String,

    #[serde(alias = "国", default, deserialize_with = "loose_text")]
    pub country: String,

    #[serde(alias = "生年月日", default, deserialize_with = "loose_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,

    /// Raw final rank; kept as text so malformed values can be coerced later
    #[serde(alias = "最終順位", default, deserialize_with = "loose_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_rank: Option<String>,

    #[serde(alias = "賞", default, deserialize_with = "loose_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prize: Option<String>,

    #[serde(alias = "第1", default, deserialize_with = "loose_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round1: Option<String>,

    #[serde(alias = "第2", default, deserialize_with = "loose_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round2: Option<String>,

    #[serde(alias = "第3", default, deserialize_with = "loose_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round3: Option<String>,

    #[serde(rename = "final", alias = "ファイナル", default, deserialize_with = "loose_string")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_round: Option<String>,
}

impl Entrant {
    pub fn new(name: &str) -> Self {
        Entrant {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Builder pattern: add country
    pub fn with_country(mut self, country: &str) -> Self {
        self.country = country.to_string();
        self
    }

    /// Builder pattern: add birth date (YYYY-MM-DD)
    pub fn with_birth_date(mut self, birth_date: &str) -> Self {
        self.birth_date = non_blank(birth_date);
        self
    }

    /// Builder pattern: add raw final rank
    pub fn with_final_rank(mut self, rank: &str) -> Self {
        self.final_rank = non_blank(rank);
        self
    }

    /// Builder pattern: add prize
    pub fn with_prize(mut self, prize: &str) -> Self {
        self.prize = non_blank(prize);
        self
    }

    /// Builder pattern: set the video for one round
    pub fn with_video(mut self, round: Round, video_id: &str) -> Self {
        let slot = match round {
            Round::Round1 => &mut self.round1,
            Round::Round2 => &mut self.round2,
            Round::Round3 => &mut self.round3,
            Round::Final => &mut self.final_round,
        };
        *slot = non_blank(video_id);
        self
    }

    /// Video identifier for a round, if the entrant has one
    pub fn video_id(&self, round: Round) -> Option<&str> {
        let slot = match round {
            Round::Round1 => &self.round1,
            Round::Round2 => &self.round2,
            Round::Round3 => &self.round3,
            Round::Final => &self.final_round,
        };
        slot.as_deref().filter(|id| !id.trim().is_empty())
    }

    pub fn has_round(&self, round: Round) -> bool {
        self.video_id(round).is_some()
    }
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// Helpers for serde: the competitor sheet mixes numbers, strings and nulls

fn loose_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(non_blank(&s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(true)) => Ok(Some("true".to_string())),
        Some(Value::Bool(false)) => Ok(None),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string, number or null, found {}",
            other
        ))),
    }
}

fn loose_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(loose_string(deserializer)?.unwrap_or_default())
}

// ============================================================================
// LOADING
// ============================================================================

/// Load the competitor list from a JSON file
///
/// The top level must be a list; anything else is rejected rather than
/// silently treated as empty.
pub fn load_entrants(path: &Path) -> Result<Vec<Entrant>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read entrant file: {:?}", path))?;

    parse_entrants(&content).with_context(|| format!("Invalid entrant file: {:?}", path))
}

/// Parse the competitor list from JSON text
pub fn parse_entrants(content: &str) -> Result<Vec<Entrant>> {
    let value: Value = serde_json::from_str(content).context("Failed to parse entrant JSON")?;

    if !value.is_array() {
        bail!("top level of the entrant file must be a list");
    }

    let entrants: Vec<Entrant> =
        serde_json::from_value(value).context("Entrant record has an unexpected shape")?;

    tracing::debug!(count = entrants.len(), "loaded entrants");
    Ok(entrants)
}

/// Collect video identifiers for the given rounds
///
/// Duplicates are dropped, first-seen order is kept (entrant order, then
/// round order within an entrant).
pub fn collect_video_ids(entrants: &[Entrant], rounds: &[Round]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();

    for entrant in entrants {
        for round in rounds {
            if let Some(id) = entrant.video_id(*round) {
                if seen.insert(id.to_string()) {
                    ids.push(id.to_string());
                }
            }
        }
    }

    ids
}

// ============================================================================
// TESTS
// ============================================================================
