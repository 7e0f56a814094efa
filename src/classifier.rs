// 🏆 Result Classifier - Competition outcome as data
// Maps raw progression flags to a canonical, strictly ordered result category

use crate::entrant::{Entrant, Round};
use serde::{Deserialize, Serialize};

/// Rank used for anyone without a numeric final rank (sorts last)
pub const UNRANKED: u32 = 999;

// ============================================================================
// RESULT CATEGORY
// ============================================================================

/// Outcome tier, best first. The discriminant is the sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResultCategory {
    /// Has a final rank (laureate)
    Ranked = 0,

    /// Played the final, no rank
    Finalist = 1,

    /// Advanced to round 3
    Round3 = 2,

    /// Advanced to round 2
    Round2 = 3,

    /// Everyone else
    Eliminated = 4,
}

impl ResultCategory {
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

// ============================================================================
// CLASSIFICATION RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultClassification {
    pub text: String,
    pub category: ResultCategory,
    pub rank_num: u32,
    /// 0 if a prize exists, else 1
    pub prize_order: u8,
}

impl ResultClassification {
    fn unranked(text: &str, category: ResultCategory) -> Self {
        ResultClassification {
            text: text.to_string(),
            category,
            rank_num: UNRANKED,
            prize_order: 1,
        }
    }

    /// (text, category, rank, prize order)
    pub fn as_tuple(&self) -> (&str, u8, u32, u8) {
        (&self.text, self.category.code(), self.rank_num, self.prize_order)
    }
}

// ============================================================================
// RESULT CLASSIFIER
// ============================================================================

/// Display texts for each tier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultLabels {
    pub rank_suffix: String,
    pub prize_separator: String,
    pub finalist: String,
    pub round3: String,
    pub round2: String,
    pub none: String,
}

impl Default for ResultLabels {
    fn default() -> Self {
        ResultLabels {
            rank_suffix: "位".to_string(),
            prize_separator: "、".to_string(),
            finalist: "ファイナリスト".to_string(),
            round3: "第3ラウンド進出".to_string(),
            round2: "第2ラウンド進出".to_string(),
            none: "-".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ResultClassifier {
    labels: ResultLabels,
}

impl ResultClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_labels(labels: ResultLabels) -> Self {
        ResultClassifier { labels }
    }

    /// Classify one entrant; first matching rule wins
    ///
    /// 1. final rank present        → "n位" / "n位、Prize"
    /// 2. final video present       → finalist
    /// 3. round 3 video present     → round-3 advance
    /// 4. round 2 video present     → round-2 advance
    /// 5. otherwise                 → "-"
    pub fn classify(&self, entrant: &Entrant) -> ResultClassification {
        let prize = entrant
            .prize
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty());

        if let Some(raw_rank) = entrant
            .final_rank
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
        {
            // A non-empty but malformed rank stays in the ranked tier, sorted last within it
            let rank_num = parse_rank(raw_rank).unwrap_or(UNRANKED);
            let text = match prize {
                Some(prize) => format!(
                    "{}{}{}{}",
                    rank_num, self.labels.rank_suffix, self.labels.prize_separator, prize
                ),
                None => format!("{}{}", rank_num, self.labels.rank_suffix),
            };

            return ResultClassification {
                text,
                category: ResultCategory::Ranked,
                rank_num,
                prize_order: if prize.is_some() { 0 } else { 1 },
            };
        }

        if entrant.has_round(Round::Final) {
            return ResultClassification::unranked(&self.labels.finalist, ResultCategory::Finalist);
        }

        if entrant.has_round(Round::Round3) {
            return ResultClassification::unranked(&self.labels.round3, ResultCategory::Round3);
        }

        if entrant.has_round(Round::Round2) {
            return ResultClassification::unranked(&self.labels.round2, ResultCategory::Round2);
        }

        ResultClassification::unranked(&self.labels.none, ResultCategory::Eliminated)
    }
}

/// "3" → 3; "3.0" → 3; anything else → None
fn parse_rank(raw: &str) -> Option<u32> {
    if let Ok(rank) = raw.parse::<u32>() {
        return Some(rank);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f < UNRANKED as f64)
        .map(|f| f as u32)
}

// ============================================================================
// TESTS
// ============================================================================
