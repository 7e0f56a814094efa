// 🔗 Join Engine - Entrants × video statistics → ranking rows
//
// Direct video-id joins only. An entrant whose video is missing from the
// statistics still gets a row (zero counts) and is counted as unmatched.

use crate::age::{parse_birth_date, AgeCalculator};
use crate::classifier::ResultClassifier;
use crate::entrant::{Entrant, Round};
use crate::name_key::name_sort_key;
use crate::stats::{StatsIndex, VideoStat};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// RANKING ROW
// ============================================================================

/// RankingRow - One display-ready, fully joined and classified record
///
/// Built once per aggregation pass and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingRow {
    // Video
    pub video_id: String,
    pub url: String,
    pub published_at: String,
    pub view_count: u64,
    pub like_count: Option<u64>,
    /// False when the statistics had no record for this video
    pub matched: bool,

    // Entrant
    pub name: String,
    pub name_sort_key: String,
    pub country: String,
    /// Birth date normalized to YYYY-MM-DD, else empty (age tie-break key)
    pub birth_date: String,
    pub age_years: Option<u32>,

    // Outcome
    pub result_text: String,
    pub result_category: u8,
    pub result_rank_num: u32,
    pub result_prize_order: u8,
}

// ============================================================================
// JOIN REPORT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinReport {
    pub round: Round,
    pub rows: Vec<RankingRow>,
    pub unmatched_count: usize,
    /// Ids missing from the statistics, in entrant order
    pub unmatched_video_ids: Vec<String>,
}

impl JoinReport {
    pub fn summary(&self) -> String {
        format!(
            "Round {}: {} rows, {} without statistics",
            self.round,
            self.rows.len(),
            self.unmatched_count
        )
    }

    pub fn is_complete(&self) -> bool {
        self.unmatched_count == 0
    }
}

// ============================================================================
// JOIN ENGINE
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct JoinEngine {
    classifier: ResultClassifier,
    ages: AgeCalculator,
}

impl JoinEngine {
    pub fn new(reference_date: NaiveDate) -> Self {
        JoinEngine {
            classifier: ResultClassifier::new(),
            ages: AgeCalculator::new(reference_date),
        }
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.ages.reference_date()
    }

    /// Builder pattern: swap the classifier (e.g. for other labels)
    pub fn with_classifier(mut self, classifier: ResultClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Build the rows for one round
    ///
    /// Entrants without a video for `round` are left out entirely.
    pub fn join(&self, round: Round, entrants: &[Entrant], index: &StatsIndex) -> JoinReport {
        let mut rows = Vec::new();
        let mut unmatched_video_ids = Vec::new();

        for entrant in entrants {
            let Some(video_id) = entrant.video_id(round) else {
                continue;
            };

            let placeholder;
            let (stat, matched) = match index.get(video_id) {
                Some(stat) => (stat, true),
                None => {
                    tracing::debug!(
                        round = %round,
                        video_id,
                        entrant = %entrant.name,
                        "no statistics for video, using zero counts"
                    );
                    unmatched_video_ids.push(video_id.to_string());
                    placeholder = VideoStat::placeholder(video_id);
                    (&placeholder, false)
                }
            };

            rows.push(self.build_row(entrant, video_id, stat, matched));
        }

        let report = JoinReport {
            round,
            unmatched_count: unmatched_video_ids.len(),
            unmatched_video_ids,
            rows,
        };

        if !report.is_complete() {
            tracing::warn!(
                round = %round,
                unmatched = report.unmatched_count,
                "some videos had no statistics"
            );
        }
        tracing::info!("{}", report.summary());

        report
    }

    fn build_row(
        &self,
        entrant: &Entrant,
        video_id: &str,
        stat: &VideoStat,
        matched: bool,
    ) -> RankingRow {
        let result = self.classifier.classify(entrant);
        let birth_date = entrant
            .birth_date
            .as_deref()
            .and_then(parse_birth_date)
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default();

        RankingRow {
            video_id: video_id.to_string(),
            url: stat.canonical_url(),
            published_at: stat.published_at.clone().unwrap_or_default(),
            view_count: stat.view_count,
            like_count: stat.like_count,
            matched,
            name: entrant.name.clone(),
            name_sort_key: name_sort_key(&entrant.name),
            country: entrant.country.clone(),
            age_years: self.ages.age_years(entrant.birth_date.as_deref()),
            birth_date,
            result_category: result.category.code(),
            result_rank_num: result.rank_num,
            result_prize_order: result.prize_order,
            result_text: result.text,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::UNRANKED;

    fn create_test_entrants() -> Vec<Entrant> {
        vec![
            Entrant::new("Eric Lu")
                .with_country("United States of America")
                .with_birth_date("1997-12-15")
                .with_final_rank("1")
                .with_video(Round::Round3, "lu3")
                .with_video(Round::Final, "luF"),
            Entrant::new("Kevin Chen")
                .with_country("Canada")
                .with_birth_date("2005-01-24")
                .with_final_rank("2")
                .with_video(Round::Round3, "chen3")
                .with_video(Round::Final, "chenF"),
            Entrant::new("Tianyao Lyu")
                .with_country("China")
                .with_video(Round::Round3, "lyu3"),
            Entrant::new("Nobody").with_video(Round::Round2, "n2"),
        ]
    }

    fn create_test_index() -> StatsIndex {
        StatsIndex::from_stats(vec![
            VideoStat::new("lu3", 1000, Some(50)).with_published_at("2025-10-13T10:00:00Z"),
            VideoStat::new("chen3", 2000, None),
            VideoStat::new("luF", 5000, Some(400)),
        ])
    }

    fn engine() -> JoinEngine {
        JoinEngine::new(NaiveDate::from_ymd_opt(2025, 10, 1).unwrap())
    }

    #[test]
    fn test_only_entrants_with_round_video_appear() {
        let entrants = create_test_entrants();
        let report = engine().join(Round::Round3, &entrants, &create_test_index());

        assert_eq!(report.rows.len(), 3);
        assert!(report.rows.iter().all(|r| r.name != "Nobody"));
    }

    #[test]
    fn test_row_count_matches_entrants_with_video() {
        let entrants = create_test_entrants();
        let index = create_test_index();

        for round in Round::ALL {
            let expected = entrants.iter().filter(|e| e.has_round(round)).count();
            let report = engine().join(round, &entrants, &index);
            assert_eq!(report.rows.len(), expected, "round {}", round);

            let unmatched_rows = report.rows.iter().filter(|r| !index.contains(&r.video_id)).count();
            assert_eq!(report.unmatched_count, unmatched_rows, "round {}", round);
        }
    }

    #[test]
    fn test_unmatched_entrant_kept_with_zero_counts() {
        let entrants = create_test_entrants();
        let report = engine().join(Round::Round3, &entrants, &create_test_index());

        assert_eq!(report.unmatched_count, 1);
        assert_eq!(report.unmatched_video_ids, vec!["lyu3"]);

        let lyu = report.rows.iter().find(|r| r.name == "Tianyao Lyu").unwrap();
        assert!(!lyu.matched);
        assert_eq!(lyu.view_count, 0);
        assert_eq!(lyu.like_count, Some(0));
        assert_eq!(lyu.published_at, "");
        assert_eq!(lyu.url, "https://www.youtube.com/watch?v=lyu3");
    }

    #[test]
    fn test_derived_fields() {
        let entrants = create_test_entrants();
        let report = engine().join(Round::Round3, &entrants, &create_test_index());

        let lu = &report.rows[0];
        assert!(lu.matched);
        assert_eq!(lu.view_count, 1000);
        assert_eq!(lu.like_count, Some(50));
        assert_eq!(lu.published_at, "2025-10-13T10:00:00Z");
        assert_eq!(lu.name_sort_key, "lu, eric");
        assert_eq!(lu.age_years, Some(27));
        assert_eq!(lu.birth_date, "1997-12-15");
        assert_eq!(lu.result_text, "1位");
        assert_eq!(lu.result_category, 0);
        assert_eq!(lu.result_rank_num, 1);
        assert_eq!(lu.result_prize_order, 1);

        let chen = &report.rows[1];
        assert_eq!(chen.like_count, None);
        assert_eq!(chen.age_years, Some(20));

        let lyu = &report.rows[2];
        assert_eq!(lyu.age_years, None);
        assert_eq!(lyu.birth_date, "");
        assert_eq!(lyu.result_category, 2);
        assert_eq!(lyu.result_rank_num, UNRANKED);
    }

    #[test]
    fn test_unparsable_birth_date_blanked() {
        let entrants = vec![Entrant::new("X")
            .with_birth_date("unknown")
            .with_video(Round::Final, "x")];
        let report = engine().join(Round::Final, &entrants, &StatsIndex::new());

        assert_eq!(report.rows[0].age_years, None);
        assert_eq!(report.rows[0].birth_date, "");
    }

    #[test]
    fn test_birth_date_normalized_for_age_tie_break() {
        let entrants = vec![
            Entrant::new("Dec Born")
                .with_birth_date("1990-12-01")
                .with_video(Round::Final, "dec"),
            Entrant::new("Nov Born")
                .with_birth_date("1990/11/01")
                .with_video(Round::Final, "nov"),
        ];
        let report = engine().join(Round::Final, &entrants, &StatsIndex::new());
        assert_eq!(report.rows[1].birth_date, "1990-11-01");
        assert_eq!(report.rows[0].age_years, Some(34));
        assert_eq!(report.rows[1].age_years, Some(34));

        let sorted = crate::sorter::MultiKeySorter::sort(
            &report.rows,
            &crate::sorter::SortSpec::new(
                crate::sorter::SortField::AgeYears,
                crate::sorter::SortDirection::Asc,
            ),
        );
        let names: Vec<&str> = sorted.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Nov Born", "Dec Born"]);
    }

    #[test]
    fn test_empty_inputs() {
        let report = engine().join(Round::Final, &[], &StatsIndex::new());
        assert!(report.rows.is_empty());
        assert!(report.is_complete());
    }

    #[test]
    fn test_summary() {
        let entrants = create_test_entrants();
        let report = engine().join(Round::Round3, &entrants, &create_test_index());
        assert_eq!(report.summary(), "Round round3: 3 rows, 1 without statistics");
    }
}
