// 🥇 Leaderboard - One aggregation pass: join, then sort for display

use crate::entrant::{Entrant, Round};
use crate::join::{JoinEngine, RankingRow};
use crate::sorter::{MultiKeySorter, SortSpec};
use crate::stats::StatsSnapshot;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard {
    pub round: Round,
    /// Date of the statistics snapshot used
    pub snapshot_date: String,
    pub reference_date: NaiveDate,
    pub sort: SortSpec,
    pub unmatched_count: usize,
    pub unmatched_video_ids: Vec<String>,
    pub rows: Vec<RankingRow>,
}

impl Leaderboard {
    pub fn build(
        engine: &JoinEngine,
        round: Round,
        entrants: &[Entrant],
        snapshot: &StatsSnapshot,
        sort: SortSpec,
    ) -> Self {
        let report = engine.join(round, entrants, &snapshot.index());
        let rows = MultiKeySorter::sort(&report.rows, &sort);

        Leaderboard {
            round,
            snapshot_date: snapshot.date.clone(),
            reference_date: engine.reference_date(),
            sort,
            unmatched_count: report.unmatched_count,
            unmatched_video_ids: report.unmatched_video_ids,
            rows,
        }
    }

    /// Same rows under a different ordering
    pub fn resorted(&self, sort: SortSpec) -> Self {
        Leaderboard {
            sort,
            rows: MultiKeySorter::sort(&self.rows, &sort),
            ..self.clone()
        }
    }

    pub fn total_views(&self) -> u64 {
        self.rows.iter().map(|r| r.view_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sorter::{SortDirection, SortField};
    use crate::stats::VideoStat;

    fn create_test_snapshot() -> StatsSnapshot {
        StatsSnapshot {
            date: "2025-10-22".to_string(),
            videos: vec![
                VideoStat::new("a", 300, Some(30)),
                VideoStat::new("b", 900, Some(10)),
            ],
        }
    }

    fn create_test_entrants() -> Vec<Entrant> {
        vec![
            Entrant::new("Alpha One").with_final_rank("1").with_prize("Gold").with_video(Round::Final, "a"),
            Entrant::new("Beta Two").with_video(Round::Final, "b"),
            Entrant::new("Gamma Three").with_video(Round::Final, "c"),
            Entrant::new("Delta Four").with_video(Round::Round3, "d"),
        ]
    }

    #[test]
    fn test_build_final_leaderboard() {
        let engine = JoinEngine::new(NaiveDate::from_ymd_opt(2025, 10, 1).unwrap());
        let board = Leaderboard::build(
            &engine,
            Round::Final,
            &create_test_entrants(),
            &create_test_snapshot(),
            SortSpec::default(),
        );

        assert_eq!(board.snapshot_date, "2025-10-22");
        assert_eq!(board.rows.len(), 3);
        assert_eq!(board.unmatched_count, 1);
        assert_eq!(board.unmatched_video_ids, vec!["c"]);
        assert_eq!(board.total_views(), 1200);

        let order: Vec<&str> = board.rows.iter().map(|r| r.video_id.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_resorted_by_result() {
        let engine = JoinEngine::default();
        let board = Leaderboard::build(
            &engine,
            Round::Final,
            &create_test_entrants(),
            &create_test_snapshot(),
            SortSpec::default(),
        );

        let by_result = board.resorted(SortSpec::new(SortField::ResultCategory, SortDirection::Asc));
        let order: Vec<&str> = by_result.rows.iter().map(|r| r.name.as_str()).collect();
        // Finalists tie on category and rank, so surname decides: "three" < "two"
        assert_eq!(order, vec!["Alpha One", "Gamma Three", "Beta Two"]);
        assert_eq!(by_result.rows[0].result_text, "1位、Gold");
        assert_eq!(by_result.sort.field, SortField::ResultCategory);
    }
}
