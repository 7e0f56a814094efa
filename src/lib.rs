// Audience Ranking - Core Library
// Video engagement leaderboards for competition rounds.
// Exposes all modules for use in CLI, API server, and tests

pub mod error;
pub mod entrant;      // Entrants, rounds, competitor file loading
pub mod stats;        // Video statistics, StatsIndex, snapshot history
pub mod classifier;   // Result categories
pub mod age;          // Age at the reference date
pub mod name_key;     // Surname-first keys + collation
pub mod join;         // Entrants × statistics → ranking rows
pub mod sorter;       // Multi-key sorting
pub mod leaderboard;  // join + sort in one pass
pub mod export;       // CSV / JSON output
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{RankingError, RankingResult};
pub use entrant::{collect_video_ids, load_entrants, parse_entrants, Entrant, Round};
pub use stats::{
    id_batches, load_latest_snapshot, parse_latest_snapshot, watch_url,
    StatsIndex, StatsSnapshot, VideoStat, PROVIDER_BATCH_LIMIT,
};
pub use classifier::{
    ResultCategory, ResultClassification, ResultClassifier, ResultLabels, UNRANKED,
};
pub use age::{default_reference_date, AgeCalculator};
pub use name_key::{collate, name_sort_key};
pub use join::{JoinEngine, JoinReport, RankingRow};
pub use sorter::{MultiKeySorter, SortDirection, SortField, SortSpec, ValueType};
pub use leaderboard::Leaderboard;
pub use export::{write_csv, write_json};
pub use config::RankingConfig;
pub use logging::init_logging;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
