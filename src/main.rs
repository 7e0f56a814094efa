use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::io;
use std::path::PathBuf;

// Use library instead of local modules
use audience_ranking::{
    collect_video_ids, id_batches, init_logging, load_entrants, load_latest_snapshot, write_csv,
    write_json, JoinEngine, Leaderboard, RankingConfig, ResultClassifier, Round, SortSpec,
};

#[derive(Parser, Debug)]
#[command(name = "audience-ranking")]
#[command(about = "Per-round video view/like leaderboards for competition entrants")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Config file (default: ./ranking.json if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Competitor list, overrides the config
    #[arg(long)]
    competitors: Option<PathBuf>,

    /// Verbose output level (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Join statistics with entrants and print the sorted leaderboard
    Rank {
        /// round1, round2, round3 or final
        #[arg(short, long)]
        round: Option<Round>,

        /// Statistics history file, overrides the config
        #[arg(long)]
        stats: Option<PathBuf>,

        /// Sort field (viewCount, likeCount, ageYears, nameSortKey, country, publishedAt, resultCategory)
        #[arg(short, long)]
        sort: Option<String>,

        /// asc or desc
        #[arg(short, long)]
        dir: Option<String>,

        /// Declared value type: number or string
        #[arg(long = "type")]
        value_type: Option<String>,

        /// Age reference date (YYYY-MM-DD)
        #[arg(long)]
        reference_date: Option<NaiveDate>,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
    },

    /// List video ids to fetch, one comma-joined provider batch per line
    Ids {
        /// Only this round (default: every round)
        #[arg(short, long)]
        round: Option<Round>,

        #[arg(long)]
        batch_size: Option<usize>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Csv,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = RankingConfig::load(cli.config.as_deref())?;
    if let Some(path) = cli.competitors {
        config.competitors_path = path;
    }

    match cli.command {
        Commands::Rank {
            round,
            stats,
            sort,
            dir,
            value_type,
            reference_date,
            format,
        } => {
            if let Some(path) = stats {
                config.stats_path = path;
            }
            if let Some(date) = reference_date {
                config.reference_date = date;
            }
            let round = round.unwrap_or(config.round);
            let sort = resolve_sort(&config, sort, dir, value_type)?;
            run_rank(&config, round, sort, format)
        }
        Commands::Ids { round, batch_size } => {
            let batch_size = batch_size.unwrap_or(config.batch_size);
            run_ids(&config, round, batch_size)
        }
    }
}

/// CLI flags win over the config's default sort; the result is re-validated
fn resolve_sort(
    config: &RankingConfig,
    field: Option<String>,
    dir: Option<String>,
    value_type: Option<String>,
) -> Result<SortSpec> {
    config
        .sort
        .overlay(field.as_deref(), dir.as_deref(), value_type.as_deref())
        .context("Invalid sort parameters")
}

fn run_rank(config: &RankingConfig, round: Round, sort: SortSpec, format: OutputFormat) -> Result<()> {
    eprintln!("🎹 Audience Ranking - {} ({} {})", round, sort.field, sort.direction);
    eprintln!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // 1. Load entrants
    eprintln!("\n📂 Loading entrants...");
    let entrants = load_entrants(&config.competitors_path)?;
    eprintln!("✓ Loaded {} entrants from {:?}", entrants.len(), config.competitors_path);

    // 2. Load statistics
    eprintln!("\n📊 Loading statistics...");
    let snapshot = load_latest_snapshot(&config.stats_path)?;
    eprintln!(
        "✓ Snapshot {} with {} videos",
        snapshot.display_date_ja(),
        snapshot.videos.len()
    );

    // 3. Join + sort
    let engine = JoinEngine::new(config.reference_date)
        .with_classifier(ResultClassifier::with_labels(config.labels.clone()));
    let board = Leaderboard::build(&engine, round, &entrants, &snapshot, sort);

    eprintln!("\n🔗 {} rows, {} total views", board.rows.len(), board.total_views());
    if board.unmatched_count > 0 {
        eprintln!(
            "⚠️  {} videos had no statistics (shown with zero counts): {}",
            board.unmatched_count,
            board.unmatched_video_ids.join(", ")
        );
    }

    // 4. Emit
    let stdout = io::stdout();
    match format {
        OutputFormat::Csv => write_csv(&board.rows, stdout.lock())?,
        OutputFormat::Json => write_json(&board, stdout.lock())?,
    }

    Ok(())
}

fn run_ids(config: &RankingConfig, round: Option<Round>, batch_size: usize) -> Result<()> {
    let entrants = load_entrants(&config.competitors_path)?;

    let rounds: Vec<Round> = match round {
        Some(round) => vec![round],
        None => Round::ALL.to_vec(),
    };

    let columns: Vec<&str> = rounds.iter().map(|r| r.label_ja()).collect();

    let ids = collect_video_ids(&entrants, &rounds);
    if ids.is_empty() {
        anyhow::bail!(
            "no video ids found in {:?} (columns: {})",
            config.competitors_path,
            columns.join(", ")
        );
    }

    tracing::info!(ids = ids.len(), columns = %columns.join(", "), "collected video ids");
    for batch in id_batches(&ids, batch_size) {
        println!("{}", batch);
    }

    Ok(())
}
