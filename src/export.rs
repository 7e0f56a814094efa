// 📤 Export - Leaderboard rows as CSV or JSON

use crate::join::RankingRow;
use crate::leaderboard::Leaderboard;
use anyhow::{Context, Result};
use std::io::Write;

/// Write rows as CSV with a camelCase header row
pub fn write_csv<W: Write>(rows: &[RankingRow], writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    for row in rows {
        wtr.serialize(row)
            .with_context(|| format!("Failed to write CSV row for video {}", row.video_id))?;
    }

    wtr.flush().context("Failed to flush CSV output")?;
    Ok(())
}

/// Write the whole leaderboard (metadata + rows) as pretty JSON
pub fn write_json<W: Write>(board: &Leaderboard, mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, board).context("Failed to write JSON output")?;
    writeln!(writer).context("Failed to write JSON output")?;
    Ok(())
}
