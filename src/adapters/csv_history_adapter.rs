//! CSV export of the treasury event history.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::error::TreasuryError;
use crate::domain::ledger::HistoryEntry;

const HEADER: [&str; 6] = ["timestamp", "type", "agent", "market", "amount", "balance"];

fn csv_err(e: csv::Error) -> TreasuryError {
    match e.into_kind() {
        csv::ErrorKind::Io(io) => TreasuryError::Io(io),
        other => TreasuryError::Io(std::io::Error::other(format!("CSV write error: {:?}", other))),
    }
}

/// Write `entries` with a header row. Returns the number of data rows.
pub fn write_history<W: Write>(writer: W, entries: &[HistoryEntry]) -> Result<usize, TreasuryError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER).map_err(csv_err)?;

    for entry in entries {
        let agent = entry.agent.map(|a| a.to_string()).unwrap_or_default();
        let market = entry.market.clone().unwrap_or_default();
        wtr.write_record([
            entry.timestamp.to_rfc3339(),
            entry.kind.as_str().to_string(),
            agent,
            market,
            format!("{:.2}", entry.amount),
            format!("{:.2}", entry.balance),
        ])
        .map_err(csv_err)?;
    }

    wtr.flush()?;
    Ok(entries.len())
}

pub fn export_history(path: &Path, entries: &[HistoryEntry]) -> Result<usize, TreasuryError> {
    let file = File::create(path)?;
    write_history(file, entries)
}
