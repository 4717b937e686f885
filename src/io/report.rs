use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

use crate::application::{BalanceEntry, OpOutcome, OpRecord};
use crate::domain::format_cents;

/// Operation log and final balances of a script run.
#[derive(Debug, Clone, Serialize)]
pub struct ScriptReport {
    pub executed_at: DateTime<Utc>,
    pub records: Vec<OpRecord>,
    pub balances: Vec<BalanceEntry>,
}

impl ScriptReport {
    pub fn new(records: Vec<OpRecord>, balances: Vec<BalanceEntry>) -> Self {
        Self {
            executed_at: Utc::now(),
            records,
            balances,
        }
    }

    /// Write the full report as pretty-printed JSON.
    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Write the operation log as CSV. Returns the number of rows written.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["line", "timestamp", "operation", "status", "balance", "error"])?;

        for record in &self.records {
            let (status, balance, error) = match &record.outcome {
                OpOutcome::Applied { balance_cents } => {
                    ("applied", format_cents(*balance_cents), String::new())
                }
                OpOutcome::Rejected { error } => ("rejected", String::new(), error.clone()),
            };
            csv_writer.write_record([
                record.line.to_string(),
                record.timestamp.to_rfc3339(),
                record.operation.clone(),
                status.to_string(),
                balance,
                error,
            ])?;
        }

        csv_writer.flush()?;
        Ok(self.records.len())
    }
}
