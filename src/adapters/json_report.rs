//! JSON report adapter.
//!
//! Writes the summary and the full trade log as pretty-printed JSON.

use serde::Serialize;
use std::fs;

use crate::domain::error::TidesimError;
use crate::domain::metrics::Summary;
use crate::domain::replay::ReplayResult;
use crate::domain::trade_log::TradeRecord;
use crate::ports::report_port::ReportPort;

pub struct JsonReportAdapter;

#[derive(Serialize)]
struct Report<'a> {
    summary: &'a Summary,
    trades: &'a [TradeRecord],
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    unpriced_positions: &'a [String],
}

impl ReportPort for JsonReportAdapter {
    fn write(
        &self,
        result: &ReplayResult,
        summary: &Summary,
        output_path: &str,
    ) -> Result<(), TidesimError> {
        let report = Report {
            summary,
            trades: result.log.records(),
            unpriced_positions: &result.unpriced_positions,
        };
        let json = serde_json::to_string_pretty(&report).map_err(|e| TidesimError::Report {
            reason: format!("serialization failed: {}", e),
        })?;
        fs::write(output_path, json).map_err(|e| TidesimError::Report {
            reason: format!("failed to write {}: {}", output_path, e),
        })?;
        Ok(())
    }
}
