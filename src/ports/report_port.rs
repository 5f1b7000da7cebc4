//! Report generation port trait.

use crate::domain::error::TidesimError;
use crate::domain::metrics::Summary;
use crate::domain::replay::ReplayResult;

/// Port for persisting replay results.
pub trait ReportPort {
    fn write(
        &self,
        result: &ReplayResult,
        summary: &Summary,
        output_path: &str,
    ) -> Result<(), TidesimError>;
}
