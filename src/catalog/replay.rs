//! Replaying scripted catalog operations.
//!
//! A script is a JSON array of operations:
//!
//! ```json
//! [
//!   { "op": "insert", "path": "sales.orders", "value": "table" },
//!   { "op": "erase", "path": "sales.orders" }
//! ]
//! ```

use serde::{Deserialize, Serialize};

use super::{Catalog, HistoricalValue};
use crate::error::CatalogResult;

/// One scripted operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum ReplayOp {
    /// Record a new version of `path`.
    Insert {
        /// Target path
        path: String,
        /// Value to record
        value: String,
    },
    /// Erase the latest version of `path`.
    Erase {
        /// Target path
        path: String,
    },
}

/// State of one path after a replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayEntry {
    /// The path
    pub path: String,
    /// Its latest value
    pub latest: String,
    /// Every visible value, oldest first
    pub history: Vec<HistoricalValue<String>>,
}

/// Outcome of a replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    /// Operations applied
    pub applied: usize,
    /// Erase operations whose path carried no value
    pub missed_erases: usize,
    /// Live `(path, version)` pairs
    pub len: usize,
    /// Paths in sorted order with their history
    pub entries: Vec<ReplayEntry>,
}

/// Parses a JSON script.
pub fn parse_script(script: &str) -> CatalogResult<Vec<ReplayOp>> {
    Ok(serde_json::from_str(script)?)
}

/// Applies `ops` in order and reports the resulting catalog contents.
///
/// Stops at the first operation with an invalid path.
pub fn replay(catalog: &Catalog<String>, ops: &[ReplayOp]) -> CatalogResult<ReplayReport> {
    let mut missed_erases = 0;
    for (step, op) in ops.iter().enumerate() {
        match op {
            ReplayOp::Insert { path, value } => {
                let version = catalog.insert(path, value.clone())?;
                tracing::trace!(step, path = %path, %version, "replayed insert");
            }
            ReplayOp::Erase { path } => {
                if !catalog.erase(path)? {
                    missed_erases += 1;
                    tracing::warn!(step, path = %path, "erase of a path without value");
                }
            }
        }
    }

    let mut entries = Vec::new();
    for (path, latest) in catalog.entries() {
        let history = catalog.history(&path)?;
        entries.push(ReplayEntry {
            path,
            latest,
            history,
        });
    }

    Ok(ReplayReport {
        applied: ops.len(),
        missed_erases,
        len: catalog.len(),
        entries,
    })
}
