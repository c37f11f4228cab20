//! Sanity report over a flat mapping file produced by a previous run.

use std::collections::HashSet;

use serde::Serialize;

use crate::error::ReconcileError;
use crate::export::csv_export::FLAT_HEADERS;
use crate::matching::check_required_columns;
use crate::models::{MAC_SENTINEL, Table};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdRange {
    pub min: i64,
    pub max: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    pub total: usize,
    pub with_mac: usize,
    pub without_mac: usize,
    pub unique_macs: usize,
    pub old_id_range: Option<IdRange>,
    pub new_id_range: Option<IdRange>,
    /// Rows whose old or new id is not an integer.
    pub non_numeric_ids: usize,
}

fn widen(range: &mut Option<IdRange>, v: i64) {
    match range {
        Some(r) => {
            r.min = r.min.min(v);
            r.max = r.max.max(v);
        }
        None => *range = Some(IdRange { min: v, max: v }),
    }
}

pub fn verify_report(report: &Table) -> Result<VerifyReport, ReconcileError> {
    check_required_columns(report, &FLAT_HEADERS, "mapping report")?;

    let mut with_mac = 0usize;
    let mut macs: HashSet<&str> = HashSet::new();
    let mut old_id_range = None;
    let mut new_id_range = None;
    let mut non_numeric_ids = 0usize;

    for row in &report.rows {
        let mac = row.get("mac_address");
        if mac != MAC_SENTINEL {
            with_mac += 1;
            macs.insert(mac);
        }
        let old = row.get_trimmed("old_user_id").parse::<i64>();
        let new = row.get_trimmed("new_user_id").parse::<i64>();
        match (old, new) {
            (Ok(o), Ok(n)) => {
                widen(&mut old_id_range, o);
                widen(&mut new_id_range, n);
            }
            _ => non_numeric_ids += 1,
        }
    }

    Ok(VerifyReport {
        total: report.len(),
        with_mac,
        without_mac: report.len() - with_mac,
        unique_macs: macs.len(),
        old_id_range,
        new_id_range,
        non_numeric_ids,
    })
}

impl std::fmt::Display for VerifyReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Total Mappings: {}", self.total)?;
        writeln!(f, "  - With MAC addresses: {}", self.with_mac)?;
        writeln!(f, "  - Without MAC addresses: {}", self.without_mac)?;
        writeln!(f, "  - Unique MAC addresses: {}", self.unique_macs)?;
        if let Some(r) = &self.old_id_range {
            writeln!(f, "Old User ID Range: {} - {}", r.min, r.max)?;
        }
        if let Some(r) = &self.new_id_range {
            writeln!(f, "New User ID Range: {} - {}", r.min, r.max)?;
        }
        if self.non_numeric_ids > 0 {
            writeln!(f, "Rows with non-numeric ids: {}", self.non_numeric_ids)?;
        }
        Ok(())
    }
}
