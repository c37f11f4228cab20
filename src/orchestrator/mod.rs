//! Orchestrator module: high-level workflow coordination.
//!
//! A run reads the three input files, checks their columns, reconciles them
//! and then either writes the report (plus an optional run summary) or
//! returns a preview.

pub mod summary;

use log::{info, warn};
use serde::Serialize;

use crate::config::AppConfig;
use crate::error::{MapperError, ReconcileError};
use crate::export::csv_export::{
    Summary, TemplateSummary, export_summary_csv, export_to_csv, summarize, summarize_template,
};
use crate::matching::{MatchOptions, ReconcileStats, Reconciled, check_required_columns, reconcile};
use crate::models::{OutputShape, Table};
use crate::parse::parse_bytes;
use summary::SummaryBuilder;

/// The three parsed input datasets.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub old_users: Table,
    pub mac_records: Table,
    pub new_users: Table,
}

/// Result of a `map` run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub out_path: String,
    pub rows: usize,
    pub stats: ReconcileStats,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Preview {
    Flat(Summary),
    Template(TemplateSummary),
}

pub fn read_table(path: &str) -> Result<Table, MapperError> {
    let bytes = std::fs::read(path).map_err(|source| MapperError::Read {
        path: path.to_string(),
        source,
    })?;
    parse_bytes(&bytes).map_err(|source| MapperError::Parse {
        path: path.to_string(),
        source,
    })
}

pub fn load_inputs(cfg: &AppConfig) -> Result<Inputs, MapperError> {
    let old_users = read_table(&cfg.inputs.old_path)?;
    let mac_records = read_table(&cfg.inputs.mags_path)?;
    let new_users = read_table(&cfg.inputs.new_path)?;
    info!(
        "Loaded {} old users, {} MAC records, {} new users",
        old_users.len(),
        mac_records.len(),
        new_users.len()
    );
    Ok(Inputs {
        old_users,
        mac_records,
        new_users,
    })
}

/// Check that every column the selected shape reads exists in its dataset.
pub fn validate_columns(cfg: &AppConfig, inputs: &Inputs) -> Result<(), ReconcileError> {
    let c = &cfg.columns;
    check_required_columns(
        &inputs.old_users,
        &[c.old_id.as_str(), c.old_username.as_str()],
        "old users",
    )?;
    match cfg.output.shape {
        OutputShape::Flat => check_required_columns(
            &inputs.mac_records,
            &[c.mac_user_id.as_str(), c.mac.as_str()],
            "MAC",
        )?,
        OutputShape::Template => {
            check_required_columns(&inputs.mac_records, &[c.mac_user_id.as_str()], "MAC")?
        }
    }
    check_required_columns(
        &inputs.new_users,
        &[c.new_id.as_str(), c.new_username.as_str()],
        "new users",
    )?;
    Ok(())
}

pub fn reconcile_inputs(cfg: &AppConfig, inputs: &Inputs) -> (Reconciled, ReconcileStats) {
    let opts = MatchOptions {
        columns: cfg.columns.clone(),
        mac_decoding: cfg.mac.decoding,
    };
    let (reconciled, stats) = reconcile(
        &inputs.old_users,
        &inputs.mac_records,
        &inputs.new_users,
        cfg.output.shape,
        &opts,
    );
    info!(
        "Reconciled {} rows ({} shape): {} usernames indexed, {} MACs indexed",
        reconciled.len(),
        cfg.output.shape,
        stats.indexed_usernames,
        stats.indexed_macs
    );
    if stats.skipped_blank > 0 {
        warn!(
            "{} new user rows skipped for a blank id or username",
            stats.skipped_blank
        );
    }
    if stats.skipped_unmatched > 0 {
        info!(
            "{} new users have no matching old username",
            stats.skipped_unmatched
        );
    }
    if cfg.output.shape == OutputShape::Template && stats.passed_through > 0 {
        info!(
            "{} MAC rows kept their old user_id (no new id found)",
            stats.passed_through
        );
    }
    (reconciled, stats)
}

/// Read, reconcile and write the report. Zero output rows is an error.
pub fn run_map(cfg: &AppConfig) -> Result<RunOutcome, MapperError> {
    cfg.validate_for_output()?;
    let started = chrono::Utc::now();
    let inputs = load_inputs(cfg)?;
    validate_columns(cfg, &inputs)?;
    let (reconciled, stats) = reconcile_inputs(cfg, &inputs);
    if reconciled.is_empty() {
        return Err(ReconcileError::EmptyResult.into());
    }

    export_to_csv(&reconciled, &cfg.output.out_path)?;
    info!("Wrote {} rows to {}", reconciled.len(), cfg.output.out_path);

    if let Some(sum_path) = cfg.output.summary_path.as_deref() {
        let with_mac = match &reconciled {
            Reconciled::Flat(v) => v.iter().filter(|a| a.has_mac()).count(),
            Reconciled::Template { .. } => 0,
        };
        let ctx = SummaryBuilder::new(
            &cfg.inputs.old_path,
            &cfg.inputs.mags_path,
            &cfg.inputs.new_path,
        )
        .with_mode(cfg.output.shape, cfg.mac.decoding)
        .with_stats(stats.clone())
        .with_output(reconciled.len(), with_mac)
        .with_timestamps(started, chrono::Utc::now())
        .build();
        info!("Writing CSV summary to {}", sum_path);
        export_summary_csv(sum_path, &ctx)?;
    }

    Ok(RunOutcome {
        out_path: cfg.output.out_path.clone(),
        rows: reconciled.len(),
        stats,
    })
}

/// Read and reconcile without writing anything. An empty result is
/// reported as zero totals rather than an error.
pub fn run_preview(cfg: &AppConfig) -> Result<Preview, MapperError> {
    cfg.validate()?;
    let inputs = load_inputs(cfg)?;
    validate_columns(cfg, &inputs)?;
    let (reconciled, stats) = reconcile_inputs(cfg, &inputs);
    Ok(match &reconciled {
        Reconciled::Flat(v) => Preview::Flat(summarize(v)),
        Reconciled::Template { headers, rows } => {
            Preview::Template(summarize_template(headers, rows, stats.passed_through))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{InputConfig, OutputConfig};
    use std::path::Path;

    fn write(dir: &Path, name: &str, content: &[u8]) -> String {
        let p = dir.join(name);
        std::fs::write(&p, content).unwrap();
        p.to_str().unwrap().to_string()
    }

    fn cfg_in(dir: &Path, old: &[u8], mags: &[u8], new: &[u8]) -> AppConfig {
        AppConfig {
            inputs: InputConfig {
                old_path: write(dir, "old.csv", old),
                mags_path: write(dir, "mags.csv", mags),
                new_path: write(dir, "new.csv", new),
            },
            output: OutputConfig {
                out_path: dir.join("out.csv").to_str().unwrap().to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn map_writes_report_and_summary() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = cfg_in(
            dir.path(),
            b"id,username\n1,bob\n2,eve\n",
            b"user_id,mac\n1,AA:BB:CC:DD:EE:FF\n",
            b"id,username\n9,bob\n10,eve\n11,new_only\n",
        );
        let sum = dir.path().join("summary.csv");
        cfg.output.summary_path = Some(sum.to_str().unwrap().to_string());

        let outcome = run_map(&cfg).unwrap();
        assert_eq!(outcome.rows, 2);
        assert_eq!(outcome.stats.skipped_unmatched, 1);
        let text = std::fs::read_to_string(&outcome.out_path).unwrap();
        assert_eq!(
            text,
            "old_user_id,mac_address,new_user_id,username\n1,AA:BB:CC:DD:EE:FF,9,bob\n2,N/A,10,eve\n"
        );
        let summary = std::fs::read_to_string(&sum).unwrap();
        assert!(summary.contains("With MAC,1\n"));
    }

    #[test]
    fn no_overlap_is_empty_result() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = cfg_in(
            dir.path(),
            b"id,username\n1,bob\n",
            b"user_id,mac\n1,AA\n",
            b"id,username\n9,carol\n",
        );
        let err = run_map(&cfg).unwrap_err();
        assert!(matches!(err, MapperError::Reconcile(ReconcileError::EmptyResult)));
        assert!(err.is_input_error());
        assert!(!Path::new(&cfg.output.out_path).exists());
    }

    #[test]
    fn bad_encoding_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = cfg_in(
            dir.path(),
            b"id,username\n1,bob\n",
            b"user_id,mac\n1,\xc3\x28\n",
            b"id,username\n9,bob\n",
        );
        let err = run_map(&cfg).unwrap_err();
        assert!(matches!(err, MapperError::Parse { ref path, .. } if path.ends_with("mags.csv")));
        assert!(err.user_message().contains("UTF-8"));
    }

    #[test]
    fn missing_mac_column_is_reported_per_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = cfg_in(
            dir.path(),
            b"id,username\n1,bob\n",
            b"owner,mac\n1,AA\n",
            b"id,username\n9,bob\n",
        );
        let err = run_map(&cfg).unwrap_err();
        assert!(matches!(
            err,
            MapperError::Reconcile(ReconcileError::MissingField { dataset: "MAC", .. })
        ));
    }

    #[test]
    fn template_preview_keeps_every_mac_row() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = cfg_in(
            dir.path(),
            b"id,username\n1,bob\n",
            b"user_id,mac,vendor\n1,AA,acme\n5,BB,other\n",
            b"id,username\n9,bob\n",
        );
        cfg.output.shape = OutputShape::Template;
        let Preview::Template(p) = run_preview(&cfg).unwrap() else {
            panic!("expected template preview");
        };
        assert_eq!(p.total, 2);
        assert_eq!(p.rekeyed, 1);
        assert_eq!(p.sample[0], vec!["9", "AA", "acme"]);
    }

    #[test]
    fn flat_preview_of_no_overlap_is_zeroes() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = cfg_in(
            dir.path(),
            b"id,username\n1,bob\n",
            b"user_id,mac\n",
            b"id,username\n9,carol\n",
        );
        let Preview::Flat(s) = run_preview(&cfg).unwrap() else {
            panic!("expected flat preview");
        };
        assert_eq!(s.total, 0);
        assert!(s.sample.is_empty());
    }
}
