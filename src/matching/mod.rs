//! Identity reconciliation: joins old users, MAC records and new users on username.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::ReconcileError;
use crate::models::{
    Association, ColumnMapping, MAC_SENTINEL, MacDecoding, OutputShape, Record, Table,
};
use crate::normalize::{normalize_key, normalize_mac};

#[derive(Debug, Clone, Default)]
pub struct MatchOptions {
    pub columns: ColumnMapping,
    pub mac_decoding: MacDecoding,
}

/// Counters describing one reconciliation, including rows that were dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileStats {
    pub old_rows: usize,
    pub mac_rows: usize,
    pub new_rows: usize,
    pub indexed_usernames: usize,
    pub indexed_macs: usize,
    /// New users with a blank id or username.
    pub skipped_blank: usize,
    /// New users whose username is not in the old dataset.
    pub skipped_unmatched: usize,
    /// Template rows emitted with their original user_id.
    pub passed_through: usize,
}

/// Output of [`reconcile`], one variant per [`OutputShape`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciled {
    Flat(Vec<Association>),
    Template {
        headers: Vec<String>,
        rows: Vec<Record>,
    },
}

impl Reconciled {
    pub fn len(&self) -> usize {
        match self {
            Self::Flat(v) => v.len(),
            Self::Template { rows, .. } => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn shape(&self) -> OutputShape {
        match self {
            Self::Flat(_) => OutputShape::Flat,
            Self::Template { .. } => OutputShape::Template,
        }
    }
}

/// Build `key -> value` over `rows`, keeping only rows where both trimmed
/// values are non-empty. Later rows overwrite earlier ones.
fn index_by<'a>(rows: &'a [Record], key_col: &str, value_col: &str) -> HashMap<&'a str, &'a str> {
    let mut map = HashMap::with_capacity(rows.len());
    for r in rows {
        let key = normalize_key(r.get(key_col));
        let value = normalize_key(r.get(value_col));
        if !key.is_empty() && !value.is_empty() {
            map.insert(key, value);
        }
    }
    map
}

fn index_macs<'a>(
    rows: &'a [Record],
    cols: &ColumnMapping,
    decoding: MacDecoding,
) -> HashMap<&'a str, String> {
    let mut map = HashMap::with_capacity(rows.len());
    for r in rows {
        let user_id = normalize_key(r.get(&cols.mac_user_id));
        if user_id.is_empty() {
            continue;
        }
        if let Some(mac) = normalize_mac(r.get(&cols.mac), decoding) {
            map.insert(user_id, mac);
        }
    }
    map
}

/// `old id -> new id`, walking old users in file order so that when several
/// usernames share an old id the last such row wins.
fn compose_new_ids<'a>(
    old_rows: &'a [Record],
    cols: &ColumnMapping,
    new_id_by_username: &HashMap<&str, &'a str>,
) -> HashMap<&'a str, &'a str> {
    let mut map = HashMap::with_capacity(old_rows.len());
    for r in old_rows {
        let username = normalize_key(r.get(&cols.old_username));
        let old_id = normalize_key(r.get(&cols.old_id));
        if username.is_empty() || old_id.is_empty() {
            continue;
        }
        if let Some(new_id) = new_id_by_username.get(username) {
            map.insert(old_id, *new_id);
        }
    }
    map
}

/// Join the three datasets. Indices are rebuilt on every call and dropped
/// before returning.
pub fn reconcile(
    old_users: &Table,
    mac_records: &Table,
    new_users: &Table,
    shape: OutputShape,
    opts: &MatchOptions,
) -> (Reconciled, ReconcileStats) {
    let cols = &opts.columns;
    let old_id_by_username = index_by(&old_users.rows, &cols.old_username, &cols.old_id);

    let mut stats = ReconcileStats {
        old_rows: old_users.len(),
        mac_rows: mac_records.len(),
        new_rows: new_users.len(),
        indexed_usernames: old_id_by_username.len(),
        ..Default::default()
    };

    match shape {
        OutputShape::Flat => {
            let mac_by_old_id = index_macs(&mac_records.rows, cols, opts.mac_decoding);
            stats.indexed_macs = mac_by_old_id.len();
            let out = reconcile_flat(&old_id_by_username, &mac_by_old_id, new_users, cols, &mut stats);
            (Reconciled::Flat(out), stats)
        }
        OutputShape::Template => {
            let new_id_by_username = index_by(&new_users.rows, &cols.new_username, &cols.new_id);
            let new_id_by_old_id = compose_new_ids(&old_users.rows, cols, &new_id_by_username);
            let rows = rekey_mac_rows(mac_records, &new_id_by_old_id, cols, &mut stats);
            (
                Reconciled::Template {
                    headers: mac_records.headers.clone(),
                    rows,
                },
                stats,
            )
        }
    }
}

fn reconcile_flat(
    old_id_by_username: &HashMap<&str, &str>,
    mac_by_old_id: &HashMap<&str, String>,
    new_users: &Table,
    cols: &ColumnMapping,
    stats: &mut ReconcileStats,
) -> Vec<Association> {
    let mut out = Vec::new();
    for user in &new_users.rows {
        let new_id = normalize_key(user.get(&cols.new_id));
        let username = normalize_key(user.get(&cols.new_username));
        if new_id.is_empty() || username.is_empty() {
            stats.skipped_blank += 1;
            continue;
        }
        let Some(old_id) = old_id_by_username.get(username) else {
            stats.skipped_unmatched += 1;
            continue;
        };
        let mac = mac_by_old_id
            .get(old_id)
            .map(|m| m.as_str())
            .unwrap_or(MAC_SENTINEL);
        out.push(Association {
            old_user_id: (*old_id).to_string(),
            mac_address: mac.to_string(),
            new_user_id: new_id.to_string(),
            username: username.to_string(),
        });
    }
    out
}

// Every MAC row is emitted; rows with no known new id keep the old one.
fn rekey_mac_rows(
    mac_records: &Table,
    new_id_by_old_id: &HashMap<&str, &str>,
    cols: &ColumnMapping,
    stats: &mut ReconcileStats,
) -> Vec<Record> {
    let mut out = Vec::with_capacity(mac_records.len());
    for rec in &mac_records.rows {
        let old_id = normalize_key(rec.get(&cols.mac_user_id));
        match new_id_by_old_id.get(old_id) {
            Some(new_id) => {
                let mut copy = rec.clone();
                copy.set(cols.mac_user_id.as_str(), *new_id);
                out.push(copy);
            }
            None => {
                stats.passed_through += 1;
                out.push(rec.clone());
            }
        }
    }
    out
}

/// Fail when a dataset with a header row lacks one of `columns` entirely.
/// Tables without any header (empty input) are left to the empty-result check.
pub fn check_required_columns(
    table: &Table,
    columns: &[&str],
    dataset: &'static str,
) -> Result<(), ReconcileError> {
    if table.headers.is_empty() {
        return Ok(());
    }
    for col in columns {
        if !table.has_column(col) {
            return Err(ReconcileError::MissingField {
                dataset,
                column: (*col).to_string(),
            });
        }
    }
    Ok(())
}
