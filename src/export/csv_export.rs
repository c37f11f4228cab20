use crate::error::ExportError;
use crate::matching::Reconciled;
use crate::models::{Association, Record};
use crate::orchestrator::summary::SummaryContext;
use csv::{Writer, WriterBuilder};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};

pub const FLAT_HEADERS: [&str; 4] = ["old_user_id", "mac_address", "new_user_id", "username"];

/// Number of rows included in a preview sample.
pub const SAMPLE_SIZE: usize = 10;

/// Serialize reconciled output to CSV text. Same input, same bytes.
pub fn format(reconciled: &Reconciled) -> Result<String, ExportError> {
    let mut buf = Vec::new();
    write_csv(reconciled, &mut buf)?;
    Ok(String::from_utf8(buf)?)
}

/// Stream reconciled output as CSV into `out`.
pub fn write_csv<W: Write>(reconciled: &Reconciled, out: W) -> Result<(), ExportError> {
    let mut w = WriterBuilder::new().from_writer(out);
    match reconciled {
        Reconciled::Flat(associations) => write_flat(&mut w, associations)?,
        Reconciled::Template { headers, rows } => write_template(&mut w, headers, rows)?,
    }
    w.flush()?;
    Ok(())
}

pub fn export_to_csv(reconciled: &Reconciled, path: &str) -> Result<(), ExportError> {
    let file = File::create(path)?;
    let buf_writer = BufWriter::with_capacity(512 * 1024, file);
    write_csv(reconciled, buf_writer)
}

fn write_flat<W: Write>(w: &mut Writer<W>, associations: &[Association]) -> Result<(), ExportError> {
    w.write_record(FLAT_HEADERS)?;
    for a in associations {
        w.write_record([
            a.old_user_id.as_str(),
            a.mac_address.as_str(),
            a.new_user_id.as_str(),
            a.username.as_str(),
        ])?;
    }
    Ok(())
}

fn write_template<W: Write>(
    w: &mut Writer<W>,
    headers: &[String],
    rows: &[Record],
) -> Result<(), ExportError> {
    // A MAC file with no header row has nothing to lay the rows out by
    if headers.is_empty() {
        return Ok(());
    }
    w.write_record(headers)?;
    for row in rows {
        w.write_record(headers.iter().map(|h| row.get(h)))?;
    }
    Ok(())
}

/// Preview of a flat run, shaped like the web preview payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub success: bool,
    #[serde(rename = "total_mappings")]
    pub total: usize,
    pub with_mac: usize,
    pub without_mac: usize,
    pub sample: Vec<Association>,
}

pub fn summarize(associations: &[Association]) -> Summary {
    let with_mac = associations.iter().filter(|a| a.has_mac()).count();
    Summary {
        success: true,
        total: associations.len(),
        with_mac,
        without_mac: associations.len() - with_mac,
        sample: associations.iter().take(SAMPLE_SIZE).cloned().collect(),
    }
}

/// Preview of a template run. Sample rows are laid out by `headers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateSummary {
    pub success: bool,
    #[serde(rename = "total_rows")]
    pub total: usize,
    pub rekeyed: usize,
    pub passed_through: usize,
    pub headers: Vec<String>,
    pub sample: Vec<Vec<String>>,
}

pub fn summarize_template(headers: &[String], rows: &[Record], passed_through: usize) -> TemplateSummary {
    let sample = rows
        .iter()
        .take(SAMPLE_SIZE)
        .map(|r| headers.iter().map(|h| r.get(h).to_string()).collect())
        .collect();
    TemplateSummary {
        success: true,
        total: rows.len(),
        rekeyed: rows.len().saturating_sub(passed_through),
        passed_through,
        headers: headers.to_vec(),
        sample,
    }
}

pub fn export_summary_csv(path: &str, ctx: &SummaryContext) -> Result<(), ExportError> {
    let file = File::create(path)?;
    let buf_writer = BufWriter::new(file);
    let mut w = WriterBuilder::new().from_writer(buf_writer);
    w.write_record(["Key", "Value"])?;

    let mut write_kv = |k: &str, v: String| -> Result<(), ExportError> {
        w.write_record([k, v.as_str()])?;
        Ok(())
    };

    // Inputs
    write_kv("Old users file", ctx.old_path.clone())?;
    write_kv("MAC file", ctx.mags_path.clone())?;
    write_kv("New users file", ctx.new_path.clone())?;
    write_kv("Output shape", ctx.shape.to_string())?;
    write_kv("MAC decoding", ctx.mac_decoding.to_string())?;

    // Totals
    let s = &ctx.stats;
    write_kv("Old user rows", s.old_rows.to_string())?;
    write_kv("MAC rows", s.mac_rows.to_string())?;
    write_kv("New user rows", s.new_rows.to_string())?;
    write_kv("Indexed usernames", s.indexed_usernames.to_string())?;
    write_kv("Output rows", ctx.output_rows.to_string())?;

    match ctx.shape {
        crate::models::OutputShape::Flat => {
            write_kv("Indexed MACs", s.indexed_macs.to_string())?;
            write_kv("With MAC", ctx.with_mac.to_string())?;
            write_kv(
                "Without MAC",
                ctx.output_rows.saturating_sub(ctx.with_mac).to_string(),
            )?;
            write_kv("Skipped (blank id/username)", s.skipped_blank.to_string())?;
            write_kv("Skipped (no old match)", s.skipped_unmatched.to_string())?;
        }
        crate::models::OutputShape::Template => {
            write_kv(
                "Re-keyed rows",
                ctx.output_rows.saturating_sub(s.passed_through).to_string(),
            )?;
            write_kv("Passed through", s.passed_through.to_string())?;
        }
    }

    // Human-readable HH:MM:SS (hours may exceed 23)
    let fmt_duration = |ms: i64| -> String {
        let total = (ms.max(0) / 1000) as u64;
        let h = total / 3600;
        let m = (total % 3600) / 60;
        let s = total % 60;
        format!("{:02}:{:02}:{:02}", h, m, s)
    };
    write_kv("Started (UTC)", ctx.started_utc.format("%Y-%m-%d %H:%M:%S").to_string())?;
    write_kv("Ended (UTC)", ctx.ended_utc.format("%Y-%m-%d %H:%M:%S").to_string())?;
    write_kv(
        "Duration",
        fmt_duration((ctx.ended_utc - ctx.started_utc).num_milliseconds()),
    )?;

    w.flush()?;
    Ok(())
}
