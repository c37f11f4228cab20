//! Run summary: what was read, what was produced, and how long it took.

use crate::matching::ReconcileStats;
use crate::models::{MacDecoding, OutputShape};

#[derive(Debug, Clone)]
pub struct SummaryContext {
    pub old_path: String,
    pub mags_path: String,
    pub new_path: String,
    pub shape: OutputShape,
    pub mac_decoding: MacDecoding,
    pub stats: ReconcileStats,
    pub output_rows: usize,
    pub with_mac: usize,
    pub started_utc: chrono::DateTime<chrono::Utc>,
    pub ended_utc: chrono::DateTime<chrono::Utc>,
}

/// Builder for SummaryContext to simplify summary creation.
#[derive(Debug, Clone)]
pub struct SummaryBuilder {
    ctx: SummaryContext,
}

impl SummaryBuilder {
    pub fn new(old_path: &str, mags_path: &str, new_path: &str) -> Self {
        let now = chrono::Utc::now();
        Self {
            ctx: SummaryContext {
                old_path: old_path.to_string(),
                mags_path: mags_path.to_string(),
                new_path: new_path.to_string(),
                shape: OutputShape::default(),
                mac_decoding: MacDecoding::default(),
                stats: ReconcileStats::default(),
                output_rows: 0,
                with_mac: 0,
                started_utc: now,
                ended_utc: now,
            },
        }
    }

    pub fn with_mode(mut self, shape: OutputShape, mac_decoding: MacDecoding) -> Self {
        self.ctx.shape = shape;
        self.ctx.mac_decoding = mac_decoding;
        self
    }

    pub fn with_stats(mut self, stats: ReconcileStats) -> Self {
        self.ctx.stats = stats;
        self
    }

    /// Set output counts. `with_mac` only applies to flat output.
    pub fn with_output(mut self, output_rows: usize, with_mac: usize) -> Self {
        self.ctx.output_rows = output_rows;
        self.ctx.with_mac = with_mac;
        self
    }

    pub fn with_timestamps(
        mut self,
        started: chrono::DateTime<chrono::Utc>,
        ended: chrono::DateTime<chrono::Utc>,
    ) -> Self {
        self.ctx.started_utc = started;
        self.ctx.ended_utc = ended;
        self
    }

    pub fn build(self) -> SummaryContext {
        self.ctx
    }
}
