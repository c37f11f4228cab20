pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod matching;
pub mod models;
pub mod normalize;
pub mod orchestrator;
pub mod parse;
pub mod util;

pub use export::csv_export::{Summary, format, summarize};
pub use matching::{MatchOptions, ReconcileStats, Reconciled, reconcile};
pub use models::{Association, OutputShape, Record, Table};
