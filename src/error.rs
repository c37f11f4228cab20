use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("input is not valid UTF-8: {source}")]
    Decoding {
        #[from]
        source: std::str::Utf8Error,
    },
    #[error("csv read error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("no mappings could be created; check that the files overlap on username")]
    EmptyResult,
    #[error("{dataset} dataset has no '{column}' column")]
    MissingField {
        dataset: &'static str,
        column: String,
    },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv export error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("output is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Everything a mapping run can fail with.
#[derive(Debug, Error)]
pub enum MapperError {
    #[error("{path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: ParseError,
    },
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl MapperError {
    /// True when the failure is caused by the user's input rather than the tool.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::Parse { .. } | Self::Reconcile(_) | Self::Config(_) | Self::Read { .. }
        )
    }

    /// Message shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::Parse {
                path,
                source: ParseError::Decoding { .. },
            } => format!(
                "Invalid file encoding in {}. Please ensure files are UTF-8 encoded.",
                path
            ),
            Self::Parse { path, source } => format!("Could not read CSV {}: {}", path, source),
            Self::Reconcile(ReconcileError::EmptyResult) => {
                "No mappings could be created. Please check your CSV files.".to_string()
            }
            Self::Reconcile(ReconcileError::MissingField { dataset, column }) => {
                format!("Missing required column in CSV: '{}' ({} file)", column, dataset)
            }
            Self::Config(e) => format!("Invalid configuration: {}", e),
            Self::Read { path, source } => format!("Cannot open {}: {}", path, source),
            Self::Export(e) => format!("Error writing output: {}", e),
        }
    }
}
