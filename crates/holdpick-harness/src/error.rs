#![forbid(unsafe_code)]

use std::io;
use std::path::PathBuf;

use holdpick_core::GestureConfigError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("failed to read trace {path}: {source}")]
    ReadTrace {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("trace line {line}: {source}")]
    ParseRecord {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// `line` is the first non-header record, or `None` for an empty trace.
    #[error(
        "trace has no header record{}",
        .line.map(|line| format!(" (line {line} came first)")).unwrap_or_default()
    )]
    MissingHeader { line: Option<usize> },

    #[error("trace line {line}: header record must come first and appear once")]
    UnexpectedHeader { line: usize },

    #[error("invalid gesture config in trace header: {0}")]
    Config(#[from] GestureConfigError),

    #[error("invalid checksum `{value}`: expected up to 16 hex digits")]
    InvalidChecksum { value: String },

    #[error("checksum mismatch: expected {expected:016x}, replay produced {actual:016x}")]
    ChecksumMismatch { expected: u64, actual: u64 },

    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

impl HarnessError {
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::ChecksumMismatch { .. } => 1,
            Self::ReadTrace { .. } | Self::InvalidChecksum { .. } => 2,
            Self::ParseRecord { .. }
            | Self::MissingHeader { .. }
            | Self::UnexpectedHeader { .. } => 3,
            Self::Config(_) => 4,
            Self::Encode(_) | Self::Output(_) => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatch_is_exit_one() {
        let err = HarnessError::ChecksumMismatch {
            expected: 0xab,
            actual: 0xcd,
        };
        assert_eq!(err.exit_code(), 1);
        assert_eq!(
            err.to_string(),
            "checksum mismatch: expected 00000000000000ab, replay produced 00000000000000cd"
        );
    }

    #[test]
    fn missing_header_names_the_offending_line() {
        let err = HarnessError::MissingHeader { line: Some(2) };
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.to_string(), "trace has no header record (line 2 came first)");
        assert_eq!(
            HarnessError::MissingHeader { line: None }.to_string(),
            "trace has no header record"
        );
    }

    #[test]
    fn config_errors_convert() {
        let err: HarnessError = GestureConfigError::ZeroLongPress.into();
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().starts_with("invalid gesture config"));
    }
}
