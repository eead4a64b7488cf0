use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("Malformed report source: expected an update line and a body, found {lines} non-empty line(s)")]
    MalformedSource { lines: usize },
}
