/// Errors from harmonic analysis.
///
/// Every variant is fatal for the call that produced it: a partially
/// resolved chord sequence would skew every ratio derived from it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("unknown chord label {label:?} at position {position}")]
    UnknownChordLabel { label: String, position: usize },

    #[error("unknown key label {0:?}")]
    UnknownKeyLabel(String),

    #[error("empty chord sequence")]
    EmptySequence,
}

pub type Result<T> = std::result::Result<T, Error>;
