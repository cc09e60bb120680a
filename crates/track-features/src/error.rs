use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    #[error(transparent)]
    Harmony(#[from] harmony::Error),

    #[error("track length must be positive to compute chord densities, got {0}")]
    NonPositiveLength(f64),

    #[error("track description has no chord-annotated segment")]
    NoChords,
}

pub type Result<T> = std::result::Result<T, FeatureError>;
