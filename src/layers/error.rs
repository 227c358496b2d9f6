//! Errors raised while acquiring the overlay layer set.

/// Errors that can occur while loading the manifest or its layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerError {
    /// The manifest resource answered with a non-success status.
    ManifestUnavailable { status: u16 },
    /// The manifest could not be parsed or failed validation.
    ManifestMalformed(String),
    /// A single layer could not be fetched or parsed. Aborts the whole batch.
    ///
    /// `status` is the HTTP status of the layer response, or 0 when the
    /// request never produced a response.
    LayerUnavailable {
        id: String,
        status: u16,
        reason: String,
    },
}

impl std::fmt::Display for LayerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerError::ManifestUnavailable { status } => {
                write!(f, "Failed to load layer index: {}", status)
            }
            LayerError::ManifestMalformed(msg) => write!(f, "Malformed layer index: {}", msg),
            LayerError::LayerUnavailable { id, status, reason } => {
                write!(f, "Failed to load {}: {} ({})", id, status, reason)
            }
        }
    }
}

impl std::error::Error for LayerError {}
