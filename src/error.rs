// THEORY:
// The tracker core has exactly two failure edges: a bad construction-time parameter
// (fatal, caught once before a single frame is ever processed) and a malformed
// per-frame input (recoverable, the offending item is dropped and the frame continues).
// Both live on one enum so callers match a single type regardless of which phase failed.

use thiserror::Error;

/// Errors raised by the hypothesis-tracking core.
#[derive(Debug, Error, PartialEq)]
pub enum TrackerError {
    /// A `TrackerConfig` field is outside its admissible range. Raised only at
    /// engine construction; the engine never starts with an invalid configuration.
    #[error("invalid tracker configuration: {0}")]
    Config(String),

    /// A per-frame input was malformed: a detection box lies outside the frame
    /// bounds, or the auxiliary-tracker map is missing an entry for a live track.
    /// The offending item is dropped and the rest of the frame is still processed.
    #[error("malformed frame input: {0}")]
    InputShape(String),
}
