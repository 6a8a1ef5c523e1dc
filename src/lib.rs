// THEORY:
// This file plays the same role the teacher's `lib.rs` plays: the crate root that
// re-exports a small, curated public surface and hides the internal modules behind
// it. The teacher hides `core_modules` behind `pipeline`; this crate hides `track`,
// `mwis`, and `histogram` behind `engine` and `driver` the same way.

pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod histogram;
pub mod mwis;
pub mod track;
pub mod types;

pub use config::{TrackerConfig, TrackerWeights};
pub use driver::{write_solution_csv, AuxiliaryTracker, Driver, StationaryAuxiliaryTracker};
pub use engine::{AuxiliaryBoxes, FrameInput, FrameOutput, MhtEngine};
pub use error::TrackerError;
pub use histogram::ColorHistogram;
pub use types::{BBox, DetectionId, TrackId};
