// THEORY:
// The driver plays the role `VisionPipeline` plays for the teacher's `SceneManager`:
// a thin orchestration shim in front of the stateful core, owning the bookkeeping the
// core itself must never see. Unlike `VisionPipeline`, this shim's second
// responsibility (maintaining the auxiliary-tracker ensemble keyed by `track_id`) has
// no teacher precedent at all, since `core_modules` has no concept of a pluggable
// short-term tracker — KCF/MedianFlow/MIL are explicitly out of this crate's scope
// (see spec.md's Non-goals), so only their *contract* is represented here: a trait
// the driver can reinitialize and step, not a concrete vision-tracker implementation.

use crate::config::TrackerConfig;
use crate::engine::{AuxiliaryBoxes, FrameInput, FrameOutput, MhtEngine};
use crate::error::TrackerError;
use crate::types::{BBox, DetectionId, TrackId};
use image::RgbImage;
use std::collections::HashMap;
use std::io::Write;

/// The contract an auxiliary short-term tracker (KCF, MedianFlow, MIL, ...) must
/// satisfy for the driver to manage it. Concrete vision-tracker implementations
/// are outside this crate's scope; callers supply their own via this trait.
pub trait AuxiliaryTracker {
    /// Reinitializes the tracker at `bbox` in `frame`, discarding any prior state.
    fn reinit(&mut self, frame: &RgbImage, bbox: BBox);

    /// Advances the tracker by one frame, returning its predicted box.
    fn step(&mut self, frame: &RgbImage) -> BBox;
}

/// A no-op stand-in auxiliary tracker that simply holds its last box steady.
/// Useful for driving the engine end-to-end (tests, the demo CLI) without a real
/// short-term tracker implementation; not a substitute for one.
#[derive(Debug, Clone, Copy)]
pub struct StationaryAuxiliaryTracker {
    current: BBox,
}

impl StationaryAuxiliaryTracker {
    pub fn new(initial: BBox) -> Self {
        Self { current: initial }
    }
}

impl AuxiliaryTracker for StationaryAuxiliaryTracker {
    fn reinit(&mut self, _frame: &RgbImage, bbox: BBox) {
        self.current = bbox;
    }

    fn step(&mut self, _frame: &RgbImage) -> BBox {
        self.current
    }
}

/// The fixed three-tracker ensemble (KCF, MedianFlow, MIL) maintained per live
/// track id, in the order §4.2 weights them.
struct Ensemble<T> {
    kcf: T,
    median_flow: T,
    mil: T,
}

impl<T: AuxiliaryTracker> Ensemble<T> {
    fn step(&mut self, frame: &RgbImage) -> AuxiliaryBoxes {
        [
            self.kcf.step(frame),
            self.median_flow.step(frame),
            self.mil.step(frame),
        ]
    }
}

/// Minimal orchestration shim between a frame source, the auxiliary-tracker
/// ensemble, and the MHT engine. Owns nothing of the hypothesis forest itself;
/// it only ever reads `FrameOutput` the engine hands back.
pub struct Driver<T, F>
where
    T: AuxiliaryTracker,
    F: Fn(BBox) -> T,
{
    engine: MhtEngine,
    ensembles: HashMap<TrackId, Ensemble<T>>,
    make_tracker: F,
}

impl<T, F> Driver<T, F>
where
    T: AuxiliaryTracker,
    F: Fn(BBox) -> T,
{
    /// `make_tracker` constructs one fresh auxiliary tracker instance seeded at
    /// a given box; it is called three times per reseed (once per ensemble slot).
    pub fn new(config: TrackerConfig, make_tracker: F) -> Result<Self, TrackerError> {
        Ok(Self {
            engine: MhtEngine::new(config)?,
            ensembles: HashMap::new(),
            make_tracker,
        })
    }

    pub fn engine(&self) -> &MhtEngine {
        &self.engine
    }

    /// Processes one frame: steps every live ensemble to produce this frame's
    /// auxiliary-tracker outputs, feeds (frame, detections, auxiliary) to the
    /// engine, then applies the engine's reseed requests to the ensemble map
    /// before returning the frame's output.
    pub fn process_frame(
        &mut self,
        frame: &RgbImage,
        detections: &HashMap<DetectionId, BBox>,
    ) -> (FrameOutput, Vec<TrackerError>) {
        let auxiliary: HashMap<TrackId, AuxiliaryBoxes> = self
            .ensembles
            .iter_mut()
            .map(|(&track_id, ensemble)| (track_id, ensemble.step(frame)))
            .collect();

        let (output, errors) = self.engine.run(FrameInput {
            image: frame,
            detections,
            auxiliary: &auxiliary,
        });

        for (&track_id, &bbox) in &output.reseed_requests {
            log::debug!("reseeding auxiliary trackers for track {track_id} at {bbox:?}");
            let ensemble = Ensemble {
                kcf: (self.make_tracker)(bbox),
                median_flow: (self.make_tracker)(bbox),
                mil: (self.make_tracker)(bbox),
            };
            self.ensembles.insert(track_id, ensemble);
        }

        self.ensembles.retain(|track_id, _| {
            output.solution_track_ids.contains(track_id) || output.reseed_requests.contains_key(track_id)
        });

        (output, errors)
    }
}

/// Persists a completed run's per-frame solution coordinates as a CSV artifact
/// compatible with the reference repository's column layout: one row per frame,
/// columns are `(x1,y1,x2,y2)` repeated per track position in the order tracks
/// appear in `history`'s last frame, missing observations encoded as `(-1,-1,-1,-1)`.
pub fn write_solution_csv<W: Write>(
    writer: W,
    history: &[Vec<Option<BBox>>],
) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    let num_tracks = history.last().map(|frame| frame.len()).unwrap_or(0);
    let mut header = Vec::with_capacity(num_tracks * 4);
    for i in 0..num_tracks {
        header.push(format!("track{i}_x1"));
        header.push(format!("track{i}_y1"));
        header.push(format!("track{i}_x2"));
        header.push(format!("track{i}_y2"));
    }
    wtr.write_record(&header)?;

    for frame in history {
        let mut row = Vec::with_capacity(num_tracks * 4);
        for i in 0..num_tracks {
            match frame.get(i).copied().flatten() {
                Some(bbox) => {
                    row.push(bbox.x1.to_string());
                    row.push(bbox.y1.to_string());
                    row.push(bbox.x2.to_string());
                    row.push(bbox.y2.to_string());
                }
                None => {
                    row.push("-1".to_string());
                    row.push("-1".to_string());
                    row.push("-1".to_string());
                    row.push("-1".to_string());
                }
            }
        }
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}
