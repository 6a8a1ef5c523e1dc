// THEORY:
// MhtEngine plays the role `SceneManager` plays in the teacher's behavioral-analysis
// layer: the top-level per-frame orchestrator that owns the stateful entities (there,
// `Tracker` and its `Moment`s; here, the hypothesis forest) and turns a frame's raw
// input into a structured report. The departure is that `SceneManager::update` keeps
// exactly one `TrackedBlob` per real object, while this engine must keep every
// surviving *hypothesis* until the conflict-resolution step narrows them down — the
// forest can be wider than the number of real objects for the span of a single frame.
//
// Parallel fan-out follows `src/parallel_pipeline.rs`'s ordered worker-pool shape in
// spirit (split work, merge at a barrier) but not its `tokio` machinery: both
// parallel points here (per-detection histogram computation, per-hypothesis branch
// expansion) are synchronous CPU-bound batch operations with a hard barrier each
// frame, the shape `rayon` is built for, not an async I/O stream.

use crate::config::TrackerConfig;
use crate::error::TrackerError;
use crate::histogram::ColorHistogram;
use crate::mwis::ConflictGraph;
use crate::track::{Trace, Track};
use crate::types::{BBox, DetectionId, TrackId};
use image::RgbImage;
use rayon::prelude::*;
use std::collections::HashMap;

/// Auxiliary short-term tracker outputs for one live hypothesis, in the fixed
/// order (KCF, MedianFlow, MIL) the reference tracker ensemble uses.
pub type AuxiliaryBoxes = [BBox; 3];

/// Everything the engine needs to process one frame.
pub struct FrameInput<'a> {
    pub image: &'a RgbImage,
    pub detections: &'a HashMap<DetectionId, BBox>,
    pub auxiliary: &'a HashMap<TrackId, AuxiliaryBoxes>,
}

/// Everything the engine produces for one frame.
#[derive(Debug, Clone)]
pub struct FrameOutput {
    /// One entry per selected hypothesis: its full coordinate trace (`None`
    /// at frames it was missed), parallel to `solution_track_ids`.
    pub solution_coordinates: Vec<Vec<Option<BBox>>>,
    pub solution_track_ids: Vec<TrackId>,
    /// Tracks the driver must (re)seed auxiliary trackers for this frame.
    pub reseed_requests: HashMap<TrackId, BBox>,
}

struct Hypothesis {
    track: Track,
    trace: Trace,
}

/// The multiple-hypothesis-tracking core: owns the hypothesis forest and the
/// frame-indexed detection-id to bounding-box table needed to rehydrate
/// solution coordinates.
pub struct MhtEngine {
    config: TrackerConfig,
    forest: Vec<Hypothesis>,
    frame_index: u64,
    next_track_id: u64,
    frame_table: Vec<HashMap<DetectionId, BBox>>,
}

impl MhtEngine {
    pub fn new(config: TrackerConfig) -> Result<Self, TrackerError> {
        config.validate()?;
        Ok(Self {
            config,
            forest: Vec::new(),
            frame_index: 0,
            next_track_id: 0,
            frame_table: Vec::new(),
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Number of live hypotheses currently in the forest.
    pub fn forest_size(&self) -> usize {
        self.forest.len()
    }

    fn allocate_track_id(&mut self) -> TrackId {
        let id = TrackId(self.next_track_id);
        self.next_track_id += 1;
        id
    }

    /// Processes one frame, advancing the forest and returning the frame's
    /// report. Per-frame input errors (malformed detection boxes, missing
    /// auxiliary-tracker entries) are collected and returned alongside a
    /// valid output rather than aborting the frame: the offending items are
    /// dropped and the rest of the frame is still processed.
    pub fn run(&mut self, input: FrameInput) -> (FrameOutput, Vec<TrackerError>) {
        let mut errors = Vec::new();
        let width = input.image.width();
        let height = input.image.height();

        let mut valid_detections: HashMap<DetectionId, BBox> = HashMap::new();
        for (&id, &bbox) in input.detections {
            if bbox.clip_to_image(width, height).is_some() || bbox.area() == 0.0 {
                valid_detections.insert(id, bbox);
            } else {
                errors.push(TrackerError::InputShape(format!(
                    "detection {id} lies entirely outside the {width}x{height} frame"
                )));
            }
        }

        let histograms: HashMap<DetectionId, ColorHistogram> = valid_detections
            .par_iter()
            .map(|(&id, &bbox)| {
                (
                    id,
                    ColorHistogram::from_region(input.image, &bbox, self.config.color_hist_bins),
                )
            })
            .collect();

        let frame_interval = self.config.frame_interval_secs();

        if self.frame_index == 0 {
            self.seed_initial_hypotheses(&valid_detections, &histograms);
        } else {
            for h in self.forest.iter().filter(|h| !h.track.lost) {
                if !input.auxiliary.contains_key(&h.track.track_id) {
                    errors.push(TrackerError::InputShape(format!(
                        "missing auxiliary-tracker outputs for live track {}",
                        h.track.track_id
                    )));
                }
            }

            let new_branches = self.expand(&valid_detections, &histograms, input.auxiliary);
            for h in self.forest.iter_mut() {
                h.track.extend_dummy(frame_interval);
                h.trace.push(None);
            }
            self.forest.extend(new_branches);

            let mut fresh_ids: Vec<&DetectionId> = valid_detections.keys().collect();
            fresh_ids.sort();
            for &det_id in fresh_ids {
                let bbox = valid_detections[det_id];
                let hist = histograms.get(det_id).cloned().unwrap_or_else(|| {
                    ColorHistogram::zero(self.config.color_hist_bins)
                });
                let track_id = self.allocate_track_id();
                let mut trace = vec![None; self.frame_index as usize];
                trace.push(Some(*det_id));
                self.forest.push(Hypothesis {
                    track: Track::new(track_id, bbox, hist, self.config.hist_stack_size),
                    trace,
                });
            }
        }

        self.frame_table.push(valid_detections);

        let weights: Vec<f64> = self.forest.iter().map(|h| h.track.score).collect();
        let mut graph = ConflictGraph::new(&weights);
        for i in 0..self.forest.len() {
            for j in (i + 1)..self.forest.len() {
                if traces_conflict(&self.forest[i].trace, &self.forest[j].trace) {
                    graph.add_edge(i, j);
                }
            }
        }
        let solution_indices = graph.max_weighted_independent_set();

        let reseed_requests = self.compute_reseeds(&solution_indices);

        // Extract outputs from the pre-prune forest first: `prune` mutates
        // `self.forest` in place and invalidates these indices.
        let solution_coordinates: Vec<Vec<Option<BBox>>> = solution_indices
            .iter()
            .map(|&i| self.resolve_trace_boxes(&self.forest[i].trace))
            .collect();
        let solution_track_ids: Vec<TrackId> = solution_indices
            .iter()
            .map(|&i| self.forest[i].track.track_id)
            .collect();

        self.prune(&solution_indices);

        let output = FrameOutput {
            solution_track_ids,
            solution_coordinates,
            reseed_requests,
        };

        self.frame_index += 1;
        (output, errors)
    }

    fn seed_initial_hypotheses(
        &mut self,
        detections: &HashMap<DetectionId, BBox>,
        histograms: &HashMap<DetectionId, ColorHistogram>,
    ) {
        let mut ids: Vec<&DetectionId> = detections.keys().collect();
        ids.sort();
        for &det_id in ids {
            let bbox = detections[det_id];
            let hist = histograms
                .get(det_id)
                .cloned()
                .unwrap_or_else(|| ColorHistogram::zero(self.config.color_hist_bins));
            let track_id = self.allocate_track_id();
            self.forest.push(Hypothesis {
                track: Track::new(track_id, bbox, hist, self.config.hist_stack_size),
                trace: vec![Some(*det_id)],
            });
        }
    }

    /// Expands every current hypothesis against every detection, returning
    /// the newly cloned continuations. The originals are left untouched here
    /// and dummy-extended by the caller afterwards, since every matched
    /// continuation was already materialized as a fresh clone.
    fn expand(
        &self,
        detections: &HashMap<DetectionId, BBox>,
        histograms: &HashMap<DetectionId, ColorHistogram>,
        auxiliary: &HashMap<TrackId, AuxiliaryBoxes>,
    ) -> Vec<Hypothesis> {
        let hist_update_period = self.config.hist_update_period_frames();
        self.forest
            .par_iter()
            .flat_map_iter(|h| {
                let mut continuations = Vec::new();
                let mut det_ids: Vec<&DetectionId> = detections.keys().collect();
                det_ids.sort();
                for &det_id in det_ids {
                    let bbox = detections[det_id];
                    let hist = histograms
                        .get(det_id)
                        .cloned()
                        .unwrap_or_else(|| ColorHistogram::zero(self.config.color_hist_bins));

                    let continuation = if h.track.lost {
                        self.try_reidentify(h, &hist)
                    } else {
                        auxiliary
                            .get(&h.track.track_id)
                            .and_then(|aux| self.try_gate(h, aux, &bbox))
                    };

                    if let Some((score_delta, trackers_lost)) = continuation {
                        let mut track = h.track.clone();
                        track.extend_live(bbox, hist, score_delta, trackers_lost, hist_update_period);
                        let mut trace = h.trace.clone();
                        trace.push(Some(*det_id));
                        continuations.push(Hypothesis { track, trace });
                    }
                }
                continuations
            })
            .collect()
    }

    /// Appearance-based re-ID candidacy for a lost hypothesis, per the mean
    /// Bhattacharyya distance across its histogram stack plus a time-decay
    /// term. Returns `Some((score_delta, trackers_lost=false))` if the mean
    /// distance is within the configured threshold.
    fn try_reidentify(&self, h: &Hypothesis, hist: &ColorHistogram) -> Option<(f64, bool)> {
        let stack = h.track.hist_stack();
        if stack.is_empty() {
            return None;
        }
        let mean_distance: f64 =
            stack.iter().map(|s| hist.bhattacharyya_distance(s)).sum::<f64>() / stack.len() as f64;
        if mean_distance >= self.config.color_score_threshold {
            return None;
        }
        let appearance_term = (1.0 - mean_distance * (0.99 / self.config.color_score_threshold))
            * self.config.color_score_weight;
        let time_term = ((0.01_f64.ln() / self.config.lost_time_threshold) * h.track.lost_time).exp()
            * self.config.lost_time_weight;
        Some((appearance_term + time_term, false))
    }

    /// Gating candidacy for a live hypothesis against a detection, using the
    /// auxiliary-tracker centers. Returns `Some((score_delta, trackers_lost))`
    /// if at least one auxiliary tracker falls within `distance_threshold`.
    fn try_gate(&self, h: &Hypothesis, aux: &AuxiliaryBoxes, detection: &BBox) -> Option<(f64, bool)> {
        let _ = h;
        let det_center = detection.center();
        let weights = self.config.tracker_weights.as_array();
        let mut inside_any = false;
        let mut score_delta = 0.0;
        let mut lost_count = 0;

        for (i, aux_box) in aux.iter().enumerate() {
            let c = aux_box.center();
            let dist = ((c.0 - det_center.0).powi(2) + (c.1 - det_center.1).powi(2)).sqrt();
            let inside = dist < self.config.distance_threshold;
            let lost = dist >= self.config.distance_threshold2 || !inside;
            if lost {
                lost_count += 1;
            }
            if inside {
                inside_any = true;
                let diff = dist - self.config.distance_threshold;
                score_delta += (1.0 / self.config.distance_threshold.powi(2)) * diff * diff * weights[i];
            }
        }

        if !inside_any {
            return None;
        }
        let trackers_lost = lost_count == aux.len();
        Some((score_delta, trackers_lost))
    }

    fn compute_reseeds(&self, solution_indices: &[usize]) -> HashMap<TrackId, BBox> {
        let mut reseeds = HashMap::new();
        for &i in solution_indices {
            let h = &self.forest[i];
            let k = h.trace.len().saturating_sub(1);
            let newly_alive = h.trace[k].is_some() && (k == 0 || h.trace[k - 1].is_none());
            if newly_alive || h.track.trackers_lost {
                reseeds.insert(h.track.track_id, h.track.last_detection);
            }
        }
        reseeds
    }

    /// Removes every non-solution hypothesis whose trace disagrees with the
    /// global solution at depth `k - N`. With `N = 0` every non-solution
    /// branch is pruned; the solution itself always survives.
    fn prune(&mut self, solution_indices: &[usize]) {
        let k = self.frame_index as usize;
        let n = self.config.n_pruning;
        let p = k.saturating_sub(n);

        if n == 0 {
            let mut keep: Vec<usize> = solution_indices.to_vec();
            keep.sort_unstable();
            self.keep_indices(&keep);
            return;
        }

        let banned: std::collections::HashSet<DetectionId> = solution_indices
            .iter()
            .filter_map(|&i| self.forest[i].trace.get(p).copied().flatten())
            .collect();

        let solution_set: std::collections::HashSet<usize> = solution_indices.iter().copied().collect();
        let mut keep = Vec::new();
        for (idx, h) in self.forest.iter().enumerate() {
            if solution_set.contains(&idx) {
                keep.push(idx);
                continue;
            }
            let conflicts_at_p = h.trace.get(p).copied().flatten().map(|d| banned.contains(&d)).unwrap_or(false);
            if !conflicts_at_p {
                keep.push(idx);
            }
        }
        keep.sort_unstable();
        self.keep_indices(&keep);
    }

    fn keep_indices(&mut self, sorted_unique_indices: &[usize]) {
        let mut kept = Vec::with_capacity(sorted_unique_indices.len());
        for &i in sorted_unique_indices {
            kept.push(std::mem::replace(
                &mut self.forest[i],
                Hypothesis {
                    track: Track::new(TrackId(0), BBox::new(0.0, 0.0, 0.0, 0.0), ColorHistogram::zero(1), 1),
                    trace: Vec::new(),
                },
            ));
        }
        self.forest = kept;
        let max_surviving = self
            .forest
            .iter()
            .map(|h| h.track.track_id.0)
            .max();
        if let Some(max_id) = max_surviving {
            self.next_track_id = max_id + 1;
        }
    }

    fn resolve_trace_boxes(&self, trace: &Trace) -> Vec<Option<BBox>> {
        trace
            .iter()
            .enumerate()
            .map(|(frame, det_id)| {
                det_id.and_then(|d| self.frame_table.get(frame).and_then(|t| t.get(&d)).copied())
            })
            .collect()
    }
}

fn traces_conflict(a: &Trace, b: &Trace) -> bool {
    a.iter()
        .zip(b.iter())
        .any(|(x, y)| matches!((x, y), (Some(dx), Some(dy)) if dx == dy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn blank_image(w: u32, h: u32) -> RgbImage {
        RgbImage::from_fn(w, h, |_, _| Rgb([128, 128, 128]))
    }

    fn aux_from_box(b: BBox) -> AuxiliaryBoxes {
        [b, b, b]
    }

    #[test]
    fn single_target_perfect_detections_keeps_one_growing_track() {
        let config = TrackerConfig::default();
        let mut engine = MhtEngine::new(config).unwrap();
        let image = blank_image(200, 200);

        for frame in 0..10 {
            let shift = frame as f64 * 2.0;
            let bbox = BBox::new(10.0 + shift, 10.0, 50.0 + shift, 50.0);
            let mut detections = HashMap::new();
            detections.insert(DetectionId(0), bbox);
            let mut auxiliary = HashMap::new();
            if frame > 0 {
                auxiliary.insert(TrackId(0), aux_from_box(bbox));
            }
            let (output, errors) = engine.run(FrameInput {
                image: &image,
                detections: &detections,
                auxiliary: &auxiliary,
            });
            assert!(errors.is_empty());
            assert_eq!(output.solution_track_ids.len(), 1);
            assert_eq!(output.solution_track_ids[0], TrackId(0));
            assert_eq!(output.solution_coordinates[0].len(), frame + 1);
        }
    }

    #[test]
    fn gating_rejection_seeds_fresh_hypothesis() {
        let config = TrackerConfig::default();
        let mut engine = MhtEngine::new(config).unwrap();
        let image = blank_image(400, 400);

        let mut first = HashMap::new();
        first.insert(DetectionId(0), BBox::new(0.0, 0.0, 10.0, 10.0));
        let (_, errors) = engine.run(FrameInput {
            image: &image,
            detections: &first,
            auxiliary: &HashMap::new(),
        });
        assert!(errors.is_empty());

        let mut second = HashMap::new();
        second.insert(DetectionId(1), BBox::new(200.0, 200.0, 240.0, 240.0));
        let mut auxiliary = HashMap::new();
        auxiliary.insert(TrackId(0), aux_from_box(BBox::new(0.0, 0.0, 10.0, 10.0)));
        let (output, _) = engine.run(FrameInput {
            image: &image,
            detections: &second,
            auxiliary: &auxiliary,
        });
        // The gated-away original track becomes lost (dummy extended); the
        // fresh seed from the far-away detection is a brand-new track id.
        assert!(output.solution_track_ids.contains(&TrackId(1)));
    }

    #[test]
    fn empty_detections_extend_all_hypotheses_as_dummy() {
        let config = TrackerConfig::default();
        let mut engine = MhtEngine::new(config).unwrap();
        let image = blank_image(200, 200);

        let mut first = HashMap::new();
        first.insert(DetectionId(0), BBox::new(10.0, 10.0, 50.0, 50.0));
        engine.run(FrameInput {
            image: &image,
            detections: &first,
            auxiliary: &HashMap::new(),
        });

        let empty = HashMap::new();
        let mut auxiliary = HashMap::new();
        auxiliary.insert(TrackId(0), aux_from_box(BBox::new(10.0, 10.0, 50.0, 50.0)));
        let (output, errors) = engine.run(FrameInput {
            image: &image,
            detections: &empty,
            auxiliary: &auxiliary,
        });
        assert!(errors.is_empty());
        assert_eq!(output.solution_track_ids.len(), 1);
        assert_eq!(output.solution_coordinates[0].last().copied().flatten(), None);
    }

    fn colored_region_image(w: u32, h: u32, bg: [u8; 3], region: BBox, color: [u8; 3]) -> RgbImage {
        let mut img = RgbImage::from_fn(w, h, |_, _| Rgb(bg));
        if let Some((x, y, rw, rh)) = region.clip_to_image(w, h) {
            for py in y..y + rh {
                for px in x..x + rw {
                    img.put_pixel(px, py, Rgb(color));
                }
            }
        }
        img
    }

    #[test]
    fn occlusion_then_matching_appearance_reidentifies_same_track() {
        let config = TrackerConfig::default();
        let mut engine = MhtEngine::new(config).unwrap();
        let region = BBox::new(10.0, 10.0, 50.0, 50.0);
        let color = [200, 50, 50];

        let frame0 = colored_region_image(200, 200, [30, 30, 30], region, color);
        let mut detections = HashMap::new();
        detections.insert(DetectionId(0), region);
        engine.run(FrameInput {
            image: &frame0,
            detections: &detections,
            auxiliary: &HashMap::new(),
        });

        // 10 consecutive misses: the hypothesis becomes lost and accumulates
        // lost_time = 10 * (1/20 fps) = 0.5s, matching the literal scenario.
        let blank = colored_region_image(200, 200, [30, 30, 30], BBox::new(0.0, 0.0, 0.0, 0.0), color);
        for _ in 0..10 {
            engine.run(FrameInput {
                image: &blank,
                detections: &HashMap::new(),
                auxiliary: &HashMap::new(),
            });
        }

        let reappear = colored_region_image(200, 200, [30, 30, 30], region, color);
        let mut reappear_detections = HashMap::new();
        reappear_detections.insert(DetectionId(0), region);
        let (output, _) = engine.run(FrameInput {
            image: &reappear,
            detections: &reappear_detections,
            auxiliary: &HashMap::new(),
        });

        assert!(output.solution_track_ids.contains(&TrackId(0)));
        let idx = output
            .solution_track_ids
            .iter()
            .position(|&id| id == TrackId(0))
            .unwrap();
        assert_eq!(output.solution_coordinates[idx].last().copied().flatten(), Some(region));
    }

    #[test]
    fn occlusion_then_dissimilar_appearance_seeds_new_track() {
        let config = TrackerConfig::default();
        let mut engine = MhtEngine::new(config).unwrap();
        let region = BBox::new(10.0, 10.0, 50.0, 50.0);

        let frame0 = colored_region_image(200, 200, [30, 30, 30], region, [200, 50, 50]);
        let mut detections = HashMap::new();
        detections.insert(DetectionId(0), region);
        engine.run(FrameInput {
            image: &frame0,
            detections: &detections,
            auxiliary: &HashMap::new(),
        });

        let blank = colored_region_image(200, 200, [30, 30, 30], BBox::new(0.0, 0.0, 0.0, 0.0), [0, 0, 0]);
        for _ in 0..10 {
            engine.run(FrameInput {
                image: &blank,
                detections: &HashMap::new(),
                auxiliary: &HashMap::new(),
            });
        }

        // A starkly different color at reappearance: mean Bhattacharyya
        // distance exceeds theta_color, so re-ID is rejected and a fresh
        // track id is seeded instead.
        let reappear = colored_region_image(200, 200, [30, 30, 30], region, [20, 200, 20]);
        let mut reappear_detections = HashMap::new();
        reappear_detections.insert(DetectionId(0), region);
        let (output, _) = engine.run(FrameInput {
            image: &reappear,
            detections: &reappear_detections,
            auxiliary: &HashMap::new(),
        });

        assert!(output.solution_track_ids.contains(&TrackId(1)));
    }

    #[test]
    fn track_ids_assigned_strictly_increasing_across_frames() {
        let config = TrackerConfig::default();
        let mut engine = MhtEngine::new(config).unwrap();
        let image = blank_image(300, 300);

        let mut max_seen: i64 = -1;
        for frame in 0..5u64 {
            let mut detections = HashMap::new();
            detections.insert(DetectionId(frame), BBox::new(frame as f64 * 60.0, 0.0, frame as f64 * 60.0 + 20.0, 20.0));
            let (output, _) = engine.run(FrameInput {
                image: &image,
                detections: &detections,
                auxiliary: &HashMap::new(),
            });
            for id in &output.solution_track_ids {
                max_seen = max_seen.max(id.0 as i64);
            }
            assert!(
                (engine.next_track_id as i64) > max_seen,
                "next_track_id {} must exceed every id seen through frame {frame}",
                engine.next_track_id
            );
        }
    }

    #[test]
    fn solution_set_never_shares_a_detection_id_across_two_crossing_targets() {
        let mut config = TrackerConfig::default();
        config.n_pruning = 3;
        let mut engine = MhtEngine::new(config).unwrap();
        let image = blank_image(400, 400);

        for frame in 0..20i64 {
            // Two targets on intersecting linear trajectories.
            let a = BBox::new(frame as f64 * 5.0, 50.0, frame as f64 * 5.0 + 20.0, 70.0);
            let b = BBox::new(200.0 - frame as f64 * 5.0, 50.0, 220.0 - frame as f64 * 5.0, 70.0);
            let mut detections = HashMap::new();
            detections.insert(DetectionId(0), a);
            detections.insert(DetectionId(1), b);

            let mut auxiliary = HashMap::new();
            for (id, bbox) in [(0u64, a), (1u64, b)] {
                auxiliary.insert(TrackId(id), aux_from_box(bbox));
            }

            let (output, _) = engine.run(FrameInput {
                image: &image,
                detections: &detections,
                auxiliary: &auxiliary,
            });

            for k in 0..output.solution_coordinates.len() {
                for j in (k + 1)..output.solution_coordinates.len() {
                    let shared = output.solution_coordinates[k]
                        .iter()
                        .zip(output.solution_coordinates[j].iter())
                        .any(|(x, y)| matches!((x, y), (Some(bx), Some(by)) if bx == by));
                    assert!(!shared, "solution tracks {k} and {j} share a detection at frame {frame}");
                }
            }
        }
    }

    #[test]
    fn fresh_seed_track_ids_are_assigned_in_detection_id_order_regardless_of_insertion_order() {
        let image = blank_image(200, 200);
        let boxes = [
            (DetectionId(2), BBox::new(0.0, 0.0, 10.0, 10.0)),
            (DetectionId(0), BBox::new(20.0, 20.0, 30.0, 30.0)),
            (DetectionId(1), BBox::new(40.0, 40.0, 50.0, 50.0)),
        ];

        // Insert in two different orders; `HashMap` iteration order is itself
        // unspecified, so the assignment must not depend on it at all.
        let mut forward = HashMap::new();
        for (id, bbox) in boxes.iter() {
            forward.insert(*id, *bbox);
        }
        let mut reversed = HashMap::new();
        for (id, bbox) in boxes.iter().rev() {
            reversed.insert(*id, *bbox);
        }

        let run = |detections: &HashMap<DetectionId, BBox>| {
            let mut engine = MhtEngine::new(TrackerConfig::default()).unwrap();
            let (output, _) = engine.run(FrameInput {
                image: &image,
                detections,
                auxiliary: &HashMap::new(),
            });
            // Frame 0 hypotheses carry exactly one observed box, so the bbox
            // in the (only) trace entry identifies which detection a track
            // came from.
            let mut by_detection: Vec<(DetectionId, TrackId)> = output
                .solution_track_ids
                .iter()
                .zip(output.solution_coordinates.iter())
                .map(|(&track_id, coords)| {
                    let bbox = coords[0].expect("frame 0 hypothesis always has an observation");
                    let (det_id, _) = boxes.iter().find(|(_, b)| *b == bbox).expect("bbox must match a seeded detection");
                    (*det_id, track_id)
                })
                .collect();
            by_detection.sort();
            by_detection
        };

        assert_eq!(run(&forward), run(&reversed));
        // Detection ids are seeded in ascending order, so track ids come out
        // assigned 0 -> det#0, 1 -> det#1, 2 -> det#2.
        assert_eq!(
            run(&forward),
            vec![
                (DetectionId(0), TrackId(0)),
                (DetectionId(1), TrackId(1)),
                (DetectionId(2), TrackId(2)),
            ]
        );
    }

    #[test]
    fn out_of_bounds_detection_is_dropped_without_corrupting_the_frame() {
        let config = TrackerConfig::default();
        let mut engine = MhtEngine::new(config).unwrap();
        let image = blank_image(100, 100);

        let mut detections = HashMap::new();
        detections.insert(DetectionId(0), BBox::new(10.0, 10.0, 50.0, 50.0));
        detections.insert(DetectionId(1), BBox::new(500.0, 500.0, 540.0, 540.0));

        let (output, errors) = engine.run(FrameInput {
            image: &image,
            detections: &detections,
            auxiliary: &HashMap::new(),
        });

        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], TrackerError::InputShape(_)));
        // The in-bounds detection still seeds a hypothesis; the frame is not aborted.
        assert_eq!(output.solution_track_ids.len(), 1);
    }
}
