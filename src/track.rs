// THEORY:
// Track takes over the role the teacher's `TrackedBlob` plays in `core_modules::tracker`:
// the single stateful entity that carries an object's memory across frames, with a
// bounded `VecDeque` history (here the appearance stack, there position/velocity/size
// windows) and incremental updates rather than recomputing from scratch. The departure
// from `TrackedBlob` is structural, not stylistic: `TrackedBlob` is one struct per
// real-world object; `Track` is one struct per *hypothesis*, and the same object can
// have many live hypotheses competing for survival until the global conflict-resolution
// step picks one. Cloning a `Track` (to branch a hypothesis) is therefore a core
// operation here in a way it never is for `TrackedBlob`.

use crate::histogram::ColorHistogram;
use crate::types::{BBox, DetectionId, TrackId};
use std::collections::VecDeque;

/// One hypothesis node in the MHT forest: a candidate identity history for a
/// tracked object, plus the bookkeeping needed to score and re-identify it.
#[derive(Debug, Clone)]
pub struct Track {
    pub track_id: TrackId,
    pub last_detection: BBox,
    hist_stack: VecDeque<ColorHistogram>,
    hist_stack_cap: usize,
    pub score: f64,
    frames_since_hist_update: u32,
    pub lost: bool,
    pub lost_time: f64,
    pub trackers_lost: bool,
}

impl Track {
    const INITIAL_SCORE: f64 = 0.001;
    const DUMMY_SCORE_DELTA: f64 = 0.001;

    /// Seeds a brand-new hypothesis from a fresh detection. `track_id` must be
    /// unique for the life of the owning engine.
    pub fn new(track_id: TrackId, detection: BBox, hist: ColorHistogram, hist_stack_cap: usize) -> Self {
        let mut hist_stack = VecDeque::with_capacity(hist_stack_cap.max(1));
        hist_stack.push_back(hist);
        Self {
            track_id,
            last_detection: detection,
            hist_stack,
            hist_stack_cap: hist_stack_cap.max(1),
            score: Self::INITIAL_SCORE,
            frames_since_hist_update: 0,
            lost: false,
            lost_time: 0.0,
            trackers_lost: false,
        }
    }

    pub fn hist_stack(&self) -> &VecDeque<ColorHistogram> {
        &self.hist_stack
    }

    fn push_hist(&mut self, hist: ColorHistogram) {
        if self.hist_stack.len() >= self.hist_stack_cap {
            self.hist_stack.pop_front();
        }
        self.hist_stack.push_back(hist);
    }

    /// Extends this hypothesis with a live observation: not lost, `lost_time`
    /// reset, score increased by `score_delta`, appearance stack refreshed
    /// every `hist_update_period_frames` frames.
    pub fn extend_live(
        &mut self,
        detection: BBox,
        hist: ColorHistogram,
        score_delta: f64,
        trackers_lost: bool,
        hist_update_period_frames: u32,
    ) {
        self.lost = false;
        self.lost_time = 0.0;
        self.trackers_lost = trackers_lost;
        self.score += score_delta;
        self.last_detection = detection;

        self.frames_since_hist_update += 1;
        if self.frames_since_hist_update >= hist_update_period_frames {
            self.push_hist(hist);
            self.frames_since_hist_update = 0;
        }
    }

    /// Extends this hypothesis with a missed observation ("dummy" extension).
    /// `last_detection` and the appearance stack are untouched; `lost_time`
    /// accumulates by one frame interval.
    pub fn extend_dummy(&mut self, frame_interval_secs: f64) {
        self.lost = true;
        self.score += Self::DUMMY_SCORE_DELTA;
        self.lost_time += frame_interval_secs;
        self.trackers_lost = false;
    }
}

/// The per-hypothesis detection trace: index `k` holds the detection id the
/// hypothesis consumed at frame `k`, or `None` for a missed frame.
pub type Trace = Vec<Option<DetectionId>>;
