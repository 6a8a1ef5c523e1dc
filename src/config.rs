// THEORY:
// TrackerConfig plays the same role here that `PipelineConfig` plays in the teacher's
// orchestration layer: a plain, `Clone`-able bundle of tunables built once and handed
// to the stateful engine by reference. Unlike `PipelineConfig`, this core has fallible
// construction (a handful of these fields must stay within admissible ranges for the
// scoring and gating math to make sense), so `validate` is the one piece of behavior
// the struct owns beyond holding its fields.

use crate::error::TrackerError;

/// Per-auxiliary-tracker weighting, always applied in the fixed order
/// (KCF, MedianFlow, MIL) the reference tracker ensemble uses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerWeights {
    pub kcf: f64,
    pub median_flow: f64,
    pub mil: f64,
}

impl TrackerWeights {
    pub fn as_array(&self) -> [f64; 3] {
        [self.kcf, self.median_flow, self.mil]
    }
}

impl Default for TrackerWeights {
    fn default() -> Self {
        Self {
            kcf: 0.45,
            median_flow: 0.35,
            mil: 0.20,
        }
    }
}

/// Tunables for the MHT engine. Construct with `TrackerConfig::default()` and
/// override individual fields, then call `validate()` before passing the config
/// to `MhtEngine::new`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerConfig {
    /// N-scan pruning depth. 0 disables branching memory entirely: only the
    /// current global solution survives each frame.
    pub n_pruning: usize,
    /// Gating distance (pixels) below which an auxiliary-tracker box is
    /// considered "inside" for a detection.
    pub distance_threshold: f64,
    /// Secondary gating distance (pixels); at or beyond this an auxiliary
    /// tracker is classified lost regardless of the primary threshold.
    pub distance_threshold2: f64,
    /// Per-auxiliary-tracker weighting, fixed order (KCF, MedianFlow, MIL).
    pub tracker_weights: TrackerWeights,
    /// Maximum mean Bhattacharyya distance admissible for lost-branch re-ID.
    pub color_score_threshold: f64,
    /// Appearance contribution weight in the re-ID score.
    pub color_score_weight: f64,
    /// Time constant (seconds) for the lost-time score decay.
    pub lost_time_threshold: f64,
    /// Time-decay contribution weight in the re-ID score.
    pub lost_time_weight: f64,
    /// Bins per channel in the joint RGB histogram (total bins = bins^3).
    pub color_hist_bins: u32,
    /// Assumed frame rate, used to convert dummy extensions into seconds.
    pub fps: f64,
    /// Rate (Hz) at which a live branch refreshes its appearance stack.
    pub hist_update_frequency: f64,
    /// Maximum number of histograms retained per branch (S_max).
    pub hist_stack_size: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            n_pruning: 0,
            distance_threshold: 100.0,
            distance_threshold2: 75.0,
            tracker_weights: TrackerWeights::default(),
            color_score_threshold: 0.20,
            color_score_weight: 0.75,
            lost_time_threshold: 25.0,
            lost_time_weight: 0.25,
            color_hist_bins: 4,
            fps: 20.0,
            hist_update_frequency: 0.5,
            hist_stack_size: 25,
        }
    }
}

impl TrackerConfig {
    /// Number of frames between appearance-stack refreshes, derived from
    /// `fps` and `hist_update_frequency` (default 20/0.5 = 40 frames).
    pub fn hist_update_period_frames(&self) -> u32 {
        (self.fps / self.hist_update_frequency).round() as u32
    }

    /// Frame interval in seconds, used to accumulate `lost_time`.
    pub fn frame_interval_secs(&self) -> f64 {
        1.0 / self.fps
    }

    pub fn validate(&self) -> Result<(), TrackerError> {
        if self.distance_threshold <= 0.0 {
            return Err(TrackerError::Config(
                "distance_threshold must be positive".into(),
            ));
        }
        if self.distance_threshold2 <= 0.0 {
            return Err(TrackerError::Config(
                "distance_threshold2 must be positive".into(),
            ));
        }
        if self.color_score_threshold <= 0.0 {
            return Err(TrackerError::Config(
                "color_score_threshold must be positive".into(),
            ));
        }
        if self.lost_time_threshold <= 0.0 {
            return Err(TrackerError::Config(
                "lost_time_threshold must be positive".into(),
            ));
        }
        if self.color_hist_bins < 1 {
            return Err(TrackerError::Config(
                "color_hist_bins must be at least 1".into(),
            ));
        }
        if self.fps <= 0.0 {
            return Err(TrackerError::Config("fps must be positive".into()));
        }
        if self.hist_update_frequency <= 0.0 {
            return Err(TrackerError::Config(
                "hist_update_frequency must be positive".into(),
            ));
        }
        if self.hist_stack_size == 0 {
            return Err(TrackerError::Config(
                "hist_stack_size must be at least 1".into(),
            ));
        }
        let weights = self.tracker_weights.as_array();
        if weights.iter().any(|w| *w < 0.0) {
            return Err(TrackerError::Config(
                "tracker_weights must be non-negative".into(),
            ));
        }
        Ok(())
    }

    /// Builds a config from environment variables, falling back to defaults.
    /// Kept out of the library's hot path; only the CLI binary calls this.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(v) = std::env::var("HYPO_TRACK_N_PRUNING") {
            if let Ok(n) = v.parse() {
                config.n_pruning = n;
            }
        }
        if let Ok(v) = std::env::var("HYPO_TRACK_COLOR_BINS") {
            if let Ok(n) = v.parse() {
                config.color_hist_bins = n;
            }
        }
        if let Ok(v) = std::env::var("HYPO_TRACK_FPS") {
            if let Ok(n) = v.parse() {
                config.fps = n;
            }
        }
        config
    }
}
