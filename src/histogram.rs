// THEORY:
// ColorHistogram plays the role the teacher's `Chunk::average_pixel` plays for a single
// region: a summary statistic computed once over a cropped pixel block. Where
// `average_pixel` reduces a block to a single mean color (for temporal change
// detection), the histogram here retains the full joint RGB distribution (for
// appearance-based re-identification), binned into a B^3 grid and L1-normalized.
// `u32` accumulators are used for the same overflow-avoidance reason `Chunk` uses them
// for its channel sums.

use crate::types::BBox;
use image::RgbImage;

/// A joint 3D histogram over the RGB channels of a cropped image region,
/// L1-normalized. Dimension is `bins^3`, flattened in (r, g, b) row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorHistogram {
    bins: Vec<f64>,
    bins_per_channel: u32,
}

impl ColorHistogram {
    /// Builds an all-zero histogram, used when a crop degenerates to zero area.
    pub fn zero(bins_per_channel: u32) -> Self {
        let total = (bins_per_channel as usize).pow(3);
        Self {
            bins: vec![0.0; total],
            bins_per_channel,
        }
    }

    /// Crops `bbox` out of `image` and bins the region's pixels into a joint RGB
    /// histogram. Returns a zero histogram (never an error) if the crop is
    /// degenerate, matching the descriptor's documented contract: a zero-area
    /// crop results in automatic rejection by every downstream distance check
    /// rather than a propagated failure.
    pub fn from_region(image: &RgbImage, bbox: &BBox, bins_per_channel: u32) -> Self {
        let Some((x, y, w, h)) = bbox.clip_to_image(image.width(), image.height()) else {
            return Self::zero(bins_per_channel);
        };

        let bins = bins_per_channel.max(1);
        let mut counts = vec![0u32; (bins as usize).pow(3)];
        let bin_width = 256.0 / bins as f64;

        for py in y..y + h {
            for px in x..x + w {
                let pixel = image.get_pixel(px, py);
                let [r, g, b] = pixel.0;
                let rb = ((r as f64 / bin_width) as u32).min(bins - 1);
                let gb = ((g as f64 / bin_width) as u32).min(bins - 1);
                let bb = ((b as f64 / bin_width) as u32).min(bins - 1);
                let idx = (rb * bins * bins + gb * bins + bb) as usize;
                counts[idx] += 1;
            }
        }

        let total: u32 = counts.iter().sum();
        let bin_values = if total == 0 {
            vec![0.0; counts.len()]
        } else {
            counts
                .iter()
                .map(|&c| c as f64 / total as f64)
                .collect()
        };

        Self {
            bins: bin_values,
            bins_per_channel: bins,
        }
    }

    pub fn bins_per_channel(&self) -> u32 {
        self.bins_per_channel
    }

    pub fn is_zero(&self) -> bool {
        self.bins.iter().all(|&v| v == 0.0)
    }

    /// Bhattacharyya distance between two histograms of equal dimension, in
    /// [0, 1] with 0 meaning identical distributions. Two zero histograms
    /// (degenerate crops on both sides) are treated as maximally distant (1.0)
    /// since neither carries any appearance information to match on.
    pub fn bhattacharyya_distance(&self, other: &ColorHistogram) -> f64 {
        debug_assert_eq!(self.bins.len(), other.bins.len());
        if self.is_zero() || other.is_zero() {
            return 1.0;
        }
        let bc: f64 = self
            .bins
            .iter()
            .zip(other.bins.iter())
            .map(|(p, q)| (p * q).sqrt())
            .sum();
        (1.0 - bc.clamp(0.0, 1.0)).sqrt()
    }
}
