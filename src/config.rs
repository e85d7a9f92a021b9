use crate::error::{ConfigError, Result};

/// Bounds applied to segment lengths during ray segmentation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentationConfig {
    /// Longest segment emitted; longer crossings are split into equal parts.
    /// `None` leaves crossings unsplit.
    pub max_segment_length: Option<f64>,
    /// Crossings shorter than this are dropped as degenerate.
    pub min_segment_length: f64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            max_segment_length: None,
            min_segment_length: 1e-10,
        }
    }
}

impl SegmentationConfig {
    /// Sets the maximum segment length.
    #[must_use]
    pub fn with_max_segment_length(mut self, max: f64) -> Self {
        self.max_segment_length = Some(max);
        self
    }

    /// Sets the minimum segment length.
    #[must_use]
    pub fn with_min_segment_length(mut self, min: f64) -> Self {
        self.min_segment_length = min;
        self
    }

    /// Checks that both bounds are positive and ordered.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first violated bound.
    pub fn validate(&self) -> Result<()> {
        let min = self.min_segment_length;
        if !min.is_finite() || min <= 0.0 {
            return Err(ConfigError::NonPositive {
                name: "min_segment_length",
                value: min,
            }
            .into());
        }
        if let Some(max) = self.max_segment_length {
            if !max.is_finite() || max <= 0.0 {
                return Err(ConfigError::NonPositive {
                    name: "max_segment_length",
                    value: max,
                }
                .into());
            }
            if min > max {
                return Err(ConfigError::InvertedBounds { min, max }.into());
            }
        }
        Ok(())
    }

    /// Number of equal parts a crossing of `length` is split into.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn pieces(&self, length: f64) -> usize {
        match self.max_segment_length {
            Some(max) if length > max => (length / max).ceil() as usize,
            _ => 1,
        }
    }
}
