use crate::config::MIN_WPM;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedAdjustment {
    pub current_wpm: u32,
    pub recommended_wpm: u32,
    pub rationale: String,
    pub is_increase: bool,
}

/// Score bands and step sizes used to recommend the next reading speed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdvisorPolicy {
    /// scores at or above this push the speed up
    pub increase_threshold: f64,
    /// scores at or above this (and below `increase_threshold`) hold steady
    pub maintain_threshold: f64,
    pub increase_ratio: f64,
    pub decrease_ratio: f64,
    pub floor_wpm: u32,
}

impl Default for AdvisorPolicy {
    fn default() -> Self {
        Self {
            increase_threshold: 90.0,
            maintain_threshold: 70.0,
            increase_ratio: 0.15,
            decrease_ratio: 0.08,
            floor_wpm: MIN_WPM,
        }
    }
}

impl AdvisorPolicy {
    pub fn compute(&self, comprehension_score: f64, current_wpm: u32) -> SpeedAdjustment {
        let step = |ratio: f64| (f64::from(current_wpm) * ratio).round() as u32;

        if comprehension_score >= self.increase_threshold {
            SpeedAdjustment {
                current_wpm,
                recommended_wpm: current_wpm.saturating_add(step(self.increase_ratio)),
                rationale: "Excellent comprehension! You're reading comfortably, so let's push \
                            the speed up to keep challenging yourself."
                    .to_string(),
                is_increase: true,
            }
        } else if comprehension_score >= self.maintain_threshold {
            SpeedAdjustment {
                current_wpm,
                recommended_wpm: current_wpm,
                rationale: "Great job! You're in the ideal learning zone. Maintain this speed \
                            until comprehension improves further."
                    .to_string(),
                is_increase: false,
            }
        } else {
            SpeedAdjustment {
                current_wpm,
                recommended_wpm: current_wpm
                    .saturating_sub(step(self.decrease_ratio))
                    .max(self.floor_wpm),
                rationale: "Your speed might be too high. Reduce it a little to rebuild \
                            comprehension."
                    .to_string(),
                is_increase: false,
            }
        }
    }
}

/// Recommend a new WPM from a quiz score (0..=100) using the default policy.
pub fn compute_speed_adjustment(comprehension_score: f64, current_wpm: u32) -> SpeedAdjustment {
    AdvisorPolicy::default().compute(comprehension_score, current_wpm)
}
