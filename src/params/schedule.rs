//! Shape auto-cycle timing.

/// Phrase length and randomness for [`crate::schedule::ShapeCycleScheduler`]
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    /// Bars between automatic shape changes
    pub phrase_bars: f64,

    /// Bar length used when the audio source cannot report one (seconds)
    pub fallback_bar_s: f64,

    /// Seed for the shape selection stream
    pub seed: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            phrase_bars: 16.0,
            fallback_bar_s: 7.5,
            seed: 1337,
        }
    }
}

impl ScheduleConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.phrase_bars.is_finite() && self.phrase_bars > 0.0) {
            return Err(format!("phrase_bars must be > 0, got {}", self.phrase_bars));
        }
        if !(self.fallback_bar_s.is_finite() && self.fallback_bar_s > 0.0) {
            return Err(format!(
                "fallback_bar_s must be > 0, got {}",
                self.fallback_bar_s
            ));
        }
        Ok(())
    }
}
