use crate::{
    constants::{DEFAULT_VELOCITY_TAU_SEC, DEFAULT_VELOCITY_TS_SEC},
    error::{ensure_non_negative, ensure_positive, Result},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LowPassInit {
    /// Time constant in seconds.
    pub tau: f64,
    /// Nominal sample period in seconds.
    pub ts: f64,
}

impl LowPassInit {
    pub fn validate(&self) -> Result<()> {
        ensure_non_negative("tau", self.tau)?;
        ensure_positive("ts", self.ts)?;
        Ok(())
    }

    pub fn build(&self) -> Result<LowPassFilter> {
        self.validate()?;
        Ok(LowPassFilter::new(self.tau, self.ts))
    }
}

impl Default for LowPassInit {
    fn default() -> Self {
        Self {
            tau: DEFAULT_VELOCITY_TAU_SEC,
            ts: DEFAULT_VELOCITY_TS_SEC,
        }
    }
}

/// First-order exponential smoother.
///
/// The first sample passes through unchanged. Later samples are blended
/// with the previous output by the weight `a = ts / (tau + ts)`.
#[derive(Debug, Clone)]
pub struct LowPassFilter {
    a: f64,
    last: Option<f64>,
}

impl LowPassFilter {
    fn new(tau: f64, ts: f64) -> Self {
        Self {
            a: ts / (tau + ts),
            last: None,
        }
    }

    pub fn filt(&mut self, value: f64) -> f64 {
        let Self { a, last } = *self;
        let output = match last {
            Some(prev) => a * value + (1.0 - a) * prev,
            None => value,
        };
        self.last = Some(output);
        output
    }

    /// The last filtered value, or `None` before the first sample.
    pub fn get(&self) -> Option<f64> {
        self.last
    }

    pub fn is_ready(&self) -> bool {
        self.last.is_some()
    }

    pub fn weight(&self) -> f64 {
        self.a
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_passes_through() {
        let mut filter = LowPassInit::default().build().unwrap();
        assert_eq!(filter.get(), None);
        assert_eq!(filter.filt(12.5), 12.5);
        assert_eq!(filter.get(), Some(12.5));
    }

    #[test]
    fn blends_with_previous_output() {
        let mut filter = LowPassFilter::new(0.5, 0.2);
        let a = 0.2 / 0.7;
        assert!((filter.weight() - a).abs() < 1e-12);

        filter.filt(0.0);
        let out = filter.filt(7.0);
        assert!((out - a * 7.0).abs() < 1e-12);
        assert_eq!(filter.get(), Some(out));
    }

    #[test]
    fn converges_to_constant_input() {
        let mut filter = LowPassInit::default().build().unwrap();
        filter.filt(-3.0);
        let out = (0..200).map(|_| filter.filt(4.0)).last().unwrap();
        assert!((out - 4.0).abs() < 1e-9);
    }

    #[test]
    fn zero_tau_disables_smoothing() {
        let mut filter = LowPassFilter::new(0.0, 0.2);
        filter.filt(1.0);
        assert_eq!(filter.filt(9.0), 9.0);
    }

    #[test]
    fn reset_forgets_history() {
        let mut filter = LowPassInit::default().build().unwrap();
        filter.filt(5.0);
        filter.reset();
        assert!(!filter.is_ready());
        assert_eq!(filter.filt(1.0), 1.0);
    }

    #[test]
    fn rejects_non_positive_period() {
        let init = LowPassInit {
            ts: 0.0,
            ..LowPassInit::default()
        };
        assert!(init.validate().is_err());
        assert!(init.build().is_err());
    }

    #[test]
    fn rejects_negative_time_constant() {
        let init = LowPassInit {
            tau: -0.2,
            ..LowPassInit::default()
        };
        assert!(init.build().is_err());
    }
}
