use crate::{
    constants::{
        DEFAULT_MAX_THROTTLE, DEFAULT_MIN_THROTTLE, DEFAULT_THROTTLE_KD, DEFAULT_THROTTLE_KI,
        DEFAULT_THROTTLE_KP,
    },
    error::{ensure_finite, Error, Result},
};
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PidInit {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    pub min_output: f64,
    pub max_output: f64,
}

impl PidInit {
    pub fn validate(&self) -> Result<()> {
        let Self {
            kp,
            ki,
            kd,
            min_output,
            max_output,
        } = *self;

        ensure_finite("kp", kp)?;
        ensure_finite("ki", ki)?;
        ensure_finite("kd", kd)?;
        ensure_finite("min_output", min_output)?;
        ensure_finite("max_output", max_output)?;

        if min_output > max_output {
            return Err(Error::invalid(
                "min_output",
                min_output,
                "must not exceed max_output",
            ));
        }

        Ok(())
    }

    pub fn build(&self) -> Result<Pid> {
        self.validate()?;

        let Self {
            kp,
            ki,
            kd,
            min_output,
            max_output,
        } = *self;
        Ok(Pid::new(kp, ki, kd, min_output, max_output))
    }
}

impl Default for PidInit {
    fn default() -> Self {
        Self {
            kp: DEFAULT_THROTTLE_KP,
            ki: DEFAULT_THROTTLE_KI,
            kd: DEFAULT_THROTTLE_KD,
            min_output: DEFAULT_MIN_THROTTLE,
            max_output: DEFAULT_MAX_THROTTLE,
        }
    }
}

/// PID controller with a saturated output.
///
/// While the output saturates, the integral term stops accumulating.
#[derive(Debug, Clone)]
pub struct Pid {
    kp: f64,
    ki: f64,
    kd: f64,
    min_output: f64,
    max_output: f64,
    integral: f64,
    last_error: f64,
    last_output: f64,
}

impl Pid {
    fn new(kp: f64, ki: f64, kd: f64, min_output: f64, max_output: f64) -> Self {
        Self {
            kp,
            ki,
            kd,
            min_output,
            max_output,
            integral: 0.0,
            last_error: 0.0,
            last_output: 0.0,
        }
    }

    /// Advances the controller by `sample_time` seconds.
    ///
    /// A non-positive or NaN `sample_time` leaves the state untouched and
    /// returns the previous output.
    pub fn step(&mut self, error: f64, sample_time: f64) -> f64 {
        if !(sample_time > 0.0) {
            debug!("skip PID step with sample time {sample_time}");
            return self.last_output;
        }

        let Self {
            kp,
            ki,
            kd,
            min_output,
            max_output,
            integral: prev_integral,
            last_error,
            ..
        } = *self;

        let integral = prev_integral + error * sample_time;
        let derivative = (error - last_error) / sample_time;
        let raw = kp * error + ki * integral + kd * derivative;
        let output = raw.clamp(min_output, max_output);

        // Anti-windup
        self.integral = if output != raw { prev_integral } else { integral };
        self.last_error = error;
        self.last_output = output;

        output
    }

    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.last_error = 0.0;
        self.last_output = 0.0;
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }

    pub fn last_output(&self) -> f64 {
        self.last_output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;

    #[test]
    fn proportional_and_integral_terms() {
        let mut pid = Pid::new(0.3, 0.1, 0.0, -10.0, 10.0);
        let out = pid.step(2.0, 0.5);
        assert!((out - (0.3 * 2.0 + 0.1 * 1.0)).abs() < 1e-12);
        assert!((pid.integral() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn derivative_term_uses_previous_error() {
        let mut pid = Pid::new(0.0, 0.0, 0.5, -10.0, 10.0);
        pid.step(1.0, 0.1);
        let out = pid.step(1.5, 0.1);
        assert!((out - 0.5 * 5.0).abs() < 1e-9);
    }

    #[test]
    fn non_positive_sample_time_is_a_no_op() {
        let mut pid = PidInit::default().build().unwrap();
        let first = pid.step(0.4, 0.02);
        let integral = pid.integral();

        assert_eq!(pid.step(100.0, 0.0), first);
        assert_eq!(pid.step(-100.0, -0.5), first);
        assert_eq!(pid.step(100.0, f64::NAN), first);
        assert_eq!(pid.last_output(), first);
        assert_eq!(pid.integral(), integral);
    }

    #[test]
    fn output_stays_within_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut pid = PidInit::default().build().unwrap();

        for _ in 0..10_000 {
            let error = rng.gen_range(-50.0..50.0);
            let sample_time = rng.gen_range(1e-4..1.0);
            let out = pid.step(error, sample_time);
            assert!((0.0..=0.2).contains(&out), "{out} out of bounds");
        }
    }

    #[test]
    fn integral_freezes_while_saturated() {
        let mut pid = PidInit::default().build().unwrap();

        for _ in 0..1_000 {
            assert_eq!(pid.step(10.0, 0.02), 0.2);
        }
        assert_eq!(pid.integral(), 0.0);
    }

    #[test]
    fn leaves_saturation_promptly_after_sign_change() {
        let mut pid = PidInit::default().build().unwrap();
        for _ in 0..5_000 {
            pid.step(10.0, 0.02);
        }

        // A wound-up integrator would hold the output at the upper bound here.
        let out = pid.step(-1.0, 0.02);
        assert_eq!(out, 0.0);
    }

    #[test]
    fn reset_matches_fresh_instance() {
        let init = PidInit::default();
        let mut fresh = init.build().unwrap();
        let mut used = init.build().unwrap();

        for _ in 0..50 {
            used.step(0.3, 0.02);
        }
        used.reset();
        assert_eq!(used.last_output(), 0.0);

        assert_eq!(used.step(0.1, 0.02), fresh.step(0.1, 0.02));
        assert_eq!(used.integral(), fresh.integral());
    }

    #[test]
    fn rejects_inverted_bounds() {
        let init = PidInit {
            min_output: 1.0,
            max_output: 0.0,
            ..PidInit::default()
        };
        assert!(init.validate().is_err());
        assert!(matches!(
            init.build(),
            Err(Error::InvalidParam {
                name: "min_output",
                ..
            })
        ));
    }

    #[test]
    fn rejects_non_finite_gain() {
        let init = PidInit {
            ki: f64::INFINITY,
            ..PidInit::default()
        };
        assert!(init.build().is_err());
    }
}
