use crate::{
    error::Result,
    lowpass::{LowPassFilter, LowPassInit},
    pid::{Pid, PidInit},
};
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedControllerInit {
    pub pid: PidInit,
    pub filter: LowPassInit,
}

impl SpeedControllerInit {
    pub fn validate(&self) -> Result<()> {
        self.pid.validate()?;
        self.filter.validate()?;
        Ok(())
    }

    pub fn build(&self) -> Result<SpeedController> {
        let Self {
            ref pid,
            ref filter,
        } = *self;

        Ok(SpeedController {
            throttle_pid: pid.build()?,
            velocity_filter: filter.build()?,
            last_time_sec: None,
        })
    }
}

/// Tracks a target speed with a PID on the low-pass filtered current speed.
#[derive(Debug, Clone)]
pub struct SpeedController {
    throttle_pid: Pid,
    velocity_filter: LowPassFilter,
    last_time_sec: Option<f64>,
}

impl SpeedController {
    pub fn step(&mut self, target_speed: f64, current_speed: f64, time_sec: f64) -> SpeedControl {
        let Self {
            throttle_pid,
            velocity_filter,
            last_time_sec,
        } = self;

        let filtered_speed = velocity_filter.filt(current_speed);
        let speed_error = target_speed - filtered_speed;

        // The first cycle has no reference time and only primes the filter.
        let sample_time = match *last_time_sec {
            Some(prev) => time_sec - prev,
            None => 0.0,
        };
        if time_sec.is_finite() {
            *last_time_sec = Some(time_sec);
        } else {
            debug!("ignore non-finite timestamp {time_sec}");
        }
        let throttle = throttle_pid.step(speed_error, sample_time);

        SpeedControl {
            filtered_speed,
            speed_error,
            sample_time,
            throttle,
        }
    }

    /// Clears the integral history. The velocity filter keeps its state.
    pub fn reset(&mut self) {
        self.throttle_pid.reset();
    }

    pub fn filtered_speed(&self) -> Option<f64> {
        self.velocity_filter.get()
    }

    pub fn last_time_sec(&self) -> Option<f64> {
        self.last_time_sec
    }

    pub fn pid(&self) -> &Pid {
        &self.throttle_pid
    }
}

#[derive(Debug, Clone)]
pub struct SpeedControl {
    pub filtered_speed: f64,
    pub speed_error: f64,
    pub sample_time: f64,
    pub throttle: f64,
}
