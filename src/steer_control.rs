use crate::{
    constants::DEFAULT_MIN_STEER_SPEED_MS,
    error::{ensure_positive, Result},
    params::VehicleParams,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YawControllerInit {
    /// Speed floor in m/s applied before dividing by a velocity.
    pub min_speed: f64,
}

impl YawControllerInit {
    pub fn validate(&self) -> Result<()> {
        ensure_positive("min_speed", self.min_speed)
    }

    pub fn build(&self, params: &VehicleParams) -> Result<YawController> {
        self.validate()?;
        params.validate()?;

        let VehicleParams {
            wheel_base,
            steer_ratio,
            max_lateral_accel,
            max_steer_angle,
            ..
        } = *params;

        Ok(YawController {
            wheel_base,
            steer_ratio,
            min_speed: self.min_speed,
            max_lateral_accel,
            max_steer_angle,
        })
    }
}

impl Default for YawControllerInit {
    fn default() -> Self {
        Self {
            min_speed: DEFAULT_MIN_STEER_SPEED_MS,
        }
    }
}

/// Maps a commanded yaw rate to a steering wheel angle using a single-track
/// vehicle model.
#[derive(Debug, Clone)]
pub struct YawController {
    wheel_base: f64,
    steer_ratio: f64,
    min_speed: f64,
    max_lateral_accel: f64,
    max_steer_angle: f64,
}

impl YawController {
    /// Steering wheel angle in radians for the commanded linear and angular
    /// velocity at the given current velocity.
    ///
    /// Both velocities are floored in magnitude at `min_speed` before
    /// dividing, and keep their sign. A reversing command therefore steers
    /// opposite to the same forward command.
    pub fn steering(&self, linear_velocity: f64, angular_velocity: f64, current_velocity: f64) -> f64 {
        if linear_velocity == 0.0 {
            return 0.0;
        }

        let Self {
            wheel_base,
            steer_ratio,
            max_steer_angle,
            ..
        } = *self;

        let max_yaw_rate = self.max_yaw_rate(current_velocity);
        let yaw_rate = angular_velocity.clamp(-max_yaw_rate, max_yaw_rate);
        let wheel_angle = wheel_base * yaw_rate / self.floor_speed(linear_velocity);

        (wheel_angle * steer_ratio).clamp(-max_steer_angle, max_steer_angle)
    }

    /// Largest yaw rate in rad/s that stays within the lateral acceleration
    /// limit at `current_velocity`.
    pub fn max_yaw_rate(&self, current_velocity: f64) -> f64 {
        self.max_lateral_accel / self.floor_speed(current_velocity).abs()
    }

    pub fn max_steer_angle(&self) -> f64 {
        self.max_steer_angle
    }

    /// Raises the magnitude of `speed` to at least `min_speed`, keeping its sign.
    fn floor_speed(&self, speed: f64) -> f64 {
        let magnitude = speed.abs().max(self.min_speed);
        if speed.is_sign_negative() {
            -magnitude
        } else {
            magnitude
        }
    }
}
