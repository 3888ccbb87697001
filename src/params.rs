use crate::error::{ensure_finite, ensure_positive, Error, Result};
use serde::{Deserialize, Serialize};

/// Physical description of the vehicle. Fixed for the lifetime of a controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleParams {
    /// Curb mass in kg.
    pub vehicle_mass: f64,
    /// Fuel tank capacity in liters. The brake torque does not account
    /// for fuel mass.
    pub fuel_capacity: f64,
    /// Brake deadband in m/s². Not applied when braking.
    pub brake_deadband: f64,
    /// Strongest allowed deceleration in m/s². Negative.
    pub decel_limit: f64,
    /// Strongest allowed acceleration in m/s². Non-negative.
    pub accel_limit: f64,
    /// Wheel radius in meters.
    pub wheel_radius: f64,
    /// Distance between the front and rear axles in meters.
    pub wheel_base: f64,
    /// Ratio between the steering wheel angle and the road wheel angle.
    pub steer_ratio: f64,
    /// Lateral acceleration limit in m/s².
    pub max_lateral_accel: f64,
    /// Steering wheel angle limit in radians.
    pub max_steer_angle: f64,
}

impl VehicleParams {
    pub fn validate(&self) -> Result<()> {
        let Self {
            vehicle_mass,
            fuel_capacity,
            brake_deadband,
            decel_limit,
            accel_limit,
            wheel_radius,
            wheel_base,
            steer_ratio,
            max_lateral_accel,
            max_steer_angle,
        } = *self;

        ensure_positive("vehicle_mass", vehicle_mass)?;
        ensure_finite("fuel_capacity", fuel_capacity)?;
        ensure_finite("brake_deadband", brake_deadband)?;

        ensure_finite("decel_limit", decel_limit)?;
        if decel_limit >= 0.0 {
            return Err(Error::invalid(
                "decel_limit",
                decel_limit,
                "must be negative",
            ));
        }

        ensure_finite("accel_limit", accel_limit)?;
        if accel_limit < 0.0 {
            return Err(Error::invalid(
                "accel_limit",
                accel_limit,
                "must not be negative",
            ));
        }

        ensure_positive("wheel_radius", wheel_radius)?;
        ensure_positive("wheel_base", wheel_base)?;
        ensure_positive("steer_ratio", steer_ratio)?;
        ensure_positive("max_lateral_accel", max_lateral_accel)?;
        ensure_positive("max_steer_angle", max_steer_angle)?;

        Ok(())
    }

    /// Brake torque in N·m that decelerates the vehicle at `decel` m/s².
    ///
    /// The deceleration is capped at `decel_limit` before conversion.
    pub fn brake_torque(&self, decel: f64) -> f64 {
        decel.max(self.decel_limit).abs() * self.vehicle_mass * self.wheel_radius
    }
}
