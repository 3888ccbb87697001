use crate::{
    constants::{LOW_THROTTLE, STOP_HOLD_BRAKE_TORQUE_NM, STOP_HOLD_SPEED_MS},
    error::{ensure_finite, ensure_non_negative, Result},
    params::VehicleParams,
    speed_control::{SpeedControl, SpeedController, SpeedControllerInit},
    steer_control::{YawController, YawControllerInit},
};
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrakeInit {
    /// Filtered speed in m/s below which a zero target speed holds the vehicle.
    pub stop_hold_speed: f64,
    /// Holding brake torque in N·m.
    pub stop_hold_torque: f64,
    /// Throttle below which an overspeeding vehicle brakes instead.
    pub low_throttle: f64,
}

impl BrakeInit {
    pub fn validate(&self) -> Result<()> {
        ensure_finite("stop_hold_speed", self.stop_hold_speed)?;
        ensure_non_negative("stop_hold_torque", self.stop_hold_torque)?;
        ensure_finite("low_throttle", self.low_throttle)?;
        Ok(())
    }
}

impl Default for BrakeInit {
    fn default() -> Self {
        Self {
            stop_hold_speed: STOP_HOLD_SPEED_MS,
            stop_hold_torque: STOP_HOLD_BRAKE_TORQUE_NM,
            low_throttle: LOW_THROTTLE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleControllerInit {
    #[serde(rename = "vehicle")]
    pub params: VehicleParams,
    #[serde(rename = "speed", default)]
    pub speed_controller: SpeedControllerInit,
    #[serde(rename = "steer", default)]
    pub yaw_controller: YawControllerInit,
    #[serde(default)]
    pub brake: BrakeInit,
}

impl VehicleControllerInit {
    pub fn from_params(params: VehicleParams) -> Self {
        Self {
            params,
            speed_controller: SpeedControllerInit::default(),
            yaw_controller: YawControllerInit::default(),
            brake: BrakeInit::default(),
        }
    }

    /// Parses a TOML document with a `[vehicle]` table and optional
    /// `[speed]`, `[steer]` and `[brake]` tables.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        self.params.validate()?;
        self.speed_controller.validate()?;
        self.yaw_controller.validate()?;
        self.brake.validate()?;
        Ok(())
    }

    pub fn build(&self) -> Result<VehicleController> {
        self.validate()?;

        let Self {
            ref params,
            ref speed_controller,
            ref yaw_controller,
            ref brake,
        } = *self;
        debug!("build vehicle controller with {params:?}");

        Ok(VehicleController {
            params: params.clone(),
            brake: brake.clone(),
            speed_controller: speed_controller.build()?,
            yaw_controller: yaw_controller.build(params)?,
            engaged: None,
        })
    }
}

/// Inputs of one control cycle.
#[derive(Debug, Clone)]
pub struct CycleInput {
    /// Commanded linear velocity in m/s.
    pub linear_velocity: f64,
    /// Commanded angular velocity in rad/s.
    pub angular_velocity: f64,
    /// Measured linear velocity in m/s.
    pub current_velocity: f64,
    pub dbw_enabled: bool,
    /// Monotonic timestamp in seconds.
    pub time_sec: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    pub throttle: f64,
    /// Brake torque in N·m.
    pub brake: f64,
    /// Steering wheel angle in radians.
    pub steer: f64,
}

impl Output {
    pub const IDLE: Self = Self {
        throttle: 0.0,
        brake: 0.0,
        steer: 0.0,
    };
}

impl Default for Output {
    fn default() -> Self {
        Self::IDLE
    }
}

#[derive(Debug, Clone)]
pub struct Report {
    pub status: Status,
    pub filtered_velocity: f64,
    pub velocity_error: f64,
    pub sample_time: f64,
    /// Throttle computed by the PID before arbitration.
    pub pid_throttle: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Disabled,
    StopHold,
    Braking,
    Accelerating,
}

/// Drive-by-wire controller producing throttle, brake and steering commands.
///
/// Each call to [`step`](Self::step) runs one control cycle. The controller
/// is engaged whenever the cycle input enables drive-by-wire.
#[derive(Debug)]
pub struct VehicleController {
    params: VehicleParams,
    brake: BrakeInit,
    speed_controller: SpeedController,
    yaw_controller: YawController,
    engaged: Option<bool>,
}

impl VehicleController {
    pub fn step(&mut self, input: CycleInput) -> (Output, Report) {
        let CycleInput {
            linear_velocity,
            angular_velocity,
            current_velocity,
            dbw_enabled,
            time_sec,
        } = input;

        if self.engaged != Some(dbw_enabled) {
            debug!(
                "drive-by-wire {}",
                if dbw_enabled { "engaged" } else { "disabled" }
            );
            self.engaged = Some(dbw_enabled);
        }

        if !dbw_enabled {
            return self.disengage();
        }

        let Self {
            params,
            brake,
            speed_controller,
            yaw_controller,
            ..
        } = self;

        // Run speed controller
        let SpeedControl {
            filtered_speed: filtered_velocity,
            speed_error: velocity_error,
            sample_time,
            throttle: pid_throttle,
        } = speed_controller.step(linear_velocity, current_velocity, time_sec);

        // Compute steering angle
        let steer = yaw_controller.steering(linear_velocity, angular_velocity, filtered_velocity);

        let is_stop_hold = linear_velocity == 0.0 && filtered_velocity < brake.stop_hold_speed;
        let is_overspeed = pid_throttle < brake.low_throttle && velocity_error < 0.0;

        let (status, output) = if is_stop_hold {
            let output = Output {
                throttle: 0.0,
                brake: brake.stop_hold_torque,
                steer,
            };
            (Status::StopHold, output)
        } else if is_overspeed {
            let output = Output {
                throttle: 0.0,
                brake: params.brake_torque(velocity_error),
                steer,
            };
            (Status::Braking, output)
        } else {
            let output = Output {
                throttle: pid_throttle,
                brake: 0.0,
                steer,
            };
            (Status::Accelerating, output)
        };

        let report = Report {
            status,
            filtered_velocity,
            velocity_error,
            sample_time,
            pid_throttle,
        };
        trace!("{output:?} {report:?}");

        (output, report)
    }

    /// Hands control back to the driver. The integral history is dropped so
    /// that the next engagement starts clean.
    fn disengage(&mut self) -> (Output, Report) {
        self.speed_controller.reset();

        let report = Report {
            status: Status::Disabled,
            filtered_velocity: self.speed_controller.filtered_speed().unwrap_or(0.0),
            velocity_error: 0.0,
            sample_time: 0.0,
            pid_throttle: 0.0,
        };
        (Output::IDLE, report)
    }

    pub fn params(&self) -> &VehicleParams {
        &self.params
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged.unwrap_or(false)
    }

    pub fn filtered_velocity(&self) -> Option<f64> {
        self.speed_controller.filtered_speed()
    }

    pub fn speed_controller(&self) -> &SpeedController {
        &self.speed_controller
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::Error, lowpass::LowPassInit, params::tests::sample, steer_control::YawControllerInit,
    };

    const CONFIG: &str = r#"
        [vehicle]
        vehicle_mass = 1736.35
        fuel_capacity = 13.5
        brake_deadband = 0.1
        decel_limit = -5.0
        accel_limit = 1.0
        wheel_radius = 0.2413
        wheel_base = 2.8498
        steer_ratio = 14.8
        max_lateral_accel = 3.0
        max_steer_angle = 8.0

        [speed.pid]
        max_output = 0.5

        [brake]
        stop_hold_torque = 400.0
    "#;

    fn input(linear_velocity: f64, current_velocity: f64, time_sec: f64) -> CycleInput {
        CycleInput {
            linear_velocity,
            angular_velocity: 0.0,
            current_velocity,
            dbw_enabled: true,
            time_sec,
        }
    }

    #[test]
    fn loads_toml_with_defaults() {
        let init = VehicleControllerInit::from_toml_str(CONFIG).unwrap();

        assert_eq!(init.params, sample());
        assert_eq!(init.speed_controller.pid.max_output, 0.5);
        assert_eq!(init.speed_controller.pid.kp, 0.3);
        assert_eq!(init.speed_controller.filter, LowPassInit::default());
        assert_eq!(init.yaw_controller, YawControllerInit::default());
        assert_eq!(init.brake.stop_hold_torque, 400.0);
        assert_eq!(init.brake.low_throttle, 0.1);
    }

    #[test]
    fn missing_vehicle_table_is_an_error() {
        let err = VehicleControllerInit::from_toml_str("[brake]\nlow_throttle = 0.2\n").unwrap_err();
        assert!(matches!(err, Error::Toml(_)));
    }

    #[test]
    fn build_rejects_invalid_params() {
        let params = VehicleParams {
            wheel_radius: 0.0,
            ..sample()
        };
        let err = VehicleControllerInit::from_params(params).build().unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidParam {
                name: "wheel_radius",
                ..
            }
        ));
    }

    #[test]
    fn accelerates_below_target() {
        let mut controller = VehicleControllerInit::from_params(sample()).build().unwrap();
        controller.step(input(10.0, 5.0, 0.0));
        let (output, report) = controller.step(input(10.0, 5.0, 0.02));

        assert_eq!(report.status, Status::Accelerating);
        assert_eq!(output.throttle, 0.2);
        assert_eq!(output.brake, 0.0);
    }

    #[test]
    fn stop_hold_overrides_pid() {
        let mut controller = VehicleControllerInit::from_params(sample()).build().unwrap();
        let (output, report) = controller.step(input(0.0, 0.05, 0.0));

        assert_eq!(report.status, Status::StopHold);
        assert_eq!(output.throttle, 0.0);
        assert_eq!(output.brake, 700.0);
    }

    #[test]
    fn tracks_engagement_state() {
        let mut controller = VehicleControllerInit::from_params(sample()).build().unwrap();
        assert!(!controller.is_engaged());

        controller.step(input(5.0, 5.0, 0.0));
        assert!(controller.is_engaged());

        controller.step(CycleInput {
            dbw_enabled: false,
            ..input(5.0, 5.0, 0.02)
        });
        assert!(!controller.is_engaged());
    }
}
