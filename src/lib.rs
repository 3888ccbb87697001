//! Drive-by-wire controller turning commanded linear and angular velocities
//! into throttle, brake torque and steering wheel angle.
//!
//! ```
//! use dbw_control::{CycleInput, VehicleControllerInit, VehicleParams};
//!
//! let params = VehicleParams {
//!     vehicle_mass: 1736.35,
//!     fuel_capacity: 13.5,
//!     brake_deadband: 0.1,
//!     decel_limit: -5.0,
//!     accel_limit: 1.0,
//!     wheel_radius: 0.2413,
//!     wheel_base: 2.8498,
//!     steer_ratio: 14.8,
//!     max_lateral_accel: 3.0,
//!     max_steer_angle: 8.0,
//! };
//! let mut controller = VehicleControllerInit::from_params(params).build()?;
//!
//! let (output, _report) = controller.step(CycleInput {
//!     linear_velocity: 0.0,
//!     angular_velocity: 0.0,
//!     current_velocity: 0.0,
//!     dbw_enabled: true,
//!     time_sec: 0.0,
//! });
//! assert_eq!(output.brake, 700.0);
//! # Ok::<(), dbw_control::Error>(())
//! ```

pub mod constants;
pub mod error;
pub mod lowpass;
pub mod params;
pub mod pid;
pub mod speed_control;
pub mod steer_control;
pub mod vehicle_control;

pub use error::{Error, Result};
pub use params::VehicleParams;
pub use vehicle_control::{CycleInput, Output, Report, Status, VehicleController, VehicleControllerInit};
