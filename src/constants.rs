/// Proportional gain of the throttle PID.
pub const DEFAULT_THROTTLE_KP: f64 = 0.3;
/// Integral gain of the throttle PID.
pub const DEFAULT_THROTTLE_KI: f64 = 0.1;
/// Derivative gain of the throttle PID.
pub const DEFAULT_THROTTLE_KD: f64 = 0.0;
pub const DEFAULT_MIN_THROTTLE: f64 = 0.0;
pub const DEFAULT_MAX_THROTTLE: f64 = 0.2;

/// Velocity filter time constant in seconds. The cutoff frequency is 1/(2π·tau).
pub const DEFAULT_VELOCITY_TAU_SEC: f64 = 0.5;
/// Nominal velocity sample period in seconds.
pub const DEFAULT_VELOCITY_TS_SEC: f64 = 0.2;

/// Speed floor of the yaw controller, in m/s.
pub const DEFAULT_MIN_STEER_SPEED_MS: f64 = 0.1;

/// Below this filtered speed a zero speed command holds the vehicle.
pub const STOP_HOLD_SPEED_MS: f64 = 0.1;
/// Brake torque that keeps the vehicle from creeping at a stop, in N·m.
pub const STOP_HOLD_BRAKE_TORQUE_NM: f64 = 700.0;
/// Throttle commands below this value are too small to matter and hand over to braking.
pub const LOW_THROTTLE: f64 = 0.1;
