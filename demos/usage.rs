use anyhow::Result;
use clap::Parser;
use dbw_control::{CycleInput, VehicleControllerInit, VehicleParams};
use log::{info, LevelFilter};
use rand::prelude::*;
use std::path::PathBuf;

#[derive(Parser)]
struct Opts {
    /// TOML parameter file. A mid-size sedan is simulated if omitted.
    #[clap(long)]
    pub params: Option<PathBuf>,
    /// Target speed in m/s.
    #[clap(long, default_value = "10.0")]
    pub speed: f64,
    /// Target yaw rate in rad/s.
    #[clap(long, default_value = "0.05")]
    pub yaw_rate: f64,
    /// Simulated duration in seconds.
    #[clap(long, default_value = "30.0")]
    pub duration: f64,
    /// Control rate in Hz.
    #[clap(long, default_value = "50.0")]
    pub rate: f64,
    /// Amplitude of the uniform speed sensor noise in m/s.
    #[clap(long, default_value = "0.1")]
    pub noise: f64,
    #[clap(long, default_value = "0")]
    pub seed: u64,
    #[clap(short, long)]
    pub verbose: bool,
}

fn main() -> Result<()> {
    let opts = Opts::parse();

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {}] {}",
                record.level(),
                record.target(),
                message
            ))
        })
        .level(if opts.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .chain(std::io::stderr())
        .apply()?;

    let init = match &opts.params {
        Some(path) => VehicleControllerInit::load(path)?,
        None => VehicleControllerInit::from_params(VehicleParams {
            vehicle_mass: 1736.35,
            fuel_capacity: 13.5,
            brake_deadband: 0.1,
            decel_limit: -5.0,
            accel_limit: 1.0,
            wheel_radius: 0.2413,
            wheel_base: 2.8498,
            steer_ratio: 14.8,
            max_lateral_accel: 3.0,
            max_steer_angle: 8.0,
        }),
    };

    // Create a vehicle controller
    let mut controller = init.build()?;
    let params = controller.params().clone();
    let max_throttle = init.speed_controller.pid.max_output;

    let mut rng = StdRng::seed_from_u64(opts.seed);
    let time_delta_sec = 1.0 / opts.rate;
    let steps = (opts.duration * opts.rate) as usize;
    let mut speed = 0.0_f64;

    for step in 0..steps {
        let time_sec = step as f64 * time_delta_sec;

        // Hand the wheel to the driver for two seconds in the middle of the run
        let dbw_enabled = !(opts.duration / 2.0..opts.duration / 2.0 + 2.0).contains(&time_sec);

        // Brake to a stop over the last quarter
        let target_speed = if time_sec > opts.duration * 0.75 {
            0.0
        } else {
            opts.speed
        };

        let noise: f64 = rng.gen_range(-1.0..=1.0) * opts.noise;
        let (output, report) = controller.step(CycleInput {
            linear_velocity: target_speed,
            angular_velocity: opts.yaw_rate,
            current_velocity: (speed + noise).max(0.0),
            dbw_enabled,
            time_sec,
        });

        // Point-mass longitudinal model with a constant rolling loss. Full
        // throttle reaches the acceleration limit.
        let accel = output.throttle / max_throttle * params.accel_limit
            - output.brake / (params.vehicle_mass * params.wheel_radius)
            - 0.05;
        speed = (speed + accel * time_delta_sec).max(0.0);

        if step % opts.rate.max(1.0) as usize == 0 {
            info!(
                "t={time_sec:5.2}s speed={speed:6.3} throttle={:.3} brake={:7.1} steer={:+.3} {:?}",
                output.throttle, output.brake, output.steer, report.status
            );
        }
    }

    Ok(())
}
