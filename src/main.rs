mod config;

use std::time::Duration;

use anyhow::Context;
use spin_sleep::SpinSleeper;
use strix_hal::devices::sim::SimBackend;
use strix_mechanism::{MechanismControl, MotorMechanism};
use tracing::info;
use tracing_subscriber::{self, EnvFilter};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let app_config = config::load_config().context("configuration load failed")?;
    let period = Duration::from_millis(app_config.loop_period_ms);
    let dt = period.as_secs_f64();

    let mut backend = SimBackend::new();
    let mut mechanism = MotorMechanism::new(app_config.mechanism, &mut backend)
        .context("mechanism bring-up failed")?;
    info!(
        mechanism = %mechanism.settings().base.name,
        motors = mechanism.motor_count(),
        "mechanism ready"
    );

    mechanism.set_brake_mode(true)?;

    let sleeper = SpinSleeper::new(100_000);
    for tick in 0..app_config.ticks {
        // Open-loop excitation so the soak shows the sensors moving.
        let volts = 3.0 * (tick as f64 * dt).sin();
        mechanism.set_motor_voltage(volts);
        backend.step(dt);

        if tick % 50 == 0 {
            info!(
                tick,
                position = mechanism.position(),
                rate = mechanism.rate(),
                voltage = mechanism.motor_voltage(0),
                current = mechanism.motor_current(0),
                "telemetry"
            );
        }
        sleeper.sleep(period);
    }

    mechanism.set_brake_mode(false)?;
    info!("soak complete");
    Ok(())
}
