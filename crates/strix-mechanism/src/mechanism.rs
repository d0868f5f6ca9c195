use strix_hal::{
    AbsoluteEncoder, HardwareBackend, MotorController, MotorOutputConfig, NeutralMode, Polarity,
    QuadratureEncoder,
};
use tracing::{info, warn};

use crate::error::MechanismError;
use crate::settings::MotorMechanismSettings;

/// Capability set every mechanism implementation exposes to the controller
/// layer.
///
/// Positions are in degrees; rates are in the distance units implied by the
/// quadrature encoder's scale, per second. All calls are synchronous and are
/// expected to complete within one control-loop tick.
pub trait MechanismControl {
    /// Current absolute position in degrees, zero-offset applied.
    ///
    /// Not clamped; the caller handles wrap-around if the mechanism can
    /// cross the 0°/360° boundary.
    fn position(&self) -> f64;

    /// Current rate from the quadrature encoder, passed through untouched.
    fn rate(&self) -> f64;

    /// Applied output voltage of one motor, or 0.0 when `index` is out of
    /// range.
    fn motor_voltage(&self, index: usize) -> f64;

    /// Torque-equivalent current of one motor, or 0.0 when `index` is out of
    /// range.
    fn motor_current(&self, index: usize) -> f64;

    /// Command the same voltage to every motor on the mechanism.
    ///
    /// The value is not clamped here; the controller layer bounds it.
    fn set_motor_voltage(&mut self, volts: f64);

    /// Number of motors on the mechanism.
    fn motor_count(&self) -> usize;
}

/// Motor mechanism driven through a hardware backend.
///
/// Owns one handle per configured motor plus the two encoders; nothing else
/// may hold or mutate them. The per-motor [`MotorOutputConfig`] snapshots
/// taken at construction act as a single-writer cache that lets
/// [`set_brake_mode`](MotorMechanism::set_brake_mode) skip redundant device
/// writes.
pub struct MotorMechanism<B: HardwareBackend> {
    settings: MotorMechanismSettings,
    motors: Vec<B::Motor>,
    motor_configs: Vec<MotorOutputConfig>,
    quad_encoder: B::QuadEncoder,
    abs_encoder: B::AbsEncoder,
}

impl<B: HardwareBackend> MotorMechanism<B> {
    /// Bring up the mechanism's hardware from its settings.
    ///
    /// Opens every motor handle, reads back the live output configuration of
    /// each device, overrides only the polarity from the per-motor inversion
    /// flag, and writes the configuration back. Then attaches both encoders
    /// and sets the quadrature scale. Any device failure aborts bring-up.
    pub fn new(
        settings: MotorMechanismSettings,
        backend: &mut B,
    ) -> Result<Self, MechanismError> {
        let mut motors = Vec::with_capacity(settings.motors.len());
        let mut motor_configs = Vec::with_capacity(settings.motors.len());

        for motor_settings in &settings.motors {
            let id = motor_settings.id;
            let mut motor = backend
                .open_motor(id)
                .map_err(|source| MechanismError::MotorInit { id, source })?;

            // The device may already hold non-default state; start from what
            // it reports, not from defaults.
            let mut config = motor
                .refresh_output_config()
                .map_err(|source| MechanismError::MotorInit { id, source })?;
            config.polarity = if motor_settings.inverted {
                Polarity::ClockwisePositive
            } else {
                Polarity::CounterClockwisePositive
            };
            motor
                .apply_output_config(&config)
                .map_err(|source| MechanismError::ConfigWrite { id, source })?;

            info!(
                mechanism = %settings.base.name,
                id,
                inverted = motor_settings.inverted,
                "motor controller attached"
            );
            motors.push(motor);
            motor_configs.push(config);
        }

        let quad = &settings.quad_encoder;
        let mut quad_encoder = backend
            .open_quadrature_encoder(quad.channel_a, quad.channel_b, quad.inverted)
            .map_err(|source| MechanismError::QuadEncoderInit {
                channel_a: quad.channel_a,
                channel_b: quad.channel_b,
                source,
            })?;
        quad_encoder
            .set_distance_per_pulse(quad.distance_per_pulse)
            .map_err(|source| MechanismError::QuadEncoderInit {
                channel_a: quad.channel_a,
                channel_b: quad.channel_b,
                source,
            })?;

        let abs_encoder = backend
            .open_absolute_encoder(settings.abs_encoder.channel)
            .map_err(|source| MechanismError::AbsEncoderInit {
                channel: settings.abs_encoder.channel,
                source,
            })?;

        info!(mechanism = %settings.base.name, "encoders attached");

        Ok(Self {
            settings,
            motors,
            motor_configs,
            quad_encoder,
            abs_encoder,
        })
    }

    /// Enable or disable brake mode on every motor.
    ///
    /// Writes the configuration only to motors whose cached snapshot holds a
    /// different neutral mode, so repeating a call performs no device
    /// writes. The snapshot is updated after the write succeeds.
    pub fn set_brake_mode(&mut self, enabled: bool) -> Result<(), MechanismError> {
        let mode = if enabled {
            NeutralMode::Brake
        } else {
            NeutralMode::Coast
        };

        for (index, motor) in self.motors.iter_mut().enumerate() {
            if self.motor_configs[index].neutral_mode == mode {
                continue;
            }
            let mut config = self.motor_configs[index];
            config.neutral_mode = mode;
            motor
                .apply_output_config(&config)
                .map_err(|source| MechanismError::ConfigWrite {
                    id: self.settings.motors[index].id,
                    source,
                })?;
            self.motor_configs[index] = config;
        }
        Ok(())
    }

    /// Settings the mechanism was constructed from.
    pub fn settings(&self) -> &MotorMechanismSettings {
        &self.settings
    }
}

impl<B: HardwareBackend> MechanismControl for MotorMechanism<B> {
    fn position(&self) -> f64 {
        let raw = match self.abs_encoder.fraction() {
            Ok(fraction) => fraction * 360.0,
            Err(error) => {
                warn!(%error, "absolute encoder read failed");
                return 0.0;
            }
        };

        let abs = &self.settings.abs_encoder;
        if abs.inverted {
            abs.zero_offset - raw
        } else {
            raw - abs.zero_offset
        }
    }

    fn rate(&self) -> f64 {
        match self.quad_encoder.rate() {
            Ok(rate) => rate,
            Err(error) => {
                warn!(%error, "quadrature encoder read failed");
                0.0
            }
        }
    }

    fn motor_voltage(&self, index: usize) -> f64 {
        let Some(motor) = self.motors.get(index) else {
            warn!(index, count = self.motors.len(), "motor voltage index out of range");
            return 0.0;
        };
        match motor.motor_voltage() {
            Ok(volts) => volts,
            Err(error) => {
                warn!(index, %error, "motor voltage read failed");
                0.0
            }
        }
    }

    fn motor_current(&self, index: usize) -> f64 {
        let Some(motor) = self.motors.get(index) else {
            warn!(index, count = self.motors.len(), "motor current index out of range");
            return 0.0;
        };
        match motor.torque_current() {
            Ok(amps) => amps,
            Err(error) => {
                warn!(index, %error, "motor current read failed");
                0.0
            }
        }
    }

    fn set_motor_voltage(&mut self, volts: f64) {
        for (index, motor) in self.motors.iter_mut().enumerate() {
            if let Err(error) = motor.set_voltage(volts) {
                warn!(index, %error, "voltage command failed");
            }
        }
    }

    fn motor_count(&self) -> usize {
        self.motors.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{
        AbsEncoderSettings, Limits, MechanismSettings, MotorSettings, PositionControlSettings,
        QuadEncoderSettings, StageSettings,
    };
    use strix_hal::devices::sim::SimBackend;

    const EPSILON: f64 = 1e-9;

    fn shoulder_settings(motors: Vec<MotorSettings>) -> MotorMechanismSettings {
        MotorMechanismSettings {
            base: MechanismSettings {
                name: "shoulder".into(),
                dashboard_tab: "Shoulder".into(),
                position_control: PositionControlSettings {
                    kp: 0.02,
                    ki: 0.0,
                    kd: 0.001,
                    max_velocity: 180.0,
                    max_accel: 360.0,
                },
                stages: vec![StageSettings {
                    range: Limits {
                        min: -10.0,
                        max: 95.0,
                    },
                    max_velocity: 90.0,
                }],
                default_tolerance: Limits { min: -1.5, max: 1.5 },
            },
            motors,
            quad_encoder: QuadEncoderSettings {
                channel_a: 0,
                channel_b: 1,
                inverted: false,
                distance_per_pulse: 0.018,
            },
            abs_encoder: AbsEncoderSettings {
                channel: 2,
                inverted: false,
                zero_offset: 10.0,
            },
        }
    }

    fn motor(id: u32, inverted: bool) -> MotorSettings {
        MotorSettings { id, inverted }
    }

    #[test]
    fn test_construction_overrides_only_polarity() {
        let mut backend = SimBackend::new();
        let seeded = MotorOutputConfig {
            polarity: Polarity::CounterClockwisePositive,
            neutral_mode: NeutralMode::Brake,
            neutral_deadband: 0.04,
            peak_forward_duty: 0.8,
            peak_reverse_duty: -0.6,
        };
        backend.seed_motor_config(11, seeded);
        backend.seed_motor_config(12, seeded);

        let settings = shoulder_settings(vec![motor(11, true), motor(12, false)]);
        let mechanism = MotorMechanism::new(settings, &mut backend).unwrap();
        assert_eq!(mechanism.motor_count(), 2);

        let config_11 = backend.motor_output_config(11).unwrap();
        let config_12 = backend.motor_output_config(12).unwrap();
        assert_eq!(config_11.polarity, Polarity::ClockwisePositive);
        assert_eq!(config_12.polarity, Polarity::CounterClockwisePositive);

        // Everything except polarity keeps the pre-existing device state.
        for config in [config_11, config_12] {
            assert_eq!(config.neutral_mode, NeutralMode::Brake);
            assert_eq!(config.neutral_deadband, 0.04);
            assert_eq!(config.peak_forward_duty, 0.8);
            assert_eq!(config.peak_reverse_duty, -0.6);
        }
    }

    #[test]
    fn test_construction_sets_distance_per_pulse() {
        let mut backend = SimBackend::new();
        let settings = shoulder_settings(vec![motor(11, false)]);
        let _mechanism = MotorMechanism::new(settings, &mut backend).unwrap();
        assert_eq!(backend.quad_distance_per_pulse(), Some(0.018));
    }

    #[test]
    fn test_duplicate_motor_id_fails_construction() {
        let mut backend = SimBackend::new();
        let settings = shoulder_settings(vec![motor(11, false), motor(11, true)]);
        let result = MotorMechanism::new(settings, &mut backend);
        assert!(matches!(
            result,
            Err(MechanismError::MotorInit { id: 11, .. })
        ));
    }

    #[test]
    fn test_position_applies_offset() {
        let mut backend = SimBackend::new();
        let settings = shoulder_settings(vec![motor(11, false)]);
        let mechanism = MotorMechanism::new(settings, &mut backend).unwrap();

        // 0.25 of a rotation is 90 degrees; zero offset is 10.
        backend.set_abs_fraction(0.25);
        assert!((mechanism.position() - 80.0).abs() < EPSILON);
    }

    #[test]
    fn test_position_applies_offset_inverted() {
        let mut backend = SimBackend::new();
        let mut settings = shoulder_settings(vec![motor(11, false)]);
        settings.abs_encoder.inverted = true;
        let mechanism = MotorMechanism::new(settings, &mut backend).unwrap();

        backend.set_abs_fraction(0.25);
        assert!((mechanism.position() + 80.0).abs() < EPSILON);
    }

    #[test]
    fn test_rate_is_passed_through() {
        let mut backend = SimBackend::new();
        let settings = shoulder_settings(vec![motor(11, false)]);
        let mechanism = MotorMechanism::new(settings, &mut backend).unwrap();

        backend.set_quad_rate(42.5);
        assert!((mechanism.rate() - 42.5).abs() < EPSILON);
    }

    #[test]
    fn test_motor_telemetry_passthrough_and_upper_bound() {
        let mut backend = SimBackend::new();
        let settings = shoulder_settings(vec![motor(11, false), motor(12, true)]);
        let mechanism = MotorMechanism::new(settings, &mut backend).unwrap();

        backend.set_motor_telemetry(11, 6.25, 14.0);
        backend.set_motor_telemetry(12, -3.5, -8.0);

        assert_eq!(mechanism.motor_voltage(0), 6.25);
        assert_eq!(mechanism.motor_current(0), 14.0);
        assert_eq!(mechanism.motor_voltage(1), -3.5);
        assert_eq!(mechanism.motor_current(1), -8.0);

        // One past the end reads as zero.
        assert_eq!(mechanism.motor_voltage(2), 0.0);
        assert_eq!(mechanism.motor_current(2), 0.0);
    }

    #[test]
    fn test_brake_mode_writes_at_most_once_per_transition() {
        let mut backend = SimBackend::new();
        let settings = shoulder_settings(vec![motor(11, false), motor(12, false)]);
        let mut mechanism = MotorMechanism::new(settings, &mut backend).unwrap();

        // One configuration write per motor from construction.
        assert_eq!(backend.motor_config_applies(11), Some(1));
        assert_eq!(backend.motor_config_applies(12), Some(1));

        mechanism.set_brake_mode(true).unwrap();
        assert_eq!(backend.motor_config_applies(11), Some(2));
        assert_eq!(
            backend.motor_output_config(11).unwrap().neutral_mode,
            NeutralMode::Brake
        );

        // Same mode again: the cached snapshot suppresses the write.
        mechanism.set_brake_mode(true).unwrap();
        assert_eq!(backend.motor_config_applies(11), Some(2));
        assert_eq!(backend.motor_config_applies(12), Some(2));

        mechanism.set_brake_mode(false).unwrap();
        assert_eq!(backend.motor_config_applies(11), Some(3));
        assert_eq!(
            backend.motor_output_config(11).unwrap().neutral_mode,
            NeutralMode::Coast
        );
    }

    #[test]
    fn test_set_motor_voltage_reaches_all_motors() {
        let mut backend = SimBackend::new();
        let settings = shoulder_settings(vec![motor(11, false)]);
        let mut mechanism = MotorMechanism::new(settings, &mut backend).unwrap();
        mechanism.set_motor_voltage(4.2);
        assert_eq!(backend.motor_commanded_voltage(11), Some(4.2));

        let mut backend = SimBackend::new();
        let settings = shoulder_settings(vec![motor(21, false), motor(22, true), motor(23, false)]);
        let mut mechanism = MotorMechanism::new(settings, &mut backend).unwrap();
        mechanism.set_motor_voltage(-7.5);
        for id in [21, 22, 23] {
            assert_eq!(backend.motor_commanded_voltage(id), Some(-7.5));
        }
    }

    #[test]
    fn test_faulted_telemetry_reads_zero() {
        let mut backend = SimBackend::new();
        let settings = shoulder_settings(vec![motor(11, false)]);
        let mechanism = MotorMechanism::new(settings, &mut backend).unwrap();

        backend.set_motor_telemetry(11, 6.0, 12.0);
        backend.set_motor_telemetry_fault(11, true);
        assert_eq!(mechanism.motor_voltage(0), 0.0);
        assert_eq!(mechanism.motor_current(0), 0.0);

        backend.set_motor_telemetry_fault(11, false);
        assert_eq!(mechanism.motor_voltage(0), 6.0);
    }
}
