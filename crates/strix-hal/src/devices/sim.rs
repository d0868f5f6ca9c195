use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use tracing::debug;

use crate::error::HalError;
use crate::traits::backend::HardwareBackend;
use crate::traits::encoder::{AbsoluteEncoder, QuadratureEncoder};
use crate::traits::motor::{MotorController, MotorOutputConfig};

/// How fast the simulated mechanism moves per volt of mean command.
const DEGREES_PER_SECOND_PER_VOLT: f64 = 30.0;
/// Torque current drawn per volt of command in the simulated motor model.
const AMPS_PER_VOLT: f64 = 2.5;

/// Mechanism state shared by every simulated sensor.
#[derive(Debug, Default)]
struct Plant {
    /// Absolute position in degrees, wrapped to `[0, 360)`.
    position_degrees: f64,
    /// Rate at the quadrature encoder, distance units per second.
    rate: f64,
}

#[derive(Debug)]
struct MotorShared {
    config: MotorOutputConfig,
    commanded_voltage: f64,
    telemetry_voltage: f64,
    telemetry_current: f64,
    config_applies: usize,
    telemetry_fault: bool,
}

impl MotorShared {
    fn new(config: MotorOutputConfig) -> Self {
        Self {
            config,
            commanded_voltage: 0.0,
            telemetry_voltage: 0.0,
            telemetry_current: 0.0,
            config_applies: 0,
            telemetry_fault: false,
        }
    }
}

#[derive(Debug)]
struct QuadShared {
    inverted: bool,
    distance_per_pulse: f64,
}

/// Handle to one simulated motor controller.
pub struct SimMotorController {
    id: u32,
    shared: Rc<RefCell<MotorShared>>,
}

impl MotorController for SimMotorController {
    fn refresh_output_config(&mut self) -> Result<MotorOutputConfig, HalError> {
        Ok(self.shared.borrow().config)
    }

    fn apply_output_config(&mut self, config: &MotorOutputConfig) -> Result<(), HalError> {
        let mut shared = self.shared.borrow_mut();
        shared.config = *config;
        shared.config_applies += 1;
        Ok(())
    }

    fn motor_voltage(&self) -> Result<f64, HalError> {
        let shared = self.shared.borrow();
        if shared.telemetry_fault {
            return Err(HalError::Read(format!("motor {}: telemetry timed out", self.id)));
        }
        Ok(shared.telemetry_voltage)
    }

    fn torque_current(&self) -> Result<f64, HalError> {
        let shared = self.shared.borrow();
        if shared.telemetry_fault {
            return Err(HalError::Read(format!("motor {}: telemetry timed out", self.id)));
        }
        Ok(shared.telemetry_current)
    }

    fn set_voltage(&mut self, volts: f64) -> Result<(), HalError> {
        let mut shared = self.shared.borrow_mut();
        shared.commanded_voltage = volts;
        shared.telemetry_voltage = volts;
        shared.telemetry_current = volts * AMPS_PER_VOLT;
        Ok(())
    }
}

/// Handle to one simulated quadrature encoder.
pub struct SimQuadEncoder {
    shared: Rc<RefCell<QuadShared>>,
    plant: Rc<RefCell<Plant>>,
}

impl QuadratureEncoder for SimQuadEncoder {
    fn set_distance_per_pulse(&mut self, distance_per_pulse: f64) -> Result<(), HalError> {
        self.shared.borrow_mut().distance_per_pulse = distance_per_pulse;
        Ok(())
    }

    fn rate(&self) -> Result<f64, HalError> {
        let rate = self.plant.borrow().rate;
        Ok(if self.shared.borrow().inverted {
            -rate
        } else {
            rate
        })
    }
}

/// Handle to one simulated absolute encoder.
pub struct SimAbsEncoder {
    plant: Rc<RefCell<Plant>>,
}

impl AbsoluteEncoder for SimAbsEncoder {
    fn fraction(&self) -> Result<f64, HalError> {
        Ok(self.plant.borrow().position_degrees / 360.0)
    }
}

/// Simulated hardware backend.
///
/// All handles share one plant through `Rc<RefCell<..>>`, which is sound
/// because exactly one thread owns the backend and every handle opened from
/// it. The backend keeps a reference to every opened device, so the plant can
/// be stepped and device state inspected after the handles are handed off.
#[derive(Default)]
pub struct SimBackend {
    plant: Rc<RefCell<Plant>>,
    motors: HashMap<u32, Rc<RefCell<MotorShared>>>,
    seeded_configs: HashMap<u32, MotorOutputConfig>,
    claimed_channels: HashSet<u32>,
    quad: Option<Rc<RefCell<QuadShared>>>,
}

impl SimBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the configuration a motor controller reports before bring-up
    /// touches it, as a device freshly powered from flash would.
    pub fn seed_motor_config(&mut self, id: u32, config: MotorOutputConfig) {
        self.seeded_configs.insert(id, config);
    }

    /// Advance the plant by `dt` seconds using the mean commanded voltage
    /// across every opened motor.
    pub fn step(&self, dt: f64) {
        if self.motors.is_empty() {
            return;
        }
        let sum: f64 = self
            .motors
            .values()
            .map(|motor| motor.borrow().commanded_voltage)
            .sum();
        let velocity = sum / self.motors.len() as f64 * DEGREES_PER_SECOND_PER_VOLT;
        let mut plant = self.plant.borrow_mut();
        plant.rate = velocity;
        plant.position_degrees = (plant.position_degrees + velocity * dt).rem_euclid(360.0);
    }

    /// Place the absolute encoder at `fraction` of a full rotation.
    pub fn set_abs_fraction(&self, fraction: f64) {
        self.plant.borrow_mut().position_degrees = fraction.rem_euclid(1.0) * 360.0;
    }

    /// Drive the quadrature rate directly, bypassing the plant model.
    pub fn set_quad_rate(&self, rate: f64) {
        self.plant.borrow_mut().rate = rate;
    }

    /// Override the telemetry a motor reports, independent of any command.
    pub fn set_motor_telemetry(&self, id: u32, volts: f64, amps: f64) {
        if let Some(shared) = self.motors.get(&id) {
            let mut shared = shared.borrow_mut();
            shared.telemetry_voltage = volts;
            shared.telemetry_current = amps;
        }
    }

    /// Fail (or restore) a motor's telemetry channel.
    pub fn set_motor_telemetry_fault(&self, id: u32, faulted: bool) {
        if let Some(shared) = self.motors.get(&id) {
            shared.borrow_mut().telemetry_fault = faulted;
        }
    }

    /// Output configuration currently held by an opened motor.
    pub fn motor_output_config(&self, id: u32) -> Option<MotorOutputConfig> {
        self.motors.get(&id).map(|shared| shared.borrow().config)
    }

    /// Last voltage commanded to an opened motor.
    pub fn motor_commanded_voltage(&self, id: u32) -> Option<f64> {
        self.motors
            .get(&id)
            .map(|shared| shared.borrow().commanded_voltage)
    }

    /// How many configuration writes an opened motor has received.
    pub fn motor_config_applies(&self, id: u32) -> Option<usize> {
        self.motors
            .get(&id)
            .map(|shared| shared.borrow().config_applies)
    }

    /// Distance-per-pulse scale configured on the quadrature encoder.
    pub fn quad_distance_per_pulse(&self) -> Option<f64> {
        self.quad
            .as_ref()
            .map(|shared| shared.borrow().distance_per_pulse)
    }
}

impl HardwareBackend for SimBackend {
    type Motor = SimMotorController;
    type QuadEncoder = SimQuadEncoder;
    type AbsEncoder = SimAbsEncoder;

    fn open_motor(&mut self, id: u32) -> Result<SimMotorController, HalError> {
        if self.motors.contains_key(&id) {
            return Err(HalError::MotorOpen {
                id,
                reason: "device already claimed".into(),
            });
        }
        let config = self.seeded_configs.get(&id).copied().unwrap_or_default();
        let shared = Rc::new(RefCell::new(MotorShared::new(config)));
        self.motors.insert(id, Rc::clone(&shared));
        debug!(id, "sim motor controller opened");
        Ok(SimMotorController { id, shared })
    }

    fn open_quadrature_encoder(
        &mut self,
        channel_a: u32,
        channel_b: u32,
        inverted: bool,
    ) -> Result<SimQuadEncoder, HalError> {
        for channel in [channel_a, channel_b] {
            if !self.claimed_channels.insert(channel) {
                return Err(HalError::QuadEncoderOpen {
                    channel_a,
                    channel_b,
                    reason: format!("digital channel {channel} already claimed"),
                });
            }
        }
        let shared = Rc::new(RefCell::new(QuadShared {
            inverted,
            distance_per_pulse: 1.0,
        }));
        self.quad = Some(Rc::clone(&shared));
        debug!(channel_a, channel_b, inverted, "sim quadrature encoder opened");
        Ok(SimQuadEncoder {
            shared,
            plant: Rc::clone(&self.plant),
        })
    }

    fn open_absolute_encoder(&mut self, channel: u32) -> Result<SimAbsEncoder, HalError> {
        if !self.claimed_channels.insert(channel) {
            return Err(HalError::AbsEncoderOpen {
                channel,
                reason: format!("digital channel {channel} already claimed"),
            });
        }
        debug!(channel, "sim absolute encoder opened");
        Ok(SimAbsEncoder {
            plant: Rc::clone(&self.plant),
        })
    }
}
