//! MPU-6500 device instance
//!
//! One [`Mpu6500`] exists per physical sensor. It is shared by reference
//! between task context (bring-up, range and filter changes, self-test) and
//! the data-ready interrupt. Cached configuration lives in atomics: task
//! context is the only writer, the interrupt handler only reads, so plain
//! loads and stores are enough on every target.

use super::bus::SpiDeviceBus;
use super::config::{AccelRange, BoardConfig, GyroRange, LowPassFilter, Orientation};
use super::error::{DriverError, HandleError};
use super::math;
use super::registers;
use super::sequencer::{ConfigSequencer, ConfigState};
use crate::devices::sensors::{QueueHandle, SensorKind, SensorQueue, SensorRegistry};
use crate::devices::traits::{AccelSample, GyroSample};
use crate::platform::{ExtiLine, SpiTransport, Watchdog};
use core::sync::atomic::{AtomicU16, AtomicU8, Ordering};
use embedded_hal::delay::DelayNs;

/// Tag stamped on every live instance
pub const DEVICE_MAGIC: u32 = 0x9DA9_BCCC;

/// Output queues handed to the driver at construction
///
/// `accel: None` builds a gyro-only driver: the burst shrinks to
/// temperature + gyro and the accel range is never programmed.
#[derive(Clone, Copy)]
pub struct OutputQueues<'q> {
    /// Gyro sample queue
    pub gyro: &'q SensorQueue<GyroSample>,
    /// Accel sample queue, if accel output is enabled
    pub accel: Option<&'q SensorQueue<AccelSample>>,
}

/// Accel capability: its queue plus the cached ACCEL_CONFIG value
pub(super) struct AccelChannel<'q> {
    pub(super) queue: &'q SensorQueue<AccelSample>,
    range: AtomicU8,
}

/// MPU-6500 driver over a shared SPI bus
pub struct Mpu6500<'a, 'q, T: SpiTransport> {
    magic: u32,
    pub(super) bus: SpiDeviceBus<'a, T>,
    pub(super) board: &'a BoardConfig,
    registry: &'a SensorRegistry<'q>,
    pub(super) gyro_queue: &'q SensorQueue<GyroSample>,
    pub(super) accel: Option<AccelChannel<'q>>,

    /// Last GYRO_CONFIG value written
    gyro_range: AtomicU8,
    /// Last CONFIG (DLPF) value written
    filter: AtomicU8,
    /// Last requested output rate, 0 until one is set
    sample_rate_hz: AtomicU16,
    state: AtomicU8,
}

impl<'a, 'q, T: SpiTransport> Mpu6500<'a, 'q, T> {
    /// Create an unconfigured instance bound to `chip_select` on bus `bus_id`
    ///
    /// Nothing is sent to the device until [`Mpu6500::init`]. Cached settings
    /// start at the power-on register values (all zero).
    pub fn new(
        transport: &'a T,
        bus_id: u32,
        chip_select: u32,
        board: &'a BoardConfig,
        queues: OutputQueues<'q>,
        registry: &'a SensorRegistry<'q>,
    ) -> Self {
        Self {
            magic: DEVICE_MAGIC,
            bus: SpiDeviceBus::new(transport, bus_id, chip_select),
            board,
            registry,
            gyro_queue: queues.gyro,
            accel: queues.accel.map(|queue| AccelChannel {
                queue,
                range: AtomicU8::new(0),
            }),
            gyro_range: AtomicU8::new(0),
            filter: AtomicU8::new(0),
            sample_rate_hz: AtomicU16::new(0),
            state: AtomicU8::new(ConfigState::Unconfigured as u8),
        }
    }

    /// Bring the sensor up
    ///
    /// Runs the configuration sequence at the slow SPI clock, switches the bus
    /// to the run clock, arms the data-ready line and registers the output
    /// queues (accel first, then gyro). Calling it again re-runs the whole
    /// bring-up; queues this device already registered are accepted as is.
    ///
    /// # Errors
    ///
    /// Any failure leaves the device unconfigured, with no queue of its own
    /// newly registered; the interrupt handler stays inert until a later
    /// `init` succeeds.
    pub fn init(
        &self,
        delay: &mut impl DelayNs,
        watchdog: &mut impl Watchdog,
        exti: &mut impl ExtiLine,
    ) -> Result<(), DriverError> {
        self.validate()?;

        crate::log_info!(
            "MPU-6500 init: bus {}, cs {}",
            self.bus.bus_id(),
            self.bus.slave()
        );

        self.bus.set_clock_speed(self.board.config_clock_hz)?;
        let configured = ConfigSequencer::new(self).run(delay, watchdog);
        let restored = self.bus.set_clock_speed(self.board.run_clock_hz);

        let result = configured
            .and(restored)
            .and_then(|()| {
                exti.init(self.board.exti_line)?;
                self.register_queues()
            });

        match result {
            Ok(()) => crate::log_info!("MPU-6500 ready (accel: {})", self.has_accel()),
            Err(e) => {
                crate::log_error!("MPU-6500 init failed: {}", e);
                self.enter(ConfigState::Unconfigured);
            }
        }
        result
    }

    /// Register accel then gyro, rolling back the accel entry if gyro is refused
    fn register_queues(&self) -> Result<(), DriverError> {
        let accel_was_registered = self.registry.is_registered(SensorKind::Accel);

        if let Some(accel) = &self.accel {
            self.registry
                .register(SensorKind::Accel, QueueHandle::Accel(accel.queue))?;
        }

        let gyro = self
            .registry
            .register(SensorKind::Gyro, QueueHandle::Gyro(self.gyro_queue));
        if gyro.is_err() && self.has_accel() && !accel_was_registered {
            self.registry.unregister(SensorKind::Accel);
        }
        gyro.map_err(DriverError::from)
    }

    /// Check the instance before touching hardware
    ///
    /// # Errors
    ///
    /// `HandleInvalid(BadTag)` for a corrupted instance,
    /// `HandleInvalid(UnboundBus)` when no bus is bound.
    pub fn validate(&self) -> Result<(), DriverError> {
        if self.magic != DEVICE_MAGIC {
            return Err(DriverError::HandleInvalid(HandleError::BadTag));
        }
        if self.bus.bus_id() == 0 {
            return Err(DriverError::HandleInvalid(HandleError::UnboundBus));
        }
        Ok(())
    }

    /// Program the gyro full scale and publish it to the sensor registry
    pub fn set_gyro_range(&self, range: GyroRange) -> Result<(), DriverError> {
        self.validate()?;
        self.program_gyro_range(range)?;
        crate::log_info!("MPU-6500 gyro range: {} dps", range.max_dps());
        Ok(())
    }

    /// Program the accel full scale
    ///
    /// # Errors
    ///
    /// `InvalidArgument` on a gyro-only instance.
    pub fn set_accel_range(&self, range: AccelRange) -> Result<(), DriverError> {
        self.validate()?;
        self.program_accel_range(range)?;
        crate::log_info!("MPU-6500 accel range: {:?}", range);
        Ok(())
    }

    /// Program the low pass filter
    ///
    /// The sample-rate divisor depends on the filter clock, so a previously
    /// requested rate is reprogrammed against the new filter.
    pub fn set_filter(&self, filter: LowPassFilter) -> Result<(), DriverError> {
        self.validate()?;
        let filtered = self.program_filter(filter);
        if !landed(&filtered) {
            return filtered;
        }
        if let Some(hz) = self.sample_rate_hz() {
            self.program_sample_rate(hz)?;
        }
        filtered?;
        crate::log_info!("MPU-6500 filter: {:?}", filter);
        Ok(())
    }

    /// Program the output data rate in Hz
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for 0 Hz.
    pub fn set_sample_rate(&self, hz: u16) -> Result<(), DriverError> {
        self.validate()?;
        self.program_sample_rate(hz)?;
        crate::log_info!("MPU-6500 sample rate: {} Hz", hz);
        Ok(())
    }

    /// Read WHO_AM_I and compare it with the MPU-6500 identity
    ///
    /// # Errors
    ///
    /// Bus errors pass through unchanged; a readable but wrong identity is
    /// `IdentityMismatch`.
    pub fn self_test(&self) -> Result<(), DriverError> {
        self.validate()?;
        let found = self.bus.read_byte(registers::WHO_AM_I)?;
        if found != registers::MPU6500_WHO_AM_I_VALUE {
            crate::log_warn!(
                "MPU-6500 WHO_AM_I mismatch: expected {:#x}, got {:#x}",
                registers::MPU6500_WHO_AM_I_VALUE,
                found
            );
            return Err(DriverError::IdentityMismatch { found });
        }
        Ok(())
    }

    pub(super) fn program_gyro_range(&self, range: GyroRange) -> Result<(), DriverError> {
        let value = range.register_value();
        let written = self.bus.write_byte(registers::GYRO_CONFIG, value);
        if landed(&written) {
            self.gyro_range.store(value, Ordering::Release);
            self.registry.set_max_gyro(range.max_dps());
        }
        written
    }

    pub(super) fn program_accel_range(&self, range: AccelRange) -> Result<(), DriverError> {
        let accel = self.accel.as_ref().ok_or(DriverError::InvalidArgument)?;
        let value = range.register_value();
        let written = self.bus.write_byte(registers::ACCEL_CONFIG, value);
        if landed(&written) {
            accel.range.store(value, Ordering::Release);
        }
        written
    }

    pub(super) fn program_filter(&self, filter: LowPassFilter) -> Result<(), DriverError> {
        let value = filter.register_value();
        let written = self.bus.write_byte(registers::CONFIG, value);
        if landed(&written) {
            self.filter.store(value, Ordering::Release);
        }
        written
    }

    /// Divisor is computed against the cached filter, so the filter goes first
    pub(super) fn program_sample_rate(&self, hz: u16) -> Result<(), DriverError> {
        if hz == 0 {
            return Err(DriverError::InvalidArgument);
        }
        let divisor = math::sample_rate_divisor(self.filter(), hz);
        let written = self.bus.write_byte(registers::SMPLRT_DIV, divisor);
        if landed(&written) {
            self.sample_rate_hz.store(hz, Ordering::Release);
            crate::log_debug!(
                "MPU-6500 SMPLRT_DIV {} ({} Hz effective)",
                divisor,
                math::effective_sample_rate(self.filter(), divisor)
            );
        }
        written
    }

    pub(super) fn enter(&self, state: ConfigState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Configuration progress
    pub fn state(&self) -> ConfigState {
        ConfigState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Whether the full configuration sequence has completed
    pub fn is_configured(&self) -> bool {
        self.state() == ConfigState::Configured
    }

    /// Whether accel output is enabled
    pub fn has_accel(&self) -> bool {
        self.accel.is_some()
    }

    /// Active gyro range
    pub fn gyro_range(&self) -> GyroRange {
        GyroRange::from_register(self.gyro_range_register()).unwrap_or_default()
    }

    /// Active accel range, `None` on a gyro-only instance
    pub fn accel_range(&self) -> Option<AccelRange> {
        self.accel_range_register()
            .and_then(AccelRange::from_register)
    }

    /// Active low pass filter
    pub fn filter(&self) -> LowPassFilter {
        LowPassFilter::from_register(self.filter.load(Ordering::Acquire)).unwrap_or_default()
    }

    /// Last requested sample rate
    pub fn sample_rate_hz(&self) -> Option<u16> {
        match self.sample_rate_hz.load(Ordering::Acquire) {
            0 => None,
            hz => Some(hz),
        }
    }

    /// Mounting orientation from the board config
    pub fn orientation(&self) -> Orientation {
        self.board.orientation
    }

    /// Bus id this instance is bound to
    pub fn bus_id(&self) -> u32 {
        self.bus.bus_id()
    }

    pub(super) fn gyro_range_register(&self) -> u8 {
        self.gyro_range.load(Ordering::Acquire)
    }

    pub(super) fn accel_range_register(&self) -> Option<u8> {
        self.accel
            .as_ref()
            .map(|accel| accel.range.load(Ordering::Acquire))
    }

    #[cfg(test)]
    pub(super) fn set_tag(&mut self, tag: u32) {
        self.magic = tag;
    }
}

/// Whether a register write reached the device
///
/// A release failure is only reported once the value has been clocked out,
/// so the register already holds it and the cache must follow.
fn landed(written: &Result<(), DriverError>) -> bool {
    matches!(written, Ok(()) | Err(DriverError::ReleaseFailed))
}

/// Validate an optional device handle
///
/// # Errors
///
/// `HandleInvalid(Missing)` for `None`, otherwise as [`Mpu6500::validate`].
pub fn validate<T: SpiTransport>(device: Option<&Mpu6500<'_, '_, T>>) -> Result<(), DriverError> {
    device
        .ok_or(DriverError::HandleInvalid(HandleError::Missing))?
        .validate()
}
