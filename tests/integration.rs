//! Bring-up to consumer: init, data-ready interrupt, dequeue

use core::cell::{Cell, RefCell};
use embedded_hal::delay::DelayNs;
use mpu6500_flight::devices::imu::mpu6500::{
    irq_handler, BoardConfig, ConfigState, DriverError, GyroRange, Mpu6500, Orientation,
    OutputQueues,
};
use mpu6500_flight::devices::sensors::{SensorKind, SensorQueue, SensorRegistry};
use mpu6500_flight::platform::{ExtiLine, PlatformError, Result, SpiError, SpiTransport, Watchdog};

/// Minimal MPU-6500 register file on a single-slave bus
struct FakeBus {
    regs: RefCell<[u8; 128]>,
    address: Cell<Option<u8>>,
    held: Cell<bool>,
}

impl FakeBus {
    fn new() -> Self {
        let bus = Self {
            regs: RefCell::new([0; 128]),
            address: Cell::new(None),
            held: Cell::new(false),
        };
        bus.regs.borrow_mut()[0x75] = 0x70;
        bus
    }

    fn load(&self, start: usize, bytes: &[u8]) {
        self.regs.borrow_mut()[start..start + bytes.len()].copy_from_slice(bytes);
    }
}

impl SpiTransport for FakeBus {
    fn claim_bus(&self, _bus: u32) -> Result<()> {
        if self.held.replace(true) {
            return Err(PlatformError::Spi(SpiError::BusBusy));
        }
        Ok(())
    }

    fn claim_bus_from_isr(&self, bus: u32) -> Result<bool> {
        self.claim_bus(bus).map(|_| false)
    }

    fn release_bus(&self, _bus: u32) -> Result<()> {
        self.held.set(false);
        Ok(())
    }

    fn release_bus_from_isr(&self, bus: u32) -> Result<bool> {
        self.release_bus(bus).map(|_| false)
    }

    fn set_chip_select(&self, _bus: u32, _slave: u32, level: bool) {
        if !level {
            self.address.set(None);
        }
    }

    fn transfer_byte(&self, _bus: u32, byte: u8) -> Result<u8> {
        match self.address.take() {
            None => {
                self.address.set(Some(byte));
                Ok(0)
            }
            Some(address) if address & 0x80 != 0 => Ok(self.regs.borrow()[usize::from(address & 0x7F)]),
            Some(address) => {
                // Reset bits self-clear
                let value = match address {
                    0x6B => byte & !0x80,
                    0x6A => byte & !0x07,
                    _ => byte,
                };
                self.regs.borrow_mut()[usize::from(address)] = value;
                Ok(0)
            }
        }
    }

    fn transfer_block(&self, _bus: u32, tx: &[u8], rx: &mut [u8]) -> Result<()> {
        let start = usize::from(tx[0] & 0x7F);
        let regs = self.regs.borrow();
        rx[0] = 0;
        for (i, slot) in rx.iter_mut().enumerate().skip(1) {
            *slot = regs[start + i - 1];
        }
        Ok(())
    }

    fn set_clock_speed(&self, _bus: u32, _hz: u32) -> Result<()> {
        Ok(())
    }
}

struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

struct NoWatchdog;

impl Watchdog for NoWatchdog {
    fn clear(&mut self) {}
}

struct Exti;

impl ExtiLine for Exti {
    fn init(&mut self, _line: u32) -> Result<()> {
        Ok(())
    }
}

/// accel (0, 0, 4096), temp 340, gyro (0, 655, 400)
const BURST: [u8; 14] = [
    0x00, 0x00, 0x00, 0x00, 0x10, 0x00, 0x01, 0x54, 0x00, 0x00, 0x02, 0x8F, 0x01, 0x90,
];

#[test]
fn test_init_interrupt_dequeue() {
    let gyro = SensorQueue::new();
    let accel = SensorQueue::new();
    let registry = SensorRegistry::new();
    let bus = FakeBus::new();
    let board = BoardConfig::default();
    let queues = OutputQueues {
        gyro: &gyro,
        accel: Some(&accel),
    };
    let dev = Mpu6500::new(&bus, 2, 1, &board, queues, &registry);

    // Interrupt before bring-up is ignored
    assert!(!irq_handler(Some(&dev)));

    dev.init(&mut NoDelay, &mut NoWatchdog, &mut Exti).unwrap();
    assert_eq!(dev.state(), ConfigState::Configured);
    assert_eq!(dev.self_test(), Ok(()));

    bus.load(0x3B, &BURST);
    assert!(irq_handler(Some(&dev)));

    // Consumers find the queues through the registry
    assert!(registry.is_registered(SensorKind::Accel));
    let gyro_queue = registry.gyro_queue().unwrap();
    let sample = embassy_futures::block_on(gyro_queue.receive());
    assert!((sample.rate.x - 10.0).abs() < 1e-4);
    assert!(sample.rate.y.abs() < 1e-4);
    assert!((sample.rate.z + 400.0 / 65.5).abs() < 1e-4);
    assert!((sample.temperature - (35.0 + 852.0 / 340.0)).abs() < 1e-4);

    let accel_sample = registry.accel_queue().unwrap().try_receive().unwrap();
    assert!((accel_sample.accel.z + 9.81).abs() < 1e-4);
}

#[test]
fn test_rotated_gyro_only_board() {
    let gyro = SensorQueue::new();
    let registry = SensorRegistry::new();
    let bus = FakeBus::new();
    let board = BoardConfig {
        orientation: Orientation::Top180Deg,
        ..BoardConfig::default()
    };
    let queues = OutputQueues { gyro: &gyro, accel: None };
    let dev = Mpu6500::new(&bus, 2, 1, &board, queues, &registry);

    dev.init(&mut NoDelay, &mut NoWatchdog, &mut Exti).unwrap();
    dev.set_gyro_range(GyroRange::Dps1000).unwrap();
    assert_eq!(registry.max_gyro(), 1000);
    assert!(!registry.is_registered(SensorKind::Accel));
    assert_eq!(
        dev.set_accel_range(Default::default()),
        Err(DriverError::InvalidArgument)
    );

    bus.load(0x3B, &BURST);
    irq_handler(Some(&dev));

    // Top180Deg: body (x, y) = (-sensor y, -sensor x)
    let sample = gyro.try_receive().unwrap();
    assert!((sample.rate.x + 655.0 / 32.8).abs() < 1e-4);
    assert!(sample.rate.y.abs() < 1e-4);
    assert!((sample.rate.z + 400.0 / 32.8).abs() < 1e-4);
}
