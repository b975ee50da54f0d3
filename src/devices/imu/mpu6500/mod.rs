//! MPU-6500 6-Axis IMU Driver
//!
//! Interrupt-driven SPI driver for the TDK InvenSense MPU-6500 on a bus shared
//! with other peripherals.
//!
//! ## Features
//!
//! - 3-axis gyroscope: ±250, ±500, ±1000, ±2000 °/s
//! - 3-axis accelerometer (optional): ±2, ±4, ±8, ±16 g
//! - Configuration at 100kHz SPI, data bursts at 3MHz
//! - One burst read per data-ready interrupt, samples rotated into the body
//!   frame and pushed to bounded queues
//!
//! ## Usage
//!
//! ```ignore
//! use mpu6500_flight::devices::imu::mpu6500::{BoardConfig, Mpu6500, OutputQueues};
//!
//! let dev = Mpu6500::new(&spi, SPI_BUS, CS_IMU, &BOARD, queues, &registry);
//! dev.init(&mut delay, &mut watchdog, &mut exti)?;
//!
//! // From the EXTI handler
//! let yield_now = dev.on_data_ready();
//! ```

mod acquisition;
mod bus;
mod config;
mod driver;
mod error;
mod math;
mod protocol;
mod registers;
mod sequencer;

pub use acquisition::{convert, irq_handler};
pub use bus::{BusContext, BusGuard, Interrupt, SpiDeviceBus, Task};
pub use config::{
    AccelRange, BoardConfig, ClockSource, GyroRange, InterruptEnable, InterruptPinConfig,
    LowPassFilter, Orientation, UserControl,
};
pub use driver::{validate, Mpu6500, OutputQueues, DEVICE_MAGIC};
pub use error::{DriverError, HandleError};
pub use math::{
    accel_scale, effective_sample_rate, gyro_scale, remap, sample_rate_divisor,
    temperature_celsius, to_body_frame,
};
pub use protocol::{read_address, write_address, BurstLayout, RawBurst, MAX_BURST_LEN};
pub use sequencer::ConfigState;
