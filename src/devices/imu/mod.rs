//! IMU Drivers
//!
//! ## Available Drivers
//!
//! - `mpu6500`: MPU-6500 6-axis IMU over shared SPI, interrupt driven

pub mod mpu6500;

pub use mpu6500::Mpu6500;
