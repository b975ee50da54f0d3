#![cfg_attr(not(test), no_std)]

//! mpu6500_flight - MPU-6500 gyro/accelerometer driver for flight controllers
//!
//! This library provides the platform abstraction the driver is written
//! against, the sensor registry and sample queues, and the interrupt-driven
//! MPU-6500 SPI driver itself.

// The mock platform records transactions in heap-backed logs
#[cfg(all(not(test), feature = "mock"))]
extern crate std;

// Platform abstraction layer (SPI bus, EXTI line, watchdog)
pub mod platform;

// Device drivers using platform abstraction
pub mod devices;

// Core infrastructure (logging, shared state)
pub mod core;
