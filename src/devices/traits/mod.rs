//! Device traits and sample types
//!
//! Hardware-independent types shared between the driver and its consumers.

pub mod imu;

pub use imu::{AccelSample, GyroSample};
