//! Device drivers
//!
//! Drivers are written against the platform abstraction traits so they can
//! run on any board and against the mock platform in tests.
//!
//! ## Modules
//!
//! - `imu`: IMU sensor drivers (MPU-6500)
//! - `sensors`: Sensor registry and bounded sample queues
//! - `traits`: Sample value types shared by drivers and consumers

pub mod imu;
pub mod sensors;
pub mod traits;
