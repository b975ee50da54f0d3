//! IMU sample types
//!
//! Value types produced once per data-ready interrupt and handed to
//! downstream consumers through the sensor queues.
//!
//! All vectors are in the vehicle body frame:
//! - X: forward
//! - Y: right
//! - Z: down

use nalgebra::Vector3;

/// Angular rate sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GyroSample {
    /// Angular rate: deg/s, body frame
    pub rate: Vector3<f32>,

    /// Die temperature: °C
    pub temperature: f32,
}

/// Specific force sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccelSample {
    /// Acceleration: m/s², body frame (includes gravity)
    pub accel: Vector3<f32>,

    /// Die temperature: °C
    pub temperature: f32,
}

impl Default for GyroSample {
    fn default() -> Self {
        Self {
            rate: Vector3::zeros(),
            temperature: 25.0,
        }
    }
}

impl Default for AccelSample {
    fn default() -> Self {
        Self {
            accel: Vector3::zeros(),
            temperature: 25.0,
        }
    }
}
