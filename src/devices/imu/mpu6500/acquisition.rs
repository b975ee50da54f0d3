//! Data-ready interrupt handling
//!
//! Runs in interrupt context: no delays, no logging, no retries. A cycle that
//! cannot get the bus or whose burst fails is dropped and reported as no work.

use super::config::Orientation;
use super::driver::Mpu6500;
use super::math;
use super::protocol::{BurstLayout, RawBurst};
use crate::devices::traits::{AccelSample, GyroSample};
use crate::platform::SpiTransport;
use nalgebra::Vector3;

impl<T: SpiTransport> Mpu6500<'_, '_, T> {
    /// Service one data-ready interrupt
    ///
    /// Reads one burst, converts it to body-frame physical units and pushes
    /// accel (if enabled) then gyro into their queues. Returns `true` when a
    /// higher-priority task became runnable and the caller should yield.
    ///
    /// Does nothing, without touching the bus, unless the instance is valid
    /// and configured.
    pub fn on_data_ready(&self) -> bool {
        if self.validate().is_err() || !self.is_configured() {
            return false;
        }

        let layout = if self.has_accel() {
            BurstLayout::AccelTempGyro
        } else {
            BurstLayout::TempGyro
        };

        let Ok(mut guard) = self.bus.claim_from_isr() else {
            return false;
        };
        let claim_woken = guard.woken();
        let frame = guard.burst_read(layout);
        let release_woken = guard.release().unwrap_or(false);

        let Some(raw) = frame.ok().and_then(|frame| RawBurst::decode(layout, &frame)) else {
            return false;
        };

        let gyro_scale = math::gyro_scale_for_register(self.gyro_range_register());
        let accel_scale = self
            .accel_range_register()
            .map(math::accel_scale_for_register);
        let (gyro, accel) = convert(&raw, self.orientation(), gyro_scale, accel_scale);

        let mut woken = claim_woken || release_woken;
        if let (Some(sample), Some(channel)) = (accel, &self.accel) {
            woken |= channel.queue.send_from_isr(sample).woken();
        }
        woken |= self.gyro_queue.send_from_isr(gyro).woken();
        woken
    }
}

/// Interrupt entry for a board-held device handle
///
/// A missing handle is treated like an invalid one: no work done.
pub fn irq_handler<T: SpiTransport>(device: Option<&Mpu6500<'_, '_, T>>) -> bool {
    device.is_some_and(|device| device.on_data_ready())
}

/// Turn a raw burst into body-frame samples
///
/// Accel and gyro go through the same orientation remap. The accel sample is
/// produced only when the burst carries accel data and a scale is given.
pub fn convert(
    raw: &RawBurst,
    orientation: Orientation,
    gyro_scale: f32,
    accel_scale: Option<f32>,
) -> (GyroSample, Option<AccelSample>) {
    let temperature = math::temperature_celsius(raw.temperature);

    let gyro = GyroSample {
        rate: scaled(math::to_body_frame(orientation, raw.gyro), gyro_scale),
        temperature,
    };

    let accel = raw.accel.zip(accel_scale).map(|(axes, scale)| AccelSample {
        accel: scaled(math::to_body_frame(orientation, axes), scale),
        temperature,
    });

    (gyro, accel)
}

fn scaled(body: [i32; 3], scale: f32) -> Vector3<f32> {
    Vector3::new(
        body[0] as f32 * scale,
        body[1] as f32 * scale,
        body[2] as f32 * scale,
    )
}
