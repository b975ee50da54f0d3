//! Scale and orientation math
//!
//! Pure functions shared by the configuration and acquisition paths. Every
//! mapping is a complete match over its closed enumeration.

use super::config::{AccelRange, GyroRange, LowPassFilter, Orientation};
use super::registers;

/// Gyro scale in (°/s)/LSB for `range`
pub fn gyro_scale(range: GyroRange) -> f32 {
    match range {
        GyroRange::Dps250 => 1.0 / registers::GYRO_SENSITIVITY_250DPS,
        GyroRange::Dps500 => 1.0 / registers::GYRO_SENSITIVITY_500DPS,
        GyroRange::Dps1000 => 1.0 / registers::GYRO_SENSITIVITY_1000DPS,
        GyroRange::Dps2000 => 1.0 / registers::GYRO_SENSITIVITY_2000DPS,
    }
}

/// Accel scale in (m/s²)/LSB for `range`
pub fn accel_scale(range: AccelRange) -> f32 {
    match range {
        AccelRange::G2 => registers::GRAVITY / registers::ACCEL_SENSITIVITY_2G,
        AccelRange::G4 => registers::GRAVITY / registers::ACCEL_SENSITIVITY_4G,
        AccelRange::G8 => registers::GRAVITY / registers::ACCEL_SENSITIVITY_8G,
        AccelRange::G16 => registers::GRAVITY / registers::ACCEL_SENSITIVITY_16G,
    }
}

/// Gyro scale for a raw GYRO_CONFIG value, zero if it is not a known range
pub fn gyro_scale_for_register(value: u8) -> f32 {
    GyroRange::from_register(value).map_or(0.0, gyro_scale)
}

/// Accel scale for a raw ACCEL_CONFIG value, zero if it is not a known range
pub fn accel_scale_for_register(value: u8) -> f32 {
    AccelRange::from_register(value).map_or(0.0, accel_scale)
}

/// Sensor X/Y to body X/Y
type AxisRemap = fn(i32, i32) -> (i32, i32);

// Sensor datasheet frame has X right, Y forward; body frame has X forward.
fn top_0deg(x: i32, y: i32) -> (i32, i32) {
    (y, x)
}

fn top_90deg(x: i32, y: i32) -> (i32, i32) {
    (x, -y)
}

fn top_180deg(x: i32, y: i32) -> (i32, i32) {
    (-y, -x)
}

fn top_270deg(x: i32, y: i32) -> (i32, i32) {
    (-x, y)
}

/// Indexed by `Orientation as usize`
const REMAP: [AxisRemap; 4] = [top_0deg, top_90deg, top_180deg, top_270deg];

/// Rotate a raw sensor X/Y pair into the body frame
///
/// Works in `i32` so negating `i16::MIN` cannot overflow.
pub fn remap(orientation: Orientation, raw_x: i32, raw_y: i32) -> (i32, i32) {
    REMAP[orientation as usize](raw_x, raw_y)
}

/// Rotate a raw sensor triplet into the body frame; Z always flips (sensor Z up, body Z down)
pub fn to_body_frame(orientation: Orientation, raw: [i16; 3]) -> [i32; 3] {
    let (x, y) = remap(orientation, i32::from(raw[0]), i32::from(raw[1]));
    [x, y, -i32::from(raw[2])]
}

/// SMPLRT_DIV value for `requested_hz` given the active filter
///
/// divisor = round(filter_clock / rate) - 1, with the rate clamped to the
/// filter clock and the result clamped to 0..=255.
pub fn sample_rate_divisor(filter: LowPassFilter, requested_hz: u16) -> u8 {
    let filter_clock = filter.filter_clock_hz();
    let rate = u32::from(requested_hz).clamp(1, filter_clock);
    let rounded = (filter_clock + rate / 2) / rate;
    rounded.saturating_sub(1).min(u32::from(u8::MAX)) as u8
}

/// Output data rate actually produced by `divisor`, in Hz
pub fn effective_sample_rate(filter: LowPassFilter, divisor: u8) -> u32 {
    filter.filter_clock_hz() / (u32::from(divisor) + 1)
}

/// Die temperature in °C from the raw TEMP_OUT value
pub fn temperature_celsius(raw: i16) -> f32 {
    registers::TEMP_OFFSET + (f32::from(raw) + registers::TEMP_RAW_BIAS) / registers::TEMP_SENSITIVITY
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIENTATIONS: [Orientation; 4] = [
        Orientation::Top0Deg,
        Orientation::Top90Deg,
        Orientation::Top180Deg,
        Orientation::Top270Deg,
    ];

    #[test]
    fn test_gyro_scale_table() {
        assert!((gyro_scale(GyroRange::Dps250) - 1.0 / 131.0).abs() < 1e-9);
        assert!((gyro_scale(GyroRange::Dps500) - 1.0 / 65.5).abs() < 1e-9);
        assert!((gyro_scale(GyroRange::Dps1000) - 1.0 / 32.8).abs() < 1e-9);
        assert!((gyro_scale(GyroRange::Dps2000) - 1.0 / 16.4).abs() < 1e-9);
    }

    #[test]
    fn test_accel_scale_table() {
        assert!((accel_scale(AccelRange::G2) - 9.81 / 16384.0).abs() < 1e-9);
        assert!((accel_scale(AccelRange::G4) - 9.81 / 8192.0).abs() < 1e-9);
        assert!((accel_scale(AccelRange::G8) - 9.81 / 4096.0).abs() < 1e-9);
        assert!((accel_scale(AccelRange::G16) - 9.81 / 2048.0).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_register_scale_is_zero() {
        assert_eq!(gyro_scale_for_register(0x03), 0.0);
        assert_eq!(accel_scale_for_register(0xFF), 0.0);
        assert!((gyro_scale_for_register(0x08) - 1.0 / 65.5).abs() < 1e-9);
    }

    #[test]
    fn test_remap_table() {
        assert_eq!(remap(Orientation::Top0Deg, 3, 5), (5, 3));
        assert_eq!(remap(Orientation::Top90Deg, 3, 5), (3, -5));
        assert_eq!(remap(Orientation::Top180Deg, 3, 5), (-5, -3));
        assert_eq!(remap(Orientation::Top270Deg, 3, 5), (-3, 5));
    }

    #[test]
    fn test_body_frame_negates_z_for_every_orientation() {
        for orientation in ORIENTATIONS {
            let body = to_body_frame(orientation, [10, 20, 30]);
            assert_eq!(body[2], -30);
            let (x, y) = remap(orientation, 10, 20);
            assert_eq!([body[0], body[1]], [x, y]);
        }
    }

    #[test]
    fn test_body_frame_handles_min_value() {
        let body = to_body_frame(Orientation::Top180Deg, [i16::MIN, i16::MIN, i16::MIN]);
        assert_eq!(body, [32768, 32768, 32768]);
    }

    #[test]
    fn test_divisor_wide_filter() {
        assert_eq!(sample_rate_divisor(LowPassFilter::Hz256, 500), 15);
        assert_eq!(sample_rate_divisor(LowPassFilter::Hz256, 8000), 0);
    }

    #[test]
    fn test_divisor_clamps_rate_to_filter_clock() {
        assert_eq!(sample_rate_divisor(LowPassFilter::Hz188, 2000), 0);
        assert_eq!(sample_rate_divisor(LowPassFilter::Hz256, 20000), 0);
    }

    #[test]
    fn test_divisor_rounds_to_nearest() {
        // 1000 / 400 = 2.5 rounds up to 3
        assert_eq!(sample_rate_divisor(LowPassFilter::Hz98, 400), 2);
        // 1000 / 333 = 3.003
        assert_eq!(sample_rate_divisor(LowPassFilter::Hz98, 333), 2);
        assert_eq!(sample_rate_divisor(LowPassFilter::Hz98, 500), 1);
    }

    #[test]
    fn test_divisor_clamps_to_register_range() {
        assert_eq!(sample_rate_divisor(LowPassFilter::Hz20, 1), 255);
        assert_eq!(sample_rate_divisor(LowPassFilter::Hz20, 0), 255);
        assert_eq!(sample_rate_divisor(LowPassFilter::Hz256, 31), 255);
    }

    #[test]
    fn test_effective_sample_rate() {
        assert_eq!(effective_sample_rate(LowPassFilter::Hz256, 15), 500);
        assert_eq!(effective_sample_rate(LowPassFilter::Hz188, 0), 1000);
    }

    #[test]
    fn test_temperature_conversion() {
        assert!((temperature_celsius(-512) - 35.0).abs() < 1e-6);
        assert!((temperature_celsius(2888) - 45.0).abs() < 1e-4);
    }
}
