//! MPU-6500 Register Definitions
//!
//! Based on the MPU-6500 Register Map (RM-MPU-6500A-00 v2.1).
//! SPI framing: bit 7 of the address byte selects read (1) or write (0).

#![allow(dead_code)]

// ============================================================================
// Registers
// ============================================================================

/// Sample rate divider: SAMPLE_RATE = Internal_Sample_Rate / (1 + SMPLRT_DIV)
pub const SMPLRT_DIV: u8 = 0x19;

/// Configuration register (DLPF_CFG[2:0], FSYNC)
pub const CONFIG: u8 = 0x1A;

/// Gyroscope configuration (FS_SEL[4:3])
pub const GYRO_CONFIG: u8 = 0x1B;

/// Accelerometer configuration (AFS_SEL[4:3])
pub const ACCEL_CONFIG: u8 = 0x1C;

/// Accelerometer configuration 2 (accel DLPF)
pub const ACCEL_CONFIG_2: u8 = 0x1D;

/// Interrupt pin configuration
pub const INT_PIN_CFG: u8 = 0x37;

/// Interrupt enable
pub const INT_ENABLE: u8 = 0x38;

/// Interrupt status
pub const INT_STATUS: u8 = 0x3A;

/// Accelerometer measurements (high byte first)
pub const ACCEL_XOUT_H: u8 = 0x3B;
pub const ACCEL_XOUT_L: u8 = 0x3C;
pub const ACCEL_YOUT_H: u8 = 0x3D;
pub const ACCEL_YOUT_L: u8 = 0x3E;
pub const ACCEL_ZOUT_H: u8 = 0x3F;
pub const ACCEL_ZOUT_L: u8 = 0x40;

/// Temperature measurement (high byte first)
pub const TEMP_OUT_H: u8 = 0x41;
pub const TEMP_OUT_L: u8 = 0x42;

/// Gyroscope measurements (high byte first)
pub const GYRO_XOUT_H: u8 = 0x43;
pub const GYRO_XOUT_L: u8 = 0x44;
pub const GYRO_YOUT_H: u8 = 0x45;
pub const GYRO_YOUT_L: u8 = 0x46;
pub const GYRO_ZOUT_H: u8 = 0x47;
pub const GYRO_ZOUT_L: u8 = 0x48;

/// Signal path reset (gyro/accel/temp digital paths)
pub const SIGNAL_PATH_RESET: u8 = 0x68;

/// User control register
pub const USER_CTRL: u8 = 0x6A;

/// Power management 1
pub const PWR_MGMT_1: u8 = 0x6B;

/// Power management 2
pub const PWR_MGMT_2: u8 = 0x6C;

/// Device ID
pub const WHO_AM_I: u8 = 0x75;

// ============================================================================
// Register Values
// ============================================================================

/// MPU-6500 WHO_AM_I value
pub const MPU6500_WHO_AM_I_VALUE: u8 = 0x70;

/// MPU-6000 WHO_AM_I value (same register map, I2C/SPI part)
pub const MPU6000_WHO_AM_I_VALUE: u8 = 0x68;

/// PWR_MGMT_1 bits
pub const PWR_MGMT_1_H_RESET: u8 = 0x80;
pub const PWR_MGMT_1_SLEEP: u8 = 0x40;

/// USER_CTRL reset bits (self-clearing)
pub const USER_CTRL_SIG_COND_RST: u8 = 0x01;
pub const USER_CTRL_I2C_MST_RST: u8 = 0x02;
pub const USER_CTRL_FIFO_RST: u8 = 0x04;

/// Read flag OR'd into the address byte
pub const SPI_READ_FLAG: u8 = 0x80;

/// Address mask for writes
pub const SPI_ADDRESS_MASK: u8 = 0x7F;

// ============================================================================
// Full Scale Range (GYRO_CONFIG[4:3], ACCEL_CONFIG[4:3])
// ============================================================================

pub const GYRO_FS_SEL_250DPS: u8 = 0x00;
pub const GYRO_FS_SEL_500DPS: u8 = 0x08;
pub const GYRO_FS_SEL_1000DPS: u8 = 0x10;
pub const GYRO_FS_SEL_2000DPS: u8 = 0x18;

pub const ACCEL_FS_SEL_2G: u8 = 0x00;
pub const ACCEL_FS_SEL_4G: u8 = 0x08;
pub const ACCEL_FS_SEL_8G: u8 = 0x10;
pub const ACCEL_FS_SEL_16G: u8 = 0x18;

// ============================================================================
// Digital Low Pass Filter (CONFIG[2:0])
// ============================================================================

pub const DLPF_CFG_256HZ: u8 = 0x00; // 8kHz internal rate
pub const DLPF_CFG_188HZ: u8 = 0x01; // 1kHz internal rate from here down
pub const DLPF_CFG_98HZ: u8 = 0x02;
pub const DLPF_CFG_42HZ: u8 = 0x03;
pub const DLPF_CFG_20HZ: u8 = 0x04;
pub const DLPF_CFG_10HZ: u8 = 0x05;
pub const DLPF_CFG_5HZ: u8 = 0x06;

// ============================================================================
// Scaling Constants
// ============================================================================

/// Gyroscope sensitivity (LSB/°/s) for each range
pub const GYRO_SENSITIVITY_250DPS: f32 = 131.0;
pub const GYRO_SENSITIVITY_500DPS: f32 = 65.5;
pub const GYRO_SENSITIVITY_1000DPS: f32 = 32.8;
pub const GYRO_SENSITIVITY_2000DPS: f32 = 16.4;

/// Accelerometer sensitivity (LSB/g) for each range
pub const ACCEL_SENSITIVITY_2G: f32 = 16384.0;
pub const ACCEL_SENSITIVITY_4G: f32 = 8192.0;
pub const ACCEL_SENSITIVITY_8G: f32 = 4096.0;
pub const ACCEL_SENSITIVITY_16G: f32 = 2048.0;

/// Temperature conversion: °C = TEMP_OFFSET + (raw + TEMP_RAW_BIAS) / TEMP_SENSITIVITY
pub const TEMP_OFFSET: f32 = 35.0;
pub const TEMP_RAW_BIAS: f32 = 512.0;
pub const TEMP_SENSITIVITY: f32 = 340.0;

/// Local gravity (m/s²)
pub const GRAVITY: f32 = 9.81;

/// Internal sample clock with the widest filter (Hz)
pub const FILTER_CLOCK_WIDE_HZ: u32 = 8000;

/// Internal sample clock with any other filter (Hz)
pub const FILTER_CLOCK_HZ: u32 = 1000;
