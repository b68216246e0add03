//! Positioning units and volume formats
//!
//! Positions and durations are expressed either in nanoseconds or in bytes.
//! Some media support only one of the two; queries in an unsupported unit
//! yield `None` (unresolved), never zero.

use serde::{Deserialize, Serialize};

/// Unit for positions and durations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionUnit {
    Nanoseconds,
    Bytes,
}

impl PositionUnit {
    /// Every unit, in reporting order
    pub const ALL: [PositionUnit; 2] = [PositionUnit::Nanoseconds, PositionUnit::Bytes];
}

impl std::fmt::Display for PositionUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PositionUnit::Nanoseconds => write!(f, "nanoseconds"),
            PositionUnit::Bytes => write!(f, "bytes"),
        }
    }
}

/// Volume value format
///
/// - `Linear`: amplitude factor, 1.0 is full volume
/// - `Cubic`: cube root of the linear factor (perceptual slider scale)
/// - `Decibels`: 20·log10 of the linear factor, 0.0 is full volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeFormat {
    Linear,
    Cubic,
    Decibels,
}

impl VolumeFormat {
    /// Full volume expressed in this format
    pub fn full_volume(self) -> f64 {
        match self {
            VolumeFormat::Linear | VolumeFormat::Cubic => 1.0,
            VolumeFormat::Decibels => 0.0,
        }
    }

    /// Convert a value in this format to a linear factor
    pub fn to_linear(self, value: f64) -> f64 {
        match self {
            VolumeFormat::Linear => value.max(0.0),
            VolumeFormat::Cubic => value.max(0.0).powi(3),
            VolumeFormat::Decibels => 10f64.powf(value / 20.0),
        }
    }

    /// Convert a linear factor to this format
    pub fn from_linear(self, linear: f64) -> f64 {
        let linear = linear.max(0.0);
        match self {
            VolumeFormat::Linear => linear,
            VolumeFormat::Cubic => linear.cbrt(),
            VolumeFormat::Decibels => 20.0 * linear.log10(),
        }
    }

    /// Convert `value` from this format to `target`
    pub fn convert(self, value: f64, target: VolumeFormat) -> f64 {
        if self == target {
            return value;
        }
        target.from_linear(self.to_linear(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_full_volume_is_neutral_everywhere() {
        for format in [VolumeFormat::Linear, VolumeFormat::Cubic, VolumeFormat::Decibels] {
            let linear = format.to_linear(format.full_volume());
            assert!(close(linear, 1.0), "{:?} full volume maps to {}", format, linear);
        }
    }

    #[test]
    fn test_cubic_conversion() {
        assert!(close(VolumeFormat::Cubic.to_linear(0.5), 0.125));
        assert!(close(VolumeFormat::Linear.convert(0.125, VolumeFormat::Cubic), 0.5));
    }

    #[test]
    fn test_decibel_conversion() {
        // -20 dB is a tenth of the amplitude
        assert!(close(VolumeFormat::Decibels.to_linear(-20.0), 0.1));
        assert!(close(VolumeFormat::Linear.convert(0.1, VolumeFormat::Decibels), -20.0));
    }

    #[test]
    fn test_silence_in_decibels() {
        assert_eq!(VolumeFormat::Decibels.from_linear(0.0), f64::NEG_INFINITY);
    }

    #[test]
    fn test_negative_linear_clamped() {
        assert_eq!(VolumeFormat::Linear.to_linear(-0.5), 0.0);
        assert_eq!(VolumeFormat::Cubic.to_linear(-0.5), 0.0);
    }

    #[test]
    fn test_unit_display() {
        assert_eq!(PositionUnit::Nanoseconds.to_string(), "nanoseconds");
        assert_eq!(PositionUnit::Bytes.to_string(), "bytes");
        assert_eq!(PositionUnit::ALL.len(), 2);
    }
}
