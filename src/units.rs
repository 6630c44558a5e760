//! Unit conversions for OOXML drawing coordinates.
//!
//! EMU (English Metric Units) is the base length unit in DrawingML:
//! 914400 EMU = 1 inch, which at the 96 DPI Excel default gives
//! 9525 EMU per pixel.

/// EMU per pixel at 96 DPI.
pub const EMU_PER_PIXEL: i64 = 9525;

/// OOXML rotation units per degree (`rot` attributes are 1/60000°).
pub const ROT_UNITS_PER_DEGREE: f64 = 60000.0;

/// Convert EMU to whole pixels, rounding toward negative infinity.
#[must_use]
pub fn emu_to_pixels(emu: i64) -> i64 {
    emu.div_euclid(EMU_PER_PIXEL)
}

/// Convert a raw `rot` attribute value to degrees.
///
/// Returns `None` when the angle is effectively zero (|deg| < 1e-6), so
/// unrotated shapes carry no rotation field at all.
#[must_use]
pub fn rotation_degrees(rot: i64) -> Option<f64> {
    #[allow(clippy::cast_precision_loss)]
    let degrees = rot as f64 / ROT_UNITS_PER_DEGREE;
    if degrees.abs() < 1e-6 {
        return None;
    }
    Some(degrees)
}
