//! User-adjustable transform parameters.
//!
//! Every numeric field has a declared range and default. Setters clamp into
//! the range, so a `TransformParameters` value is always valid and the
//! renderer never has to re-check bounds.
//!
//! ## Filter Order
//! The colour adjustments are evaluated as an ordered chain:
//! 1. Brightness
//! 2. Contrast
//! 3. Saturation
//! 4. Hue rotation
//! 5. Sepia
//! 6. Grayscale
//!
//! The same chain drives both the live CSS preview ([`TransformParameters::css_filter`])
//! and the pixel pipeline used at export, so the two cannot drift apart.

use serde::{Deserialize, Serialize};

use crate::encode::OutputFormat;
use crate::transform::TransformError;

/// Declared bounds and default of one numeric parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamRange {
    pub min: f32,
    pub max: f32,
    pub default: f32,
}

impl ParamRange {
    /// Clamp into range. NaN and infinities fall back to the default.
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_finite() {
            value.clamp(self.min, self.max)
        } else {
            self.default
        }
    }
}

/// Brightness in percent.
pub const BRIGHTNESS: ParamRange = ParamRange { min: 0.0, max: 200.0, default: 100.0 };
/// Contrast ("sharpness") slider position.
pub const CONTRAST: ParamRange = ParamRange { min: 0.0, max: 100.0, default: 50.0 };
/// Saturation in percent.
pub const SATURATION: ParamRange = ParamRange { min: 0.0, max: 300.0, default: 100.0 };
/// Hue rotation in degrees.
pub const HUE_ROTATE: ParamRange = ParamRange { min: 0.0, max: 360.0, default: 0.0 };
/// Sepia in percent.
pub const SEPIA: ParamRange = ParamRange { min: 0.0, max: 100.0, default: 0.0 };
/// Grayscale in percent.
pub const GRAYSCALE: ParamRange = ParamRange { min: 0.0, max: 100.0, default: 0.0 };
/// Rotation in degrees, positive is clockwise.
pub const ROTATION: ParamRange = ParamRange { min: -180.0, max: 180.0, default: 0.0 };
/// Encoder quality for lossy formats.
pub const QUALITY: ParamRange = ParamRange { min: 0.0, max: 1.0, default: 0.92 };

/// Map the contrast slider (0-100) to a multiplicative factor.
///
/// 0 → 0.0, 50 → 1.0 (unchanged), 100 → 2.0.
#[inline]
pub fn contrast_factor(slider: f32) -> f32 {
    1.0 + (slider - 50.0) / 50.0
}

/// One step of the colour filter chain, holding its normalized amount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "kebab-case")]
pub enum FilterStep {
    /// Linear multiplier (1.0 = unchanged).
    Brightness(f32),
    /// Contrast factor around mid-grey (1.0 = unchanged).
    Contrast(f32),
    /// Saturation multiplier (1.0 = unchanged).
    Saturate(f32),
    /// Hue rotation in degrees.
    HueRotate(f32),
    /// Sepia amount, 0.0 to 1.0.
    Sepia(f32),
    /// Grayscale amount, 0.0 to 1.0.
    Grayscale(f32),
}

impl FilterStep {
    /// CSS `filter` function for this step.
    pub fn css(&self) -> String {
        match self {
            FilterStep::Brightness(a) => format!("brightness({a})"),
            FilterStep::Contrast(a) => format!("contrast({a})"),
            FilterStep::Saturate(a) => format!("saturate({a})"),
            FilterStep::HueRotate(deg) => format!("hue-rotate({deg}deg)"),
            FilterStep::Sepia(a) => format!("sepia({a})"),
            FilterStep::Grayscale(a) => format!("grayscale({a})"),
        }
    }
}

/// Pixel-space crop rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// The complete set of adjustments for one editing session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransformParameters {
    brightness: f32,
    contrast: f32,
    saturation: f32,
    hue_rotate: f32,
    sepia: f32,
    grayscale: f32,
    rotation: f32,
    crop: Option<CropRect>,
    format: OutputFormat,
    quality: f32,
}

impl Default for TransformParameters {
    fn default() -> Self {
        Self {
            brightness: BRIGHTNESS.default,
            contrast: CONTRAST.default,
            saturation: SATURATION.default,
            hue_rotate: HUE_ROTATE.default,
            sepia: SEPIA.default,
            grayscale: GRAYSCALE.default,
            rotation: ROTATION.default,
            crop: None,
            format: OutputFormat::default(),
            quality: QUALITY.default,
        }
    }
}

impl TransformParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore every field to its documented default.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Check if all values are at their defaults.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    pub fn set_brightness(&mut self, value: f32) {
        self.brightness = BRIGHTNESS.clamp(value);
    }

    pub fn contrast(&self) -> f32 {
        self.contrast
    }

    pub fn set_contrast(&mut self, value: f32) {
        self.contrast = CONTRAST.clamp(value);
    }

    /// Multiplicative contrast factor derived from the slider.
    pub fn contrast_factor(&self) -> f32 {
        contrast_factor(self.contrast)
    }

    pub fn saturation(&self) -> f32 {
        self.saturation
    }

    pub fn set_saturation(&mut self, value: f32) {
        self.saturation = SATURATION.clamp(value);
    }

    pub fn hue_rotate(&self) -> f32 {
        self.hue_rotate
    }

    pub fn set_hue_rotate(&mut self, value: f32) {
        self.hue_rotate = HUE_ROTATE.clamp(value);
    }

    pub fn sepia(&self) -> f32 {
        self.sepia
    }

    pub fn set_sepia(&mut self, value: f32) {
        self.sepia = SEPIA.clamp(value);
    }

    pub fn grayscale(&self) -> f32 {
        self.grayscale
    }

    pub fn set_grayscale(&mut self, value: f32) {
        self.grayscale = GRAYSCALE.clamp(value);
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation = ROTATION.clamp(degrees);
    }

    pub fn crop(&self) -> Option<CropRect> {
        self.crop
    }

    /// Set the crop rectangle. An empty rectangle is rejected and the
    /// previous crop is kept.
    pub fn set_crop(&mut self, rect: CropRect) -> Result<(), TransformError> {
        if rect.is_empty() {
            return Err(TransformError::EmptyCrop {
                width: rect.width,
                height: rect.height,
            });
        }
        self.crop = Some(rect);
        Ok(())
    }

    pub fn clear_crop(&mut self) {
        self.crop = None;
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn set_format(&mut self, format: OutputFormat) {
        self.format = format;
    }

    pub fn quality(&self) -> f32 {
        self.quality
    }

    pub fn set_quality(&mut self, value: f32) {
        self.quality = QUALITY.clamp(value);
    }

    /// The colour adjustments as an ordered chain. Steps at their identity
    /// value are omitted, so the default parameters yield an empty chain.
    pub fn filter_chain(&self) -> Vec<FilterStep> {
        let mut chain = Vec::with_capacity(6);
        if self.brightness != BRIGHTNESS.default {
            chain.push(FilterStep::Brightness(self.brightness / 100.0));
        }
        if self.contrast != CONTRAST.default {
            chain.push(FilterStep::Contrast(self.contrast_factor()));
        }
        if self.saturation != SATURATION.default {
            chain.push(FilterStep::Saturate(self.saturation / 100.0));
        }
        if self.hue_rotate != HUE_ROTATE.default {
            chain.push(FilterStep::HueRotate(self.hue_rotate));
        }
        if self.sepia != SEPIA.default {
            chain.push(FilterStep::Sepia(self.sepia / 100.0));
        }
        if self.grayscale != GRAYSCALE.default {
            chain.push(FilterStep::Grayscale(self.grayscale / 100.0));
        }
        chain
    }

    /// CSS `filter` value for live preview, `"none"` when nothing applies.
    pub fn css_filter(&self) -> String {
        let chain = self.filter_chain();
        if chain.is_empty() {
            return "none".to_string();
        }
        chain
            .iter()
            .map(FilterStep::css)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Whether the geometry differs from the source.
    pub fn has_geometry(&self) -> bool {
        self.rotation != ROTATION.default || self.crop.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = TransformParameters::new();
        assert_eq!(params.brightness(), 100.0);
        assert_eq!(params.contrast(), 50.0);
        assert_eq!(params.saturation(), 100.0);
        assert_eq!(params.hue_rotate(), 0.0);
        assert_eq!(params.sepia(), 0.0);
        assert_eq!(params.grayscale(), 0.0);
        assert_eq!(params.rotation(), 0.0);
        assert_eq!(params.crop(), None);
        assert_eq!(params.format(), OutputFormat::Png);
        assert!((params.quality() - 0.92).abs() < f32::EPSILON);
        assert!(params.is_default());
    }

    #[test]
    fn test_contrast_factor_mapping_is_exact() {
        assert_eq!(contrast_factor(0.0), 0.0);
        assert_eq!(contrast_factor(50.0), 1.0);
        assert_eq!(contrast_factor(100.0), 2.0);
    }

    #[test]
    fn test_setters_clamp() {
        let mut params = TransformParameters::new();
        params.set_brightness(500.0);
        params.set_contrast(-10.0);
        params.set_saturation(301.0);
        params.set_hue_rotate(720.0);
        params.set_sepia(-1.0);
        params.set_grayscale(101.0);
        params.set_rotation(-270.0);
        params.set_quality(3.0);

        assert_eq!(params.brightness(), 200.0);
        assert_eq!(params.contrast(), 0.0);
        assert_eq!(params.saturation(), 300.0);
        assert_eq!(params.hue_rotate(), 360.0);
        assert_eq!(params.sepia(), 0.0);
        assert_eq!(params.grayscale(), 100.0);
        assert_eq!(params.rotation(), -180.0);
        assert_eq!(params.quality(), 1.0);
    }

    #[test]
    fn test_non_finite_input_falls_back_to_default() {
        let mut params = TransformParameters::new();
        params.set_brightness(f32::NAN);
        params.set_rotation(f32::INFINITY);
        assert_eq!(params.brightness(), 100.0);
        assert_eq!(params.rotation(), 0.0);
    }

    #[test]
    fn test_empty_crop_rejected_and_previous_kept() {
        let mut params = TransformParameters::new();
        params.set_crop(CropRect::new(0, 0, 10, 10)).unwrap();

        let result = params.set_crop(CropRect::new(5, 5, 0, 20));
        assert!(matches!(result, Err(TransformError::EmptyCrop { .. })));
        assert_eq!(params.crop(), Some(CropRect::new(0, 0, 10, 10)));
    }

    #[test]
    fn test_default_chain_is_empty() {
        let params = TransformParameters::new();
        assert!(params.filter_chain().is_empty());
        assert_eq!(params.css_filter(), "none");
    }

    #[test]
    fn test_chain_order_is_fixed() {
        let mut params = TransformParameters::new();
        // Set in reverse order to make sure insertion order doesn't matter
        params.set_grayscale(10.0);
        params.set_sepia(20.0);
        params.set_hue_rotate(90.0);
        params.set_saturation(150.0);
        params.set_contrast(75.0);
        params.set_brightness(120.0);

        let chain = params.filter_chain();
        assert_eq!(
            chain,
            vec![
                FilterStep::Brightness(1.2),
                FilterStep::Contrast(1.5),
                FilterStep::Saturate(1.5),
                FilterStep::HueRotate(90.0),
                FilterStep::Sepia(0.2),
                FilterStep::Grayscale(0.1),
            ]
        );
        assert_eq!(
            params.css_filter(),
            "brightness(1.2) contrast(1.5) saturate(1.5) hue-rotate(90deg) sepia(0.2) grayscale(0.1)"
        );
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut params = TransformParameters::new();
        params.set_brightness(10.0);
        params.set_rotation(45.0);
        params.set_crop(CropRect::new(1, 2, 3, 4)).unwrap();
        params.set_format(OutputFormat::Jpeg);
        assert!(!params.is_default());
        assert!(params.has_geometry());

        params.reset();
        assert!(params.is_default());
        assert!(!params.has_geometry());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: reset after any sequence of adjustments restores defaults exactly.
        #[test]
        fn prop_reset_restores_defaults(
            brightness in -1000.0f32..1000.0,
            contrast in -1000.0f32..1000.0,
            saturation in -1000.0f32..1000.0,
            hue in -1000.0f32..1000.0,
            sepia in -1000.0f32..1000.0,
            grayscale in -1000.0f32..1000.0,
            rotation in -1000.0f32..1000.0,
            quality in -10.0f32..10.0,
        ) {
            let mut params = TransformParameters::new();
            params.set_brightness(brightness);
            params.set_contrast(contrast);
            params.set_saturation(saturation);
            params.set_hue_rotate(hue);
            params.set_sepia(sepia);
            params.set_grayscale(grayscale);
            params.set_rotation(rotation);
            params.set_quality(quality);
            params.set_format(OutputFormat::Webp);

            params.reset();
            prop_assert_eq!(params, TransformParameters::default());
        }

        /// Property: every setter keeps its field inside the declared range.
        #[test]
        fn prop_values_stay_in_range(value in proptest::num::f32::ANY) {
            let mut params = TransformParameters::new();
            params.set_brightness(value);
            params.set_saturation(value);
            params.set_rotation(value);

            prop_assert!((BRIGHTNESS.min..=BRIGHTNESS.max).contains(&params.brightness()));
            prop_assert!((SATURATION.min..=SATURATION.max).contains(&params.saturation()));
            prop_assert!((ROTATION.min..=ROTATION.max).contains(&params.rotation()));
        }

        /// Property: the chain never has more than one step of each kind and
        /// never reorders.
        #[test]
        fn prop_chain_order_monotonic(
            brightness in 0.0f32..=200.0,
            contrast in 0.0f32..=100.0,
            hue in 0.0f32..=360.0,
            grayscale in 0.0f32..=100.0,
        ) {
            let mut params = TransformParameters::new();
            params.set_grayscale(grayscale);
            params.set_hue_rotate(hue);
            params.set_contrast(contrast);
            params.set_brightness(brightness);

            let rank = |s: &FilterStep| match s {
                FilterStep::Brightness(_) => 0,
                FilterStep::Contrast(_) => 1,
                FilterStep::Saturate(_) => 2,
                FilterStep::HueRotate(_) => 3,
                FilterStep::Sepia(_) => 4,
                FilterStep::Grayscale(_) => 5,
            };
            let ranks: Vec<_> = params.filter_chain().iter().map(rank).collect();
            prop_assert!(ranks.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
