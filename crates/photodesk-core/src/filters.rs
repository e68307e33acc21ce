//! Pixel implementation of the colour filter chain.
//!
//! Each [`FilterStep`] follows the Filter Effects Level 1 definitions that
//! browsers use for the CSS `filter` property, so an exported image matches
//! what the live preview showed. Steps run in chain order and every
//! intermediate result is clamped to [0, 1], as a browser does between
//! filter primitives. Alpha is never touched.

use crate::params::FilterStep;

type Matrix3 = [[f32; 3]; 3];

/// Apply a filter chain to RGBA pixel data in place.
///
/// An empty chain leaves the buffer untouched.
pub fn apply_filter_chain(pixels: &mut [u8], chain: &[FilterStep]) {
    if chain.is_empty() {
        return;
    }

    let ops: Vec<PixelOp> = chain.iter().map(PixelOp::from_step).collect();

    for chunk in pixels.chunks_exact_mut(4) {
        let mut rgb = [
            chunk[0] as f32 / 255.0,
            chunk[1] as f32 / 255.0,
            chunk[2] as f32 / 255.0,
        ];

        for op in &ops {
            rgb = op.apply(rgb);
        }

        chunk[0] = to_byte(rgb[0]);
        chunk[1] = to_byte(rgb[1]);
        chunk[2] = to_byte(rgb[2]);
    }
}

#[inline]
fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// A step lowered to either a per-channel linear transfer or a colour matrix.
#[derive(Debug, Clone, Copy)]
enum PixelOp {
    Linear { slope: f32, intercept: f32 },
    Matrix(Matrix3),
}

impl PixelOp {
    fn from_step(step: &FilterStep) -> Self {
        match *step {
            FilterStep::Brightness(a) => PixelOp::Linear {
                slope: a,
                intercept: 0.0,
            },
            FilterStep::Contrast(a) => PixelOp::Linear {
                slope: a,
                intercept: 0.5 - 0.5 * a,
            },
            FilterStep::Saturate(s) => PixelOp::Matrix(saturate_matrix(s)),
            FilterStep::HueRotate(deg) => PixelOp::Matrix(hue_rotate_matrix(deg)),
            FilterStep::Sepia(a) => PixelOp::Matrix(sepia_matrix(a)),
            FilterStep::Grayscale(a) => PixelOp::Matrix(grayscale_matrix(a)),
        }
    }

    #[inline]
    fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        match self {
            PixelOp::Linear { slope, intercept } => rgb.map(|c| (c * slope + intercept).clamp(0.0, 1.0)),
            PixelOp::Matrix(m) => {
                let [r, g, b] = rgb;
                [
                    (m[0][0] * r + m[0][1] * g + m[0][2] * b).clamp(0.0, 1.0),
                    (m[1][0] * r + m[1][1] * g + m[1][2] * b).clamp(0.0, 1.0),
                    (m[2][0] * r + m[2][1] * g + m[2][2] * b).clamp(0.0, 1.0),
                ]
            }
        }
    }
}

fn saturate_matrix(s: f32) -> Matrix3 {
    [
        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
    ]
}

fn hue_rotate_matrix(degrees: f32) -> Matrix3 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    [
        [
            0.213 + cos * 0.787 - sin * 0.213,
            0.715 - cos * 0.715 - sin * 0.715,
            0.072 - cos * 0.072 + sin * 0.928,
        ],
        [
            0.213 - cos * 0.213 + sin * 0.143,
            0.715 + cos * 0.285 + sin * 0.140,
            0.072 - cos * 0.072 - sin * 0.283,
        ],
        [
            0.213 - cos * 0.213 - sin * 0.787,
            0.715 - cos * 0.715 + sin * 0.715,
            0.072 + cos * 0.928 + sin * 0.072,
        ],
    ]
}

fn sepia_matrix(amount: f32) -> Matrix3 {
    let inv = 1.0 - amount.clamp(0.0, 1.0);
    [
        [0.393 + 0.607 * inv, 0.769 - 0.769 * inv, 0.189 - 0.189 * inv],
        [0.349 - 0.349 * inv, 0.686 + 0.314 * inv, 0.168 - 0.168 * inv],
        [0.272 - 0.272 * inv, 0.534 - 0.534 * inv, 0.131 + 0.869 * inv],
    ]
}

fn grayscale_matrix(amount: f32) -> Matrix3 {
    let inv = 1.0 - amount.clamp(0.0, 1.0);
    [
        [0.2126 + 0.7874 * inv, 0.7152 - 0.7152 * inv, 0.0722 - 0.0722 * inv],
        [0.2126 - 0.2126 * inv, 0.7152 + 0.2848 * inv, 0.0722 - 0.0722 * inv],
        [0.2126 - 0.2126 * inv, 0.7152 - 0.7152 * inv, 0.0722 + 0.9278 * inv],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn px(r: u8, g: u8, b: u8, a: u8) -> Vec<u8> {
        vec![r, g, b, a]
    }

    fn run(mut pixels: Vec<u8>, chain: &[FilterStep]) -> Vec<u8> {
        apply_filter_chain(&mut pixels, chain);
        pixels
    }

    #[test]
    fn test_empty_chain_is_noop() {
        let original: Vec<u8> = (0..=255).collect();
        assert_eq!(run(original.clone(), &[]), original);
    }

    #[test]
    fn test_brightness_scales_channels() {
        let out = run(px(100, 50, 200, 255), &[FilterStep::Brightness(1.5)]);
        assert_eq!(out, px(150, 75, 255, 255));
    }

    #[test]
    fn test_brightness_zero_is_black() {
        let out = run(px(100, 50, 200, 77), &[FilterStep::Brightness(0.0)]);
        assert_eq!(out, px(0, 0, 0, 77));
    }

    #[test]
    fn test_contrast_zero_is_mid_grey() {
        let out = run(px(0, 255, 30, 255), &[FilterStep::Contrast(0.0)]);
        assert_eq!(out, px(128, 128, 128, 255));
    }

    #[test]
    fn test_contrast_two_pushes_away_from_midpoint() {
        let out = run(px(64, 192, 128, 255), &[FilterStep::Contrast(2.0)]);
        assert!(out[0] < 64);
        assert!(out[1] > 192);
    }

    #[test]
    fn test_identity_steps_preserve_pixels() {
        let original: Vec<u8> = (0..=255u8).collect();
        let chain = [
            FilterStep::Brightness(1.0),
            FilterStep::Contrast(1.0),
            FilterStep::Saturate(1.0),
            FilterStep::HueRotate(0.0),
            FilterStep::Sepia(0.0),
            FilterStep::Grayscale(0.0),
        ];
        let out = run(original.clone(), &chain);
        for (a, b) in out.iter().zip(original.iter()) {
            assert!((*a as i16 - *b as i16).abs() <= 1, "{a} vs {b}");
        }
    }

    #[test]
    fn test_full_grayscale_equalizes_channels() {
        let out = run(px(200, 40, 90, 255), &[FilterStep::Grayscale(1.0)]);
        assert_eq!(out[0], out[1]);
        assert_eq!(out[1], out[2]);
    }

    #[test]
    fn test_saturate_zero_matches_luma_weights() {
        let out = run(px(255, 0, 0, 255), &[FilterStep::Saturate(0.0)]);
        // 0.213 * 255 = 54.3
        assert_eq!(out, px(54, 54, 54, 255));
    }

    #[test]
    fn test_full_sepia_warms_grey() {
        let out = run(px(100, 100, 100, 255), &[FilterStep::Sepia(1.0)]);
        assert!(out[0] > out[1] && out[1] > out[2]);
    }

    #[test]
    fn test_hue_rotate_full_turn_is_identity() {
        let original = px(12, 180, 90, 255);
        let out = run(original.clone(), &[FilterStep::HueRotate(360.0)]);
        for (a, b) in out.iter().zip(original.iter()) {
            assert!((*a as i16 - *b as i16).abs() <= 1);
        }
    }

    #[test]
    fn test_order_matters() {
        // Brightening before contrast differs from contrast before brightening
        let a = run(
            px(100, 100, 100, 255),
            &[FilterStep::Brightness(1.5), FilterStep::Contrast(2.0)],
        );
        let b = run(
            px(100, 100, 100, 255),
            &[FilterStep::Contrast(2.0), FilterStep::Brightness(1.5)],
        );
        assert_ne!(a, b);
    }

    #[test]
    fn test_alpha_untouched() {
        let out = run(
            vec![10, 20, 30, 0, 40, 50, 60, 128],
            &[FilterStep::Sepia(1.0), FilterStep::Brightness(2.0)],
        );
        assert_eq!(out[3], 0);
        assert_eq!(out[7], 128);
    }
}
