//! Arbitrary-angle rotation onto an expanded canvas.
//!
//! The output canvas is sized to contain the whole rotated image, so nothing
//! is clipped. Corners the source does not cover stay transparent.
//!
//! # Algorithm
//!
//! Quarter turns are exact pixel permutations. Any other angle uses inverse
//! mapping: for each destination pixel centre we rotate back into source
//! space and sample bilinearly. With a y-down raster a positive angle turns
//! the image clockwise, which is what a canvas `rotate()` call does.
//!
//! ```text
//! src_x =  dx * cos(θ) + dy * sin(θ) + src_cx
//! src_y = -dx * sin(θ) + dy * cos(θ) + src_cy
//! ```

use crate::decode::DecodedImage;

/// Tolerance used when snapping to quarter turns and integer sizes.
const EPSILON: f64 = 1e-9;

/// Compute the canvas size that contains a `width × height` image rotated
/// by `angle_degrees`.
///
/// `ceil(w·|cos θ| + h·|sin θ|) × ceil(w·|sin θ| + h·|cos θ|)`, with values
/// within floating-point noise of an integer snapped to it first so that a
/// 90° turn of `w × h` is exactly `h × w`.
pub fn compute_rotated_bounds(width: u32, height: u32, angle_degrees: f64) -> (u32, u32) {
    match quarter_turns(angle_degrees) {
        Some(0) | Some(2) => return (width, height),
        Some(_) => return (height, width),
        None => {}
    }

    let (sin, cos) = angle_degrees.to_radians().sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());
    let w = width as f64;
    let h = height as f64;

    let new_w = snap_ceil(w * cos + h * sin) as u32;
    let new_h = snap_ceil(w * sin + h * cos) as u32;

    (new_w.max(1), new_h.max(1))
}

/// Rotate `image` by `angle_degrees` (positive = clockwise) about its centre.
///
/// Returns a new image; the source is not modified.
pub fn apply_rotation(image: &DecodedImage, angle_degrees: f64) -> DecodedImage {
    if image.is_empty() {
        return image.clone();
    }

    if let Some(turns) = quarter_turns(angle_degrees) {
        return rotate_quarter(image, turns);
    }

    let (dst_w, dst_h) = compute_rotated_bounds(image.width, image.height, angle_degrees);
    let (sin, cos) = angle_degrees.to_radians().sin_cos();

    let src_cx = image.width as f64 / 2.0;
    let src_cy = image.height as f64 / 2.0;
    let dst_cx = dst_w as f64 / 2.0;
    let dst_cy = dst_h as f64 / 2.0;

    let mut output = vec![0u8; dst_w as usize * dst_h as usize * 4];

    for dst_y in 0..dst_h {
        for dst_x in 0..dst_w {
            // Work with pixel centres
            let dx = dst_x as f64 + 0.5 - dst_cx;
            let dy = dst_y as f64 + 0.5 - dst_cy;

            let src_x = dx * cos + dy * sin + src_cx;
            let src_y = -dx * sin + dy * cos + src_cy;

            let pixel = sample_bilinear(image, src_x - 0.5, src_y - 0.5);
            let idx = (dst_y as usize * dst_w as usize + dst_x as usize) * 4;
            output[idx..idx + 4].copy_from_slice(&pixel);
        }
    }

    DecodedImage::new(dst_w, dst_h, output)
}

/// Number of clockwise quarter turns if the angle is a multiple of 90°.
fn quarter_turns(angle_degrees: f64) -> Option<u8> {
    let normalized = angle_degrees.rem_euclid(360.0);
    let turns = (normalized / 90.0).round();
    if (normalized - turns * 90.0).abs() < EPSILON * 360.0 {
        Some((turns as u8) % 4)
    } else {
        None
    }
}

fn snap_ceil(value: f64) -> f64 {
    let rounded = value.round();
    if (value - rounded).abs() < EPSILON * value.abs().max(1.0) {
        rounded
    } else {
        value.ceil()
    }
}

fn rotate_quarter(image: &DecodedImage, turns: u8) -> DecodedImage {
    let Some(rgba) = image.to_rgba_image() else {
        return image.clone();
    };
    let rotated = match turns {
        1 => image::imageops::rotate90(&rgba),
        2 => image::imageops::rotate180(&rgba),
        3 => image::imageops::rotate270(&rgba),
        _ => return image.clone(),
    };
    DecodedImage::from_rgba_image(rotated)
}

/// Sample at continuous coordinates where integer values are pixel centres.
///
/// Neighbours outside the image count as transparent, which gives the
/// rotated edges a soft alpha falloff. Colour is interpolated premultiplied
/// so transparent neighbours do not darken the edge.
fn sample_bilinear(image: &DecodedImage, x: f64, y: f64) -> [u8; 4] {
    let w = image.width as i64;
    let h = image.height as i64;

    if x <= -1.0 || y <= -1.0 || x >= w as f64 || y >= h as f64 {
        return [0, 0, 0, 0];
    }

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let taps = [
        (x0, y0, (1.0 - fx) * (1.0 - fy)),
        (x0 + 1, y0, fx * (1.0 - fy)),
        (x0, y0 + 1, (1.0 - fx) * fy),
        (x0 + 1, y0 + 1, fx * fy),
    ];

    let mut acc = [0.0f64; 4];
    for (px, py, weight) in taps {
        if weight == 0.0 || px < 0 || py < 0 || px >= w || py >= h {
            continue;
        }
        let [r, g, b, a] = image.pixel(px as u32, py as u32);
        let alpha = a as f64 / 255.0;
        acc[0] += r as f64 * alpha * weight;
        acc[1] += g as f64 * alpha * weight;
        acc[2] += b as f64 * alpha * weight;
        acc[3] += alpha * weight;
    }

    if acc[3] <= 0.0 {
        return [0, 0, 0, 0];
    }

    [
        (acc[0] / acc[3]).clamp(0.0, 255.0).round() as u8,
        (acc[1] / acc[3]).clamp(0.0, 255.0).round() as u8,
        (acc[2] / acc[3]).clamp(0.0, 255.0).round() as u8,
        (acc[3] * 255.0).clamp(0.0, 255.0).round() as u8,
    ]
}
