//! Test image generation.
//!
//! Provides grayscale images with a distinct pattern per index, for demos and
//! for running the labeller without any image files.

use ndarray::Array2;

/// Number of distinct patterns before they repeat with an offset.
pub const PATTERN_COUNT: usize = 8;

/// Generate `count` grayscale test images of `width` x `height` pixels.
///
/// Values are in `0.0..=1.0`. Image `i` uses pattern `i % PATTERN_COUNT`:
/// - 0: Horizontal gradient
/// - 1: Vertical gradient
/// - 2: Checkerboard
/// - 3: Circular pattern (radial gradient)
/// - 4: Concentric rings
/// - 5: Diagonal stripes
/// - 6: Noise-like pattern
/// - 7: Cross
pub fn generate_test_images(count: usize, width: usize, height: usize) -> Vec<Array2<f32>> {
    log::info!(
        "Generating {} test images of {}x{} pixels",
        count,
        width,
        height
    );
    (0..count)
        .map(|index| generate_test_image(index, width, height))
        .collect()
}

/// Generate the test image for a single index.
pub fn generate_test_image(index: usize, width: usize, height: usize) -> Array2<f32> {
    Array2::from_shape_fn((height, width), |(y, x)| {
        pattern_pixel(index, x, y, width, height)
    })
}

/// Pixel value of the pattern for `index` at the given coordinates.
fn pattern_pixel(index: usize, x: usize, y: usize, width: usize, height: usize) -> f32 {
    let fx = x as f32 / width.max(1) as f32;
    let fy = y as f32 / height.max(1) as f32;
    let cell = (width.min(height) / 4).max(1);

    let value = match index % PATTERN_COUNT {
        0 => fx,
        1 => fy,
        2 => {
            let checker = ((x / cell) + (y / cell)) % 2 == 0;
            if checker { 0.8 } else { 0.2 }
        }
        3 => {
            let cx = fx - 0.5;
            let cy = fy - 0.5;
            let dist = (cx * cx + cy * cy).sqrt();
            1.0 - dist * 2.0
        }
        4 => {
            let cx = fx - 0.5;
            let cy = fy - 0.5;
            let dist = (cx * cx + cy * cy).sqrt();
            (dist * 20.0).sin() * 0.5 + 0.5
        }
        5 => {
            if ((x + y) / cell) % 2 == 0 { 0.9 } else { 0.1 }
        }
        6 => {
            let noise = ((x as f32 * 12.9898 + y as f32 * 78.233).sin() * 43758.5453).fract();
            noise.abs() * 0.5 + fy * 0.5
        }
        _ => {
            let near_x = (fx - 0.5).abs() < 0.1;
            let near_y = (fy - 0.5).abs() < 0.1;
            if near_x || near_y { 1.0 } else { 0.0 }
        }
    };

    // Later cycles get shifted so repeated patterns still look different.
    let offset = (index / PATTERN_COUNT) as f32 * 0.1;
    ((value + offset) % 1.0001).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shapes_and_range() {
        let images = generate_test_images(10, 12, 6);
        assert_eq!(images.len(), 10);
        for image in &images {
            assert_eq!(image.dim(), (6, 12));
            assert!(image.iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn test_patterns_differ() {
        let a = generate_test_image(0, 8, 8);
        let b = generate_test_image(1, 8, 8);
        let c = generate_test_image(PATTERN_COUNT, 8, 8);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_tiny_image() {
        let image = generate_test_image(2, 1, 1);
        assert_eq!(image.dim(), (1, 1));
    }
}
