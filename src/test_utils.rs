//! Synthetic images shared by the unit tests.

use image::{GrayImage, Luma};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const BACKGROUND: u8 = 30;

/// Dark image sprinkled with bright squares of random intensity. FAST fires
/// on the square corners, and random placement keeps the neighbourhoods
/// distinct, which gives unambiguous descriptors.
pub fn squares_image(width: u32, height: u32, squares: usize, seed: u64) -> GrayImage {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut img = GrayImage::from_pixel(width, height, Luma([BACKGROUND]));
    let side = 6u32;

    for _ in 0..squares {
        let x0 = rng.gen_range(6..width - side - 6);
        let y0 = rng.gen_range(6..height - side - 6);
        let value = rng.gen_range(140..=255u8);
        for y in y0..y0 + side {
            for x in x0..x0 + side {
                img.put_pixel(x, y, Luma([value]));
            }
        }
    }
    img
}

pub fn flat_image(width: u32, height: u32) -> GrayImage {
    GrayImage::from_pixel(width, height, Luma([BACKGROUND]))
}

/// Copy `patch` into `canvas` with its top-left corner at `(x0, y0)`.
pub fn paste(canvas: &mut GrayImage, patch: &GrayImage, x0: u32, y0: u32) {
    for (x, y, pixel) in patch.enumerate_pixels() {
        canvas.put_pixel(x0 + x, y0 + y, *pixel);
    }
}
