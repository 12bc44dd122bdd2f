//! Rotation augmentation: expand the canvas so nothing is clipped,
//! rotate about the center, crop back to the original dimensions.

use image::{GrayImage, Luma, imageops};
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use rand::Rng;

use crate::grid::ComposedImage;

/// Rotates `image` by a uniformly sampled integer degree in
/// `[-|max_rotation|, |max_rotation|]`, reduced mod 360. Newly exposed
/// area is filled with background. `max_rotation == 0` is the identity.
pub fn augment<R: Rng + ?Sized>(
    image: ComposedImage,
    max_rotation: i32,
    rng: &mut R,
) -> ComposedImage {
    if max_rotation == 0 {
        return image;
    }

    let bound = max_rotation.abs();
    let degree = rng.random_range(-bound..=bound).rem_euclid(360);
    rotate_recrop(&image, degree)
}

/// Deterministic rotation step: embed centered in a square canvas wide
/// enough for any angle (the diagonal), rotate, crop the canvas center
/// back to the input's exact width and height.
pub fn rotate_recrop(image: &ComposedImage, degree: i32) -> ComposedImage {
    let (width, height) = (image.width(), image.height());
    let side = f64::from(width).hypot(f64::from(height)).ceil() as u32;
    let offset_x = (side - width) / 2;
    let offset_y = (side - height) / 2;

    let mut canvas = GrayImage::from_pixel(side, side, Luma([0u8]));
    imageops::overlay(
        &mut canvas,
        &image.to_gray(),
        i64::from(offset_x),
        i64::from(offset_y),
    );

    let theta = (degree as f32).to_radians();
    let rotated = rotate_about_center(&canvas, theta, Interpolation::Nearest, Luma([0u8]));

    let cropped = imageops::crop_imm(&rotated, offset_x, offset_y, width, height).to_image();
    debug_assert_eq!(cropped.dimensions(), (width, height));
    ComposedImage::from_gray(cropped)
}
