// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module converts between screen positions on the canvas and integer
//! pixel coordinates of the displayed frame, which is drawn scaled by
//! `scale` with its top-left corner at `origin`.

use crate::models::annotation::Point;

/// Convert a screen position to the pixel under it.
pub fn screen_to_pixel(screen: (f32, f32), origin: (f32, f32), scale: f32) -> Point {
    Point::new(
        ((screen.0 - origin.0) / scale).floor() as i64,
        ((screen.1 - origin.1) / scale).floor() as i64,
    )
}

/// Convert pixel coordinates to a screen position.
pub fn pixel_to_screen(point: Point, origin: (f32, f32), scale: f32) -> (f32, f32) {
    (
        origin.0 + point.x as f32 * scale,
        origin.1 + point.y as f32 * scale,
    )
}

/// Scale that fits an image inside the available area, keeping its aspect.
pub fn fit_scale(image: (u32, u32), available: (f32, f32)) -> f32 {
    if image.0 == 0 || image.1 == 0 {
        return 1.0;
    }
    (available.0 / image.0 as f32).min(available.1 / image.1 as f32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_screen_roundtrip() {
        let origin = (40.0, 12.0);
        let scale = 0.75;
        let pixel = Point::new(960, 540);

        let screen = pixel_to_screen(pixel, origin, scale);
        assert_eq!(screen_to_pixel(screen, origin, scale), pixel);
    }

    #[test]
    fn test_screen_to_pixel_floors() {
        let origin = (10.0, 10.0);

        // Anywhere inside a scaled-up pixel maps back to that pixel
        assert_eq!(screen_to_pixel((10.0, 10.0), origin, 4.0), Point::new(0, 0));
        assert_eq!(screen_to_pixel((13.9, 17.5), origin, 4.0), Point::new(0, 1));

        // Left of and above the image gives negative coordinates
        assert_eq!(screen_to_pixel((9.0, 5.0), origin, 4.0), Point::new(-1, -2));
    }

    #[test]
    fn test_fit_scale() {
        assert_eq!(fit_scale((1920, 1080), (960.0, 1080.0)), 0.5);
        assert_eq!(fit_scale((100, 400), (1000.0, 200.0)), 0.5);
        assert_eq!(fit_scale((0, 10), (100.0, 100.0)), 1.0);
    }
}
