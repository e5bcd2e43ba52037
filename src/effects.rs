//! Image-filter routines used to build the glass icon surface.
//!
//! Every layer is a full-canvas `RgbaImage` composited onto the base with
//! Porter-Duff "over" (`imageops::overlay`), so the layers stay independent
//! and the order of composition in [`rounded_base`] is the whole recipe.

use image::{imageops, GrayImage, Luma, Pixel, Rgba, RgbaImage};
use rand::Rng;
use std::f64::consts::PI;

/// Corner radius as a fraction of the icon edge.
pub const CORNER_RADIUS_FACTOR: f32 = 0.23;

/// Vertical gradient stops, top to bottom.
pub const GRADIENT_STOPS: [[u8; 3]; 4] = [
    [41, 121, 255], // bright blue
    [0, 122, 255],  // system blue
    [0, 91, 219],
    [0, 66, 165], // deep blue
];

pub const GLASS_OPACITY: u8 = 40;
pub const SHADOW_ALPHA: u8 = 30;
pub const EDGE_HIGHLIGHT: Rgba<u8> = Rgba([255, 255, 255, 15]);
pub const NOISE_INTENSITY: u8 = 3;

pub const GLOW_COLOR: [u8; 3] = [41, 121, 255];
pub const GLOW_SIGMA: f32 = 3.0;
pub const GLOW_PASSES: usize = 4;

pub const SOFT_GLOW_SIGMA: f32 = 1.2;
pub const CONTRAST: f32 = 1.2;
pub const BRIGHTNESS: f32 = 1.08;

pub fn corner_radius(size: u32) -> f32 {
    size as f32 * CORNER_RADIUS_FACTOR
}

/// A rectangle with inclusive pixel bounds and rounded corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundedRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub radius: f32,
}

impl RoundedRect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32, radius: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
            radius,
        }
    }

    /// The rectangle covering a whole `size`×`size` canvas.
    pub fn full(size: u32, radius: f32) -> Self {
        Self::new(0, 0, size as i32 - 1, size as i32 - 1, radius)
    }

    pub fn is_empty(&self) -> bool {
        self.right < self.left || self.bottom < self.top
    }

    /// Fraction of pixel `(x, y)` covered by the shape, in `0.0..=1.0`.
    ///
    /// Uses the signed distance from the pixel centre to the rounded box, so
    /// edges get one pixel of anti-aliasing. The radius is clamped to half the
    /// shorter side.
    pub fn coverage(&self, x: u32, y: u32) -> f32 {
        if self.is_empty() {
            return 0.0;
        }

        let half_w = (self.right - self.left + 1) as f32 / 2.0;
        let half_h = (self.bottom - self.top + 1) as f32 / 2.0;
        let center_x = self.left as f32 + half_w;
        let center_y = self.top as f32 + half_h;
        let radius = self.radius.clamp(0.0, half_w.min(half_h));

        let qx = (x as f32 + 0.5 - center_x).abs() - (half_w - radius);
        let qy = (y as f32 + 0.5 - center_y).abs() - (half_h - radius);
        let outside = qx.max(0.0).hypot(qy.max(0.0));
        let inside = qx.max(qy).min(0.0);
        let distance = outside + inside - radius;

        (0.5 - distance).clamp(0.0, 1.0)
    }
}

/// Single-channel mask of the full-canvas rounded rectangle.
pub fn rounded_rect_mask(size: u32, radius: f32) -> GrayImage {
    let rect = RoundedRect::full(size, radius);
    GrayImage::from_fn(size, size, |x, y| {
        Luma([(rect.coverage(x, y) * 255.0).round() as u8])
    })
}

/// Fill `rect` with `color` on a layer. Filled pixels replace what was there
/// when more opaque, so overlapping fills form a union rather than stacking.
pub fn fill_rounded_rect(layer: &mut RgbaImage, rect: &RoundedRect, color: Rgba<u8>) {
    if rect.is_empty() || layer.width() == 0 || layer.height() == 0 {
        return;
    }

    let x_end = rect.right.min(layer.width() as i32 - 1);
    let y_end = rect.bottom.min(layer.height() as i32 - 1);
    for y in rect.top.max(0)..=y_end {
        for x in rect.left.max(0)..=x_end {
            let coverage = rect.coverage(x as u32, y as u32);
            if coverage <= 0.0 {
                continue;
            }

            let alpha = (color[3] as f32 * coverage).round() as u8;
            let pixel = layer.get_pixel_mut(x as u32, y as u32);
            if alpha > pixel[3] {
                *pixel = Rgba([color[0], color[1], color[2], alpha]);
            }
        }
    }
}

/// Porter-Duff "over" of an equally sized layer onto `base`.
pub fn alpha_composite(base: &mut RgbaImage, layer: &RgbaImage) {
    imageops::overlay(base, layer, 0, 0);
}

/// Opaque vertical gradient through `stops`, eased with a half sine wave
/// inside each segment.
pub fn vertical_gradient(size: u32, stops: &[[u8; 3]]) -> RgbaImage {
    let mut gradient = RgbaImage::new(size, size);
    let Some(last) = stops.last() else {
        return gradient;
    };

    let mut rows = vec![*last; size as usize];
    if stops.len() > 1 {
        let segment_height = size as f64 / (stops.len() - 1) as f64;
        for (i, pair) in stops.windows(2).enumerate() {
            let (start, end) = (pair[0], pair[1]);
            let start_y = (i as f64 * segment_height) as u32;
            let end_y = (((i + 1) as f64 * segment_height) as u32).min(size);

            for y in start_y..end_y {
                let progress = (y - start_y) as f64 / (end_y - start_y) as f64;
                let eased = ((progress * PI - PI / 2.0).sin() + 1.0) / 2.0;
                rows[y as usize] = [
                    lerp_channel(start[0], end[0], eased),
                    lerp_channel(start[1], end[1], eased),
                    lerp_channel(start[2], end[2], eased),
                ];
            }
        }
    }

    for (_, y, pixel) in gradient.enumerate_pixels_mut() {
        let [r, g, b] = rows[y as usize];
        *pixel = Rgba([r, g, b, 255]);
    }
    gradient
}

fn lerp_channel(start: u8, end: u8, t: f64) -> u8 {
    (start as f64 + (end as f64 - start as f64) * t) as u8
}

/// White sheen fading from `opacity` at the top to nothing at the bottom,
/// clipped to the rounded rectangle.
pub fn glass_highlight(size: u32, radius: f32, opacity: u8) -> RgbaImage {
    let mask = rounded_rect_mask(size, radius);
    RgbaImage::from_fn(size, size, |x, y| {
        let alpha = (opacity as f32 * (1.0 - y as f32 / size as f32)) as u32;
        let clip = mask.get_pixel(x, y)[0] as u32;
        Rgba([255, 255, 255, (alpha * clip / 255) as u8])
    })
}

/// The three shadow bands along the bottom of the icon, in layer order.
pub fn shadow_rects(size: u32, radius: f32) -> [RoundedRect; 3] {
    let s = size as i32;
    let at = |fraction: f64| (size as f64 / fraction) as i32;
    [
        RoundedRect::new(4, at(1.5), s - 5, s - 4, radius),
        RoundedRect::new(6, at(1.3), s - 7, s - 6, radius),
        RoundedRect::new(8, at(1.2), s - 9, s - 8, radius),
    ]
}

pub fn shadow_bands(size: u32, radius: f32) -> RgbaImage {
    let mut shadow = RgbaImage::new(size, size);
    for rect in shadow_rects(size, radius) {
        // A band with no height left is skipped outright
        if rect.top >= rect.bottom {
            continue;
        }
        fill_rounded_rect(&mut shadow, &rect, Rgba([0, 0, 0, SHADOW_ALPHA]));
    }
    shadow
}

pub fn edge_highlight(size: u32, radius: f32) -> RgbaImage {
    let mut edge = RgbaImage::new(size, size);
    let rect = RoundedRect::new(1, 1, size as i32 - 2, size as i32 - 2, radius);
    fill_rounded_rect(&mut edge, &rect, EDGE_HIGHLIGHT);
    edge
}

/// Sprinkle faint white specks over roughly half of the pixels. Each speck
/// has an alpha drawn uniformly from `0..=intensity`.
pub fn add_noise<R: Rng + ?Sized>(image: &mut RgbaImage, intensity: u8, rng: &mut R) {
    for pixel in image.pixels_mut() {
        if rng.gen::<f64>() > 0.5 {
            let alpha = rng.gen_range(0..=intensity);
            if alpha > 0 {
                pixel.blend(&Rgba([255, 255, 255, alpha]));
            }
        }
    }
}

/// Halo around the shape: the alpha channel is blurred into a mask, a layer of
/// `color` under that mask is stacked `passes` times, and the image goes on top.
pub fn outer_glow(image: &RgbaImage, color: [u8; 3], sigma: f32, passes: usize) -> RgbaImage {
    let (width, height) = image.dimensions();
    let alpha = GrayImage::from_fn(width, height, |x, y| Luma([image.get_pixel(x, y)[3]]));
    let mask = imageops::blur(&alpha, sigma);
    let layer = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([color[0], color[1], color[2], mask.get_pixel(x, y)[0]])
    });

    let mut glow = RgbaImage::new(width, height);
    for _ in 0..passes {
        alpha_composite(&mut glow, &layer);
    }
    alpha_composite(&mut glow, image);
    glow
}

/// The finished rounded glass surface, outer glow included.
pub fn rounded_base<R: Rng + ?Sized>(size: u32, radius: f32, rng: &mut R) -> RgbaImage {
    let mask = rounded_rect_mask(size, radius);
    let mut gradient = vertical_gradient(size, &GRADIENT_STOPS);
    for (pixel, clip) in gradient.pixels_mut().zip(mask.pixels()) {
        pixel[3] = clip[0];
    }

    let mut base = RgbaImage::new(size, size);
    alpha_composite(&mut base, &gradient);
    alpha_composite(&mut base, &shadow_bands(size, radius));
    alpha_composite(&mut base, &edge_highlight(size, radius));
    alpha_composite(&mut base, &glass_highlight(size, radius, GLASS_OPACITY));

    add_noise(&mut base, NOISE_INTENSITY, rng);

    outer_glow(&base, GLOW_COLOR, GLOW_SIGMA, GLOW_PASSES)
}

/// Composite the image over a Gaussian-blurred copy of itself.
pub fn soft_glow(image: &RgbaImage, sigma: f32) -> RgbaImage {
    let mut glow = imageops::blur(image, sigma);
    alpha_composite(&mut glow, image);
    glow
}

// ITU-R 601-2 luma in 16-bit fixed point, rounded
fn luma(pixel: &Rgba<u8>) -> u32 {
    (pixel[0] as u32 * 19595 + pixel[1] as u32 * 38470 + pixel[2] as u32 * 7471 + 0x8000) >> 16
}

// Channels are truncated after scaling, then clamped
fn scale_channel(value: f32) -> u8 {
    value.clamp(0.0, 255.0) as u8
}

/// Stretch colour channels away from the mean luma by `factor`. Alpha is untouched.
pub fn adjust_contrast(image: &mut RgbaImage, factor: f32) {
    let count = image.width() as u64 * image.height() as u64;
    if count == 0 {
        return;
    }

    let total: u64 = image.pixels().map(|p| luma(p) as u64).sum();
    let mean = (total as f64 / count as f64 + 0.5) as u32 as f32;

    for pixel in image.pixels_mut() {
        for channel in pixel.0.iter_mut().take(3) {
            *channel = scale_channel(mean + factor * (*channel as f32 - mean));
        }
    }
}

/// Scale colour channels by `factor`. Alpha is untouched.
pub fn adjust_brightness(image: &mut RgbaImage, factor: f32) {
    for pixel in image.pixels_mut() {
        for channel in pixel.0.iter_mut().take(3) {
            *channel = scale_channel(*channel as f32 * factor);
        }
    }
}
