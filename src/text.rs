use anyhow::{Context, Result};
use fontdb::{Database, Family, Query};
use image::{imageops, GrayImage, Luma, Rgba, RgbaImage};
use rusttype::{point, Font, Rect, Scale};
use tracing::{debug, warn};

/// Embedded default font, used when no system font matches.
static DEFAULT_FONT_DATA: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

/// Font families queried in order before falling back to the generic
/// sans-serif family.
pub const FONT_FAMILIES: &[&str] = &["Helvetica", "Arial", "DejaVu Sans", "Liberation Sans"];

/// Label height as a fraction of the icon edge.
pub const LABEL_SCALE: f32 = 0.22;
/// How far above true centre the label sits, as a fraction of the icon edge.
pub const LABEL_LIFT: f32 = 0.01;
/// Drop shadow passes: offset as a percentage of the icon edge, and alpha.
pub const LABEL_SHADOWS: [(f32, u8); 4] = [(1.2, 60), (1.8, 45), (2.4, 30), (3.0, 15)];
pub const LABEL_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

pub struct Typeface {
    name: String,
    font: Font<'static>,
}

impl Typeface {
    /// The font compiled into the binary.
    pub fn embedded() -> Result<Self> {
        let font = Font::try_from_bytes(DEFAULT_FONT_DATA).context("Embedded font is invalid")?;
        Ok(Self {
            name: "DejaVuSans (embedded)".to_string(),
            font,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rasterise `text` at `px` pixels and crop to the ink bounds.
    ///
    /// Text without any ink yields a 0×0 mask.
    pub fn render_mask(&self, text: &str, px: f32) -> GrayImage {
        trim(render_outline(&self.font, text, px))
    }
}

/// Resolve the label typeface from the installed system fonts, falling back
/// to the embedded font when nothing usable is found.
pub fn load_typeface() -> Result<Typeface> {
    let mut db = Database::new();
    db.load_system_fonts();
    debug!(faces = db.len(), "loaded system font database");

    match find_typeface(&db, FONT_FAMILIES) {
        Some(typeface) => Ok(typeface),
        None => {
            warn!("no usable system font found, falling back to the embedded font");
            Typeface::embedded()
        }
    }
}

/// Query `db` for the first of `families`, then for any sans-serif face.
pub fn find_typeface(db: &Database, families: &[&str]) -> Option<Typeface> {
    let mut query_families: Vec<Family> =
        families.iter().map(|&name| Family::Name(name)).collect();
    query_families.push(Family::SansSerif);

    let id = db.query(&Query {
        families: &query_families,
        ..Query::default()
    })?;
    let name = db.face(id)?.post_script_name.clone();

    let font = db
        .with_face_data(id, |data, index| Font::try_from_vec_and_index(data.to_vec(), index))
        .flatten();
    match font {
        Some(font) => {
            debug!(font = %name, "loaded system font");
            Some(Typeface { name, font })
        }
        None => {
            debug!(font = %name, "skipping unparseable system font");
            None
        }
    }
}

fn render_outline(font: &Font<'static>, text: &str, px: f32) -> GrayImage {
    let scale = Scale::uniform(px);
    let ascent = font.v_metrics(scale).ascent;
    let glyphs: Vec<_> = font.layout(text, scale, point(0.0, ascent)).collect();

    let bounds = glyphs
        .iter()
        .filter_map(|glyph| glyph.pixel_bounding_box())
        .reduce(|a, b| Rect {
            min: point(a.min.x.min(b.min.x), a.min.y.min(b.min.y)),
            max: point(a.max.x.max(b.max.x), a.max.y.max(b.max.y)),
        });
    let Some(bounds) = bounds else {
        return GrayImage::new(0, 0);
    };

    let width = (bounds.max.x - bounds.min.x) as u32;
    let height = (bounds.max.y - bounds.min.y) as u32;
    let mut mask = GrayImage::new(width, height);

    for glyph in &glyphs {
        let Some(bb) = glyph.pixel_bounding_box() else {
            continue;
        };
        let offset_x = (bb.min.x - bounds.min.x) as u32;
        let offset_y = (bb.min.y - bounds.min.y) as u32;
        glyph.draw(|x, y, v| {
            let (mx, my) = (offset_x + x, offset_y + y);
            if mx < width && my < height {
                let coverage = (v * 255.0).round().clamp(0.0, 255.0) as u8;
                let pixel = mask.get_pixel_mut(mx, my);
                // Overlapping glyphs (kerned pairs) keep the stronger coverage
                if coverage > pixel[0] {
                    *pixel = Luma([coverage]);
                }
            }
        });
    }

    mask
}

/// Crop a mask to the bounding box of its non-zero pixels.
fn trim(mask: GrayImage) -> GrayImage {
    let (mut min_x, mut min_y) = (u32::MAX, u32::MAX);
    let (mut max_x, mut max_y) = (0, 0);
    for (x, y, pixel) in mask.enumerate_pixels() {
        if pixel[0] > 0 {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    if min_x == u32::MAX {
        return GrayImage::new(0, 0);
    }
    imageops::crop_imm(&mask, min_x, min_y, max_x - min_x + 1, max_y - min_y + 1).to_image()
}

/// Fill a solid `color` through `mask` with its top-left corner at `(x, y)`.
///
/// Every channel, alpha included, moves toward `color` by the mask coverage,
/// so a fully covered pixel takes `color` exactly. Anything falling outside
/// the image is clipped.
pub fn draw_mask(image: &mut RgbaImage, mask: &GrayImage, x: i64, y: i64, color: Rgba<u8>) {
    let (width, height) = (image.width() as i64, image.height() as i64);
    for (mx, my, coverage) in mask.enumerate_pixels() {
        let coverage = coverage[0] as u32;
        if coverage == 0 {
            continue;
        }

        let (tx, ty) = (x + mx as i64, y + my as i64);
        if tx < 0 || ty < 0 || tx >= width || ty >= height {
            continue;
        }

        let pixel = image.get_pixel_mut(tx as u32, ty as u32);
        for (channel, ink) in pixel.0.iter_mut().zip(color.0) {
            *channel = div255(*channel as u32 * (255 - coverage) + ink as u32 * coverage);
        }
    }
}

// Rounded division by 255
fn div255(value: u32) -> u8 {
    let t = value + 128;
    (((t >> 8) + t) >> 8) as u8
}

/// Point size of the label for an icon of edge `size`.
pub fn label_px(size: u32) -> f32 {
    ((size as f32 * LABEL_SCALE) as u32).max(1) as f32
}

/// Top-left corner where a `mask` is drawn so its ink sits centred on the
/// icon, lifted slightly above the middle.
pub fn label_origin(size: u32, mask: &GrayImage) -> (i64, i64) {
    let size_f = size as f32;
    let x = (size_f - mask.width() as f32) / 2.0;
    let y = (size_f - mask.height() as f32) / 2.0 - size_f * LABEL_LIFT;
    (x.round() as i64, y.round() as i64)
}

/// Offset of a shadow pass, never less than one pixel.
pub fn shadow_offset(size: u32, percent: f32) -> i64 {
    ((size as f32 * percent * 0.01) as i64).max(1)
}

/// Draw `text` centred on a square icon with its layered drop shadow.
pub fn draw_label(image: &mut RgbaImage, typeface: &Typeface, text: &str) {
    let size = image.width();
    let mask = typeface.render_mask(text, label_px(size));
    let (x, y) = label_origin(size, &mask);

    for (percent, alpha) in LABEL_SHADOWS {
        let offset = shadow_offset(size, percent);
        draw_mask(image, &mask, x + offset, y + offset, Rgba([0, 0, 0, alpha]));
    }
    draw_mask(image, &mask, x, y, LABEL_COLOR);
}
