use crate::contents_json::{write_contents_json, ImageEntry};
use crate::effects::{
    adjust_brightness, adjust_contrast, alpha_composite, corner_radius, rounded_base, soft_glow,
    BRIGHTNESS, CONTRAST, SOFT_GLOW_SIGMA,
};
use crate::text::{draw_label, load_typeface, Typeface};
use anyhow::{Context, Result};
use image::{
    codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder},
    ColorType, ImageEncoder, RgbaImage,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{
    fs::{create_dir_all, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::{debug, info};

/// Text drawn across every icon.
pub const LABEL: &str = "ToDoList";

/// Smallest edge an icon is ever rendered at.
pub const MIN_ICON_SIZE: u32 = 20;

pub const DEFAULT_OUTPUT_DIR: &str = "ToDoList/Assets.xcassets/AppIcon.appiconset";

/// One output file of the icon set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconSpec {
    pub size: u32,
    pub filename: &'static str,
}

impl IconSpec {
    pub const fn new(size: u32, filename: &'static str) -> Self {
        Self { size, filename }
    }
}

/// Every icon written, in generation order.
pub const ICON_SPECS: [IconSpec; 8] = [
    IconSpec::new(40, "Icon-40.png"),
    IconSpec::new(60, "Icon-60.png"),
    IconSpec::new(58, "Icon-58.png"),
    IconSpec::new(87, "Icon-87.png"),
    IconSpec::new(80, "Icon-80.png"),
    IconSpec::new(120, "Icon-120.png"),
    IconSpec::new(180, "Icon-180.png"),
    IconSpec::new(1024, "Icon-1024.png"),
];

/// Asset catalog slots filled by the icon set: (file, idiom, size in points, scale).
const CATALOG_SLOTS: [(&str, &str, &str, &str); 9] = [
    ("Icon-40.png", "iphone", "20x20", "2x"),
    ("Icon-60.png", "iphone", "20x20", "3x"),
    ("Icon-58.png", "iphone", "29x29", "2x"),
    ("Icon-87.png", "iphone", "29x29", "3x"),
    ("Icon-80.png", "iphone", "40x40", "2x"),
    ("Icon-120.png", "iphone", "40x40", "3x"),
    ("Icon-120.png", "iphone", "60x60", "2x"),
    ("Icon-180.png", "iphone", "60x60", "3x"),
    ("Icon-1024.png", "ios-marketing", "1024x1024", "1x"),
];

#[derive(Debug, Clone)]
pub struct Options {
    pub output: PathBuf,
    /// Noise seed; a fresh random seed is used when unset.
    pub seed: Option<u64>,
    pub contents_json: bool,
}

pub fn generate_icons(options: &Options) -> Result<()> {
    // Ensure the output directory exists
    create_dir_all(&options.output).with_context(|| {
        format!("Can't create output directory {}", options.output.display())
    })?;

    let typeface = load_typeface()?;
    info!(typeface = typeface.name(), "typeface ready");

    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    for spec in &ICON_SPECS {
        println!("Generating {}...", spec.filename);
        let icon = create_icon(spec.size, &typeface, &mut rng);
        let output_path = options.output.join(spec.filename);
        save_png(&icon, &output_path)?;
        debug!(path = %output_path.display(), size = icon.width(), "wrote icon");
    }

    if options.contents_json {
        write_contents_json(&options.output, catalog_entries())?;
        println!("  ✓ Generated Contents.json");
    }

    println!("Icon generation complete!");
    Ok(())
}

/// Render one icon. Sizes below [`MIN_ICON_SIZE`] are raised to it.
pub fn create_icon<R: Rng + ?Sized>(size: u32, typeface: &Typeface, rng: &mut R) -> RgbaImage {
    let size = size.max(MIN_ICON_SIZE);

    let mut img = RgbaImage::new(size, size);
    let base = rounded_base(size, corner_radius(size), rng);
    alpha_composite(&mut img, &base);

    draw_label(&mut img, typeface, LABEL);

    let mut img = soft_glow(&img, SOFT_GLOW_SIGMA);
    adjust_contrast(&mut img, CONTRAST);
    adjust_brightness(&mut img, BRIGHTNESS);
    img
}

/// Slots for the asset catalog's Contents.json.
pub fn catalog_entries() -> Vec<ImageEntry> {
    CATALOG_SLOTS
        .iter()
        .map(|&(filename, idiom, size, scale)| {
            ImageEntry::new_app_icon(filename, idiom, size, scale)
        })
        .collect()
}

pub fn save_png(image: &RgbaImage, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create PNG file {}", path.display()))?;
    let mut out_file = BufWriter::new(file);
    write_png(image.as_raw(), &mut out_file, image.width(), image.height())?;
    out_file
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

// Encode image data as PNG with compression
fn write_png<W: Write>(image_data: &[u8], w: W, width: u32, height: u32) -> Result<()> {
    let encoder = PngEncoder::new_with_quality(w, CompressionType::Best, PngFilterType::Adaptive);
    encoder
        .write_image(image_data, width, height, ColorType::Rgba8)
        .context("Failed to encode PNG")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typeface() -> Typeface {
        Typeface::embedded().unwrap()
    }

    #[test]
    fn test_icon_specs_are_unique_and_named_after_their_size() {
        for spec in &ICON_SPECS {
            assert_eq!(spec.filename, format!("Icon-{}.png", spec.size));
        }
        let mut names: Vec<_> = ICON_SPECS.iter().map(|spec| spec.filename).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ICON_SPECS.len());
    }

    #[test]
    fn test_catalog_slots_only_reference_generated_files() {
        let entries = catalog_entries();
        assert_eq!(entries.len(), 9);

        for entry in &entries {
            let filename = entry.filename.as_deref().unwrap();
            let spec = ICON_SPECS
                .iter()
                .find(|spec| spec.filename == filename)
                .unwrap_or_else(|| panic!("{filename} is not generated"));

            // Pixel size must equal points times scale
            let points: u32 = entry.size.split('x').next().unwrap().parse().unwrap();
            let scale: u32 = entry.scale.trim_end_matches('x').parse().unwrap();
            assert_eq!(points * scale, spec.size, "{filename}");
        }

        for spec in &ICON_SPECS {
            assert!(entries
                .iter()
                .any(|entry| entry.filename.as_deref() == Some(spec.filename)));
        }
    }

    #[test]
    fn test_small_icons_are_raised_to_minimum_size() {
        let mut rng = StdRng::seed_from_u64(0);
        let icon = create_icon(10, &typeface(), &mut rng);
        assert_eq!(icon.dimensions(), (MIN_ICON_SIZE, MIN_ICON_SIZE));

        let icon = create_icon(MIN_ICON_SIZE, &typeface(), &mut rng);
        assert_eq!(icon.dimensions(), (MIN_ICON_SIZE, MIN_ICON_SIZE));
    }

    #[test]
    fn test_icon_matches_requested_size_and_is_visible() {
        let mut rng = StdRng::seed_from_u64(42);
        for size in [40, 87] {
            let icon = create_icon(size, &typeface(), &mut rng);
            assert_eq!(icon.dimensions(), (size, size));
            assert!(icon.pixels().any(|p| p[3] > 0));
            assert!(icon.get_pixel(size / 2, size - 3)[3] >= 250);
        }
    }

    #[test]
    fn test_label_is_drawn_in_white() {
        let mut rng = StdRng::seed_from_u64(5);
        let icon = create_icon(180, &typeface(), &mut rng);
        let white = icon
            .pixels()
            .filter(|p| p[0] > 230 && p[1] > 230 && p[2] > 230 && p[3] > 230)
            .count();
        assert!(white > 50, "only {white} white pixels");
    }

    #[test]
    fn test_same_seed_renders_identically() {
        let a = create_icon(60, &typeface(), &mut StdRng::seed_from_u64(9));
        let b = create_icon(60, &typeface(), &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_save_png_round_trips_dimensions() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("icon.png");
        let icon = create_icon(58, &typeface(), &mut StdRng::seed_from_u64(1));

        save_png(&icon, &path).unwrap();

        let decoded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(decoded, icon);
    }

    #[test]
    fn test_save_png_into_missing_directory_fails() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("missing").join("icon.png");
        let err = save_png(&RgbaImage::new(1, 1), &path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to create PNG file"));
    }
}
