use anyhow::{Context, Result};
use image::io::Reader as ImageReader;
use std::path::PathBuf;
use todo_icon_gen::icon_gen::{DEFAULT_OUTPUT_DIR, ICON_SPECS, MIN_ICON_SIZE};

/// Print a quick report on generated icons: dimensions, how much of the
/// canvas is covered, and whether the rounded corners came out transparent.
///
/// With no arguments, every icon in the default output directory is checked.
fn main() -> Result<()> {
    let paths: Vec<(PathBuf, Option<u32>)> = if std::env::args().len() > 1 {
        std::env::args().skip(1).map(|p| (PathBuf::from(p), None)).collect()
    } else {
        ICON_SPECS
            .iter()
            .map(|spec| {
                let path = PathBuf::from(DEFAULT_OUTPUT_DIR).join(spec.filename);
                (path, Some(spec.size.max(MIN_ICON_SIZE)))
            })
            .collect()
    };

    for (path, expected) in paths {
        let img = ImageReader::open(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?
            .decode()
            .with_context(|| format!("Failed to decode {}", path.display()))?;

        let rgba_img = img.to_rgba8();
        let (width, height) = rgba_img.dimensions();

        println!("{}", path.display());
        println!("  dimensions: {}x{}", width, height);
        if let Some(expected) = expected {
            let mark = if width == expected && height == expected { "✓" } else { "⚠" };
            println!("  {} expected {}x{}", mark, expected, expected);
        }

        let total = (width as usize * height as usize).max(1);
        let visible = rgba_img.pixels().filter(|p| p[3] > 0).count();
        let opaque = rgba_img.pixels().filter(|p| p[3] == 255).count();
        println!(
            "  visible: {:.1}%  opaque: {:.1}%",
            visible as f64 * 100.0 / total as f64,
            opaque as f64 * 100.0 / total as f64
        );

        if width > 0 && height > 0 {
            let corner = rgba_img.get_pixel(0, 0);
            let centre = rgba_img.get_pixel(width / 2, height / 2);
            println!("  corner RGBA: {:?}", corner.0);
            println!("  centre RGBA: {:?}", centre.0);
            if corner[3] < 64 {
                println!("  ✓ rounded corner is see-through");
            } else {
                println!("  ⚠ corner alpha {} looks too solid", corner[3]);
            }
        }
    }

    Ok(())
}
