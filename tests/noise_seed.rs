use image::RgbaImage;
use rand::{rngs::StdRng, SeedableRng};
use todo_icon_gen::effects::{corner_radius, rounded_rect_mask, NOISE_INTENSITY};
use todo_icon_gen::icon_gen::create_icon;
use todo_icon_gen::text::Typeface;

fn render(size: u32, seed: u64) -> RgbaImage {
    let typeface = Typeface::embedded().unwrap();
    create_icon(size, &typeface, &mut StdRng::seed_from_u64(seed))
}

/// Two seeds only disagree by the faint noise specks, amplified at most by the
/// contrast and brightness pass, wherever the icon surface is solid.
#[test]
fn test_different_seeds_differ_only_by_noise() {
    let size = 120;
    let a = render(size, 1);
    let b = render(size, 2);
    assert_ne!(a, b, "noise should depend on the seed");

    // 1.2x contrast, 1.08x brightness plus a little rounding slack
    let bound = (NOISE_INTENSITY as f32 * 1.2 * 1.08).ceil() as u8 + 4;

    let mut compared = 0;
    for (pa, pb) in a.pixels().zip(b.pixels()) {
        if pa[3] < 250 || pb[3] < 250 {
            continue;
        }
        compared += 1;
        for channel in 0..3 {
            let diff = pa[channel].abs_diff(pb[channel]);
            assert!(diff <= bound, "{pa:?} vs {pb:?} differ by {diff} (bound {bound})");
        }
    }
    assert!(
        compared > (size * size / 2) as usize,
        "only {compared} solid pixels compared"
    );
}

#[test]
fn test_same_seed_is_reproducible() {
    assert_eq!(render(87, 1234), render(87, 1234));
}

#[test]
fn test_rounded_corners_scale_with_size() {
    for size in [40, 120, 180] {
        let radius = corner_radius(size);
        assert!((radius - 0.23 * size as f32).abs() < 1e-3);

        let mask = rounded_rect_mask(size, radius);
        assert_eq!(mask.get_pixel(0, 0)[0], 0);
        assert_eq!(mask.get_pixel(size / 2, size / 2)[0], 255);

        // Just inside the straight part of the top edge is fully covered
        let edge_start = radius.ceil() as u32 + 1;
        assert_eq!(mask.get_pixel(edge_start, 0)[0], 255);
    }
}

#[test]
fn test_icon_corners_are_see_through() {
    let icon = render(180, 3);
    let last = icon.width() - 1;
    for (x, y) in [(0, 0), (last, 0), (0, last), (last, last)] {
        assert!(icon.get_pixel(x, y)[3] < 64, "corner ({x}, {y}) is too solid");
    }
    assert!(icon.get_pixel(90, 90)[3] >= 250);
}
