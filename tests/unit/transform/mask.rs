use super::*;

fn assert_disk_property(w: u32, h: u32) {
    let src = image::RgbaImage::from_pixel(w, h, image::Rgba([10, 200, 30, 255]));
    let out = circular_mask(&src);
    assert_eq!(out.dimensions(), (w, h));

    let r = f64::from(w.min(h) / 2);
    let (cx, cy) = (f64::from(w / 2), f64::from(h / 2));
    for (x, y, px) in out.enumerate_pixels() {
        let dx = f64::from(x) - cx;
        let dy = f64::from(y) - cy;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist > r {
            assert_eq!(px.0[3], 0, "({x},{y}) at {dist} should be clear in {w}x{h}");
        } else {
            assert_eq!(px.0, [10, 200, 30, 255], "({x},{y}) should keep its color");
        }
    }
}

#[test]
fn outside_the_disk_is_transparent() {
    assert_disk_property(64, 64);
    assert_disk_property(65, 65);
    assert_disk_property(80, 50);
    assert_disk_property(3, 9);
}

#[test]
fn corners_clear_center_kept() {
    let src = image::RgbaImage::from_pixel(64, 64, image::Rgba([255, 255, 255, 255]));
    let out = circular_mask(&src);
    assert_eq!(out.get_pixel(0, 0).0[3], 0);
    assert_eq!(out.get_pixel(63, 63).0[3], 0);
    assert_eq!(out.get_pixel(32, 32).0[3], 255);
    assert_eq!(out.get_pixel(32, 1).0[3], 255);
}

#[test]
fn degenerate_sizes_do_not_panic() {
    let out = circular_mask(&image::RgbaImage::new(1, 1));
    assert_eq!(out.get_pixel(0, 0).0[3], 0);
    assert_eq!(circular_mask(&image::RgbaImage::new(0, 0)).dimensions(), (0, 0));
}

#[test]
fn fringe_above_and_left_of_the_disk_is_clear() {
    let src = image::RgbaImage::from_pixel(64, 64, image::Rgba([255, 255, 255, 255]));
    let out = circular_mask(&src);
    // (26, 0) sits 32.56 px from (32, 32), just past r = 32.
    assert_eq!(out.get_pixel(26, 0).0[3], 0);
    assert_eq!(out.get_pixel(0, 26).0[3], 0);
    // (32, 0) and (0, 32) sit exactly on the rim.
    assert_eq!(out.get_pixel(32, 0).0[3], 255);
    assert_eq!(out.get_pixel(0, 32).0[3], 255);
}
