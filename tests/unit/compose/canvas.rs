use super::*;

fn close(a: [u8; 4], b: [u8; 4]) -> bool {
    a.iter().zip(b).all(|(x, y)| x.abs_diff(y) <= 2)
}

#[test]
fn rejects_degenerate_sizes() {
    assert!(CpuCanvas::new(0, 10).is_err());
    assert!(CpuCanvas::new(10, 70_000).is_err());
    assert_eq!(CpuCanvas::new(40, 30).unwrap().size(), (40, 30));
}

#[test]
fn untouched_canvas_is_transparent() {
    let img = CpuCanvas::new(8, 8).unwrap().finish().unwrap();
    assert_eq!(img.dimensions(), (8, 8));
    assert!(img.pixels().all(|p| p.0[3] == 0));
}

#[test]
fn fill_rect_then_translucent_overlay_blends() {
    let mut c = CpuCanvas::new(32, 32).unwrap();
    c.fill_rect(Rect::new(0.0, 0.0, 32.0, 32.0), Rgba8::WHITE)
        .unwrap();
    c.fill_rect(Rect::new(8.0, 8.0, 24.0, 24.0), Rgba8::BLACK.with_alpha(153))
        .unwrap();
    let img = c.finish().unwrap();

    assert_eq!(img.get_pixel(2, 2).0, [255, 255, 255, 255]);
    let mid = img.get_pixel(16, 16).0;
    assert!(close(mid, [102, 102, 102, 255]), "{mid:?}");
}

#[test]
fn circle_covers_center_not_corners() {
    let mut c = CpuCanvas::new(40, 40).unwrap();
    c.fill_circle(Point::new(20.0, 20.0), 10.0, Rgba8::opaque(255, 0, 0))
        .unwrap();
    let img = c.finish().unwrap();
    assert_eq!(img.get_pixel(20, 20).0, [255, 0, 0, 255]);
    assert_eq!(img.get_pixel(2, 2).0[3], 0);
    assert_eq!(img.get_pixel(28, 28).0[3], 0);
}

#[test]
fn image_lands_at_its_offset() {
    let src = image::RgbaImage::from_pixel(10, 6, image::Rgba([0, 0, 255, 255]));
    let mut c = CpuCanvas::new(40, 40).unwrap();
    c.fill_rect(Rect::new(0.0, 0.0, 40.0, 40.0), Rgba8::WHITE)
        .unwrap();
    c.draw_image(&src, Point::new(20.0, 30.0)).unwrap();
    let img = c.finish().unwrap();

    assert!(close(img.get_pixel(25, 33).0, [0, 0, 255, 255]));
    assert_eq!(img.get_pixel(19, 33).0, [255, 255, 255, 255]);
    assert_eq!(img.get_pixel(25, 29).0, [255, 255, 255, 255]);
}

#[test]
fn transparent_image_pixels_leave_the_background() {
    let mut src = image::RgbaImage::from_pixel(8, 8, image::Rgba([255, 0, 0, 255]));
    src.put_pixel(0, 0, image::Rgba([0, 0, 0, 0]));
    let mut c = CpuCanvas::new(8, 8).unwrap();
    c.fill_rect(Rect::new(0.0, 0.0, 8.0, 8.0), Rgba8::opaque(0, 255, 0))
        .unwrap();
    c.draw_image(&src, Point::ZERO).unwrap();
    let img = c.finish().unwrap();
    assert!(close(img.get_pixel(0, 0).0, [0, 255, 0, 255]));
    assert!(close(img.get_pixel(4, 4).0, [255, 0, 0, 255]));
}

#[test]
fn premultiply_rounds() {
    assert_eq!(premultiply(255, 255), 255);
    assert_eq!(premultiply(255, 0), 0);
    assert_eq!(premultiply(255, 128), 128);
    assert_eq!(premultiply(100, 51), 20);
}
