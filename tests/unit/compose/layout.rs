use super::*;

#[test]
fn overlay_is_inset_by_margin() {
    let r = overlay_rect(1200, 630);
    assert_eq!((r.x0, r.y0, r.x1, r.y1), (20.0, 20.0, 1180.0, 610.0));
}

#[test]
fn avatar_geometry_for_default_diameter() {
    assert_eq!(avatar_center(64), 84.0);
    assert_eq!(avatar_ring_radius(64), 36.0);
    assert_eq!(avatar_origin(64, 64, 64), Point::new(52.0, 52.0));
}

#[test]
fn odd_avatar_diameter_truncates_center_and_radius() {
    assert_eq!(avatar_center(65), 84.5);
    assert_eq!(avatar_ring_radius(65), 36.0);
    assert_eq!(avatar_origin(65, 65, 65), Point::new(52.0, 52.0));
}

#[test]
fn text_anchors() {
    assert_eq!(author_origin(64, 40.0), Point::new(136.0, 60.0));
    assert_eq!(title_origin(64), Point::new(48.0, 160.0));
    assert_eq!(title_wrap_width(1200), 1112.0);
    assert_eq!(footer_baseline(630), 582.0);
}

#[test]
fn footer_packs_from_the_right() {
    let f = footer_layout(1200, Some(100.0), Some(96.0), Some(50.0));
    assert_eq!(f.trailing_x, Some(1052.0));
    assert_eq!(f.logo_x, Some(946.0));
    assert_eq!(f.label_x, Some(886.0));
}

#[test]
fn footer_without_logo_right_aligns_label() {
    let f = footer_layout(1200, None, None, Some(50.0));
    assert_eq!(f.label_x, Some(1102.0));
    assert_eq!(f.logo_x, None);

    let f = footer_layout(1200, None, Some(96.0), None);
    assert_eq!(f.logo_x, Some(1056.0));
    assert_eq!(f.label_x, None);
}
