use super::*;

#[test]
fn probe_reads_header_only_dimensions() {
    let img = image::RgbaImage::from_pixel(7, 3, image::Rgba([1, 2, 3, 255]));
    let png = encode_png(&img).unwrap();
    assert_eq!(probe_dimensions(&png).unwrap(), (7, 3));
}

#[test]
fn decode_keeps_straight_alpha() {
    let img = image::RgbaImage::from_raw(1, 1, vec![100, 50, 200, 128]).unwrap();
    let png = encode_png(&img).unwrap();
    let back = decode_rgba8(&png).unwrap();
    assert_eq!(back.get_pixel(0, 0).0, [100, 50, 200, 128]);
}

#[test]
fn garbage_is_a_decode_error() {
    let err = probe_dimensions(b"definitely not an image").unwrap_err();
    assert!(matches!(err, CardError::Decode(_)));
    let err = decode_rgba8(b"\x89PNG\r\n\x1a\nshort").unwrap_err();
    assert!(matches!(err, CardError::Decode(_)));
}
