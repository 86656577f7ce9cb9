use super::*;

#[test]
fn parses_short_and_long_forms() {
    assert_eq!(
        parse_hex_color("#ffaa00").unwrap(),
        Rgba8::opaque(255, 170, 0)
    );
    assert_eq!(parse_hex_color("#FA0").unwrap(), Rgba8::opaque(255, 170, 0));
    assert_eq!(parse_hex_color("#000").unwrap(), Rgba8::BLACK);
}

#[test]
fn pattern_is_strict() {
    assert!(is_hex_color("#abc"));
    assert!(is_hex_color("#A1B2C3"));
    assert!(!is_hex_color("abc"));
    assert!(!is_hex_color("#abcd"));
    assert!(!is_hex_color("#abcdef00"));
    assert!(!is_hex_color("#ggg"));
    assert!(!is_hex_color("#"));
    assert!(!is_hex_color(" #abc"));
}

#[test]
fn rejects_malformed_as_config_error() {
    let err = parse_hex_color("#12").unwrap_err();
    assert!(matches!(err, CardError::Config(_)));
}
