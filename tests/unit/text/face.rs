use super::*;

use crate::text::cache::FontSet;

fn bundled_face(size: f32) -> CompositeFace {
    let dir = FontSet::bundled_dir();
    let fonts = [
        FontSet::REGULAR_FILE,
        FontSet::BOLD_FILE,
        FontSet::SYMBOL_FILE,
        FontSet::EMOJI_FILE,
    ]
    .into_iter()
    .map(|f| (f.to_string(), std::fs::read(dir.join(f)).unwrap()))
    .collect();
    CompositeFace::build(size, fonts).unwrap()
}

#[test]
fn families_follow_registration_order() {
    let face = bundled_face(24.0);
    assert_eq!(
        face.families(),
        ["DejaVu Sans", "DejaVu Math TeX Gyre", "Noto Emoji"],
    );
}

#[test]
fn garbage_bytes_are_a_font_error() {
    let err = CompositeFace::build(24.0, vec![("junk.ttf".to_string(), b"nope".to_vec())])
        .unwrap_err();
    assert!(matches!(err, CardError::Font(ref m) if m.contains("junk.ttf")), "{err}");
}

#[test]
fn invalid_sizes_are_rejected() {
    for size in [0.0, -3.0, f32::NAN, f32::INFINITY] {
        assert!(CompositeFace::build(size, Vec::new()).is_err());
    }
}

#[test]
fn single_line_layout_has_positive_metrics() {
    let face = bundled_face(36.0);
    let layout = face.layout("Hello", &TextStyle::default()).unwrap();
    assert!(layout.width() > 0.0);
    assert!(layout.height() > 0.0);
    assert!(layout.baseline() > 0.0 && layout.baseline() <= layout.height());
    assert_eq!(layout.line_count(), 1);

    let glyphs: usize = layout.runs().iter().map(|r| r.glyphs.len()).sum();
    assert_eq!(glyphs, 5);
    assert!(layout.runs().iter().all(|r| r.color == Rgba8::WHITE));
}

#[test]
fn longer_text_measures_wider() {
    let face = bundled_face(36.0);
    let style = TextStyle::default();
    let short = face.measure("ab", &style).unwrap();
    let long = face.measure("abababab", &style).unwrap();
    assert!(long > short * 3.0);
}

#[test]
fn bold_is_at_least_as_wide_as_regular() {
    let face = bundled_face(40.0);
    let regular = face
        .measure("Label", &TextStyle::new(TextWeight::Regular, Rgba8::WHITE))
        .unwrap();
    let bold = face
        .measure("Label", &TextStyle::new(TextWeight::Bold, Rgba8::WHITE))
        .unwrap();
    assert!(bold > regular);
}

#[test]
fn wrapping_breaks_into_lines_within_width() {
    let face = bundled_face(30.0);
    let text = "the quick brown fox jumps over the lazy dog again and again";
    let style = TextStyle::default().with_max_width(200.0).with_line_height(1.6);
    let layout = face.layout(text, &style).unwrap();
    assert!(layout.line_count() > 1);
    assert!(layout.width() <= 200.0 + 0.5);

    let tight = face
        .layout(text, &TextStyle::default().with_max_width(200.0))
        .unwrap();
    assert_eq!(tight.line_count(), layout.line_count());
    assert!(layout.height() > tight.height());
}

#[test]
fn missing_glyphs_fall_through_to_the_symbol_face() {
    let face = bundled_face(30.0);
    let layout = face.layout("a\u{210A}", &TextStyle::default()).unwrap();
    let fonts: Vec<_> = layout.runs().iter().map(|r| r.font.data.len()).collect();
    assert!(fonts.len() >= 2, "expected a fallback run, got {fonts:?}");
    assert_ne!(fonts[0], fonts[fonts.len() - 1]);
}

#[test]
fn emoji_fall_through_to_the_emoji_face() {
    let face = bundled_face(30.0);
    let emoji_len = std::fs::read(FontSet::bundled_dir().join(FontSet::EMOJI_FILE))
        .unwrap()
        .len();

    // U+1F680 ROCKET is absent from both DejaVu faces.
    let layout = face.layout("go \u{1F680}", &TextStyle::default()).unwrap();
    let emoji_runs: Vec<_> = layout
        .runs()
        .iter()
        .filter(|r| r.font.data.len() == emoji_len)
        .collect();
    assert_eq!(emoji_runs.len(), 1, "runs: {:?}", layout.runs().len());
    let glyphs = &emoji_runs[0].glyphs;
    assert_eq!(glyphs.len(), 1);
    assert_ne!(glyphs[0].id, 0, "rocket shaped to .notdef");
}

#[test]
fn empty_text_yields_no_runs() {
    let face = bundled_face(30.0);
    let layout = face.layout("", &TextStyle::default()).unwrap();
    assert!(layout.runs().is_empty());
    assert_eq!(layout.width(), 0.0);
}

#[test]
fn zero_line_height_is_rejected() {
    let face = bundled_face(30.0);
    assert!(face
        .layout("x", &TextStyle::default().with_line_height(0.0))
        .is_err());
}
