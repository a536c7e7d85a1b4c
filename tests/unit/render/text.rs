use super::*;

#[test]
fn font_stack_puts_registered_families_before_generic_fallback() {
    let mut engine = TextLayoutEngine::new();
    engine.registered_families.push("Bundled Sans".to_string());
    assert_eq!(
        engine.font_stack("Arial, serif"),
        "Arial, serif, \"Bundled Sans\", sans-serif"
    );
    assert_eq!(engine.font_stack(""), "\"Bundled Sans\", sans-serif");
}

#[test]
fn garbage_font_bytes_are_rejected() {
    let mut engine = TextLayoutEngine::new();
    let err = engine.register_font_bytes(b"not a font".to_vec()).unwrap_err();
    assert!(matches!(err, MemfyError::Validation(_)));
    assert!(engine.registered_families().is_empty());
}

#[test]
fn missing_font_dir_loads_nothing() {
    let mut engine = TextLayoutEngine::new();
    assert_eq!(
        engine.register_font_dir(Path::new("target/definitely-missing-fonts")),
        0
    );
}

#[test]
fn layout_rejects_non_positive_size() {
    let mut engine = TextLayoutEngine::new();
    assert!(
        engine
            .layout_plain("HI", "sans-serif", 0.0, TextBrushRgba8::default())
            .is_err()
    );
}

#[test]
fn font_file_extensions() {
    assert!(is_font_file(Path::new("a/Inter.TTF")));
    assert!(is_font_file(Path::new("x.otf")));
    assert!(!is_font_file(Path::new("x.woff2")));
}
