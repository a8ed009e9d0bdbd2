use super::*;

#[test]
fn empty_document_yields_defaults() {
    let cfg = AppConfig::from_toml_str("").unwrap();
    assert_eq!(cfg, AppConfig::default());
    assert_eq!(cfg.animation.fps, 24);
    assert_eq!(cfg.style.dimensions.padding, 240.0);
    assert_eq!(cfg.style.colors.marriage_line, Rgb8::new(197, 61, 67));
    assert_eq!(cfg.layout.program, "dot");
    assert_eq!(cfg.logging.level, "info");
}

#[test]
fn partial_sections_keep_remaining_defaults() {
    let cfg = AppConfig::from_toml_str(
        r#"
[style.colors]
background = [0, 0, 0]

[style.dimensions]
dpi = 100.0
font_path = "fonts/Sans.ttf"

[animation]
fps = 30
line_duration = 1.5
"#,
    )
    .unwrap();
    assert_eq!(cfg.style.colors.background, Rgb8::new(0, 0, 0));
    assert_eq!(cfg.style.colors.text, Rgb8::new(43, 43, 43));
    assert_eq!(cfg.style.dimensions.dpi, 100.0);
    assert_eq!(cfg.style.dimensions.corner_radius, 48.0);
    assert_eq!(
        cfg.style.dimensions.font_path.as_deref(),
        Some(Path::new("fonts/Sans.ttf"))
    );
    assert_eq!(cfg.animation.fps, 30);
    assert_eq!(cfg.animation.pause_duration, 0.3);
    assert_eq!(cfg.timeline_params().line_duration, 1.5);
    assert_eq!(cfg.layout_params().pixels_per_unit, 100.0);
}

#[test]
fn unknown_keys_are_rejected() {
    let err = AppConfig::from_toml_str("[animation]\nspeed = 2\n").unwrap_err();
    assert!(matches!(err, FamflowError::Serde(_)));
    let err = AppConfig::from_toml_str("[colour]\n").unwrap_err();
    assert!(matches!(err, FamflowError::Serde(_)));
}

#[test]
fn out_of_range_values_are_validation_errors() {
    for doc in [
        "[animation]\nfps = 0\n",
        "[animation]\nline_duration = -1.0\n",
        "[style.dimensions]\ndpi = 0.0\n",
        "[style.dimensions]\nnode_width_scale = -2.0\n",
        "[layout]\nprogram = \"  \"\n",
    ] {
        let err = AppConfig::from_toml_str(doc).unwrap_err();
        assert!(matches!(err, FamflowError::Validation(_)), "{doc}: {err}");
    }
}

#[test]
fn color_channels_must_fit_a_byte() {
    let err = AppConfig::from_toml_str("[style.colors]\ntext = [0, 300, 0]\n").unwrap_err();
    assert!(matches!(err, FamflowError::Serde(_)));
}

#[test]
fn explicit_path_is_loaded() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("famflow.toml");
    std::fs::write(&path, "[logging]\nlevel = \"debug\"\n").unwrap();
    let cfg = load_config(Some(&path)).unwrap();
    assert_eq!(cfg.logging.level, "debug");
}

#[test]
fn missing_explicit_path_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_config(Some(&dir.path().join("nope.toml"))).is_err());
}

#[test]
fn derived_parameters_follow_sections() {
    let cfg = AppConfig::default();
    assert_eq!(cfg.fps().unwrap().as_f64(), 24.0);
    assert_eq!(cfg.layout_params(), LayoutParams::default());
    assert_eq!(cfg.timeline_params(), TimelineParams::default());
    assert_eq!(cfg.solver().program(), "dot");
}
