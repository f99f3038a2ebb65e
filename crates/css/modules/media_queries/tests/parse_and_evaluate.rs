use css_media_queries::{
    AmbientPreferences, FeatureName, FeatureOverrides, FeatureValue, MediaEnvironment,
    MediaFeature, MediaQuery, ParseError, RangeKind, ViewportSize, evaluate, parse_media_query,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn matches_with(query: &str, width: f32, height: f32, overrides: &FeatureOverrides) -> bool {
    let ambient = AmbientPreferences::default();
    let env = MediaEnvironment::new(overrides, &ambient);
    parse_media_query(query)
        .is_ok_and(|tree| evaluate(&tree, ViewportSize::new(width, height), &env))
}

fn matches(query: &str, width: f32, height: f32) -> bool {
    matches_with(query, width, height, &FeatureOverrides::new())
}

fn width_feature(range: RangeKind, value: f32) -> MediaQuery {
    MediaQuery::Feature(MediaFeature {
        name: FeatureName::Width,
        range,
        value: FeatureValue::Number(value),
    })
}

#[test]
fn dimension_queries_compare_against_viewport() {
    init_logging();
    assert!(matches("(min-width: 500px)", 600.0, 800.0));
    assert!(!matches("(min-width: 500px)", 400.0, 800.0));
    assert!(matches("(max-height: 800px)", 600.0, 800.0));
    assert!(!matches("(max-height: 799px)", 600.0, 800.0));
    assert!(matches("(width: 600px)", 600.0, 800.0));
    assert!(matches("(height: 800)", 600.0, 800.0));
}

#[test]
fn non_pixel_units_are_taken_literally() {
    init_logging();
    assert_eq!(
        parse_media_query("(min-width: 30em)"),
        Ok(width_feature(RangeKind::Min, 30.0))
    );
    assert!(matches("(min-width: 30rem)", 31.0, 10.0));
    assert!(parse_media_query("(min-width: 30vw)").is_err());
}

#[test]
fn orientation_follows_height_versus_width() {
    init_logging();
    assert!(matches("(orientation: portrait)", 600.0, 800.0));
    assert!(!matches("(orientation: landscape)", 600.0, 800.0));
    assert!(matches("(orientation: portrait)", 500.0, 500.0));
    assert!(matches("(orientation: landscape)", 1024.0, 768.0));
}

#[test]
fn aspect_ratio_queries() {
    init_logging();
    assert!(matches("(aspect-ratio: 16/9)", 1920.0, 1080.0));
    assert!(matches("(min-aspect-ratio: 4/3)", 1920.0, 1080.0));
    assert!(!matches("(max-aspect-ratio: 1/1)", 1920.0, 1080.0));
    assert!(parse_media_query("(aspect-ratio: 16/0)").is_err());
    assert!(parse_media_query("(aspect-ratio: 1.5/1)").is_err());
}

#[test]
fn compound_queries() {
    init_logging();
    assert!(matches(
        "(min-width: 500px) and (max-width: 700px)",
        600.0,
        800.0
    ));
    assert!(matches(
        "(max-width: 400px), (min-width: 500px)",
        600.0,
        800.0
    ));
    assert!(!matches(
        "(max-width: 400px), (min-width: 700px)",
        600.0,
        800.0
    ));
    assert!(matches(
        "screen and (min-width: 500px) AND (orientation: portrait)",
        600.0,
        800.0
    ));
}

#[test]
fn not_binds_to_its_own_clause_only() {
    init_logging();
    let parsed = parse_media_query("not (min-width: 500px) and (max-width: 700px)");
    assert_eq!(
        parsed,
        Ok(MediaQuery::and(
            MediaQuery::negate(width_feature(RangeKind::Min, 500.0)),
            width_feature(RangeKind::Max, 700.0),
        ))
    );
    // (not A) and B is false at 800px wide; not (A and B) would be true.
    assert!(!matches(
        "not (min-width: 500px) and (max-width: 700px)",
        800.0,
        600.0
    ));
    assert!(matches("not (min-width: 500px)", 400.0, 600.0));
}

#[test]
fn comma_binds_loosest() {
    init_logging();
    let parsed = parse_media_query("(width: 1px), (width: 2px) and (width: 3px)");
    assert_eq!(
        parsed,
        Ok(MediaQuery::or(
            width_feature(RangeKind::Exact, 1.0),
            MediaQuery::and(
                width_feature(RangeKind::Exact, 2.0),
                width_feature(RangeKind::Exact, 3.0),
            ),
        ))
    );
}

#[test]
fn whitespace_and_case_are_tolerated() {
    init_logging();
    assert_eq!(
        parse_media_query("  ( min-width : 500px )  "),
        parse_media_query("(min-width: 500px)")
    );
    assert_eq!(
        parse_media_query("(MIN-WIDTH: 500PX)"),
        parse_media_query("(min-width: 500px)")
    );
    assert!(matches("(PREFERS-COLOR-SCHEME: LIGHT)", 1.0, 1.0));
}

#[test]
fn bare_media_types_match_everything() {
    init_logging();
    assert_eq!(parse_media_query("screen"), Ok(MediaQuery::AllMedia));
    assert!(matches("all", 1.0, 1.0));
    assert!(matches("print and (min-width: 1px)", 2.0, 2.0));
}

#[test]
fn malformed_queries_are_rejected_whole() {
    init_logging();
    assert_eq!(parse_media_query(""), Err(ParseError::Empty));
    assert_eq!(parse_media_query("   \t "), Err(ParseError::Empty));
    assert_eq!(
        parse_media_query("invalid query"),
        Err(ParseError::Malformed {
            fragment: "invalid query".to_owned()
        })
    );
    assert_eq!(
        parse_media_query("(min-width: 500px) and (color: red)"),
        Err(ParseError::UnsupportedFeature {
            fragment: "(color: red)".to_owned()
        })
    );
    assert_eq!(
        parse_media_query("(min-width: 500px),"),
        Err(ParseError::Empty)
    );
    assert_eq!(
        parse_media_query("(max-width: 9px), (width: 1px) and (grid: 1)")
            .unwrap_err()
            .fragment(),
        Some("(grid: 1)")
    );
    assert_eq!(parse_media_query(" ").unwrap_err().fragment(), None);
    assert!(parse_media_query("(min-width: 500px) trailing").is_err());
    assert!(parse_media_query("(orientation: sideways)").is_err());
    assert!(parse_media_query("(min-hover: hover)").is_err());
    assert!(parse_media_query("(min-width: -5px)").is_err());
    assert!(!matches("invalid query", 600.0, 800.0));
}

#[test]
fn static_features_use_overrides_then_defaults() {
    init_logging();
    assert!(matches("(hover: hover)", 1.0, 1.0));
    assert!(matches("(pointer: fine)", 1.0, 1.0));
    assert!(!matches("(pointer: coarse)", 1.0, 1.0));
    assert!(matches("(prefers-reduced-motion: no-preference)", 1.0, 1.0));
    assert!(matches("(prefers-contrast: no-preference)", 1.0, 1.0));
    assert!(!matches("(prefers-color-scheme: dark)", 1.0, 1.0));

    let overrides = FeatureOverrides::new()
        .with("prefers-color-scheme", "dark")
        .with("pointer", "coarse");
    assert!(matches_with("(prefers-color-scheme: dark)", 1.0, 1.0, &overrides));
    assert!(matches_with("(pointer: coarse)", 1.0, 1.0, &overrides));
    assert!(!matches_with("(pointer: fine)", 1.0, 1.0, &overrides));
}

#[test]
fn ambient_preferences_fill_in_missing_overrides() {
    init_logging();
    let overrides = FeatureOverrides::new();
    let ambient = AmbientPreferences {
        color_scheme: Some("dark".to_owned()),
        ..AmbientPreferences::default()
    };
    let env = MediaEnvironment::new(&overrides, &ambient);
    let tree = parse_media_query("(prefers-color-scheme: dark)").unwrap();
    assert!(evaluate(&tree, ViewportSize::new(1.0, 1.0), &env));
}
