// tests/config.rs
use symbios_script::{AngleUnit, EngineConfig, RewriteConfig, TurtleConfig};

#[test]
fn missing_fields_take_defaults() {
    let config: EngineConfig = serde_json::from_str(
        r#"{ "rewrite": { "iterations": 3 }, "turtle": { "angle_unit": "Degrees" } }"#,
    )
    .unwrap();

    assert_eq!(config.rewrite.iterations, 3);
    assert_eq!(config.rewrite.seed, RewriteConfig::default().seed);
    assert_eq!(config.rewrite.max_modules, RewriteConfig::default().max_modules);
    assert_eq!(config.turtle.angle_unit, AngleUnit::Degrees);
    assert_eq!(config.turtle.default_length, 1.0);
    assert!(!config.standard_symbols);
}

#[test]
fn empty_object_is_the_default_config() {
    let config: EngineConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, EngineConfig::default());
}

#[test]
fn config_survives_serialization() {
    let config = EngineConfig {
        rewrite: RewriteConfig {
            iterations: 6,
            seed: 42,
            max_modules: 10_000,
        },
        turtle: TurtleConfig {
            default_angle: 25.0,
            angle_unit: AngleUnit::Degrees,
            ..Default::default()
        },
        standard_symbols: true,
    };

    let json = serde_json::to_string(&config).unwrap();
    let back: EngineConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}

#[test]
fn defaults_are_sane() {
    let turtle = TurtleConfig::default();
    assert_eq!(turtle.angle_unit, AngleUnit::Radians);
    assert!((turtle.default_angle - std::f32::consts::FRAC_PI_4).abs() < 1e-6);
    assert_eq!(turtle.max_stack_depth, 1024);
    assert_eq!(RewriteConfig::default().iterations, 1);
}
