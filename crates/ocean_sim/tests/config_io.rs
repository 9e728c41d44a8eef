//! Config file save/load.

use ocean_sim::{ConfigError, SceneConfig};
use std::path::PathBuf;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("ocean_sim_{}_{}", std::process::id(), name))
}

#[test]
fn yaml_and_json_load_same_scene() {
    let mut config = SceneConfig::default();
    config.water.grid_res = 48;
    config.particles.seed = Some(123);
    config.sun.period = 60.0;

    let json = temp_path("scene.json");
    let yaml = temp_path("scene.yaml");
    config.save_json(&json).unwrap();
    config.save_yaml(&yaml).unwrap();

    let from_json = SceneConfig::load(&json).unwrap();
    let from_yaml = SceneConfig::load(&yaml).unwrap();
    for loaded in [&from_json, &from_yaml] {
        assert_eq!(loaded.water.grid_res, 48);
        assert_eq!(loaded.particles.seed, Some(123));
        assert_eq!(loaded.sun.period, 60.0);
        assert_eq!(loaded.islands.len(), config.islands.len());
    }

    let _ = std::fs::remove_file(json);
    let _ = std::fs::remove_file(yaml);
}

#[test]
fn invalid_file_is_rejected() {
    let path = temp_path("bad.json");
    std::fs::write(&path, r#"{ "particles": { "count": 0 } }"#).unwrap();
    assert!(matches!(SceneConfig::load(&path), Err(ConfigError::Invalid(_))));
    let _ = std::fs::remove_file(path);
}

#[test]
fn missing_file_is_io_error() {
    let path = temp_path("does_not_exist.yaml");
    assert!(matches!(SceneConfig::load(&path), Err(ConfigError::Io(_))));
}

#[test]
fn malformed_file_is_parse_error() {
    let path = temp_path("garbage.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(SceneConfig::load(&path), Err(ConfigError::Parse(_))));
    let _ = std::fs::remove_file(path);
}

#[test]
fn non_finite_yaml_values_are_invalid() {
    let cases = [
        ("nan_width.yaml", "particles:\n  tunnel_width: .nan\n  seed: 1\n"),
        ("nan_distance.yaml", "particles:\n  min_distance: .nan\n"),
        ("inf_life.yaml", "particles:\n  life: .inf\n"),
        ("inf_period.yaml", "sun:\n  period: .inf\n"),
        ("neg_inf_grid.yaml", "water:\n  grid_size: -.inf\n"),
    ];
    for (name, yaml) in cases {
        let path = temp_path(name);
        std::fs::write(&path, yaml).unwrap();
        let result = SceneConfig::load(&path);
        let _ = std::fs::remove_file(&path);
        assert!(
            matches!(result, Err(ConfigError::Invalid(_))),
            "{name}: expected Invalid, got {:?}",
            result.map(|_| ())
        );
    }
}
