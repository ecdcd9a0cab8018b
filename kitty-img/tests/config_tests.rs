// ABOUTME: Tests for configuration file loading, validation, and merging
// ABOUTME: Tests TOML parsing, chunk size rules, and path precedence

use kitty_img::config::Config;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_config_deserialize_complete() {
    let toml_content = r#"
        chunk_size = 2048
        image_id = 42
        z_index = -1
        columns = 80
        rows = 24
        loop_count = 3
        force = true
    "#;

    let config: Config = toml::from_str(toml_content).expect("Should parse valid TOML");

    assert_eq!(config.chunk_size, Some(2048));
    assert_eq!(config.placement.image_id, 42);
    assert_eq!(config.placement.z_index, -1);
    assert_eq!(config.placement.columns, 80);
    assert_eq!(config.placement.rows, 24);
    assert_eq!(config.loop_count, Some(3));
    assert_eq!(config.force, Some(true));
}

#[test]
fn test_config_deserialize_empty() {
    let config: Config = toml::from_str("").expect("Should parse empty TOML");
    assert_eq!(config, Config::default());
    assert_eq!(config.chunk_size_or_default(), 4096);
}

#[test]
fn test_chunk_size_must_be_base64_aligned() {
    let result: Result<Config, _> = toml::from_str("chunk_size = 1001");
    let err = result.expect_err("unaligned chunk size should be rejected");
    assert!(err.to_string().contains("multiple of 4"));

    let result: Result<Config, _> = toml::from_str("chunk_size = 0");
    assert!(result.is_err());
}

#[test]
fn test_unknown_fields_are_ignored() {
    let config: Config = toml::from_str("image_id = 3\ntheme = \"dark\"").unwrap();
    assert_eq!(config.placement.image_id, 3);
}

#[test]
fn test_load_from_paths_precedence() {
    let dir = TempDir::new().unwrap();
    let user = dir.path().join("config.toml");
    let project = dir.path().join("kitty-img.toml");

    fs::write(&user, "image_id = 1\ncolumns = 40\nchunk_size = 1024").unwrap();
    fs::write(&project, "image_id = 2").unwrap();

    let config = Config::load_from_paths(&[&user, &project]).unwrap();
    assert_eq!(config.placement.image_id, 2);
    assert_eq!(config.placement.columns, 40);
    assert_eq!(config.chunk_size_or_default(), 1024);
}

#[test]
fn test_missing_files_are_skipped() {
    let dir = TempDir::new().unwrap();
    let present = dir.path().join("present.toml");
    fs::write(&present, "rows = 10").unwrap();

    let config =
        Config::load_from_paths(&[dir.path().join("absent.toml"), present.clone()]).unwrap();
    assert_eq!(config.placement.rows, 10);
}

#[test]
fn test_invalid_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let broken = dir.path().join("broken.toml");
    fs::write(&broken, "image_id = \"not a number\"").unwrap();

    let err = Config::load_from_file(&broken).unwrap_err();
    assert!(format!("{:#}", err).contains("broken.toml"));
}

#[test]
fn test_any_transfer_option_can_be_configured() {
    let config: Config = toml::from_str("placement_id = 4\nsrc_width = 320").unwrap();
    assert_eq!(config.placement.placement_id, 4);
    assert_eq!(config.placement.src_width, 320);
}
