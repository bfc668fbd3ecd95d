// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::time::Duration;

use anyhow::{Context, Result};
use sed_client_rs::cfg::{
    cli::resolve_config_path,
    config::{Config, RuntimeConfig},
    enums::InterfaceKind,
};

#[test]
fn loads_and_validates_the_sample_config() -> Result<()> {
    let cfg = resolve_config_path("tests/config.yaml")
        .and_then(Config::load_from_file)
        .context("failed to resolve or load config")?;

    assert_eq!(cfg.device.path, "/dev/nvme0");
    assert_eq!(cfg.device.interface, InterfaceKind::Nvme);
    assert_eq!(cfg.runtime.response_buffer_bytes, 2048);
    assert_eq!(cfg.runtime.session_timeout, Some(Duration::from_secs(30)));
    assert_eq!(cfg.session_timeout_ms(), Some(30_000));
    Ok(())
}

#[test]
fn buffer_size_has_a_floor() {
    let yaml = r#"
device:
  Path: /dev/nvme0
  Interface: nvme
runtime:
  ResponseBufferBytes: 16
"#;
    let cfg: Config = serde_yaml::from_str(yaml).expect("yaml must parse");
    assert!(cfg.validate().is_err());
}

#[test]
fn empty_device_path_is_rejected() {
    let yaml = r#"
device:
  Path: ""
  Interface: nvme
runtime: {}
"#;
    let cfg: Config = serde_yaml::from_str(yaml).expect("yaml must parse");
    assert!(cfg.validate().is_err());
}

#[test]
fn runtime_defaults_apply() {
    let runtime = RuntimeConfig::default();
    assert_eq!(runtime.response_buffer_bytes, 2048);
    assert_eq!(runtime.session_timeout, None);
}

#[test]
fn logger_initializes_exactly_once() -> Result<()> {
    let path = resolve_config_path("tests/logger.yaml")?;
    let path = path.to_str().context("logger config path is not UTF-8")?;

    let _guard = sed_client_rs::cfg::logger::init_logger(path)?;
    tracing::debug!("logger smoke test");
    // The global subscriber is already claimed.
    assert!(sed_client_rs::cfg::logger::init_logger(path).is_err());
    Ok(())
}
