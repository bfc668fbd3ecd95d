// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::cfg::enums::InterfaceKind;

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct Config {
    /// Which device to manage and how to reach it.
    pub device: DeviceConfig,
    /// Implementation/runtime parameters that live outside the TCG protocol.
    pub runtime: RuntimeConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct DeviceConfig {
    #[serde(rename = "Path")]
    /// Block device node, e.g. `/dev/nvme0`.
    pub path: String,

    #[serde(rename = "Interface")]
    /// Transport used for Security Send/Receive.
    pub interface: InterfaceKind,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct RuntimeConfig {
    #[serde(rename = "ResponseBufferBytes", default = "default_response_buffer")]
    /// Initial IF-RECV buffer size. Grown on demand when the TPer reports a
    /// larger minimum transfer.
    pub response_buffer_bytes: usize,

    #[serde(
        rename = "SessionTimeout",
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_opt_secs"
    )]
    /// Session timeout negotiated in StartSession.
    pub session_timeout: Option<Duration>,
}

fn default_response_buffer() -> usize {
    2048
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            response_buffer_bytes: default_response_buffer(),
            session_timeout: None,
        }
    }
}

impl Config {
    /// Loads the configuration from YAML, validates it, and returns the
    /// ready-to-use value.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path)?;
        let cfg: Config = serde_yaml::from_str(&s).context("failed to parse config YAML")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates invariants across the whole file.
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.device.path.is_empty(), "device Path must not be empty");
        ensure!(
            self.runtime.response_buffer_bytes >= 512,
            "ResponseBufferBytes must be at least 512"
        );
        if let Some(timeout) = self.runtime.session_timeout {
            ensure!(
                timeout >= Duration::from_secs(1),
                "SessionTimeout must be at least one second"
            );
        }
        Ok(())
    }

    /// Session timeout in the milliseconds StartSession wants, when set.
    pub fn session_timeout_ms(&self) -> Option<u32> {
        self.runtime
            .session_timeout
            .map(|timeout| timeout.as_millis().min(u128::from(u32::MAX)) as u32)
    }
}

/// Serde helpers representing an optional `Duration` as seconds.
mod serde_opt_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        d: &Option<Duration>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        match d {
            Some(d) => s.serialize_some(&d.as_secs()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<Duration>, D::Error> {
        let secs = Option::<u64>::deserialize(d)?;
        Ok(secs.map(Duration::from_secs))
    }
}
