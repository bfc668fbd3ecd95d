// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Environment variable that overrides any relative config path.
pub const CONFIG_ENV_VAR: &str = "SED_CLIENT_CONFIG";

/// Resolves a config path to a canonical absolute path. The
/// `SED_CLIENT_CONFIG` environment variable, when set, wins over a relative
/// `rel`.
pub fn resolve_config_path(rel: &str) -> Result<PathBuf> {
    let p = Path::new(rel);

    let abs = if p.is_absolute() {
        p.to_path_buf()
    } else if let Ok(from_env) = std::env::var(CONFIG_ENV_VAR) {
        PathBuf::from(from_env)
    } else {
        std::env::current_dir()
            .context("cannot get current working dir")?
            .join(p)
    };

    let canon = abs
        .canonicalize()
        .with_context(|| format!("failed to canonicalize path {abs:?}"))?;

    Ok(canon)
}
