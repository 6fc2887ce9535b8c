/*
 * Copyright (c) 2024 Andrew Brower.
 * This file is part of Lurker.
 *
 * Lurker is free software: you can redistribute it and/or
 * modify it under the terms of the GNU Affero General Public
 * License as published by the Free Software Foundation, either
 * version 3 of the License, or (at your option) any later version.
 *
 * Lurker is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU
 * Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public
 * License along with Lurker. If not, see
 * <https://www.gnu.org/licenses/>.
 */

use std::{fs, io::ErrorKind, path::Path};

use color_eyre::eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::player::Player;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".into(),
            port: 25565,
        }
    }
}

/// Everything kept in `config.json` between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub players: Vec<Player>,
}

impl AppConfig {
    /// Reads the config at `path`. A missing or empty file gives the defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("{} doesn't exist, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).wrap_err_with(|| format!("Failed to read {}", path.display()));
            }
        };

        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_json::from_str(&contents)
            .wrap_err_with(|| format!("Failed to parse {}", path.display()))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let mut contents = serde_json::to_string_pretty(self)?;
        contents.push('\n');
        fs::write(path, contents).wrap_err_with(|| format!("Failed to write {}", path.display()))?;

        debug!("Saved config to {}", path.display());
        Ok(())
    }
}
