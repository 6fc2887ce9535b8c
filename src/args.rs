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

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(version, about = "Headless chat client for 1.12.2 servers")]
pub struct Args {
    /// Where players and the server address are saved.
    #[arg(short, long, env = "LURKER_CONFIG", default_value = "config.json")]
    pub config: PathBuf,
    /// Index of the saved player to log in as. Asks if there's more than one and this isn't set.
    #[arg(short, long)]
    pub player: Option<usize>,
    /// Join without a session, for servers in offline mode.
    #[arg(long)]
    pub offline: bool,
    /// Invalidate the selected player's saved session and exit.
    #[arg(long, conflicts_with_all = ["offline", "replay"])]
    pub logout: bool,
    /// Also append every chat message to this file.
    #[arg(long)]
    pub record: Option<PathBuf>,
    /// Print a file written by --record instead of connecting.
    #[arg(long, conflicts_with = "record")]
    pub replay: Option<PathBuf>,
    /// Server to join. Defaults to the saved address.
    #[arg(short, long)]
    address: Option<String>,
    /// Port to join on. Defaults to the saved port.
    #[arg(long)]
    port: Option<u16>,
}

impl Args {
    #[inline(always)]
    pub fn address(&self, saved: &str) -> String {
        self.address.clone().unwrap_or_else(|| saved.to_owned())
    }

    #[inline(always)]
    pub fn port(&self, saved: u16) -> u16 {
        self.port.unwrap_or(saved)
    }
}
