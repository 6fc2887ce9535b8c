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

//! Destinations for rendered chat.

mod replay;

pub use replay::*;

use std::{
    fs::{File, OpenOptions},
    io::{self, Stdout, Write},
    path::Path,
};

use color_eyre::eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    chat::{self, LinkAction},
    protocol::packets::play::ChatPosition,
};

/// A chat packet after rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub position: ChatPosition,
    pub json: Value,
    pub formatted: String,
    pub plain: String,
    pub links: Vec<LinkAction>,
}

impl ChatMessage {
    pub fn from_packet(position: ChatPosition, raw: &str) -> Result<Self> {
        let json: Value =
            serde_json::from_str(raw).wrap_err_with(|| format!("Chat message isn't JSON: {raw}"))?;
        let rendered = chat::render(&json);

        Ok(Self {
            position,
            json,
            formatted: rendered.formatted,
            plain: rendered.plain,
            links: rendered.links,
        })
    }
}

pub trait ChatSink {
    fn consume(&mut self, message: &ChatMessage) -> Result<()>;
}

/// Prints each message followed by its links.
pub struct ConsoleSink<W> {
    out: W,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl ConsoleSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ChatSink for ConsoleSink<W> {
    fn consume(&mut self, message: &ChatMessage) -> Result<()> {
        writeln!(self.out, "{}: {}", message.position, message.formatted)?;
        for link in &message.links {
            writeln!(self.out, "Link: {}: {}", link.action, link.value)?;
        }

        self.out.flush()?;
        Ok(())
    }
}

/// One line of a recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinkRecord {
    pub json_data: Value,
    pub position: ChatPosition,
}

/// Appends every message to a file, one JSON record per line. [`ReplayReader`] reads these back.
#[derive(Debug)]
pub struct FileSink {
    file: File,
}

impl FileSink {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .wrap_err_with(|| format!("Failed to open {} for recording", path.display()))?;

        Ok(Self { file })
    }
}

impl ChatSink for FileSink {
    fn consume(&mut self, message: &ChatMessage) -> Result<()> {
        let record = SinkRecord {
            json_data: message.json.clone(),
            position: message.position,
        };

        let mut line = serde_json::to_vec(&record)?;
        line.push(b'\n');
        self.file
            .write_all(&line)
            .wrap_err("Failed to append chat record")?;

        Ok(())
    }
}

#[cfg(test)]
pub use capture::CaptureSink;
