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

use std::{fs, path::Path};

use color_eyre::eyre::{Context, Result};

use crate::{
    net::{Dispatcher, Listener, PacketKind, PacketSource, PlayPacket},
    protocol::packets::play::ChatMessageC,
};

use super::SinkRecord;

/// Plays a [`FileSink`](super::FileSink) recording back to listeners as if it came off the wire.
#[derive(Debug, Default)]
pub struct ReplayReader {
    /// Stored back to front so the next record is at the end.
    records: Vec<SinkRecord>,
    dispatcher: Dispatcher,
}

impl ReplayReader {
    pub fn read_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read recording {}", path.display()))?;

        let mut records = contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| {
                serde_json::from_str(line)
                    .wrap_err_with(|| format!("Bad record on line {} of {}", i + 1, path.display()))
            })
            .collect::<Result<Vec<SinkRecord>>>()?;
        records.reverse();

        debug!("Loaded {} records from {}", records.len(), path.display());

        Ok(Self {
            records,
            dispatcher: Dispatcher::new(),
        })
    }

    pub fn remaining(&self) -> usize {
        self.records.len()
    }

    /// Delivers the next record as a chat packet. Returns whether any records are left.
    pub fn dispatch(&mut self) -> Result<bool> {
        let Some(record) = self.records.pop() else {
            return Ok(false);
        };

        let packet = PlayPacket::Chat(ChatMessageC {
            json: serde_json::to_string(&record.json_data)?,
            position: record.position,
        });
        self.dispatcher.dispatch(&packet)?;

        Ok(!self.records.is_empty())
    }
}

impl PacketSource for ReplayReader {
    fn register_listener(&mut self, kind: PacketKind, listener: Listener) {
        self.dispatcher.register_listener(kind, listener);
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::Write,
        sync::{Arc, Mutex},
    };

    use super::*;
    use crate::{
        protocol::packets::play::ChatPosition,
        sink::{ChatMessage, ChatSink, FileSink},
    };

    fn collect(reader: &mut ReplayReader) -> Arc<Mutex<Vec<ChatMessageC>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let handle = seen.clone();
        reader.register_listener(
            PacketKind::Chat,
            Box::new(move |packet: &PlayPacket| -> Result<()> {
                if let PlayPacket::Chat(chat) = packet {
                    handle.lock().unwrap().push(chat.clone());
                }
                Ok(())
            }),
        );
        seen
    }

    #[test]
    fn replays_recording_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.jsonl");

        let mut sink = FileSink::open(&path).unwrap();
        for (position, raw) in [
            (ChatPosition::Chat, r#"{"text":"first"}"#),
            (ChatPosition::System, r#"{"text":"second"}"#),
            (ChatPosition::GameInfo, r#"{"text":"third"}"#),
        ] {
            sink.consume(&ChatMessage::from_packet(position, raw).unwrap())
                .unwrap();
        }

        let mut reader = ReplayReader::read_file(&path).unwrap();
        let seen = collect(&mut reader);
        assert_eq!(reader.remaining(), 3);

        assert!(reader.dispatch().unwrap());
        assert!(reader.dispatch().unwrap());
        assert!(!reader.dispatch().unwrap());
        assert!(!reader.dispatch().unwrap());

        let seen = seen.lock().unwrap();
        let texts: Vec<_> = seen
            .iter()
            .map(|c| ChatMessage::from_packet(c.position, &c.json).unwrap().plain)
            .collect();
        assert_eq!(texts, ["first", "second", "third"]);
        assert_eq!(seen[2].position, ChatPosition::GameInfo);
    }

    #[test]
    fn blank_lines_are_ignored() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"json_data":{{"text":"a"}},"position":"CHAT"}}"#).unwrap();
        writeln!(file).unwrap();
        writeln!(file, "   ").unwrap();

        let mut reader = ReplayReader::read_file(file.path()).unwrap();
        let seen = collect(&mut reader);

        assert_eq!(reader.remaining(), 1);
        assert!(!reader.dispatch().unwrap());
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn bad_records_fail_to_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"json_data":{{}},"position":"NOWHERE"}}"#).unwrap();

        assert!(ReplayReader::read_file(file.path()).is_err());
    }
}
