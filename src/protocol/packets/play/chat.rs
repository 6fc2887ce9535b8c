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

use std::fmt::Display;

use color_eyre::eyre::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocol::{datatypes::Bounded, Decode, Encode, Packet};

/// Where the client is asked to show a chat message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChatPosition {
    Chat,
    System,
    GameInfo,
}

#[derive(Error, Debug)]
pub enum PositionDecodeError {
    #[error("Unable to decode {0} into a ChatPosition")]
    InvalidPosition(i8),
}

impl TryFrom<i8> for ChatPosition {
    type Error = PositionDecodeError;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ChatPosition::Chat),
            1 => Ok(ChatPosition::System),
            2 => Ok(ChatPosition::GameInfo),
            i => Err(PositionDecodeError::InvalidPosition(i)),
        }
    }
}

impl Display for ChatPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ChatPosition::Chat => "CHAT",
            ChatPosition::System => "SYSTEM",
            ChatPosition::GameInfo => "GAME_INFO",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessageC {
    pub json: String,
    pub position: ChatPosition,
}

impl Packet for ChatMessageC {
    const ID: i32 = 0x0F;
}

impl Decode<'_> for ChatMessageC {
    fn decode(r: &mut &'_ [u8]) -> Result<Self> {
        Ok(Self {
            json: Bounded::<&str>::decode(r)?.0.to_owned(),
            position: ChatPosition::try_from(i8::decode(r)?)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatS {
    pub message: String,
}

impl ChatS {
    pub const MAX_LEN: usize = 256;
}

impl Packet for ChatS {
    const ID: i32 = 0x02;
}

impl Encode for ChatS {
    fn encode(&self, w: impl std::io::Write) -> Result<()> {
        Bounded::<_, { ChatS::MAX_LEN }>(self.message.as_str()).encode(w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat_body(json: &str, position: u8) -> Vec<u8> {
        let mut body = Vec::new();
        Bounded::<_, 32767>(json).encode(&mut body).unwrap();
        body.push(position);
        body
    }

    #[test]
    fn decodes_system_message() {
        let body = chat_body(r#"{"text":"hi"}"#, 1);
        let mut r = &body[..];
        let packet = ChatMessageC::decode(&mut r).unwrap();

        assert_eq!(packet.json, r#"{"text":"hi"}"#);
        assert_eq!(packet.position, ChatPosition::System);
        assert!(r.is_empty());
    }

    #[test]
    fn rejects_unknown_position() {
        let body = chat_body("{}", 7);
        let mut r = &body[..];
        assert!(ChatMessageC::decode(&mut r).is_err());
    }

    #[test]
    fn position_names_match_serde() {
        for position in [ChatPosition::Chat, ChatPosition::System, ChatPosition::GameInfo] {
            let json = serde_json::to_string(&position).unwrap();
            assert_eq!(json, format!("\"{position}\""));
        }
    }

    #[test]
    fn chat_over_limit_fails_to_encode() {
        let mut buf = Vec::new();
        let packet = ChatS {
            message: "x".repeat(ChatS::MAX_LEN + 1),
        };
        assert!(packet.encode(&mut buf).is_err());
    }
}
