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

pub mod datatypes {
    mod impls;
    mod string;
    mod variable;

    pub use impls::*;
    pub use string::*;
    pub use variable::*;
}

pub mod packets {
    pub mod login {
        mod handshake;
        #[expect(clippy::module_inception)]
        mod login;

        pub use handshake::*;
        pub use login::*;
    }

    pub mod play {
        mod chat;
        mod disconnect;
        mod join;
        mod keepalive;
        mod player_list;
        mod status;

        pub use chat::*;
        pub use disconnect::*;
        pub use join::*;
        pub use keepalive::*;
        pub use player_list::*;
        pub use status::*;
    }
}

mod decoder;
mod encoder;

use std::{fmt::Debug, io::Write};

use color_eyre::eyre::{Context, Result};
use datatypes::VarInt;
pub use decoder::*;
pub use encoder::*;

/// Minecraft 1.12.2
pub const PROTOCOL_VERSION: i32 = 340;

const MAX_PACKET_SIZE: i32 = 2097152;

pub trait Encode {
    fn encode(&self, w: impl Write) -> Result<()>;
}

pub trait Decode<'a>: Sized {
    fn decode(r: &mut &'a [u8]) -> Result<Self>;
}

pub trait DecodeSized<'a>: Sized {
    fn decode(times: usize, r: &mut &'a [u8]) -> Result<Self>;
}

/// The state requested by the `next_state` field of a handshake.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProtocolState {
    Status,
    Login,
}

impl Encode for ProtocolState {
    fn encode(&self, w: impl Write) -> Result<()> {
        let state = match self {
            ProtocolState::Status => 1,
            ProtocolState::Login => 2,
        };

        VarInt(state).encode(w)
    }
}

pub trait Packet {
    const ID: i32;
}

/// A packet sent by the server, which we only ever need to read.
pub trait ClientboundPacket<'a>: Packet + Decode<'a> + Debug {}
impl<'a, P> ClientboundPacket<'a> for P where P: Packet + Decode<'a> + Debug {}

/// A packet we send to the server.
pub trait ServerboundPacket: Packet + Encode + Debug {
    fn encode_packet(&self, mut w: impl Write) -> Result<()>
    where
        Self: Encode,
    {
        VarInt(Self::ID)
            .encode(&mut w)
            .context("Failed to encode packet id")?;

        self.encode(w)
    }
}
impl<P> ServerboundPacket for P where P: Packet + Encode + Debug {}
