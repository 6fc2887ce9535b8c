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

use std::mem;

use color_eyre::eyre::Result;

use crate::protocol::{
    datatypes::{Bounded, VarInt},
    Decode, Encode, Packet,
};

#[derive(Debug)]
pub struct LoginStartS<'a> {
    pub name: Bounded<&'a str, 16>,
}

impl Packet for LoginStartS<'_> {
    const ID: i32 = 0x00;
}

impl Encode for LoginStartS<'_> {
    fn encode(&self, w: impl std::io::Write) -> Result<()> {
        self.name.encode(w)
    }
}

/// Sent instead of [`LoginSuccessC`] when the server refuses us. The reason is a chat component.
#[derive(Debug)]
pub struct LoginDisconnectC<'a> {
    pub reason: Bounded<&'a str>,
}

impl Packet for LoginDisconnectC<'_> {
    const ID: i32 = 0x00;
}

impl<'a> Decode<'a> for LoginDisconnectC<'a> {
    fn decode(r: &mut &'a [u8]) -> Result<Self> {
        Ok(Self {
            reason: Bounded::<&'a str>::decode(r)?,
        })
    }
}

/// Online-mode servers ask for encryption here. We only need to recognise it to refuse it, so
/// the body is skipped wholesale.
#[derive(Debug)]
pub struct EncryptionRequestC;

impl Packet for EncryptionRequestC {
    const ID: i32 = 0x01;
}

impl Decode<'_> for EncryptionRequestC {
    fn decode(r: &mut &'_ [u8]) -> Result<Self> {
        mem::take(r);
        Ok(Self)
    }
}

#[derive(Debug)]
pub struct LoginSuccessC<'a> {
    pub uuid: Bounded<&'a str, 36>,
    pub username: Bounded<&'a str, 16>,
}

impl Packet for LoginSuccessC<'_> {
    const ID: i32 = 0x02;
}

impl<'a> Decode<'a> for LoginSuccessC<'a> {
    fn decode(r: &mut &'a [u8]) -> Result<Self> {
        Ok(Self {
            uuid: Bounded::<&'a str, 36>::decode(r)?,
            username: Bounded::<&'a str, 16>::decode(r)?,
        })
    }
}

#[derive(Debug)]
pub struct SetCompressionC {
    pub threshold: VarInt,
}

impl Packet for SetCompressionC {
    const ID: i32 = 0x03;
}

impl Decode<'_> for SetCompressionC {
    fn decode(r: &mut &'_ [u8]) -> Result<Self> {
        Ok(Self {
            threshold: VarInt::decode(r)?,
        })
    }
}
