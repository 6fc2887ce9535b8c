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

use color_eyre::eyre::Result;

use crate::protocol::{Decode, Encode, Packet};

#[derive(Debug, Clone, Copy)]
pub struct KeepAliveC(pub i64);

impl Packet for KeepAliveC {
    const ID: i32 = 0x1F;
}

impl Decode<'_> for KeepAliveC {
    fn decode(r: &mut &'_ [u8]) -> Result<Self> {
        Ok(Self(i64::decode(r)?))
    }
}

/// Echoes the id of a [`KeepAliveC`]; the server kicks us if this is late.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepAliveS(pub i64);

impl Packet for KeepAliveS {
    const ID: i32 = 0x0B;
}

impl Encode for KeepAliveS {
    fn encode(&self, w: impl std::io::Write) -> Result<()> {
        self.0.encode(w)
    }
}
