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

use crate::protocol::{datatypes::Bounded, Decode, Packet};

#[derive(Debug, Clone)]
pub struct DisconnectC {
    /// A chat component explaining why we were kicked.
    pub reason: String,
}

impl Packet for DisconnectC {
    const ID: i32 = 0x1A;
}

impl Decode<'_> for DisconnectC {
    fn decode(r: &mut &'_ [u8]) -> Result<Self> {
        Ok(Self {
            reason: Bounded::<&str>::decode(r)?.0.to_owned(),
        })
    }
}
