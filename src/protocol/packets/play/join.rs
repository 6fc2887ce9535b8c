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
pub struct JoinGameC {
    pub entity_id: i32,
    pub gamemode: u8,
    pub dimension: i32,
    pub difficulty: u8,
    pub max_players: u8,
    pub level_type: String,
    pub reduced_debug_info: bool,
}

impl Packet for JoinGameC {
    const ID: i32 = 0x23;
}

impl Decode<'_> for JoinGameC {
    fn decode(r: &mut &'_ [u8]) -> Result<Self> {
        Ok(Self {
            entity_id: i32::decode(r)?,
            gamemode: u8::decode(r)?,
            dimension: i32::decode(r)?,
            difficulty: u8::decode(r)?,
            max_players: u8::decode(r)?,
            level_type: Bounded::<&str, 16>::decode(r)?.0.to_owned(),
            reduced_debug_info: bool::decode(r)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Encode;

    #[test]
    fn decodes_join_game() {
        let mut body = Vec::new();
        42i32.encode(&mut body).unwrap();
        body.push(1);
        (-1i32).encode(&mut body).unwrap();
        body.push(2);
        body.push(20);
        Bounded::<_, 16>("default").encode(&mut body).unwrap();
        body.push(0);

        let mut r = &body[..];
        let join = JoinGameC::decode(&mut r).unwrap();
        assert_eq!(join.entity_id, 42);
        assert_eq!(join.gamemode, 1);
        assert_eq!(join.dimension, -1);
        assert_eq!(join.difficulty, 2);
        assert_eq!(join.max_players, 20);
        assert_eq!(join.level_type, "default");
        assert!(!join.reduced_debug_info);
        assert!(r.is_empty());
    }
}
