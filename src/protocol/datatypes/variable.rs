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
use std::io::Write;

use byteorder::{ReadBytesExt, WriteBytesExt};
use color_eyre::eyre::Result;

use crate::protocol::{Decode, Encode};

#[derive(thiserror::Error, Debug)]
pub enum VariableDecodeError {
    #[error("VarInt exceeds 32 bits")]
    TooLong,
    #[error("VarInt incomplete")]
    Incomplete,
}

const SEGMENT_BITS: u8 = 0b01111111;
const CONTINUE_BIT: u8 = 0b10000000;

#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct VarInt(pub i32);

impl VarInt {
    pub const MAX_BYTES: usize = 5;

    /// Number of bytes this value occupies on the wire.
    pub fn len(self) -> usize {
        match self.0 {
            0 => 1,
            n => (31 - n.leading_zeros() as usize) / 7 + 1,
        }
    }
}

impl Display for VarInt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Decode<'_> for VarInt {
    fn decode(r: &mut &[u8]) -> Result<Self> {
        let mut v: i32 = 0;

        for i in 0..Self::MAX_BYTES {
            let byte = r.read_u8().map_err(|_| VariableDecodeError::Incomplete)?;
            v |= i32::from(byte & SEGMENT_BITS) << (i * 7);
            if byte & CONTINUE_BIT == 0 {
                return Ok(Self(v));
            }
        }

        Err(VariableDecodeError::TooLong)?
    }
}

impl Encode for VarInt {
    fn encode(&self, mut w: impl Write) -> Result<()> {
        let mut val = self.0 as u32;
        loop {
            if val & !u32::from(SEGMENT_BITS) == 0 {
                w.write_u8(val as u8)?;
                return Ok(());
            }
            w.write_u8(val as u8 & SEGMENT_BITS | CONTINUE_BIT)?;
            val >>= 7;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(v: i32) -> Vec<u8> {
        let mut buf = Vec::new();
        VarInt(v).encode(&mut buf).unwrap();
        buf
    }

    #[test]
    fn encodes_known_values() {
        assert_eq!(encoded(0), [0x00]);
        assert_eq!(encoded(127), [0x7f]);
        assert_eq!(encoded(128), [0x80, 0x01]);
        assert_eq!(encoded(25565), [0xdd, 0xc7, 0x01]);
        assert_eq!(encoded(2097151), [0xff, 0xff, 0x7f]);
        assert_eq!(encoded(-1), [0xff, 0xff, 0xff, 0xff, 0x0f]);
    }

    #[test]
    fn len_matches_encoding() {
        for v in [0, 1, 127, 128, 16383, 16384, 2097151, i32::MAX, -1] {
            assert_eq!(VarInt(v).len(), encoded(v).len(), "length of {v}");
        }
    }

    #[test]
    fn decodes_and_advances() {
        let bytes = [0xdd, 0xc7, 0x01, 0x2a];
        let mut r = &bytes[..];
        assert_eq!(VarInt::decode(&mut r).unwrap(), VarInt(25565));
        assert_eq!(r, [0x2a]);
    }

    #[test]
    fn short_input_is_incomplete() {
        let mut r = &[0x80, 0x80][..];
        let err = VarInt::decode(&mut r).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<VariableDecodeError>(),
            Some(VariableDecodeError::Incomplete)
        ));
    }

    #[test]
    fn six_byte_varint_is_too_long() {
        let mut r = &[0xff, 0xff, 0xff, 0xff, 0xff, 0x01][..];
        let err = VarInt::decode(&mut r).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<VariableDecodeError>(),
            Some(VariableDecodeError::TooLong)
        ));
    }
}
