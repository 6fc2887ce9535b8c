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

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use color_eyre::eyre::{bail, Result};
use uuid::Uuid;

use crate::protocol::{Decode, DecodeSized, Encode};

impl<'a> Decode<'a> for bool {
    fn decode(r: &mut &'a [u8]) -> Result<Self> {
        Ok(match r.read_u8()? {
            0x01 => true,
            0x00 => false,
            v => bail!("Expected 0x01 or 0x00 for bool, got {v}"),
        })
    }
}

impl<'a> Decode<'a> for i8 {
    fn decode(r: &mut &'a [u8]) -> Result<Self> {
        Ok(r.read_i8()?)
    }
}

impl<'a> Decode<'a> for u8 {
    fn decode(r: &mut &'a [u8]) -> Result<Self> {
        Ok(r.read_u8()?)
    }
}

impl Encode for u16 {
    fn encode(&self, mut w: impl std::io::Write) -> Result<()> {
        Ok(w.write_u16::<BigEndian>(*self)?)
    }
}

impl<'a> Decode<'a> for i32 {
    fn decode(r: &mut &'a [u8]) -> Result<Self> {
        Ok(r.read_i32::<BigEndian>()?)
    }
}

impl Encode for i32 {
    fn encode(&self, mut w: impl std::io::Write) -> Result<()> {
        Ok(w.write_i32::<BigEndian>(*self)?)
    }
}

impl<'a> Decode<'a> for i64 {
    fn decode(r: &mut &'a [u8]) -> Result<Self> {
        Ok(r.read_i64::<BigEndian>()?)
    }
}

impl Encode for i64 {
    fn encode(&self, mut w: impl std::io::Write) -> Result<()> {
        Ok(w.write_i64::<BigEndian>(*self)?)
    }
}

impl<'a> Decode<'a> for Uuid {
    fn decode(r: &mut &'a [u8]) -> Result<Self> {
        Ok(Uuid::from_u128(r.read_u128::<BigEndian>()?))
    }
}

impl<'a, T> DecodeSized<'a> for Vec<T>
where
    T: Decode<'a>,
{
    fn decode(times: usize, r: &mut &'a [u8]) -> Result<Self> {
        let mut o = Vec::with_capacity(times.min(64));

        for _ in 0..times {
            o.push(T::decode(r)?)
        }

        Ok(o)
    }
}

/// Optional fields are prefixed with a boolean saying whether they're present.
impl<'a, T> Decode<'a> for Option<T>
where
    T: Decode<'a>,
{
    fn decode(r: &mut &'a [u8]) -> Result<Self> {
        match bool::decode(r)? {
            true => Ok(Some(T::decode(r)?)),
            false => Ok(None),
        }
    }
}
