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

use color_eyre::eyre::{ensure, Result};

use crate::protocol::{Decode, Encode};

use super::VarInt;

/// A string whose UTF-16 length may not exceed `BOUND`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounded<T, const BOUND: usize = 32767>(pub T);

impl<'a, const BOUND: usize> Decode<'a> for Bounded<&'a str, BOUND> {
    fn decode(r: &mut &'a [u8]) -> Result<Self> {
        let len = VarInt::decode(r)?.0;
        ensure!(len >= 0, "tried to decode string with negative length");

        let len = len as usize;
        ensure!(
            len <= r.len(),
            "malformed packet - not enough data to continue decoding (expected {len} got {})",
            r.len(),
        );

        let (content, rest) = r.split_at(len);
        let content = std::str::from_utf8(content)?;
        let utf16_len = content.encode_utf16().count();

        ensure!(
            utf16_len <= BOUND,
            "utf-16 encoded string exceeds {BOUND} chars (is {utf16_len})"
        );

        *r = rest;

        Ok(Bounded(content))
    }
}

impl<T, const BOUND: usize> Encode for Bounded<T, BOUND>
where
    T: AsRef<str>,
{
    fn encode(&self, mut w: impl std::io::Write) -> Result<()> {
        let s = self.0.as_ref();
        let len = s.encode_utf16().count();

        ensure!(len <= BOUND, "length of string {len} exceeds bound {BOUND}");

        VarInt(s.len() as i32).encode(&mut w)?;
        Ok(w.write_all(s.as_bytes())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_prefixed_utf8() {
        let mut buf = Vec::new();
        Bounded::<_, 16>("§cHi").encode(&mut buf).unwrap();
        // '§' is two bytes in UTF-8
        assert_eq!(buf[0], 5);

        let mut r = &buf[..];
        let decoded = Bounded::<&str, 16>::decode(&mut r).unwrap();
        assert_eq!(decoded.0, "§cHi");
        assert!(r.is_empty());
    }

    #[test]
    fn rejects_strings_over_bound() {
        let mut buf = Vec::new();
        assert!(Bounded::<_, 4>("hello").encode(&mut buf).is_err());

        Bounded::<_, 16>("hello").encode(&mut buf).unwrap();
        let mut r = &buf[..];
        assert!(Bounded::<&str, 4>::decode(&mut r).is_err());
    }

    #[test]
    fn rejects_truncated_strings() {
        let buf = [0x05, b'a', b'b'];
        let mut r = &buf[..];
        assert!(Bounded::<&str, 16>::decode(&mut r).is_err());
    }
}
