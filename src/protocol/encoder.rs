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

use std::io::Write;

use bytes::{BufMut, BytesMut};
use color_eyre::eyre::{ensure, Result};
use flate2::{write::ZlibEncoder, Compression};

use crate::protocol::{Encode, MAX_PACKET_SIZE};

use super::{datatypes::VarInt, ServerboundPacket};

#[derive(Default)]
pub struct Encoder {
    buf: BytesMut,
    compression_threshold: Option<usize>,
}

impl Encoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_compression(&mut self, threshold: i32) {
        self.compression_threshold = usize::try_from(threshold).ok();
    }

    pub fn append_packet<P>(&mut self, packet: &P) -> Result<()>
    where
        P: ServerboundPacket,
    {
        let mut body = Vec::new();
        packet.encode_packet(&mut body)?;

        ensure!(
            (body.len() as i32) < MAX_PACKET_SIZE,
            "packet size {} exceeds max {MAX_PACKET_SIZE}!",
            body.len()
        );

        let mut w = (&mut self.buf).writer();

        match self.compression_threshold {
            None => {
                VarInt(body.len() as i32).encode(&mut w)?;
                w.write_all(&body)?;
            }
            Some(threshold) if body.len() < threshold => {
                // +1 for the zero data length
                VarInt(body.len() as i32 + 1).encode(&mut w)?;
                VarInt(0).encode(&mut w)?;
                w.write_all(&body)?;
            }
            Some(_) => {
                let mut z = ZlibEncoder::new(Vec::new(), Compression::default());
                z.write_all(&body)?;
                let compressed = z.finish()?;

                let data_len = VarInt(body.len() as i32);
                VarInt((data_len.len() + compressed.len()) as i32).encode(&mut w)?;
                data_len.encode(&mut w)?;
                w.write_all(&compressed)?;
            }
        }

        Ok(())
    }

    pub fn take(&mut self) -> BytesMut {
        self.buf.split()
    }
}
