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

use std::io::Read;

use bytes::{Buf, BytesMut};
use color_eyre::eyre::{bail, ensure, Context, Result};
use flate2::read::ZlibDecoder;

use crate::protocol::{Decode, MAX_PACKET_SIZE};

use super::{
    datatypes::{VarInt, VariableDecodeError},
    ClientboundPacket,
};

#[derive(Default, Debug)]
pub struct Decoder {
    buf: BytesMut,
    compression_threshold: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct Frame {
    pub id: i32,
    pub body: BytesMut,
}

impl Frame {
    pub fn decode<'a, P>(&'a self) -> Result<P>
    where
        P: ClientboundPacket<'a>,
    {
        ensure!(
            P::ID == self.id,
            "Mismatched packet IDs: expected {} got {}",
            P::ID,
            self.id
        );

        let mut r = &self.body[..];
        let p = P::decode(&mut r)?;

        ensure!(
            r.is_empty(),
            "Didn't decode enough bytes decoding {:#04x}: {} left",
            P::ID,
            r.len()
        );

        Ok(p)
    }
}

impl Decoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Negative thresholds turn compression back off, same as the server means them.
    pub fn set_compression(&mut self, threshold: i32) {
        self.compression_threshold = usize::try_from(threshold).ok();
    }

    pub fn reserve_additional(&mut self, additional: usize) {
        self.buf.reserve(additional);
    }

    pub fn try_read_next(&mut self) -> Result<Option<Frame>> {
        let mut buf = &self.buf[..];

        let len = match VarInt::decode(&mut buf) {
            Ok(l) => l,
            Err(e) => match e.downcast_ref::<VariableDecodeError>() {
                Some(&VariableDecodeError::Incomplete) => {
                    trace!("Incomplete packet length ({} bytes buffered)", buf.len());
                    return Ok(None);
                }
                Some(&VariableDecodeError::TooLong) => bail!("Invalid packet length"),
                None => bail!("Unknown error: {e}"),
            },
        };

        ensure!(
            0 <= len.0 && len.0 <= MAX_PACKET_SIZE,
            "Packet length {len} is out of bounds (min 0, max {MAX_PACKET_SIZE})",
        );

        if buf.len() < len.0 as usize {
            // packet is incomplete, keep waiting
            return Ok(None);
        }

        let header_len = self.buf.len() - buf.len();
        self.buf.advance(header_len);
        let data = self.buf.split_to(len.0 as usize);

        let mut data = match self.compression_threshold {
            Some(_) => Self::inflate(data)?,
            None => data,
        };

        let mut buf = &data[..];
        let packet_id = VarInt::decode(&mut buf)
            .context("Failed to decode packet ID")?
            .0;

        // advance to end of packet id
        data.advance(data.len() - buf.len());

        Ok(Some(Frame {
            id: packet_id,
            body: data,
        }))
    }

    fn inflate(mut data: BytesMut) -> Result<BytesMut> {
        let mut r = &data[..];
        let data_len = VarInt::decode(&mut r).context("Failed to decode data length")?;

        ensure!(
            0 <= data_len.0 && data_len.0 <= MAX_PACKET_SIZE,
            "Uncompressed length {data_len} is out of bounds (min 0, max {MAX_PACKET_SIZE})",
        );

        // zero means the sender left this one uncompressed
        if data_len.0 == 0 {
            data.advance(data.len() - r.len());
            return Ok(data);
        }

        // one byte past the claimed length is enough to tell the sender lied
        let mut inflated = Vec::with_capacity(data_len.0 as usize);
        ZlibDecoder::new(r)
            .take(data_len.0 as u64 + 1)
            .read_to_end(&mut inflated)
            .context("Failed to inflate packet")?;

        ensure!(
            inflated.len() == data_len.0 as usize,
            "Inflated packet is {} bytes, expected {data_len}",
            inflated.len(),
        );

        Ok(BytesMut::from(&inflated[..]))
    }

    pub fn take_all(&mut self) -> BytesMut {
        self.buf.split_off(self.buf.len())
    }

    pub fn add_bytes(&mut self, bytes: BytesMut) {
        self.buf.unsplit(bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{packets::play::ChatS, Encoder};

    fn chat(message: &str) -> ChatS {
        ChatS {
            message: message.to_owned(),
        }
    }

    #[test]
    fn waits_for_whole_frame() {
        let mut encoder = Encoder::new();
        encoder.append_packet(&chat("hello there")).unwrap();
        let mut bytes = encoder.take();
        let tail = bytes.split_off(4);

        let mut decoder = Decoder::new();
        decoder.add_bytes(bytes);
        assert!(decoder.try_read_next().unwrap().is_none());

        decoder.add_bytes(tail);
        let frame = decoder.try_read_next().unwrap().expect("frame is complete");
        assert_eq!(frame.id, 0x02);
        assert_eq!(&frame.body[1..], b"hello there");
        assert!(decoder.try_read_next().unwrap().is_none());
    }

    #[test]
    fn reads_back_to_back_frames() {
        let mut encoder = Encoder::new();
        encoder.append_packet(&chat("one")).unwrap();
        encoder.append_packet(&chat("two")).unwrap();

        let mut decoder = Decoder::new();
        decoder.add_bytes(encoder.take());

        let first = decoder.try_read_next().unwrap().unwrap();
        let second = decoder.try_read_next().unwrap().unwrap();
        assert_eq!(&first.body[1..], b"one");
        assert_eq!(&second.body[1..], b"two");
    }

    #[test]
    fn inflates_compressed_frames() {
        let long = "a".repeat(200);

        let mut encoder = Encoder::new();
        encoder.set_compression(64);
        encoder.append_packet(&chat("short")).unwrap();
        encoder.append_packet(&chat(&long)).unwrap();
        let bytes = encoder.take();
        // the long message is mostly one repeated byte, so it has to have shrunk
        assert!(bytes.len() < 200);

        let mut decoder = Decoder::new();
        decoder.set_compression(64);
        decoder.add_bytes(bytes);

        let short = decoder.try_read_next().unwrap().unwrap();
        assert_eq!(&short.body[1..], b"short");

        let frame = decoder.try_read_next().unwrap().unwrap();
        assert_eq!(frame.id, 0x02);
        assert_eq!(&frame.body[2..], long.as_bytes());
    }

    #[test]
    fn stops_inflating_past_claimed_length() {
        use std::io::Write;

        use flate2::{write::ZlibEncoder, Compression};

        use crate::protocol::Encode;

        let mut z = ZlibEncoder::new(Vec::new(), Compression::best());
        z.write_all(&vec![0u8; 1 << 20]).unwrap();
        let compressed = z.finish().unwrap();

        let mut inner = Vec::new();
        VarInt(16).encode(&mut inner).unwrap();
        inner.extend_from_slice(&compressed);

        let mut frame = Vec::new();
        VarInt(inner.len() as i32).encode(&mut frame).unwrap();
        frame.extend_from_slice(&inner);

        let mut decoder = Decoder::new();
        decoder.set_compression(64);
        decoder.add_bytes(BytesMut::from(&frame[..]));

        let err = decoder.try_read_next().unwrap_err();
        assert!(
            err.to_string().contains("is 17 bytes, expected 16"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn rejects_oversized_length() {
        let mut decoder = Decoder::new();
        let mut len = Vec::new();
        crate::protocol::Encode::encode(&VarInt(MAX_PACKET_SIZE + 1), &mut len).unwrap();
        decoder.add_bytes(BytesMut::from(&len[..]));
        assert!(decoder.try_read_next().is_err());
    }
}
