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

use std::io::ErrorKind;

use color_eyre::eyre::Result;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::protocol::{
    packets::play::{ChatS, ClientStatusS, KeepAliveS},
    Decoder, Encoder, Frame, ServerboundPacket,
};

const BUF_SIZE: usize = 4096;

/// Everything the client ever sends once it's in play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Chat(ChatS),
    ClientStatus(ClientStatusS),
    KeepAlive(KeepAliveS),
}

pub struct NetReader<R> {
    stream: R,
    decoder: Decoder,
}

impl<R> NetReader<R>
where
    R: AsyncRead + Unpin,
{
    #[must_use]
    pub fn new(stream: R) -> Self {
        Self {
            stream,
            decoder: Decoder::new(),
        }
    }

    pub fn set_compression(&mut self, threshold: i32) {
        self.decoder.set_compression(threshold);
    }

    pub async fn rx(&mut self) -> Result<Frame> {
        loop {
            if let Some(frame) = self.decoder.try_read_next()? {
                trace!("Got packet {:#04x} ({} bytes)", frame.id, frame.body.len());
                return Ok(frame);
            };

            self.decoder.reserve_additional(BUF_SIZE);
            let mut buf = self.decoder.take_all();

            if self.stream.read_buf(&mut buf).await? == 0 {
                return Err(std::io::Error::from(ErrorKind::UnexpectedEof).into());
            }

            self.decoder.add_bytes(buf);
        }
    }
}

pub struct NetWriter<W> {
    stream: W,
    encoder: Encoder,
}

impl<W> NetWriter<W>
where
    W: AsyncWrite + Unpin,
{
    #[must_use]
    pub fn new(stream: W) -> Self {
        Self {
            stream,
            encoder: Encoder::new(),
        }
    }

    pub fn set_compression(&mut self, threshold: i32) {
        self.encoder.set_compression(threshold);
    }

    pub async fn tx<P>(&mut self, packet: &P) -> Result<()>
    where
        P: ServerboundPacket,
    {
        self.encoder.append_packet(packet)?;
        let bytes = self.encoder.take();
        self.stream.write_all(&bytes).await?;
        self.stream.flush().await?;

        debug!("Sent packet {packet:?}");
        Ok(())
    }

    pub async fn send(&mut self, packet: &Outbound) -> Result<()> {
        match packet {
            Outbound::Chat(p) => self.tx(p).await,
            Outbound::ClientStatus(p) => self.tx(p).await,
            Outbound::KeepAlive(p) => self.tx(p).await,
        }
    }
}
