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

use std::time::Duration;

use color_eyre::eyre::{eyre, Context, Result};
use thiserror::Error;
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpStream,
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
    time::timeout,
};

use crate::{
    chat,
    protocol::{
        datatypes::{Bounded, VarInt},
        packets::{
            login::{
                EncryptionRequestC, HandshakeS, LoginDisconnectC, LoginStartS, LoginSuccessC,
                SetCompressionC,
            },
            play::{KeepAliveC, KeepAliveS},
        },
        Packet, ProtocolState, PROTOCOL_VERSION,
    },
};

use super::{
    Dispatcher, Listener, NetReader, NetWriter, Outbound, PacketKind, PacketSource, PlayPacket,
};

const LOGIN_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum ConnectionError {
    #[error("Disconnected: {0}")]
    Disconnected(String),
    #[error("Server is in online mode and asked for encryption, which isn't supported")]
    EncryptionRequired,
    #[error("Got unexpected packet {0:#04x} while logging in")]
    UnexpectedLoginPacket(i32),
}

/// A connection to a game server that hasn't been opened yet. Register listeners first, then
/// call [`Connection::connect`].
#[derive(Debug)]
pub struct Connection {
    address: String,
    port: u16,
    username: String,
    dispatcher: Dispatcher,
}

impl Connection {
    #[must_use]
    pub fn new(address: impl Into<String>, port: u16, username: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            port,
            username: username.into(),
            dispatcher: Dispatcher::new(),
        }
    }

    pub async fn connect(self) -> Result<ConnectionHandle> {
        let stream = TcpStream::connect((self.address.as_str(), self.port))
            .await
            .wrap_err_with(|| format!("Failed to connect to {}:{}", self.address, self.port))?;

        if let Err(why) = stream.set_nodelay(true) {
            warn!("Failed to set nodelay for {}: {why}", self.address);
        }

        let (r, w) = stream.into_split();
        self.start(NetReader::new(r), NetWriter::new(w)).await
    }

    async fn start<R, W>(
        self,
        mut reader: NetReader<R>,
        mut writer: NetWriter<W>,
    ) -> Result<ConnectionHandle>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        match timeout(LOGIN_TIMEOUT, self.login(&mut reader, &mut writer)).await {
            Err(_) => return Err(eyre!("Timed out logging in to {}", self.address)),
            Ok(result) => result?,
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let writer = tokio::spawn(write_loop(writer, rx));
        let reader = tokio::spawn(read_loop(reader, self.dispatcher, tx.clone()));

        Ok(ConnectionHandle { tx, reader, writer })
    }

    async fn login<R, W>(
        &self,
        reader: &mut NetReader<R>,
        writer: &mut NetWriter<W>,
    ) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        writer
            .tx(&HandshakeS {
                protocol_version: VarInt(PROTOCOL_VERSION),
                server_address: Bounded(self.address.as_str()),
                server_port: self.port,
                next_state: ProtocolState::Login,
            })
            .await?;

        writer
            .tx(&LoginStartS {
                name: Bounded(self.username.as_str()),
            })
            .await
            .wrap_err("Failed to send login start")?;

        loop {
            let frame = reader.rx().await?;

            match frame.id {
                id if id == LoginDisconnectC::ID => {
                    let p: LoginDisconnectC = frame.decode()?;
                    let reason = chat::render_raw(p.reason.0).formatted;
                    return Err(ConnectionError::Disconnected(reason).into());
                }
                id if id == EncryptionRequestC::ID => {
                    return Err(ConnectionError::EncryptionRequired.into());
                }
                id if id == SetCompressionC::ID => {
                    let p: SetCompressionC = frame.decode()?;
                    debug!("Compression threshold set to {}", p.threshold);
                    reader.set_compression(p.threshold.0);
                    writer.set_compression(p.threshold.0);
                }
                id if id == LoginSuccessC::ID => {
                    let p: LoginSuccessC = frame.decode()?;
                    info!("Logged in as {} ({})", p.username.0, p.uuid.0);
                    return Ok(());
                }
                id => return Err(ConnectionError::UnexpectedLoginPacket(id).into()),
            }
        }
    }
}

impl PacketSource for Connection {
    fn register_listener(&mut self, kind: PacketKind, listener: Listener) {
        self.dispatcher.register_listener(kind, listener);
    }
}

/// A logged in connection. Packets arrive through the listeners registered before connecting.
#[derive(Debug)]
pub struct ConnectionHandle {
    tx: UnboundedSender<Outbound>,
    reader: JoinHandle<Result<()>>,
    writer: JoinHandle<Result<()>>,
}

impl ConnectionHandle {
    pub fn write_packet(&self, packet: Outbound) -> Result<()> {
        self.tx
            .send(packet)
            .map_err(|_| eyre!("Connection is closed"))
    }

    /// Waits for the server side to end: the socket closing, a listener failing, or a kick.
    /// Must not be polled again once it has returned.
    pub async fn closed(&mut self) -> Result<()> {
        let result = match (&mut self.reader).await {
            Ok(result) => result,
            Err(why) => Err(eyre!("Reader task failed: {why}")),
        };

        self.writer.abort();
        result
    }

    pub fn close(self) {
        self.reader.abort();
        self.writer.abort();
    }
}

async fn read_loop<R>(
    mut reader: NetReader<R>,
    mut dispatcher: Dispatcher,
    tx: UnboundedSender<Outbound>,
) -> Result<()>
where
    R: AsyncRead + Unpin,
{
    loop {
        let frame = reader.rx().await?;

        let packet = match PlayPacket::from_frame(&frame) {
            Ok(Some(packet)) => packet,
            Ok(None) => continue,
            Err(why) => {
                warn!("Failed to decode packet {:#04x}, skipping: {why}", frame.id);
                continue;
            }
        };

        if let PlayPacket::KeepAlive(KeepAliveC(id)) = &packet {
            trace!("Answering keepalive {id}");
            tx.send(Outbound::KeepAlive(KeepAliveS(*id)))
                .map_err(|_| eyre!("Writer closed before keepalive could be answered"))?;
        }

        dispatcher.dispatch(&packet)?;
    }
}

async fn write_loop<W>(mut writer: NetWriter<W>, mut rx: UnboundedReceiver<Outbound>) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(packet) = rx.recv().await {
        writer.send(&packet).await?;
    }

    Ok(())
}
