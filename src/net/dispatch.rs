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

use std::collections::HashMap;

use color_eyre::eyre::Result;

use crate::protocol::{
    packets::play::{ChatMessageC, DisconnectC, JoinGameC, KeepAliveC, PlayerListItemC},
    Frame, Packet,
};

/// The play packets this client understands.
#[derive(Debug, Clone)]
pub enum PlayPacket {
    Chat(ChatMessageC),
    JoinGame(JoinGameC),
    PlayerListItem(PlayerListItemC),
    Disconnect(DisconnectC),
    KeepAlive(KeepAliveC),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketKind {
    Chat,
    JoinGame,
    PlayerListItem,
    Disconnect,
    KeepAlive,
}

impl PlayPacket {
    pub fn kind(&self) -> PacketKind {
        match self {
            PlayPacket::Chat(_) => PacketKind::Chat,
            PlayPacket::JoinGame(_) => PacketKind::JoinGame,
            PlayPacket::PlayerListItem(_) => PacketKind::PlayerListItem,
            PlayPacket::Disconnect(_) => PacketKind::Disconnect,
            PlayPacket::KeepAlive(_) => PacketKind::KeepAlive,
        }
    }

    /// Decodes a play frame, or returns `None` if it's a packet we don't care about.
    pub fn from_frame(frame: &Frame) -> Result<Option<Self>> {
        Ok(Some(match frame.id {
            id if id == ChatMessageC::ID => PlayPacket::Chat(frame.decode()?),
            id if id == JoinGameC::ID => PlayPacket::JoinGame(frame.decode()?),
            id if id == PlayerListItemC::ID => PlayPacket::PlayerListItem(frame.decode()?),
            id if id == DisconnectC::ID => PlayPacket::Disconnect(frame.decode()?),
            id if id == KeepAliveC::ID => PlayPacket::KeepAlive(frame.decode()?),
            _ => return Ok(None),
        }))
    }
}

/// Called with every packet of the kind it was registered for. Returning an error ends the
/// session it's attached to.
pub type Listener = Box<dyn FnMut(&PlayPacket) -> Result<()> + Send>;

/// Anything that delivers play packets to listeners: a live connection, or a recording.
pub trait PacketSource {
    fn register_listener(&mut self, kind: PacketKind, listener: Listener);
}

#[derive(Default)]
pub struct Dispatcher {
    listeners: HashMap<PacketKind, Vec<Listener>>,
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands the packet to each listener for its kind, in registration order.
    pub fn dispatch(&mut self, packet: &PlayPacket) -> Result<()> {
        if let Some(listeners) = self.listeners.get_mut(&packet.kind()) {
            for listener in listeners {
                listener(packet)?;
            }
        }

        Ok(())
    }
}

impl PacketSource for Dispatcher {
    fn register_listener(&mut self, kind: PacketKind, listener: Listener) {
        self.listeners.entry(kind).or_default().push(listener);
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let counts: HashMap<_, _> = self.listeners.iter().map(|(k, v)| (k, v.len())).collect();
        f.debug_struct("Dispatcher").field("listeners", &counts).finish()
    }
}
