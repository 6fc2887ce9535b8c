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

use crate::protocol::{
    datatypes::{Bounded, VarInt},
    Encode, Packet, ProtocolState,
};

#[derive(Debug)]
pub struct HandshakeS<'a> {
    pub protocol_version: VarInt,
    pub server_address: Bounded<&'a str, 255>,
    pub server_port: u16,
    pub next_state: ProtocolState,
}

impl Packet for HandshakeS<'_> {
    const ID: i32 = 0x00;
}

impl Encode for HandshakeS<'_> {
    fn encode(&self, mut w: impl std::io::Write) -> Result<()> {
        self.protocol_version.encode(&mut w)?;
        self.server_address.encode(&mut w)?;
        self.server_port.encode(&mut w)?;
        self.next_state.encode(&mut w)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::PROTOCOL_VERSION;

    #[test]
    fn encodes_login_handshake() {
        let handshake = HandshakeS {
            protocol_version: VarInt(PROTOCOL_VERSION),
            server_address: Bounded("localhost"),
            server_port: 25565,
            next_state: ProtocolState::Login,
        };

        let mut buf = Vec::new();
        handshake.encode(&mut buf).unwrap();

        let mut expected = vec![0xd4, 0x02, 9];
        expected.extend_from_slice(b"localhost");
        expected.extend_from_slice(&[0x63, 0xdd, 0x02]);
        assert_eq!(buf, expected);
    }
}
