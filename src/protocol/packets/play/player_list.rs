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

use color_eyre::eyre::{bail, Result};
use uuid::Uuid;

use crate::protocol::{
    datatypes::{Bounded, VarInt},
    Decode, DecodeSized, Packet,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileProperty {
    pub name: String,
    pub value: String,
    pub signature: Option<String>,
}

impl Decode<'_> for ProfileProperty {
    fn decode(r: &mut &'_ [u8]) -> Result<Self> {
        Ok(Self {
            name: Bounded::<&str>::decode(r)?.0.to_owned(),
            value: Bounded::<&str>::decode(r)?.0.to_owned(),
            signature: Option::<Bounded<&str>>::decode(r)?.map(|s| s.0.to_owned()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerListAction {
    AddPlayer {
        name: String,
        properties: Vec<ProfileProperty>,
        gamemode: i32,
        ping: i32,
        display_name: Option<String>,
    },
    UpdateGamemode {
        gamemode: i32,
    },
    UpdateLatency {
        ping: i32,
    },
    UpdateDisplayName {
        display_name: Option<String>,
    },
    RemovePlayer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerListEntry {
    pub uuid: Uuid,
    pub action: PlayerListAction,
}

/// Every entry in one packet carries the same kind of action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerListItemC {
    pub entries: Vec<PlayerListEntry>,
}

impl Packet for PlayerListItemC {
    const ID: i32 = 0x2E;
}

fn display_name(r: &mut &'_ [u8]) -> Result<Option<String>> {
    Ok(Option::<Bounded<&str>>::decode(r)?.map(|s| s.0.to_owned()))
}

impl Decode<'_> for PlayerListItemC {
    fn decode(r: &mut &'_ [u8]) -> Result<Self> {
        let action = VarInt::decode(r)?.0;
        let count = VarInt::decode(r)?.0;

        if !(0..=4).contains(&action) {
            bail!("Unknown player list action {action}");
        }

        let mut entries = Vec::new();
        for _ in 0..count.max(0) {
            let uuid = Uuid::decode(r)?;
            let action = match action {
                0 => {
                    let name = Bounded::<&str, 16>::decode(r)?.0.to_owned();
                    let property_count = VarInt::decode(r)?.0.max(0) as usize;

                    PlayerListAction::AddPlayer {
                        name,
                        properties: <Vec<ProfileProperty> as DecodeSized>::decode(
                            property_count,
                            r,
                        )?,
                        gamemode: VarInt::decode(r)?.0,
                        ping: VarInt::decode(r)?.0,
                        display_name: display_name(r)?,
                    }
                }
                1 => PlayerListAction::UpdateGamemode {
                    gamemode: VarInt::decode(r)?.0,
                },
                2 => PlayerListAction::UpdateLatency {
                    ping: VarInt::decode(r)?.0,
                },
                3 => PlayerListAction::UpdateDisplayName {
                    display_name: display_name(r)?,
                },
                _ => PlayerListAction::RemovePlayer,
            };

            entries.push(PlayerListEntry { uuid, action });
        }

        Ok(Self { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Encode;

    fn header(action: i32, count: i32, uuid: Uuid) -> Vec<u8> {
        let mut body = Vec::new();
        VarInt(action).encode(&mut body).unwrap();
        VarInt(count).encode(&mut body).unwrap();
        body.extend_from_slice(uuid.as_bytes());
        body
    }

    #[test]
    fn decodes_added_player() {
        let uuid = Uuid::from_u128(0x1234);
        let mut body = header(0, 1, uuid);
        Bounded::<_, 16>("Notch").encode(&mut body).unwrap();
        VarInt(1).encode(&mut body).unwrap();
        Bounded::<_, 32767>("textures").encode(&mut body).unwrap();
        Bounded::<_, 32767>("abc").encode(&mut body).unwrap();
        body.push(0);
        VarInt(1).encode(&mut body).unwrap();
        VarInt(35).encode(&mut body).unwrap();
        body.push(0);

        let mut r = &body[..];
        let packet = PlayerListItemC::decode(&mut r).unwrap();
        assert!(r.is_empty());
        assert_eq!(
            packet.entries,
            vec![PlayerListEntry {
                uuid,
                action: PlayerListAction::AddPlayer {
                    name: "Notch".into(),
                    properties: vec![ProfileProperty {
                        name: "textures".into(),
                        value: "abc".into(),
                        signature: None,
                    }],
                    gamemode: 1,
                    ping: 35,
                    display_name: None,
                },
            }]
        );
    }

    #[test]
    fn decodes_removed_players() {
        let uuid = Uuid::from_u128(7);
        let body = header(4, 1, uuid);
        let mut r = &body[..];
        let packet = PlayerListItemC::decode(&mut r).unwrap();
        assert_eq!(packet.entries[0].action, PlayerListAction::RemovePlayer);
        assert_eq!(packet.entries[0].uuid, uuid);
    }

    #[test]
    fn rejects_unknown_action() {
        let body = header(9, 1, Uuid::nil());
        let mut r = &body[..];
        assert!(PlayerListItemC::decode(&mut r).is_err());
    }
}
