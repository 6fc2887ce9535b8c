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

use crate::{
    chat,
    net::{ConnectionError, Outbound, PacketKind, PacketSource, PlayPacket},
    protocol::packets::play::{
        ChatS, ClientStatusAction, ClientStatusS, PlayerListAction, PlayerListEntry,
    },
    sink::{ChatMessage, ChatSink},
};

/// Reacts to what the server sends and turns typed lines into packets.
pub struct Bot {
    sinks: Vec<Box<dyn ChatSink + Send>>,
}

impl Bot {
    pub fn new(sinks: Vec<Box<dyn ChatSink + Send>>) -> Self {
        Self { sinks }
    }

    pub fn attach(self, source: &mut impl PacketSource) {
        let mut sinks = self.sinks;

        source.register_listener(
            PacketKind::Chat,
            Box::new(move |packet: &PlayPacket| -> Result<()> {
                let PlayPacket::Chat(packet) = packet else {
                    return Ok(());
                };

                let message = match ChatMessage::from_packet(packet.position, &packet.json) {
                    Ok(message) => message,
                    Err(why) => {
                        warn!("Skipping chat message: {why:#}");
                        return Ok(());
                    }
                };

                for sink in &mut sinks {
                    sink.consume(&message)?;
                }

                Ok(())
            }),
        );

        source.register_listener(
            PacketKind::JoinGame,
            Box::new(|packet: &PlayPacket| -> Result<()> {
                if let PlayPacket::JoinGame(join) = packet {
                    debug!("{join:?}");
                    println!("Joined game");
                }
                Ok(())
            }),
        );

        source.register_listener(
            PacketKind::PlayerListItem,
            Box::new(|packet: &PlayPacket| -> Result<()> {
                if let PlayPacket::PlayerListItem(list) = packet {
                    for entry in &list.entries {
                        println!("{}", describe_entry(entry));
                    }
                }
                Ok(())
            }),
        );

        source.register_listener(
            PacketKind::Disconnect,
            Box::new(|packet: &PlayPacket| -> Result<()> {
                match packet {
                    PlayPacket::Disconnect(disconnect) => {
                        let reason = chat::render_raw(&disconnect.reason).formatted;
                        Err(ConnectionError::Disconnected(reason).into())
                    }
                    _ => Ok(()),
                }
            }),
        );
    }
}

/// Turns a line typed by the user into the packet to send, if any.
pub fn process_input(line: &str) -> Option<Outbound> {
    match line {
        "/respawn" => {
            println!("respawning...");
            Some(Outbound::ClientStatus(ClientStatusS {
                action: ClientStatusAction::Respawn,
            }))
        }
        "/stats" => Some(Outbound::ClientStatus(ClientStatusS {
            action: ClientStatusAction::RequestStats,
        })),
        "" => {
            warn!("Not sending an empty message");
            None
        }
        message if message.encode_utf16().count() > ChatS::MAX_LEN => {
            warn!(
                "Message is longer than {} characters, not sending it",
                ChatS::MAX_LEN
            );
            None
        }
        message => Some(Outbound::Chat(ChatS {
            message: message.to_owned(),
        })),
    }
}

fn describe_entry(entry: &PlayerListEntry) -> String {
    let uuid = entry.uuid;

    match &entry.action {
        PlayerListAction::AddPlayer {
            name,
            properties,
            gamemode,
            display_name,
            ..
        } => {
            let name = match display_name {
                Some(display_name) => chat::render_raw(display_name).plain,
                None => name.clone(),
            };
            let properties = properties
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");

            format!("Added player: {name} ({properties}) GM{gamemode}")
        }
        PlayerListAction::UpdateGamemode { gamemode } => {
            format!("Updated game mode: {gamemode} for {uuid}")
        }
        PlayerListAction::UpdateLatency { ping } => format!("Updated latency: {ping} for {uuid}"),
        PlayerListAction::UpdateDisplayName { display_name } => {
            let name = display_name
                .as_deref()
                .map(|n| chat::render_raw(n).plain)
                .unwrap_or_default();
            format!("Updated display name: {name} for {uuid}")
        }
        PlayerListAction::RemovePlayer => format!("Removed player: {uuid}"),
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::{
        net::Dispatcher,
        protocol::packets::play::{
            ChatMessageC, ChatPosition, DisconnectC, JoinGameC, PlayerListItemC, ProfileProperty,
        },
        sink::CaptureSink,
    };

    fn attached(capture: &CaptureSink) -> Dispatcher {
        let mut dispatcher = Dispatcher::new();
        Bot::new(vec![Box::new(capture.clone())]).attach(&mut dispatcher);
        dispatcher
    }

    fn chat(json: &str) -> PlayPacket {
        PlayPacket::Chat(ChatMessageC {
            json: json.to_owned(),
            position: ChatPosition::Chat,
        })
    }

    #[test]
    fn chat_reaches_sinks() {
        let capture = CaptureSink::default();
        let mut dispatcher = attached(&capture);

        dispatcher
            .dispatch(&chat(r#"{"text":"<Steve> ","extra":[{"text":"hi","color":"green"}]}"#))
            .unwrap();

        let messages = capture.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].plain, "<Steve> hi");
        assert_eq!(messages[0].position, ChatPosition::Chat);
    }

    #[test]
    fn unparseable_chat_is_skipped() {
        let capture = CaptureSink::default();
        let mut dispatcher = attached(&capture);

        dispatcher.dispatch(&chat("{not json")).unwrap();
        dispatcher.dispatch(&chat(r#"{"text":"after"}"#)).unwrap();

        let messages = capture.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].plain, "after");
    }

    #[test]
    fn disconnect_ends_the_session() {
        let mut dispatcher = attached(&CaptureSink::default());

        let err = dispatcher
            .dispatch(&PlayPacket::Disconnect(DisconnectC {
                reason: r#"{"text":"","extra":[{"text":"Server closed","color":"red"}]}"#.into(),
            }))
            .unwrap_err();

        match err.downcast_ref::<ConnectionError>() {
            Some(ConnectionError::Disconnected(reason)) => {
                assert_eq!(reason, "\x1b[91mServer closed\x1b[m")
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn join_game_is_accepted() {
        let mut dispatcher = attached(&CaptureSink::default());

        dispatcher
            .dispatch(&PlayPacket::JoinGame(JoinGameC {
                entity_id: 7,
                gamemode: 0,
                dimension: 0,
                difficulty: 2,
                max_players: 20,
                level_type: "default".into(),
                reduced_debug_info: false,
            }))
            .unwrap();

        dispatcher
            .dispatch(&PlayPacket::PlayerListItem(PlayerListItemC {
                entries: vec![PlayerListEntry {
                    uuid: Uuid::nil(),
                    action: PlayerListAction::RemovePlayer,
                }],
            }))
            .unwrap();
    }

    #[test]
    fn input_becomes_packets() {
        assert_eq!(
            process_input("/respawn"),
            Some(Outbound::ClientStatus(ClientStatusS {
                action: ClientStatusAction::Respawn
            }))
        );
        assert_eq!(
            process_input("/stats"),
            Some(Outbound::ClientStatus(ClientStatusS {
                action: ClientStatusAction::RequestStats
            }))
        );
        assert_eq!(
            process_input("hello there"),
            Some(Outbound::Chat(ChatS {
                message: "hello there".into()
            }))
        );
        assert_eq!(process_input(""), None);
        assert_eq!(process_input(&"a".repeat(257)), None);
        assert!(process_input(&"a".repeat(256)).is_some());
    }

    #[test]
    fn player_list_entries_are_described() {
        let uuid = Uuid::nil();
        let entry = |action| PlayerListEntry { uuid, action };

        assert_eq!(
            describe_entry(&entry(PlayerListAction::AddPlayer {
                name: "Steve".into(),
                properties: vec![ProfileProperty {
                    name: "textures".into(),
                    value: "e30=".into(),
                    signature: None,
                }],
                gamemode: 1,
                ping: 20,
                display_name: None,
            })),
            "Added player: Steve (textures) GM1"
        );
        assert_eq!(
            describe_entry(&entry(PlayerListAction::UpdateGamemode { gamemode: 3 })),
            format!("Updated game mode: 3 for {uuid}")
        );
        assert_eq!(
            describe_entry(&entry(PlayerListAction::UpdateLatency { ping: 42 })),
            format!("Updated latency: 42 for {uuid}")
        );
        assert_eq!(
            describe_entry(&entry(PlayerListAction::UpdateDisplayName {
                display_name: Some(r#"{"text":"Admin"}"#.into())
            })),
            format!("Updated display name: Admin for {uuid}")
        );
        assert_eq!(
            describe_entry(&entry(PlayerListAction::RemovePlayer)),
            "Removed player: 00000000-0000-0000-0000-000000000000"
        );
    }
}
