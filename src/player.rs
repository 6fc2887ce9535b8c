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

use color_eyre::eyre::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::auth::{AuthClient, AuthenticationToken, Profile};

/// A saved account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Player {
    pub username: String,
    pub password: String,
    pub access_token: String,
    pub client_token: String,
    #[serde(deserialize_with = "null_as_default")]
    pub profile: Profile,
}

fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

impl Player {
    /// The name to list this player under.
    pub fn display_name(&self) -> &str {
        match self.profile.name.as_str() {
            "" => &self.username,
            name => name,
        }
    }

    fn has_session(&self) -> bool {
        !self.access_token.is_empty() && !self.client_token.is_empty()
    }

    fn stored_token(&self) -> AuthenticationToken {
        AuthenticationToken {
            username: self.username.clone(),
            access_token: self.access_token.clone(),
            client_token: self.client_token.clone(),
            profile: self.profile.clone(),
        }
    }

    /// Gets a usable session: the stored one if it's still valid, a refreshed one if it isn't,
    /// or a new one from the password. The result is remembered for saving.
    pub async fn login(&mut self, auth: &AuthClient) -> Result<AuthenticationToken> {
        let token = if self.has_session() {
            let stored = self.stored_token();

            let valid = match auth.validate(&stored).await {
                Ok(valid) => valid,
                Err(why) => {
                    warn!("Couldn't validate stored session: {why}");
                    false
                }
            };

            if valid && stored.is_authenticated() {
                info!("Stored session for {} is still valid", self.username);
                stored
            } else {
                info!("Refreshing session for {}", self.username);
                auth.refresh(&stored)
                    .await
                    .wrap_err("Failed to refresh session")?
            }
        } else {
            info!("Authenticating for new session as {}", self.username);

            if self.client_token.is_empty() {
                self.client_token = Uuid::new_v4().simple().to_string();
            }

            auth.authenticate(&self.username, &self.password, Some(self.client_token.as_str()))
                .await
                .wrap_err("Failed to authenticate")?
        };

        self.remember(&token);
        Ok(token)
    }

    /// Throws away the stored session, server side too.
    pub async fn logout(&mut self, auth: &AuthClient) -> Result<()> {
        if self.has_session() {
            auth.invalidate(&self.stored_token())
                .await
                .wrap_err("Failed to invalidate session")?;
        } else {
            auth.sign_out(&self.username, &self.password)
                .await
                .wrap_err("Failed to sign out")?;
        }

        self.access_token.clear();
        self.client_token.clear();
        Ok(())
    }

    /// A token for servers that don't check sessions. Only the name matters there.
    pub fn offline_token(&self) -> AuthenticationToken {
        let name = self.display_name().to_owned();

        AuthenticationToken {
            username: name.clone(),
            profile: Profile {
                id: self.profile.id.clone(),
                name,
            },
            ..Default::default()
        }
    }

    fn remember(&mut self, token: &AuthenticationToken) {
        self.access_token = token.access_token.clone();
        self.client_token = token.client_token.clone();
        self.profile = token.profile.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_and_null_profile_default() {
        let player: Player =
            serde_json::from_str(r#"{"username": "steve@example.com", "profile": null}"#).unwrap();

        assert_eq!(player.username, "steve@example.com");
        assert!(player.access_token.is_empty());
        assert_eq!(player.profile, Profile::default());
        assert!(!player.has_session());
    }

    #[test]
    fn serializes_with_config_keys() {
        let player = Player {
            username: "steve@example.com".into(),
            profile: Profile {
                id: "0123".into(),
                name: "Steve".into(),
            },
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(&player).unwrap(),
            serde_json::json!({
                "username": "steve@example.com",
                "password": "",
                "access_token": "",
                "client_token": "",
                "profile": {"id": "0123", "name": "Steve"},
            })
        );
    }

    #[test]
    fn offline_token_prefers_profile_name() {
        let mut player = Player {
            username: "Alex".into(),
            ..Default::default()
        };
        assert_eq!(player.offline_token().profile.name, "Alex");
        assert_eq!(player.offline_token().username, "Alex");

        player.profile.name = "Steve".into();
        let token = player.offline_token();
        assert_eq!(token.username, "Steve");
        assert!(token.access_token.is_empty());
    }

    #[test]
    fn remembers_new_sessions() {
        let mut player = Player::default();
        player.remember(&AuthenticationToken {
            username: "steve".into(),
            access_token: "a".into(),
            client_token: "c".into(),
            profile: Profile {
                id: "1".into(),
                name: "Steve".into(),
            },
        });

        assert!(player.has_session());
        // no username was ever saved
        assert!(!player.stored_token().is_authenticated());
        assert_eq!(player.display_name(), "Steve");
    }
}
