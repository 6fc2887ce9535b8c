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

//! Client for the Yggdrasil identity service that hands out access tokens.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const AUTH_SERVER: &str = "https://authserver.mojang.com";

const AGENT_NAME: &str = "Minecraft";
const AGENT_VERSION: u32 = 1;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("[{status}] {error}: '{message}'")]
    Yggdrasil {
        status: u16,
        error: String,
        message: String,
        cause: Option<String>,
    },
    #[error("[{status}] Malformed error message: '{body}'")]
    Malformed { status: u16, body: String },
    #[error("'{0}' not set!")]
    MissingField(&'static str),
    #[error("Validate answered with unexpected status {0}")]
    UnexpectedStatus(u16),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// The game profile an account plays as.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub id: String,
    pub name: String,
}

impl Profile {
    pub fn is_populated(&self) -> bool {
        !self.id.is_empty() && !self.name.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthenticationToken {
    pub username: String,
    pub access_token: String,
    pub client_token: String,
    pub profile: Profile,
}

impl AuthenticationToken {
    pub fn is_authenticated(&self) -> bool {
        !self.username.is_empty()
            && !self.access_token.is_empty()
            && !self.client_token.is_empty()
            && self.profile.is_populated()
    }
}

#[derive(Serialize)]
struct Agent {
    name: &'static str,
    version: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthenticateRequest<'a> {
    agent: Agent,
    username: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_token: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenPair<'a> {
    access_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_token: Option<&'a str>,
}

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    access_token: String,
    client_token: String,
    selected_profile: Option<Profile>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    error: String,
    error_message: String,
    cause: Option<String>,
}

/// Turns a failed response into the error it describes.
fn error_from_response(status: u16, body: &str) -> AuthError {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(e) => AuthError::Yggdrasil {
            status,
            error: e.error,
            message: e.error_message,
            cause: e.cause,
        },
        Err(_) => AuthError::Malformed {
            status,
            body: body.to_owned(),
        },
    }
}

fn token_from_response(
    username: &str,
    status: u16,
    body: &str,
) -> Result<AuthenticationToken, AuthError> {
    let res: TokenResponse = serde_json::from_str(body).map_err(|_| AuthError::Malformed {
        status,
        body: body.to_owned(),
    })?;

    Ok(AuthenticationToken {
        username: username.to_owned(),
        access_token: res.access_token,
        client_token: res.client_token,
        profile: res
            .selected_profile
            .ok_or(AuthError::MissingField("selectedProfile"))?,
    })
}

#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    auth_server: String,
}

impl Default for AuthClient {
    fn default() -> Self {
        Self::new(AUTH_SERVER)
    }
}

impl AuthClient {
    pub fn new(auth_server: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            auth_server: auth_server.into(),
        }
    }

    async fn post<B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<(StatusCode, String), AuthError> {
        let url = format!("{}/{endpoint}", self.auth_server);
        debug!("POST {url}");

        let res = self.http.post(&url).json(body).send().await?;
        let status = res.status();
        let text = res.text().await?;

        trace!("{endpoint} answered {status}: {text}");
        Ok((status, text))
    }

    async fn post_checked<B: Serialize>(&self, endpoint: &str, body: &B) -> Result<String, AuthError> {
        let (status, text) = self.post(endpoint, body).await?;

        if status.is_success() {
            Ok(text)
        } else {
            Err(error_from_response(status.as_u16(), &text))
        }
    }

    /// Logs in with account credentials. `client_token` is reused if given, otherwise the service
    /// picks one.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
        client_token: Option<&str>,
    ) -> Result<AuthenticationToken, AuthError> {
        let body = AuthenticateRequest {
            agent: Agent {
                name: AGENT_NAME,
                version: AGENT_VERSION,
            },
            username,
            password,
            client_token,
        };

        let text = self.post_checked("authenticate", &body).await?;
        token_from_response(username, StatusCode::OK.as_u16(), &text)
    }

    /// Trades a stored token pair for a fresh one.
    pub async fn refresh(
        &self,
        token: &AuthenticationToken,
    ) -> Result<AuthenticationToken, AuthError> {
        if token.access_token.is_empty() {
            return Err(AuthError::MissingField("access_token"));
        }
        if token.client_token.is_empty() {
            return Err(AuthError::MissingField("client_token"));
        }

        let body = TokenPair {
            access_token: &token.access_token,
            client_token: Some(&token.client_token),
        };

        let text = self.post_checked("refresh", &body).await?;
        token_from_response(&token.username, StatusCode::OK.as_u16(), &text)
    }

    /// Whether the access token can still be used to join servers.
    pub async fn validate(&self, token: &AuthenticationToken) -> Result<bool, AuthError> {
        if token.access_token.is_empty() {
            return Err(AuthError::MissingField("access_token"));
        }

        let body = TokenPair {
            access_token: &token.access_token,
            client_token: None,
        };

        let (status, text) = self.post("validate", &body).await?;
        match status {
            StatusCode::NO_CONTENT => Ok(true),
            StatusCode::FORBIDDEN => Ok(false),
            s if s.is_success() => Err(AuthError::UnexpectedStatus(s.as_u16())),
            s => Err(error_from_response(s.as_u16(), &text)),
        }
    }

    /// Invalidates the token pair.
    pub async fn invalidate(&self, token: &AuthenticationToken) -> Result<(), AuthError> {
        let body = TokenPair {
            access_token: &token.access_token,
            client_token: Some(&token.client_token),
        };

        self.post_checked("invalidate", &body).await?;
        Ok(())
    }

    /// Invalidates every token of the account.
    pub async fn sign_out(&self, username: &str, password: &str) -> Result<(), AuthError> {
        self.post_checked("signout", &Credentials { username, password })
            .await?;
        Ok(())
    }
}
