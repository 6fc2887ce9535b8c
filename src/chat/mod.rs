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

//! Turns chat components into text a terminal can show.
//!
//! A component is the JSON the server sends with every chat message: a `text` string plus an
//! `extra` list of siblings that may carry a color, italic/strikethrough flags and a click
//! action. Only the root's direct `extra` children are rendered; anything nested deeper is
//! dropped.

pub mod ansi;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use self::ansi::{color_code, replace_legacy_codes, strip_ansi, TermCode};

/// Something that happens when a player clicks a piece of chat, e.g. `open_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkAction {
    pub action: String,
    pub value: String,
}

impl LinkAction {
    fn from_click_event(event: &Value) -> Option<Self> {
        let action = event.get("action")?.as_str()?.to_owned();
        let value = match event.get("value")? {
            Value::String(s) => s.clone(),
            // change_page carries a page number
            Value::Number(n) => n.to_string(),
            _ => return None,
        };

        Some(Self { action, value })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderResult {
    /// Text with ANSI escapes for colors and styles.
    pub formatted: String,
    /// `formatted` with every escape stripped out.
    pub plain: String,
    /// Click actions in the order they appear.
    pub links: Vec<LinkAction>,
}

/// Renders a chat component. Never fails: anything malformed is logged and left out.
pub fn render(component: &Value) -> RenderResult {
    let mut out = String::new();
    let mut links = Vec::new();

    match component {
        Value::Object(root) => render_root(root, &mut out, &mut links),
        Value::String(text) => out.push_str(text),
        Value::Array(parts) => {
            for part in parts {
                render_child(part, &mut out, &mut links);
            }
        }
        other => warn!("Chat component is not an object, array or string: {other}"),
    }

    let formatted = replace_legacy_codes(&out);
    let plain = strip_ansi(&formatted);

    RenderResult {
        formatted,
        plain,
        links,
    }
}

/// Renders a component that hasn't been parsed yet. Text that isn't JSON at all is shown as is,
/// which is what kick messages from some proxies look like.
pub fn render_raw(raw: &str) -> RenderResult {
    match serde_json::from_str::<Value>(raw) {
        Ok(component) => render(&component),
        Err(_) => render(&Value::String(raw.to_owned())),
    }
}

fn render_root(root: &Map<String, Value>, out: &mut String, links: &mut Vec<LinkAction>) {
    match root.get("text") {
        Some(Value::String(text)) => out.push_str(text),
        Some(other) => warn!("Ignoring non-string text in chat component: {other}"),
        None => (),
    }

    match root.get("extra") {
        Some(Value::Array(extra)) => {
            for child in extra {
                render_child(child, out, links);
            }
        }
        Some(other) => warn!("Ignoring non-array extra in chat component: {other}"),
        None => (),
    }
}

fn render_child(child: &Value, out: &mut String, links: &mut Vec<LinkAction>) {
    match child {
        Value::String(text) => out.push_str(text),
        Value::Object(fields) => render_styled(fields, out, links),
        other => warn!("Skipping chat element of unexpected type: {other}"),
    }
}

fn render_styled(fields: &Map<String, Value>, out: &mut String, links: &mut Vec<LinkAction>) {
    let mut prefix = String::new();
    let mut suffix = "";

    // the flags only need to be present, their value is never looked at
    if fields.contains_key("italic") {
        prefix.push_str(TermCode::Italic.as_str());
        suffix = TermCode::Reset.as_str();
    }

    if fields.contains_key("strikethrough") {
        prefix.push_str(TermCode::Strikethrough.as_str());
        suffix = TermCode::Reset.as_str();
    }

    if let Some(event) = fields.get("clickEvent") {
        match LinkAction::from_click_event(event) {
            Some(link) => links.push(link),
            None => warn!("Malformed clickEvent in chat element: {event}"),
        }
    }

    // a known color replaces any style prefix set above rather than adding to it
    if let Some(color) = fields.get("color") {
        match color.as_str().and_then(color_code) {
            Some(code) => {
                prefix = code.as_str().to_owned();
                suffix = TermCode::Reset.as_str();
            }
            None => warn!("Color {color} unmatched!"),
        }
    }

    match fields.get("text") {
        Some(Value::String(text)) => {
            out.push_str(&prefix);
            out.push_str(text);
            out.push_str(suffix);
        }
        Some(other) => warn!("Skipping chat element with non-string text: {other}"),
        None => warn!("Skipping chat element without text: {fields:?}"),
    }
}
