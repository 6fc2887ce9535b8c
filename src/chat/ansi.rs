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

//! Terminal escape codes and the palette that maps chat colors onto them.

/// SGR escape sequences understood by ANSI terminals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermCode {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    LightGray,
    DarkGray,
    LightRed,
    LightGreen,
    LightYellow,
    LightBlue,
    LightMagenta,
    LightCyan,
    White,

    Italic,
    Strikethrough,

    Reset,
}

impl TermCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            TermCode::Black => "\x1b[30m",
            TermCode::Red => "\x1b[31m",
            TermCode::Green => "\x1b[32m",
            TermCode::Yellow => "\x1b[33m",
            TermCode::Blue => "\x1b[34m",
            TermCode::Magenta => "\x1b[35m",
            TermCode::Cyan => "\x1b[36m",
            TermCode::LightGray => "\x1b[37m",
            TermCode::DarkGray => "\x1b[90m",
            TermCode::LightRed => "\x1b[91m",
            TermCode::LightGreen => "\x1b[92m",
            TermCode::LightYellow => "\x1b[93m",
            TermCode::LightBlue => "\x1b[94m",
            TermCode::LightMagenta => "\x1b[95m",
            TermCode::LightCyan => "\x1b[96m",
            TermCode::White => "\x1b[97m",

            TermCode::Italic => "\x1b[3m",
            TermCode::Strikethrough => "\x1b[9m",

            TermCode::Reset => "\x1b[m",
        }
    }
}

/// Looks up a named chat color.
///
/// The game's bright colors carry the plain names (`red`, `blue`, ...) and its darker shades the
/// `dark_` ones, so the plain names go to the terminal's light variants and vice versa. `gold`
/// is the game's dark yellow.
pub fn color_code(name: &str) -> Option<TermCode> {
    Some(match name {
        "black" => TermCode::Black,
        "dark_blue" => TermCode::Blue,
        "dark_green" => TermCode::Green,
        "dark_aqua" => TermCode::Cyan,
        "dark_red" => TermCode::Red,
        "dark_purple" => TermCode::Magenta,
        "gold" => TermCode::Yellow,
        "gray" => TermCode::LightGray,
        "dark_gray" => TermCode::DarkGray,
        "blue" => TermCode::LightBlue,
        "green" => TermCode::LightGreen,
        "aqua" => TermCode::LightCyan,
        "red" => TermCode::LightRed,
        "light_purple" => TermCode::LightMagenta,
        "yellow" => TermCode::LightYellow,
        "white" => TermCode::White,
        "reset" => TermCode::Reset,
        _ => return None,
    })
}

/// Section-sign codes from before structured chat, and the color name each stands for.
///
/// `§n` is underline in the game but has always been treated as a reset here.
pub const LEGACY_CODES: [(&str, &str); 17] = [
    ("§0", "black"),
    ("§1", "dark_blue"),
    ("§2", "dark_green"),
    ("§3", "dark_aqua"),
    ("§4", "dark_red"),
    ("§5", "dark_purple"),
    ("§6", "gold"),
    ("§7", "gray"),
    ("§8", "dark_gray"),
    ("§9", "blue"),
    ("§a", "green"),
    ("§b", "aqua"),
    ("§c", "red"),
    ("§d", "light_purple"),
    ("§e", "yellow"),
    ("§f", "white"),
    ("§n", "reset"),
];

/// Replaces every legacy code in `s` with its escape sequence. Anything else after a `§`,
/// like `§r` or `§l`, is left as is.
pub fn replace_legacy_codes(s: &str) -> String {
    let mut out = s.to_owned();

    for (code, name) in LEGACY_CODES {
        if !out.contains(code) {
            continue;
        }

        match color_code(name) {
            Some(term) => out = out.replace(code, term.as_str()),
            None => warn!("Legacy code {code} names unknown color {name}"),
        }
    }

    out
}

/// Removes SGR sequences of the form `ESC [ <0-3 digits> m`. Nothing else is touched, so a
/// stray escape that doesn't match stays in the output.
pub fn strip_ansi(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        if let Some(len) = sgr_len(&bytes[i..]) {
            out.push_str(&s[copied..i]);
            i += len;
            copied = i;
        } else {
            i += 1;
        }
    }

    out.push_str(&s[copied..]);
    out
}

fn sgr_len(bytes: &[u8]) -> Option<usize> {
    let rest = bytes.strip_prefix(b"\x1b[")?;
    let digits = rest.iter().take(4).take_while(|b| b.is_ascii_digit()).count();

    match (digits <= 3, rest.get(digits)) {
        (true, Some(b'm')) => Some(2 + digits + 1),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_swaps_plain_and_dark_names() {
        assert_eq!(color_code("red"), Some(TermCode::LightRed));
        assert_eq!(color_code("dark_red"), Some(TermCode::Red));
        assert_eq!(color_code("gold"), Some(TermCode::Yellow));
        assert_eq!(color_code("yellow"), Some(TermCode::LightYellow));
        assert_eq!(color_code("red").unwrap().as_str(), "\x1b[91m");
        assert_eq!(color_code("ultraviolet"), None);
    }

    #[test]
    fn every_color_name_has_its_escape() {
        let table = [
            ("black", "\x1b[30m"),
            ("dark_blue", "\x1b[34m"),
            ("dark_green", "\x1b[32m"),
            ("dark_aqua", "\x1b[36m"),
            ("dark_red", "\x1b[31m"),
            ("dark_purple", "\x1b[35m"),
            ("gold", "\x1b[33m"),
            ("gray", "\x1b[37m"),
            ("dark_gray", "\x1b[90m"),
            ("blue", "\x1b[94m"),
            ("green", "\x1b[92m"),
            ("aqua", "\x1b[96m"),
            ("red", "\x1b[91m"),
            ("light_purple", "\x1b[95m"),
            ("yellow", "\x1b[93m"),
            ("white", "\x1b[97m"),
            ("reset", "\x1b[m"),
        ];

        for (name, escape) in table {
            assert_eq!(color_code(name).map(TermCode::as_str), Some(escape), "{name}");
        }
    }

    #[test]
    fn replaces_every_legacy_code() {
        assert_eq!(
            replace_legacy_codes("§0§1§2§3§4§5§6§7§8§9§a§b§c§d§e§f§n"),
            concat!(
                "\x1b[30m\x1b[34m\x1b[32m\x1b[36m\x1b[31m\x1b[35m\x1b[33m\x1b[37m",
                "\x1b[90m\x1b[94m\x1b[92m\x1b[96m\x1b[91m\x1b[95m\x1b[93m\x1b[97m",
                "\x1b[m",
            )
        );
    }

    #[test]
    fn every_legacy_code_has_a_color() {
        for (code, name) in LEGACY_CODES {
            assert!(color_code(name).is_some(), "{code} -> {name}");
        }
    }

    #[test]
    fn legacy_replacement_skips_unmapped_codes() {
        assert_eq!(
            replace_legacy_codes("§cRed§r text§n"),
            "\x1b[91mRed§r text\x1b[m"
        );
    }

    #[test]
    fn strips_sgr_sequences_only() {
        assert_eq!(strip_ansi("\x1b[91mA\x1b[m\x1b[3mB\x1b[9m"), "AB");
        assert_eq!(strip_ansi("\x1b[1234mX"), "\x1b[1234mX");
        assert_eq!(strip_ansi("\x1b[2J§c"), "\x1b[2J§c");
        assert_eq!(strip_ansi("tail\x1b["), "tail\x1b[");
    }
}
