//! ToUnicode CMap parsing
//!
//! Only the `bfchar` and `bfrange` sections matter for text search; the
//! rest of the CMap program (codespace ranges, CID mappings) is ignored.
//!
//! ```text
//! beginbfchar
//! <0041> <0041>
//! endbfchar
//! beginbfrange
//! <0020> <007E> <0020>
//! <0080> <0081> [<00E9> <00E8>]
//! endbfrange
//! ```

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    static ref TOKEN: Regex = Regex::new(r"<([0-9A-Fa-f\s]*)>|\[|\]").unwrap();
}

/// Largest range expanded from a single `bfrange` entry
const MAX_RANGE: u32 = 0xFFFF;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToUnicodeMap {
    map: HashMap<u32, String>,
    /// Width in bytes of the source codes seen while parsing
    code_len: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Hex(Vec<u8>),
    Open,
    Close,
}

impl ToUnicodeMap {
    pub fn parse(data: &[u8]) -> Self {
        let content = String::from_utf8_lossy(data);
        let mut cmap = ToUnicodeMap::default();

        for section in sections(&content, "beginbfchar", "endbfchar") {
            let tokens = tokenize(section);
            for pair in tokens.chunks(2) {
                if let [Token::Hex(src), Token::Hex(dst)] = pair {
                    cmap.note_code_len(src.len());
                    cmap.map.insert(code_of(src), utf16_to_string(dst));
                }
            }
        }

        for section in sections(&content, "beginbfrange", "endbfrange") {
            cmap.parse_ranges(&tokenize(section));
        }

        cmap
    }

    fn parse_ranges(&mut self, tokens: &[Token]) {
        let mut i = 0;
        while i + 2 < tokens.len() {
            let (start, end) = match (&tokens[i], &tokens[i + 1]) {
                (Token::Hex(start), Token::Hex(end)) => {
                    self.note_code_len(start.len());
                    (code_of(start), code_of(end))
                }
                _ => {
                    i += 1;
                    continue;
                }
            };
            if end < start || end - start > MAX_RANGE {
                i += 3;
                continue;
            }

            match &tokens[i + 2] {
                Token::Hex(dst) => {
                    let mut units = utf16_units(dst);
                    for code in start..=end {
                        self.map.insert(code, String::from_utf16_lossy(&units));
                        if let Some(last) = units.last_mut() {
                            *last = last.wrapping_add(1);
                        }
                    }
                    i += 3;
                }
                Token::Open => {
                    let mut j = i + 3;
                    let mut code = start;
                    while j < tokens.len() && tokens[j] != Token::Close {
                        if let Token::Hex(dst) = &tokens[j] {
                            if code <= end {
                                self.map.insert(code, utf16_to_string(dst));
                            }
                            code = code.saturating_add(1);
                        }
                        j += 1;
                    }
                    i = j + 1;
                }
                Token::Close => i += 3,
            }
        }
    }

    fn note_code_len(&mut self, len: usize) {
        if self.code_len.is_none() && (1..=4).contains(&len) {
            self.code_len = Some(len);
        }
    }

    pub fn get(&self, code: u32) -> Option<&str> {
        self.map.get(&code).map(String::as_str)
    }

    pub fn code_len(&self) -> Option<usize> {
        self.code_len
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

fn sections<'a>(content: &'a str, begin: &str, end: &str) -> Vec<&'a str> {
    let mut found = Vec::new();
    let mut rest = content;
    while let Some(start) = rest.find(begin) {
        let after = &rest[start + begin.len()..];
        match after.find(end) {
            Some(stop) => {
                found.push(&after[..stop]);
                rest = &after[stop + end.len()..];
            }
            None => break,
        }
    }
    found
}

fn tokenize(section: &str) -> Vec<Token> {
    TOKEN
        .captures_iter(section)
        .map(|cap| match cap.get(1) {
            Some(hex) => Token::Hex(hex_bytes(hex.as_str())),
            None if &cap[0] == "[" => Token::Open,
            None => Token::Close,
        })
        .collect()
}

fn hex_bytes(hex: &str) -> Vec<u8> {
    let digits: Vec<u8> = hex
        .bytes()
        .filter(|b| b.is_ascii_hexdigit())
        .map(|b| match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 10,
            _ => b - b'A' + 10,
        })
        .collect();
    digits
        .chunks(2)
        .map(|pair| match pair {
            [hi, lo] => (hi << 4) | lo,
            // Odd trailing digit is padded with 0
            [hi] => hi << 4,
            _ => 0,
        })
        .collect()
}

fn code_of(bytes: &[u8]) -> u32 {
    bytes.iter().take(4).fold(0u32, |acc, b| (acc << 8) | *b as u32)
}

fn utf16_units(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks(2)
        .map(|pair| match pair {
            [hi, lo] => u16::from_be_bytes([*hi, *lo]),
            [lo] => *lo as u16,
            _ => 0,
        })
        .collect()
}

fn utf16_to_string(bytes: &[u8]) -> String {
    String::from_utf16_lossy(&utf16_units(bytes))
}
