//! Font decoding and metrics for the text layer
//!
//! A shown string is a sequence of character codes. To search it we need
//! the Unicode text behind each code, and to place highlights we need each
//! glyph's advance width. Both come from the font dictionary:
//!
//! - text: `/ToUnicode` CMap, then `/Encoding /Differences` glyph names,
//!   then WinAnsi for simple fonts
//! - width: `/Widths` (simple) or `/W` (composite), then the built-in
//!   metrics of the standard Helvetica/Times/Courier families, then
//!   `/MissingWidth` or `/DW`
//!
//! Composite (Type0) fonts are read with two-byte codes unless the ToUnicode
//! CMap declares one-byte source codes. Vertical writing is not supported.

use crate::cmap::ToUnicodeMap;
use crate::objects::{self, number};
use lopdf::{Dictionary, Document, Object};
use std::collections::HashMap;

const DEFAULT_ASCENT: f64 = 0.8;
const DEFAULT_DESCENT: f64 = -0.2;
const REPLACEMENT: char = '\u{FFFD}';

/// Widths of the printable ASCII range (32..=126) in 1/1000 em
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 32-47
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 48-63
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 64-79
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 80-95
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 96-111
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 112-126
];

const TIMES_WIDTHS: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278, // 32-47
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, 278, 278, 564, 564, 564, 444, // 48-63
    921, 722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722, // 64-79
    556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, 333, 278, 333, 469, 500, // 80-95
    333, 444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500, // 96-111
    500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, 480, 200, 480, 541, // 112-126
];

/// WinAnsi code points for 0x80..=0x9F; `None` marks unused slots
const WIN_ANSI_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'), None, Some('\u{201A}'), Some('\u{0192}'),
    Some('\u{201E}'), Some('\u{2026}'), Some('\u{2020}'), Some('\u{2021}'),
    Some('\u{02C6}'), Some('\u{2030}'), Some('\u{0160}'), Some('\u{2039}'),
    Some('\u{0152}'), None, Some('\u{017D}'), None,
    None, Some('\u{2018}'), Some('\u{2019}'), Some('\u{201C}'),
    Some('\u{201D}'), Some('\u{2022}'), Some('\u{2013}'), Some('\u{2014}'),
    Some('\u{02DC}'), Some('\u{2122}'), Some('\u{0161}'), Some('\u{203A}'),
    Some('\u{0153}'), None, Some('\u{017E}'), Some('\u{0178}'),
];

const GLYPH_NAMES: &[(&str, &str)] = &[
    ("space", " "), ("exclam", "!"), ("quotedbl", "\""), ("numbersign", "#"),
    ("dollar", "$"), ("percent", "%"), ("ampersand", "&"), ("quotesingle", "'"),
    ("quoteright", "\u{2019}"), ("quoteleft", "\u{2018}"), ("parenleft", "("),
    ("parenright", ")"), ("asterisk", "*"), ("plus", "+"), ("comma", ","),
    ("hyphen", "-"), ("minus", "\u{2212}"), ("period", "."), ("slash", "/"),
    ("zero", "0"), ("one", "1"), ("two", "2"), ("three", "3"), ("four", "4"),
    ("five", "5"), ("six", "6"), ("seven", "7"), ("eight", "8"), ("nine", "9"),
    ("colon", ":"), ("semicolon", ";"), ("less", "<"), ("equal", "="),
    ("greater", ">"), ("question", "?"), ("at", "@"), ("bracketleft", "["),
    ("backslash", "\\"), ("bracketright", "]"), ("asciicircum", "^"),
    ("underscore", "_"), ("grave", "`"), ("braceleft", "{"), ("bar", "|"),
    ("braceright", "}"), ("asciitilde", "~"), ("quotedblleft", "\u{201C}"),
    ("quotedblright", "\u{201D}"), ("quotesinglbase", "\u{201A}"),
    ("quotedblbase", "\u{201E}"), ("endash", "\u{2013}"), ("emdash", "\u{2014}"),
    ("bullet", "\u{2022}"), ("ellipsis", "\u{2026}"), ("fi", "fi"), ("fl", "fl"),
    ("ff", "ff"), ("ffi", "ffi"), ("ffl", "ffl"), ("Euro", "\u{20AC}"),
    ("copyright", "\u{00A9}"), ("registered", "\u{00AE}"), ("trademark", "\u{2122}"),
    ("degree", "\u{00B0}"), ("section", "\u{00A7}"), ("paragraph", "\u{00B6}"),
    ("nbspace", "\u{00A0}"), ("nonbreakingspace", "\u{00A0}"),
    ("ordfeminine", "\u{00AA}"), ("ordmasculine", "\u{00BA}"),
    ("aacute", "á"), ("agrave", "à"), ("acircumflex", "â"), ("atilde", "ã"),
    ("adieresis", "ä"), ("aring", "å"), ("ccedilla", "ç"), ("eacute", "é"),
    ("egrave", "è"), ("ecircumflex", "ê"), ("edieresis", "ë"), ("iacute", "í"),
    ("igrave", "ì"), ("icircumflex", "î"), ("idieresis", "ï"), ("ntilde", "ñ"),
    ("oacute", "ó"), ("ograve", "ò"), ("ocircumflex", "ô"), ("otilde", "õ"),
    ("odieresis", "ö"), ("oslash", "ø"), ("uacute", "ú"), ("ugrave", "ù"),
    ("ucircumflex", "û"), ("udieresis", "ü"), ("yacute", "ý"), ("ydieresis", "ÿ"),
    ("germandbls", "ß"), ("ae", "æ"), ("oe", "œ"), ("scaron", "š"), ("zcaron", "ž"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StandardFamily {
    Helvetica,
    Times,
    Courier,
}

impl StandardFamily {
    fn detect(base_font: &str) -> Option<Self> {
        let lower = base_font.to_lowercase();
        if lower.contains("courier") {
            Some(StandardFamily::Courier)
        } else if lower.contains("times") {
            Some(StandardFamily::Times)
        } else if lower.contains("helvetica") || lower.contains("arial") {
            Some(StandardFamily::Helvetica)
        } else {
            None
        }
    }

    /// Width in 1/1000 em of the glyph showing `ch`
    fn width(&self, ch: char) -> f64 {
        let ascii = ch as u32;
        match self {
            StandardFamily::Courier => 600.0,
            StandardFamily::Helvetica => match ascii {
                32..=126 => HELVETICA_WIDTHS[(ascii - 32) as usize] as f64,
                _ => 556.0,
            },
            StandardFamily::Times => match ascii {
                32..=126 => TIMES_WIDTHS[(ascii - 32) as usize] as f64,
                _ => 500.0,
            },
        }
    }
}

/// One character code decoded from a shown string
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedChar {
    pub code: u32,
    pub text: String,
    /// Horizontal displacement in text space units (before font size)
    pub width: f64,
    /// Single-byte code 32, the only code word spacing applies to
    pub is_word_space: bool,
}

#[derive(Debug, Clone)]
pub struct PdfFont {
    pub base_font: String,
    composite: bool,
    widths: HashMap<u32, f64>,
    default_width: f64,
    width_scale: f64,
    standard: Option<StandardFamily>,
    differences: HashMap<u32, String>,
    to_unicode: Option<ToUnicodeMap>,
    /// Top of the glyph box in em
    pub ascent: f64,
    /// Bottom of the glyph box in em, usually negative
    pub descent: f64,
}

impl Default for PdfFont {
    /// Metrics used when a `Tf` names a font missing from the resources
    fn default() -> Self {
        Self {
            base_font: "Helvetica".to_string(),
            composite: false,
            widths: HashMap::new(),
            default_width: 556.0,
            width_scale: 0.001,
            standard: Some(StandardFamily::Helvetica),
            differences: HashMap::new(),
            to_unicode: None,
            ascent: DEFAULT_ASCENT,
            descent: DEFAULT_DESCENT,
        }
    }
}

impl PdfFont {
    pub fn from_dict(doc: &Document, dict: &Dictionary) -> Self {
        let subtype = objects::get_name(doc, dict, b"Subtype").unwrap_or(b"Type1");
        let base_font = objects::get_name(doc, dict, b"BaseFont")
            .map(|name| strip_subset_prefix(&String::from_utf8_lossy(name)).to_string())
            .unwrap_or_default();

        let to_unicode = objects::get_stream(doc, dict, b"ToUnicode")
            .and_then(|stream| match objects::stream_content(stream) {
                Ok(data) => Some(ToUnicodeMap::parse(&data)),
                Err(e) => {
                    tracing::warn!("Unreadable ToUnicode CMap for font {}: {}", base_font, e);
                    None
                }
            })
            .filter(|cmap| !cmap.is_empty());

        let mut font = PdfFont {
            base_font,
            to_unicode,
            ..Default::default()
        };

        if subtype == b"Type0" {
            font.load_composite(doc, dict);
        } else {
            font.load_simple(doc, dict, subtype == b"Type3");
        }
        font
    }

    fn load_simple(&mut self, doc: &Document, dict: &Dictionary, type3: bool) {
        self.composite = false;

        if type3 {
            self.width_scale = objects::get_array(doc, dict, b"FontMatrix")
                .and_then(|m| m.first())
                .and_then(number)
                .filter(|scale| *scale != 0.0)
                .unwrap_or(0.001);
        }

        let first_char = objects::get_number(doc, dict, b"FirstChar")
            .and_then(to_code)
            .unwrap_or(0);
        if let Some(widths) = objects::get_array(doc, dict, b"Widths") {
            for (i, w) in widths.iter().enumerate() {
                let Some(code) = offset_code(first_char, i) else {
                    break;
                };
                if let Some(w) = objects::resolve(doc, w).and_then(number) {
                    self.widths.insert(code, w);
                }
            }
        }

        let descriptor = objects::get_dict(doc, dict, b"FontDescriptor");
        self.standard = if self.widths.is_empty() && !type3 {
            StandardFamily::detect(&self.base_font)
        } else {
            None
        };
        self.default_width = descriptor
            .and_then(|d| objects::get_number(doc, d, b"MissingWidth"))
            .filter(|w| *w > 0.0)
            .unwrap_or(if type3 { 0.0 } else { 500.0 });

        if let Some(encoding) = objects::get_dict(doc, dict, b"Encoding") {
            if let Some(diffs) = objects::get_array(doc, encoding, b"Differences") {
                self.differences = parse_differences(diffs);
            }
        }

        if !type3 {
            self.load_vertical_metrics(doc, descriptor);
        }
    }

    fn load_composite(&mut self, doc: &Document, dict: &Dictionary) {
        self.composite = true;
        self.standard = None;

        let descendant = objects::get_array(doc, dict, b"DescendantFonts")
            .and_then(|fonts| fonts.first())
            .and_then(|obj| objects::resolve(doc, obj))
            .and_then(|obj| obj.as_dict().ok());

        let Some(descendant) = descendant else {
            tracing::warn!("Type0 font {} has no descendant font", self.base_font);
            self.default_width = 1000.0;
            return;
        };

        self.default_width = objects::get_number(doc, descendant, b"DW").unwrap_or(1000.0);
        if let Some(w) = objects::get_array(doc, descendant, b"W") {
            self.widths = parse_cid_widths(doc, w);
        }
        let descriptor = objects::get_dict(doc, descendant, b"FontDescriptor");
        self.load_vertical_metrics(doc, descriptor);
    }

    fn load_vertical_metrics(&mut self, doc: &Document, descriptor: Option<&Dictionary>) {
        let Some(descriptor) = descriptor else {
            return;
        };
        let ascent = objects::get_number(doc, descriptor, b"Ascent").map(|a| a / 1000.0);
        let descent = objects::get_number(doc, descriptor, b"Descent").map(|d| d / 1000.0);
        if let (Some(ascent), Some(descent)) = (ascent, descent) {
            if ascent > 0.0 && descent <= 0.0 && ascent - descent <= 3.0 {
                self.ascent = ascent;
                self.descent = descent;
            }
        }
    }

    pub fn is_composite(&self) -> bool {
        self.composite
    }

    /// Split a shown string into character codes with text and widths
    pub fn decode(&self, bytes: &[u8]) -> Vec<DecodedChar> {
        let code_len = if self.composite {
            match self.to_unicode.as_ref().and_then(|m| m.code_len()) {
                Some(1) => 1,
                _ => 2,
            }
        } else {
            1
        };

        bytes
            .chunks(code_len)
            .map(|chunk| {
                let code = chunk.iter().fold(0u32, |acc, b| (acc << 8) | *b as u32);
                let text = self.text_for(code);
                let width = self.width_for(code, &text);
                DecodedChar {
                    code,
                    text,
                    width,
                    is_word_space: !self.composite && code == 32,
                }
            })
            .collect()
    }

    fn text_for(&self, code: u32) -> String {
        if let Some(mapped) = self.to_unicode.as_ref().and_then(|m| m.get(code)) {
            if !mapped.is_empty() {
                return mapped.to_string();
            }
        }
        if let Some(text) = self.differences.get(&code) {
            return text.clone();
        }
        if self.composite {
            return REPLACEMENT.to_string();
        }
        win_ansi_char(code as u8).to_string()
    }

    fn width_for(&self, code: u32, text: &str) -> f64 {
        if let Some(w) = self.widths.get(&code) {
            return w * self.width_scale;
        }
        if let Some(family) = self.standard {
            let ch = text.chars().next().unwrap_or(' ');
            return family.width(ch) / 1000.0;
        }
        self.default_width * self.width_scale
    }
}

/// Drop the `ABCDEF+` tag of subset fonts
fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.bytes().all(|b| b.is_ascii_uppercase()) => rest,
        _ => name,
    }
}

/// A character code read from a PDF number; `None` when out of range
fn to_code(value: f64) -> Option<u32> {
    if (0.0..=u32::MAX as f64).contains(&value) {
        Some(value as u32)
    } else {
        None
    }
}

fn offset_code(first: u32, offset: usize) -> Option<u32> {
    u32::try_from(offset).ok().and_then(|o| first.checked_add(o))
}

/// `[code name name ... code name ...]`
fn parse_differences(diffs: &[Object]) -> HashMap<u32, String> {
    let mut map = HashMap::new();
    // `None` after an out-of-range code; names are skipped until the next valid one
    let mut code = Some(0u32);
    for item in diffs {
        match item {
            Object::Integer(c) => code = u32::try_from(*c).ok(),
            Object::Name(name) => {
                if let Some(current) = code {
                    if let Some(text) = glyph_to_unicode(&String::from_utf8_lossy(name)) {
                        map.insert(current, text);
                    }
                    code = current.checked_add(1);
                }
            }
            _ => {}
        }
    }
    map
}

/// `/W` entries: `c [w1 w2 ...]` or `c_first c_last w`
fn parse_cid_widths(doc: &Document, w: &[Object]) -> HashMap<u32, f64> {
    let mut widths = HashMap::new();
    let items: Vec<&Object> = w.iter().filter_map(|o| objects::resolve(doc, o)).collect();
    let mut i = 0;
    while i < items.len() {
        let Some(first) = number(items[i]) else {
            i += 1;
            continue;
        };
        let first = to_code(first);
        match items.get(i + 1) {
            Some(Object::Array(list)) => {
                if let Some(first) = first {
                    for (offset, w) in list.iter().enumerate() {
                        let Some(cid) = offset_code(first, offset) else {
                            break;
                        };
                        if let Some(w) = objects::resolve(doc, w).and_then(number) {
                            widths.insert(cid, w);
                        }
                    }
                }
                i += 2;
            }
            Some(last) => {
                let last = number(last).and_then(to_code);
                let w = items.get(i + 2).and_then(|o| number(o));
                if let (Some(first), Some(last), Some(w)) = (first, last, w) {
                    if last >= first && last - first <= 0xFFFF {
                        for cid in first..=last {
                            widths.insert(cid, w);
                        }
                    }
                }
                i += 3;
            }
            None => break,
        }
    }
    widths
}

/// Map a glyph name to its Unicode text
pub fn glyph_to_unicode(name: &str) -> Option<String> {
    // "a.sc", "one.oldstyle"
    let base = name.split('.').next().unwrap_or(name);
    if base.is_empty() {
        return None;
    }

    // Ligatures written as "f_f_i"
    if base.contains('_') {
        let parts: Option<Vec<String>> = base.split('_').map(glyph_to_unicode).collect();
        return parts.map(|p| p.concat());
    }

    if let Some(hex) = base.strip_prefix("uni") {
        if hex.len() >= 4 && hex.len() % 4 == 0 && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            let units: Option<Vec<u16>> = (0..hex.len())
                .step_by(4)
                .map(|i| u16::from_str_radix(&hex[i..i + 4], 16).ok())
                .collect();
            if let Some(units) = units {
                return Some(String::from_utf16_lossy(&units));
            }
        }
    }

    if let Some(hex) = base.strip_prefix('u') {
        if (4..=6).contains(&hex.len()) && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            if let Some(ch) = u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
                return Some(ch.to_string());
            }
        }
    }

    let mut chars = base.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        if ch.is_ascii_alphanumeric() {
            return Some(ch.to_string());
        }
    }

    if let Some((_, text)) = GLYPH_NAMES.iter().find(|(n, _)| *n == base) {
        return Some(text.to_string());
    }

    // "Eacute" from "eacute"
    let mut chars = base.chars();
    let first = chars.next()?;
    if first.is_ascii_uppercase() {
        let lowered = format!("{}{}", first.to_ascii_lowercase(), chars.as_str());
        if let Some((_, text)) = GLYPH_NAMES.iter().find(|(n, _)| *n == lowered) {
            return Some(text.to_uppercase());
        }
    }

    None
}

/// WinAnsiEncoding, with Latin-1 for the upper half
pub fn win_ansi_char(code: u8) -> char {
    match code {
        0x80..=0x9F => WIN_ANSI_HIGH[(code - 0x80) as usize].unwrap_or(REPLACEMENT),
        b'\t' | b'\n' | b'\r' => code as char,
        0x00..=0x1F => REPLACEMENT,
        _ => code as char,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};
    use pretty_assertions::assert_eq;

    fn helvetica() -> Dictionary {
        dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        }
    }

    #[test]
    fn test_standard_font_widths() {
        let doc = Document::with_version("1.7");
        let font = PdfFont::from_dict(&doc, &helvetica());
        let chars = font.decode(b"Hi ");
        assert_eq!(chars.len(), 3);
        assert_eq!(chars[0].text, "H");
        assert!((chars[0].width - 0.722).abs() < 1e-9);
        assert!((chars[1].width - 0.222).abs() < 1e-9);
        assert!(chars[2].is_word_space);
        assert!(!chars[0].is_word_space);
    }

    #[test]
    fn test_courier_is_monospaced() {
        let doc = Document::with_version("1.7");
        let dict = dictionary! { "Subtype" => "Type1", "BaseFont" => "Courier-Bold" };
        let font = PdfFont::from_dict(&doc, &dict);
        assert!(font.decode(b"iW").iter().all(|c| (c.width - 0.6).abs() < 1e-9));
    }

    #[test]
    fn test_widths_array_and_missing_width() {
        let mut doc = Document::with_version("1.7");
        let descriptor = doc.add_object(dictionary! {
            "Type" => "FontDescriptor",
            "MissingWidth" => 250,
            "Ascent" => 900,
            "Descent" => -250,
        });
        let dict = dictionary! {
            "Subtype" => "TrueType",
            "BaseFont" => "ABCDEF+Custom",
            "FirstChar" => 65,
            "Widths" => vec![Object::Integer(700), Object::Integer(650)],
            "FontDescriptor" => Object::Reference(descriptor),
        };
        let font = PdfFont::from_dict(&doc, &dict);
        assert_eq!(font.base_font, "Custom");
        let chars = font.decode(b"ABC");
        assert!((chars[0].width - 0.7).abs() < 1e-9);
        assert!((chars[1].width - 0.65).abs() < 1e-9);
        assert!((chars[2].width - 0.25).abs() < 1e-9);
        assert!((font.ascent - 0.9).abs() < 1e-9);
        assert!((font.descent + 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_differences_override_encoding() {
        let doc = Document::with_version("1.7");
        let dict = dictionary! {
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => dictionary! {
                "Type" => "Encoding",
                "Differences" => vec![
                    Object::Integer(1),
                    Object::Name(b"eacute".to_vec()),
                    Object::Name(b"fi".to_vec()),
                    Object::Name(b"Ccedilla".to_vec()),
                ],
            },
        };
        let font = PdfFont::from_dict(&doc, &dict);
        let text: Vec<String> = font.decode(&[1, 2, 3, b'a']).into_iter().map(|c| c.text).collect();
        assert_eq!(text, vec!["é", "fi", "Ç", "a"]);
    }

    #[test]
    fn test_composite_font_with_to_unicode() {
        let mut doc = Document::with_version("1.7");
        let cmap = doc.add_object(Stream::new(
            Dictionary::new(),
            b"beginbfchar <0001> <0048> <0002> <0069> endbfchar".to_vec(),
        ));
        let descendant = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "CIDFontType2",
            "DW" => 500,
            "W" => vec![Object::Integer(1), Object::Array(vec![Object::Integer(800)])],
        });
        let dict = dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => "Noto",
            "Encoding" => "Identity-H",
            "DescendantFonts" => vec![Object::Reference(descendant)],
            "ToUnicode" => Object::Reference(cmap),
        };
        let font = PdfFont::from_dict(&doc, &dict);
        assert!(font.is_composite());
        let chars = font.decode(&[0, 1, 0, 2, 0, 9]);
        assert_eq!(chars.len(), 3);
        assert_eq!(chars[0].text, "H");
        assert_eq!(chars[1].text, "i");
        assert_eq!(chars[2].text, "\u{FFFD}");
        assert!((chars[0].width - 0.8).abs() < 1e-9);
        assert!((chars[1].width - 0.5).abs() < 1e-9);
        assert!(chars.iter().all(|c| !c.is_word_space));
    }

    #[test]
    fn test_cid_width_ranges() {
        let doc = Document::with_version("1.7");
        let w = vec![
            Object::Integer(10),
            Object::Integer(12),
            Object::Integer(300),
            Object::Integer(20),
            Object::Array(vec![Object::Integer(100), Object::Real(200.5)]),
        ];
        let widths = parse_cid_widths(&doc, &w);
        assert_eq!(widths.get(&11), Some(&300.0));
        assert_eq!(widths.get(&20), Some(&100.0));
        assert_eq!(widths.get(&21), Some(&200.5));
        assert_eq!(widths.len(), 5);
    }

    #[test]
    fn test_glyph_names() {
        assert_eq!(glyph_to_unicode("A"), Some("A".to_string()));
        assert_eq!(glyph_to_unicode("uni00E9"), Some("é".to_string()));
        assert_eq!(glyph_to_unicode("u1F600"), Some("\u{1F600}".to_string()));
        assert_eq!(glyph_to_unicode("f_f_i"), Some("ffi".to_string()));
        assert_eq!(glyph_to_unicode("a.sc"), Some("a".to_string()));
        assert_eq!(glyph_to_unicode("Atilde"), Some("Ã".to_string()));
        assert_eq!(glyph_to_unicode("g123"), None);
    }

    #[test]
    fn test_glyph_names_with_non_hex_suffix() {
        assert_eq!(glyph_to_unicode("uniaaaéaaa"), None);
        assert_eq!(glyph_to_unicode("uni00É9"), None);
        assert_eq!(glyph_to_unicode("uéééé"), None);
        assert_eq!(glyph_to_unicode("uni+0E9"), None);
    }

    #[test]
    fn test_non_ascii_difference_name_decodes() {
        let doc = Document::with_version("1.7");
        let dict = dictionary! {
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => dictionary! {
                "Differences" => vec![
                    Object::Integer(65),
                    Object::Name("uniaaaéaaa".as_bytes().to_vec()),
                ],
            },
        };
        let font = PdfFont::from_dict(&doc, &dict);
        assert_eq!(font.decode(b"A")[0].text, "A");
    }

    #[test]
    fn test_differences_near_code_limit() {
        let diffs = vec![
            Object::Integer(u32::MAX as i64),
            Object::Name(b"a".to_vec()),
            Object::Name(b"b".to_vec()),
            Object::Integer(-5),
            Object::Name(b"c".to_vec()),
            Object::Integer(i64::MAX),
            Object::Name(b"d".to_vec()),
            Object::Integer(7),
            Object::Name(b"e".to_vec()),
        ];
        let map = parse_differences(&diffs);
        assert_eq!(map.get(&u32::MAX), Some(&"a".to_string()));
        assert_eq!(map.get(&7), Some(&"e".to_string()));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_widths_near_code_limit() {
        let doc = Document::with_version("1.7");
        let dict = dictionary! {
            "Subtype" => "TrueType",
            "BaseFont" => "Custom",
            "FirstChar" => u32::MAX as i64,
            "Widths" => vec![Object::Integer(700), Object::Integer(650)],
        };
        let font = PdfFont::from_dict(&doc, &dict);
        assert_eq!(font.widths.get(&u32::MAX), Some(&700.0));
        assert_eq!(font.widths.len(), 1);

        let w = vec![
            Object::Integer(u32::MAX as i64),
            Object::Array(vec![Object::Integer(100), Object::Integer(200)]),
            Object::Integer(-1),
            Object::Array(vec![Object::Integer(300)]),
            Object::Real(1e12),
            Object::Real(2e12),
            Object::Integer(400),
        ];
        let widths = parse_cid_widths(&doc, &w);
        assert_eq!(widths.get(&u32::MAX), Some(&100.0));
        assert_eq!(widths.len(), 1);
    }

    #[test]
    fn test_win_ansi() {
        assert_eq!(win_ansi_char(b'A'), 'A');
        assert_eq!(win_ansi_char(0x93), '\u{201C}');
        assert_eq!(win_ansi_char(0xE9), 'é');
        assert_eq!(win_ansi_char(0x81), '\u{FFFD}');
        assert_eq!(win_ansi_char(0x01), '\u{FFFD}');
    }
}
