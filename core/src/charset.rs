//! Output encodings: how a [`CharacterEntry`] becomes on-screen text.
//!
//! Unicode renders precomposed NFC characters. The two legacy encodings
//! target the VNI-Windows and TCVN3 (ABC) font families; their glyphs sit
//! on Latin-1 codepoints, so a slot may render as one or two characters.

use ahash::AHashMap;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::buffer::{CharacterEntry, Tone};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Encoding {
    #[default]
    Unicode,
    VniWindows,
    Tcvn3,
}

/// Append the rendering of one slot to `out`.
pub fn push_entry(out: &mut String, e: &CharacterEntry, enc: Encoding) {
    // đ is the only shaped consonant.
    if e.base == 'd' && e.circumflex {
        out.push(match (enc, e.caps) {
            (Encoding::Unicode, false) => 'đ',
            (Encoding::Unicode, true) => 'Đ',
            (Encoding::VniWindows, false) => 'ñ',
            (Encoding::VniWindows, true) => 'Ñ',
            (Encoding::Tcvn3, false) => '®',
            (Encoding::Tcvn3, true) => '§',
        });
        return;
    }
    if !e.is_vowel() {
        out.push(if e.caps {
            e.base.to_ascii_uppercase()
        } else {
            e.base
        });
        return;
    }
    match enc {
        Encoding::Unicode => {
            let ch = unicode_vowel(e.base, e.circumflex, e.horn, e.tone);
            if e.caps {
                out.extend(ch.to_uppercase());
            } else {
                out.push(ch);
            }
        }
        Encoding::VniWindows => vni_push(out, e),
        Encoding::Tcvn3 => tcvn3_push(out, e),
    }
}

pub fn render_entry(e: &CharacterEntry, enc: Encoding) -> String {
    let mut out = String::new();
    push_entry(&mut out, e, enc);
    out
}

/// Lowercase precomposed vowel for (base, circumflex, horn, tone).
///
/// Rows are ordered level, acute, grave, hook above, tilde, dot below.
/// Impossible flag combinations fall back to the nearest real letter so a
/// rendering always exists.
fn unicode_vowel(base: char, circumflex: bool, horn: bool, tone: Tone) -> char {
    let row: [char; 6] = match (base, circumflex, horn) {
        ('a', false, false) => ['a', 'á', 'à', 'ả', 'ã', 'ạ'],
        ('a', true, _) => ['â', 'ấ', 'ầ', 'ẩ', 'ẫ', 'ậ'],
        ('a', false, true) => ['ă', 'ắ', 'ằ', 'ẳ', 'ẵ', 'ặ'],
        ('e', false, _) => ['e', 'é', 'è', 'ẻ', 'ẽ', 'ẹ'],
        ('e', true, _) => ['ê', 'ế', 'ề', 'ể', 'ễ', 'ệ'],
        ('i', _, _) => ['i', 'í', 'ì', 'ỉ', 'ĩ', 'ị'],
        ('o', false, false) => ['o', 'ó', 'ò', 'ỏ', 'õ', 'ọ'],
        ('o', true, _) => ['ô', 'ố', 'ồ', 'ổ', 'ỗ', 'ộ'],
        ('o', false, true) => ['ơ', 'ớ', 'ờ', 'ở', 'ỡ', 'ợ'],
        ('u', _, false) => ['u', 'ú', 'ù', 'ủ', 'ũ', 'ụ'],
        ('u', _, true) => ['ư', 'ứ', 'ừ', 'ử', 'ữ', 'ự'],
        ('y', _, _) => ['y', 'ý', 'ỳ', 'ỷ', 'ỹ', 'ỵ'],
        _ => return base,
    };
    row[tone.index()]
}

/// VNI-Windows: plain or horn base glyph followed by a combining glyph.
///
/// The horn vowels are single precomposed codepoints (ơ = `ô`, ư = `ö` in
/// Latin-1 terms); circumflex and breve merge with the tone into one
/// combining glyph. The combining glyph's case follows the vowel's case.
fn vni_push(out: &mut String, e: &CharacterEntry) {
    let lower = !e.caps;
    let base = if e.horn && e.base == 'o' {
        if lower { 'ô' } else { 'Ô' }
    } else if e.horn && e.base == 'u' {
        if lower { 'ö' } else { 'Ö' }
    } else if e.caps {
        e.base.to_ascii_uppercase()
    } else {
        e.base
    };
    out.push(base);

    let ti = e.tone.index();
    if e.circumflex {
        let marks = if lower {
            ['â', 'á', 'à', 'å', 'ã', 'ä']
        } else {
            ['Â', 'Á', 'À', 'Å', 'Ã', 'Ä']
        };
        out.push(marks[ti]);
    } else if e.horn && e.base == 'a' {
        // Breve.
        let marks = if lower {
            ['ê', 'é', 'è', 'ú', 'ü', 'ë']
        } else {
            ['Ê', 'É', 'È', 'Ú', 'Ü', 'Ë']
        };
        out.push(marks[ti]);
    } else if e.tone != Tone::Level {
        let marks = if lower {
            [' ', 'ù', 'ø', 'û', 'õ', 'ï']
        } else {
            [' ', 'Ù', 'Ø', 'Û', 'Õ', 'Ï']
        };
        out.push(marks[ti]);
    }
}

/// TCVN3 glyphs for every shaped/toned lowercase vowel, keyed by
/// (base, circumflex, horn, tone row). Plain letters are absent: they
/// render as themselves.
static TCVN3_LOWER: Lazy<AHashMap<(char, bool, bool, usize), char>> = Lazy::new(|| {
    let rows: &[(char, bool, bool, [char; 6])] = &[
        ('a', false, false, ['a', '¸', 'µ', '¶', '·', '¹']),
        ('a', false, true, ['¨', '¾', '»', '¼', '½', 'Æ']),
        ('a', true, false, ['©', 'Ê', 'Ç', 'È', 'É', 'Ë']),
        ('e', false, false, ['e', 'Ð', 'Ì', 'Î', 'Ï', 'Ñ']),
        ('e', true, false, ['ª', 'Õ', 'Ò', 'Ó', 'Ô', 'Ö']),
        ('i', false, false, ['i', 'Ý', '×', 'Ø', 'Ü', 'Þ']),
        ('o', false, false, ['o', 'ã', 'ß', 'á', 'â', 'ä']),
        ('o', true, false, ['«', 'è', 'å', 'æ', 'ç', 'é']),
        ('o', false, true, ['¬', 'í', 'ê', 'ë', 'ì', 'î']),
        ('u', false, false, ['u', 'ó', 'ï', 'ñ', 'ò', 'ô']),
        ('u', false, true, ['\u{ad}', 'ø', 'õ', 'ö', '÷', 'ù']),
        ('y', false, false, ['y', 'ý', 'ú', 'û', 'ü', 'þ']),
    ];
    let mut m = AHashMap::new();
    for &(base, circ, horn, glyphs) in rows {
        for (ti, &g) in glyphs.iter().enumerate() {
            m.insert((base, circ, horn, ti), g);
        }
    }
    m
});

/// TCVN3: single scattered Latin-1 glyphs, lowercase forms only.
///
/// Uppercase exists for the seven shaped base letters alone; a toned
/// capital falls back to the lowercase glyph, which is what the companion
/// fonts of the era displayed in body text.
fn tcvn3_push(out: &mut String, e: &CharacterEntry) {
    if e.caps && e.tone == Tone::Level {
        let upper = match (e.base, e.circumflex, e.horn) {
            ('a', false, true) => Some('¡'),
            ('a', true, false) => Some('¢'),
            ('e', true, false) => Some('£'),
            ('o', true, false) => Some('¤'),
            ('o', false, true) => Some('¥'),
            ('u', false, true) => Some('¦'),
            (_, false, false) => Some(e.base.to_ascii_uppercase()),
            _ => None,
        };
        if let Some(ch) = upper {
            out.push(ch);
            return;
        }
    }
    let key = (e.base, e.circumflex, e.horn, e.tone.index());
    match TCVN3_LOWER.get(&key) {
        Some(&g) => out.push(g),
        None => out.push(e.base),
    }
}
