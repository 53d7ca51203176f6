//! Special-key tables for the supported input styles.
//!
//! A style maps printable keys to transform roles: tone marks, circumflex
//! and horn/breve triggers, the đ key, the remove-mark key, and (Telex
//! only) keys that insert a pre-shaped horn vowel directly. Keys absent
//! from the table are ordinary letters for that style.

use serde::{Deserialize, Serialize};

use crate::buffer::Tone;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum InputStyle {
    #[default]
    Telex,
    Vni,
    SimpleTelex1,
    SimpleTelex2,
}

/// Key assignments of one input style.
///
/// `circumflex` pairs a trigger with its target base letter; `None` means
/// any of a/e/o (the VNI `6`). `horn` lists which bases a trigger may
/// horn. `standalone` inserts a pre-shaped horn vowel when no target is
/// available; the bool forces capitalization (`{`/`}`). `adjacent_only`
/// restricts every transform to a target in final position.
#[derive(Debug, Clone)]
pub struct StyleTable {
    pub tones: &'static [(char, Tone)],
    pub circumflex: &'static [(char, Option<char>)],
    pub horn: &'static [(char, &'static [char])],
    pub d_key: Option<char>,
    pub remove_key: Option<char>,
    pub standalone: &'static [(char, char, bool)],
    pub adjacent_only: bool,
}

const TELEX_TONES: &[(char, Tone)] = &[
    ('s', Tone::Acute),
    ('f', Tone::Grave),
    ('r', Tone::HookAbove),
    ('x', Tone::Tilde),
    ('j', Tone::DotBelow),
];
const TELEX_CIRCUMFLEX: &[(char, Option<char>)] =
    &[('a', Some('a')), ('e', Some('e')), ('o', Some('o'))];
const TELEX_HORN: &[(char, &[char])] = &[('w', &['a', 'o', 'u'])];

static TELEX: StyleTable = StyleTable {
    tones: TELEX_TONES,
    circumflex: TELEX_CIRCUMFLEX,
    horn: TELEX_HORN,
    d_key: Some('d'),
    remove_key: Some('z'),
    standalone: &[
        ('w', 'u', false),
        ('[', 'o', false),
        (']', 'u', false),
        ('{', 'o', true),
        ('}', 'u', true),
    ],
    adjacent_only: false,
};

static VNI: StyleTable = StyleTable {
    tones: &[
        ('1', Tone::Acute),
        ('2', Tone::Grave),
        ('3', Tone::HookAbove),
        ('4', Tone::Tilde),
        ('5', Tone::DotBelow),
    ],
    circumflex: &[('6', None)],
    horn: &[('7', &['o', 'u']), ('8', &['a'])],
    d_key: Some('9'),
    remove_key: Some('0'),
    standalone: &[],
    adjacent_only: false,
};

static SIMPLE_TELEX1: StyleTable = StyleTable {
    tones: TELEX_TONES,
    circumflex: TELEX_CIRCUMFLEX,
    horn: TELEX_HORN,
    d_key: Some('d'),
    remove_key: Some('z'),
    standalone: &[],
    adjacent_only: false,
};

static SIMPLE_TELEX2: StyleTable = StyleTable {
    tones: TELEX_TONES,
    circumflex: TELEX_CIRCUMFLEX,
    horn: TELEX_HORN,
    d_key: Some('d'),
    remove_key: Some('z'),
    standalone: &[],
    adjacent_only: true,
};

pub fn table(style: InputStyle) -> &'static StyleTable {
    match style {
        InputStyle::Telex => &TELEX,
        InputStyle::Vni => &VNI,
        InputStyle::SimpleTelex1 => &SIMPLE_TELEX1,
        InputStyle::SimpleTelex2 => &SIMPLE_TELEX2,
    }
}

impl StyleTable {
    pub fn tone_of(&self, key: char) -> Option<Tone> {
        self.tones.iter().find(|(k, _)| *k == key).map(|(_, t)| *t)
    }

    pub fn circumflex_target(&self, key: char) -> Option<Option<char>> {
        self.circumflex
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, t)| *t)
    }

    pub fn horn_targets(&self, key: char) -> Option<&'static [char]> {
        self.horn.iter().find(|(k, _)| *k == key).map(|(_, t)| *t)
    }

    pub fn standalone_of(&self, key: char) -> Option<(char, bool)> {
        self.standalone
            .iter()
            .find(|(k, _, _)| *k == key)
            .map(|(_, base, caps)| (*base, *caps))
    }

    /// Keys that can set a horn explicitly, for the auto-fix provenance
    /// check on deletion.
    pub fn is_horn_key(&self, key: char) -> bool {
        self.horn.iter().any(|(k, _)| *k == key)
            || self.standalone.iter().any(|(k, _, _)| *k == key)
    }

    /// Whether the style claims this key in any role.
    pub fn is_special(&self, key: char) -> bool {
        self.tone_of(key).is_some()
            || self.circumflex_target(key).is_some()
            || self.horn_targets(key).is_some()
            || self.d_key == Some(key)
            || self.remove_key == Some(key)
            || self.standalone_of(key).is_some()
    }
}
