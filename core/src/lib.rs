//! libviet-core
//!
//! Typing buffer, phonotactic tables and the keystroke-to-edit engine
//! shared by libviet front-ends. The crate is host-agnostic: it knows
//! nothing about keyboards or text fields beyond the keystrokes it is
//! fed and the [`EditInstruction`]s it hands back.
//!
//! Public API:
//! - `Engine` - Stateful transliterator; one keystroke in, one edit out
//! - `EditInstruction` - Backspace count plus replacement text
//! - `Config` - Input style, output encoding and feature flags
//! - `SpellChecker` - Optional word lists backing the restore heuristics
//! - `InputStyle` / `Encoding` - Telex/VNI variants and output charsets

use serde::{Deserialize, Serialize};

pub mod buffer;
pub use buffer::{CharacterEntry, Tone, TypingBuffer};

pub mod charset;
pub use charset::Encoding;

pub mod edit;
pub use edit::EditInstruction;

pub mod engine;
pub use engine::Engine;

pub mod history;
pub use history::{History, HistoryUnit};

pub mod keys;
pub use keys::KeyStroke;

pub mod oracle;
pub use oracle::{Dictionary, SpellChecker, SpellingStyle};

pub mod styles;
pub use styles::InputStyle;

pub mod syllable;
pub use syllable::CodaRule;

/// Engine configuration and feature flags.
///
/// Every field has a serde default, so a config file may name only the
/// fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Keystroke interpretation: Telex, VNI or the simplified variants.
    pub style: InputStyle,

    /// Output charset. Unicode unless a legacy font family is in use.
    pub encoding: Encoding,

    /// Tone mark placement for two-vowel nuclei without a coda:
    /// modern `hoả`/`thuỷ` versus old-style `hỏa`/`thủy`.
    pub modern_tone_placement: bool,

    /// Accept tone keys anywhere in the word (`chaof` and `chafo` both
    /// give `chào`). When off, the mark is re-placed after every key.
    pub free_tone_mark: bool,

    /// Master switch for the word lists and restore heuristics.
    pub spell_check: bool,

    /// Restore the raw keystrokes at the word boundary when the composed
    /// word fails validation (`ưill` becomes `will`).
    pub restore_on_invalid_word: bool,

    /// Restore as soon as a tone key betrays English typing, without
    /// waiting for the word boundary. Requires an English word list to
    /// be useful.
    pub instant_restore: bool,

    /// Word-initial doubled consonant shorthand (`cc` types `ch`).
    pub quick_telex: bool,

    /// Expand `f`/`j`/`w` starts to `ph`/`gi`/`qu` at the word boundary.
    pub quick_start_consonant: bool,

    /// Expand `g`/`h`/`k` finals to `ng`/`nh`/`ch` at the word boundary.
    pub quick_end_consonant: bool,

    /// Tolerate the loanword onsets f, j, w, z during validation.
    pub allow_foreign_consonants: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            style: InputStyle::Telex,
            encoding: Encoding::Unicode,
            modern_tone_placement: true,
            free_tone_mark: true,
            spell_check: true,
            restore_on_invalid_word: true,
            instant_restore: false,
            quick_telex: false,
            quick_start_consonant: false,
            quick_end_consonant: false,
            allow_foreign_consonants: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        use anyhow::Context;
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        use anyhow::Context;
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("writing config {}", path.display()))?;
        Ok(())
    }

    /// Load configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// The spelling convention implied by the tone placement setting,
    /// used to pick the matching Vietnamese word list.
    pub fn spelling_style(&self) -> SpellingStyle {
        if self.modern_tone_placement {
            SpellingStyle::Modern
        } else {
            SpellingStyle::Old
        }
    }
}

/// Utility helpers.
pub mod utils {
    /// Normalize input strings (NFC) and trim whitespace.
    pub fn normalize(s: &str) -> String {
        use unicode_normalization::UnicodeNormalization;
        s.nfc().collect::<String>().trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_round_trip_preserves_every_field() {
        // Every field flipped away from its default, so a field the
        // serializer skipped would come back wrong.
        let config = Config {
            style: InputStyle::SimpleTelex2,
            encoding: Encoding::Tcvn3,
            modern_tone_placement: false,
            free_tone_mark: false,
            spell_check: false,
            restore_on_invalid_word: false,
            instant_restore: true,
            quick_telex: true,
            quick_start_consonant: true,
            quick_end_consonant: true,
            allow_foreign_consonants: true,
        };
        let text = config.to_toml_string().expect("serialize");
        assert_eq!(Config::from_toml_str(&text).expect("parse"), config);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config = Config::from_toml_str("style = \"vni\"\nquick-telex = true\n")
            .expect("valid config");
        assert_eq!(config.style, InputStyle::Vni);
        assert!(config.quick_telex);
        assert!(config.modern_tone_placement);
        assert_eq!(config.encoding, Encoding::Unicode);
    }

    #[test]
    fn spelling_style_follows_tone_placement() {
        assert_eq!(Config::default().spelling_style(), SpellingStyle::Modern);
        let old = Config {
            modern_tone_placement: false,
            ..Config::default()
        };
        assert_eq!(old.spelling_style(), SpellingStyle::Old);
    }

    #[test]
    fn normalize_composes_and_trims() {
        // a + combining grave -> precomposed à.
        assert_eq!(utils::normalize("  a\u{0300} "), "à");
    }
}
