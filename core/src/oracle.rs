//! Dictionary-backed spell checking behind the restore decisions.
//!
//! The engine never owns word lists itself. Front ends hand it anything
//! implementing [`Dictionary`], tagged with the tone-placement style the
//! list was compiled with, and the checker answers the two questions the
//! engine asks at runtime: "is this finished word worth keeping?" and
//! "does the raw keystroke trail look like English?".

use std::cell::RefCell;
use std::num::NonZeroUsize;

use lru::LruCache;
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

use serde::{Deserialize, Serialize};

/// Lookups the checker performs are cached; this bounds the cache.
const LOOKUP_CACHE_SIZE: usize = 1024;

/// A word list the checker can query. Implementations are expected to
/// hold NFC, lowercase entries.
pub trait Dictionary: Send {
    fn contains(&self, word: &str) -> bool;
}

impl Dictionary for ahash::AHashSet<String> {
    fn contains(&self, word: &str) -> bool {
        // Through the Deref target; naming `contains` on the wrapper
        // resolves back to this impl.
        (**self).contains(word)
    }
}

/// Tone placement convention a Vietnamese word list was compiled with.
///
/// Modern lists carry "hoả" and "thuỷ"; old-style lists carry "hỏa" and
/// "thủy". A list only answers for text rendered in its own convention,
/// otherwise every such word would look misspelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpellingStyle {
    Modern,
    Old,
}

/// Decides when a finished or in-flight word should be restored to its
/// literal keystrokes.
///
/// Both dictionaries are optional. Without a Vietnamese list the checker
/// falls back to phonotactics alone; without an English list it falls
/// back to a doubled-final-consonant heuristic.
pub struct SpellChecker {
    vietnamese: Option<(Box<dyn Dictionary>, SpellingStyle)>,
    english: Option<Box<dyn Dictionary>>,
    cache: RefCell<LruCache<String, bool>>,
}

impl Default for SpellChecker {
    fn default() -> Self {
        SpellChecker {
            vietnamese: None,
            english: None,
            cache: RefCell::new(LruCache::new(
                NonZeroUsize::new(LOOKUP_CACHE_SIZE).unwrap(),
            )),
        }
    }
}

impl SpellChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the Vietnamese word list, tagged with the placement style
    /// it was compiled with. Replaces any previous list.
    pub fn set_vietnamese(&mut self, dict: Box<dyn Dictionary>, style: SpellingStyle) {
        self.vietnamese = Some((dict, style));
        self.cache.borrow_mut().clear();
    }

    pub fn set_english(&mut self, dict: Box<dyn Dictionary>) {
        self.english = Some(dict);
    }

    pub fn has_vietnamese(&self) -> bool {
        self.vietnamese.is_some()
    }

    /// Looks `rendered` up in the Vietnamese list. `None` means the
    /// checker has no opinion, either because no list is installed or
    /// because the list was compiled for the other placement style.
    pub fn word_in_vietnamese(&self, rendered: &str, style: SpellingStyle) -> Option<bool> {
        let (dict, dict_style) = self.vietnamese.as_ref()?;
        if *dict_style != style {
            return None;
        }
        let key: String = rendered.nfc().collect::<String>().to_lowercase();
        if let Some(&hit) = self.cache.borrow_mut().get(&key) {
            return Some(hit);
        }
        let hit = dict.contains(&key);
        self.cache.borrow_mut().put(key, hit);
        Some(hit)
    }

    /// Whether the raw keystroke trail reads as an English word. With no
    /// English list installed, a doubled final consonant is taken as
    /// English; Vietnamese never ends a word that way, and Telex only
    /// doubles the transform letters.
    pub fn raw_is_english(&self, raw: &str) -> bool {
        if let Some(dict) = &self.english {
            return dict.contains(&raw.to_lowercase());
        }
        let lower = raw.to_lowercase();
        let mut rev = lower.chars().rev();
        match (rev.next(), rev.next()) {
            (Some(a), Some(b)) if a == b => {
                a.is_ascii_alphabetic() && !matches!(a, 'a' | 'e' | 'i' | 'o' | 'u' | 'y' | 'd' | 'w')
            }
            _ => false,
        }
    }

    /// The end-of-word restore decision. A phonotactically broken word is
    /// always restored; past that check the word list has the final say,
    /// so a well-formed word the list rejects is restored too. Without a
    /// usable list the phonotactic check alone decides.
    pub fn should_restore_at_boundary(
        &self,
        phonotactic_ok: bool,
        rendered: &str,
        raw: &str,
        style: SpellingStyle,
    ) -> bool {
        if !phonotactic_ok {
            debug!(rendered, raw, "restore: phonotactically invalid");
            return true;
        }
        match self.word_in_vietnamese(rendered, style) {
            Some(false) => {
                debug!(rendered, "restore: rejected by the word list");
                true
            }
            _ => false,
        }
    }

    /// The mid-word restore decision, consulted right after a transform
    /// fires. Deliberately narrower than the boundary check: half-typed
    /// words fail phonotactics and word lists all the time, so only the
    /// English signal counts here.
    pub fn should_restore_instantly(&self, raw: &str) -> bool {
        self.raw_is_english(raw)
    }
}
