//! The per-word typing buffer: character slots plus the raw keystroke log.
//!
//! Every printable key the engine consumes lands here twice: once in the
//! slot list that renders to the screen, and once in the chronological raw
//! log that restore and history replay from. Transform keys (tone, shape,
//! remove) are recorded on the slot they modified and in the raw log, so a
//! restored word reproduces the typed sequence exactly.

use crate::charset::{self, Encoding};
use crate::keys::{self, KeyStroke};

/// Vietnamese tone marks. `Level` is the unmarked tone (thanh ngang).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Level,
    Acute,
    Grave,
    HookAbove,
    Tilde,
    DotBelow,
}

impl Tone {
    /// Row index into the per-encoding render tables.
    pub fn index(self) -> usize {
        match self {
            Tone::Level => 0,
            Tone::Acute => 1,
            Tone::Grave => 2,
            Tone::HookAbove => 3,
            Tone::Tilde => 4,
            Tone::DotBelow => 5,
        }
    }
}

/// One on-screen character of the word being composed.
///
/// `base` is the typed letter (`a`..`z`, lowercase). Shape state lives in
/// two flags: `circumflex` covers â/ê/ô and the stroke of đ (base `d`),
/// `horn` covers ơ/ư and doubles as the breve on base `a` (ă). `keys`
/// records every keystroke that created or modified the slot.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterEntry {
    pub base: char,
    pub caps: bool,
    pub circumflex: bool,
    pub horn: bool,
    pub tone: Tone,
    pub standalone: bool,
    pub keys: Vec<KeyStroke>,
}

impl CharacterEntry {
    /// A plain letter slot, as typed.
    pub fn from_key(ks: KeyStroke) -> Self {
        CharacterEntry {
            base: ks.key,
            caps: ks.caps,
            circumflex: false,
            horn: false,
            tone: Tone::Level,
            standalone: false,
            keys: vec![ks],
        }
    }

    /// A pre-shaped horn vowel created directly by its own key
    /// (Telex `w`, `[`, `]`), not by modifying an earlier slot.
    pub fn standalone_horn(base: char, ks: KeyStroke) -> Self {
        CharacterEntry {
            base,
            caps: ks.caps,
            circumflex: false,
            horn: true,
            tone: Tone::Level,
            standalone: true,
            keys: vec![ks],
        }
    }

    pub fn is_vowel(&self) -> bool {
        keys::is_vowel_key(self.base)
    }

    /// Whether the slot carries a circumflex or horn/breve.
    pub fn is_modified(&self) -> bool {
        self.circumflex || self.horn
    }

    /// Record a consumed transform keystroke against this slot.
    pub fn record(&mut self, ks: KeyStroke) {
        self.keys.push(ks);
    }

    pub fn render_into(&self, out: &mut String, enc: Encoding) {
        charset::push_entry(out, self, enc);
    }
}

/// Slot capacity of the buffer. Longer input overflows to a literal side
/// list that renders as typed and only participates in restore.
pub const MAX_WORD_SLOTS: usize = 12;

/// The word currently being composed.
#[derive(Debug, Clone, Default)]
pub struct TypingBuffer {
    slots: Vec<CharacterEntry>,
    overflow: Vec<KeyStroke>,
    raw: Vec<KeyStroke>,
    suspended: bool,
}

impl TypingBuffer {
    pub fn new() -> Self {
        TypingBuffer::default()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty() && self.overflow.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn slots(&self) -> &[CharacterEntry] {
        &self.slots
    }

    pub fn entry(&self, idx: usize) -> &CharacterEntry {
        &self.slots[idx]
    }

    pub fn entry_mut(&mut self, idx: usize) -> &mut CharacterEntry {
        &mut self.slots[idx]
    }

    pub fn last(&self) -> Option<&CharacterEntry> {
        self.slots.last()
    }

    pub fn overflowed(&self) -> bool {
        !self.overflow.is_empty()
    }

    pub fn suspended(&self) -> bool {
        self.suspended
    }

    pub fn suspend(&mut self) {
        self.suspended = true;
    }

    pub fn clear_suspended(&mut self) {
        self.suspended = false;
    }

    /// Append a literal keystroke: a new slot, or the overflow list once
    /// the slot capacity is reached.
    pub fn push_key(&mut self, ks: KeyStroke) {
        self.raw.push(ks);
        if self.slots.len() < MAX_WORD_SLOTS {
            self.slots.push(CharacterEntry::from_key(ks));
        } else {
            self.overflow.push(ks);
        }
    }

    /// Append a pre-built slot; its recorded keys join the raw log.
    pub fn push_entry(&mut self, entry: CharacterEntry) {
        self.raw.extend(entry.keys.iter().copied());
        if self.slots.len() < MAX_WORD_SLOTS {
            self.slots.push(entry);
        } else {
            self.overflow.extend(entry.keys.iter().copied());
        }
    }

    /// Log a consumed transform keystroke that created no slot of its own.
    pub fn log_raw(&mut self, ks: KeyStroke) {
        self.raw.push(ks);
    }

    /// Remove the last visual unit (overflow keystroke first, then the
    /// last slot). The slot's recorded keystrokes leave the raw log too,
    /// latest occurrence first, so a later restore reflects what remains.
    pub fn pop(&mut self) -> bool {
        if let Some(ks) = self.overflow.pop() {
            self.remove_raw(ks);
            return true;
        }
        match self.slots.pop() {
            Some(entry) => {
                for ks in entry.keys.iter().rev() {
                    self.remove_raw(*ks);
                }
                true
            }
            None => false,
        }
    }

    fn remove_raw(&mut self, ks: KeyStroke) {
        if let Some(pos) = self.raw.iter().rposition(|r| *r == ks) {
            self.raw.remove(pos);
        }
    }

    /// Replace the slots in `range` with the given entries. The raw log is
    /// untouched: replacements reinterpret keystrokes already logged.
    pub fn replace(&mut self, range: std::ops::Range<usize>, entries: Vec<CharacterEntry>) {
        self.slots.splice(range, entries);
    }

    /// Swap a slot's logged keystrokes for a substitute sequence, placed
    /// where the earliest removed key sat. The log stays in typed order.
    pub fn substitute_raw(&mut self, old: &[KeyStroke], with: &[KeyStroke]) {
        let mut at = self.raw.len();
        for ks in old.iter().rev() {
            if let Some(pos) = self.raw.iter().rposition(|r| r == ks) {
                self.raw.remove(pos);
                at = at.min(pos);
            }
        }
        let at = at.min(self.raw.len());
        self.raw.splice(at..at, with.iter().copied());
    }

    /// The on-screen text of the word: rendered slots plus overflow typed
    /// as-is.
    pub fn render(&self, enc: Encoding) -> String {
        let mut out = String::new();
        for entry in &self.slots {
            entry.render_into(&mut out, enc);
        }
        for ks in &self.overflow {
            out.push(ks.render());
        }
        out
    }

    pub fn raw_keys(&self) -> &[KeyStroke] {
        &self.raw
    }

    /// The literal text of every keystroke consumed for this word, in
    /// typed order.
    pub fn raw_text(&self) -> String {
        keys::render_keys(&self.raw)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.overflow.clear();
        self.raw.clear();
        self.suspended = false;
    }

    /// Clone the word for the history stack: the slots (overflow
    /// keystrokes become literal slots so a reloaded word needs no side
    /// state) together with the chronological raw log. Slot keys alone
    /// cannot stand in for the log; a transform key is recorded on the
    /// slot it modified, not where it was typed.
    pub fn snapshot(&self) -> (Vec<CharacterEntry>, Vec<KeyStroke>) {
        let mut snap = self.slots.clone();
        snap.extend(self.overflow.iter().copied().map(CharacterEntry::from_key));
        (snap, self.raw.clone())
    }

    /// Reload a word previously captured by [`snapshot`](Self::snapshot).
    pub fn load(&mut self, entries: Vec<CharacterEntry>, raw: Vec<KeyStroke>) {
        self.slots = entries;
        self.raw = raw;
        self.overflow.clear();
        self.suspended = false;
    }
}
