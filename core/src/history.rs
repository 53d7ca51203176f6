//! The word history stack backing cross-word backspace.
//!
//! Units are typed: a committed word snapshot, a run of spaces, or a run
//! of other literal characters. Adjacent spaces and literals merge into
//! their run so one backspace consumes exactly one on-screen character.

use std::collections::VecDeque;

use crate::buffer::CharacterEntry;
use crate::keys::KeyStroke;

/// Upper bound on retained units; the oldest falls off first.
pub const MAX_HISTORY_UNITS: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub enum HistoryUnit {
    /// A committed word: its slots plus the chronological raw keystroke
    /// log, so a reloaded word still restores in typed order.
    Word(Vec<CharacterEntry>, Vec<KeyStroke>),
    Spaces(u16),
    Literals(Vec<KeyStroke>),
}

#[derive(Debug, Clone, Default)]
pub struct History {
    units: VecDeque<HistoryUnit>,
}

impl History {
    pub fn new() -> Self {
        History::default()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn push_word(&mut self, word: Vec<CharacterEntry>, raw: Vec<KeyStroke>) {
        if !word.is_empty() {
            self.push(HistoryUnit::Word(word, raw));
        }
    }

    pub fn push_space(&mut self) {
        if let Some(HistoryUnit::Spaces(n)) = self.units.back_mut() {
            *n = n.saturating_add(1);
            return;
        }
        self.push(HistoryUnit::Spaces(1));
    }

    pub fn push_literal(&mut self, ks: KeyStroke) {
        if let Some(HistoryUnit::Literals(run)) = self.units.back_mut() {
            run.push(ks);
            return;
        }
        self.push(HistoryUnit::Literals(vec![ks]));
    }

    pub fn pop(&mut self) -> Option<HistoryUnit> {
        self.units.pop_back()
    }

    /// Put a partially consumed unit back on top.
    pub fn push_back_unit(&mut self, unit: HistoryUnit) {
        self.units.push_back(unit);
    }

    pub fn clear(&mut self) {
        self.units.clear();
    }

    fn push(&mut self, unit: HistoryUnit) {
        if self.units.len() == MAX_HISTORY_UNITS {
            self.units.pop_front();
        }
        self.units.push_back(unit);
    }
}
