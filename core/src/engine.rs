//! The transducer: one keystroke in, one edit instruction out.
//!
//! The engine owns the typing buffer, the word history and four session
//! flags, and exposes the host-facing calls (`process_key`,
//! `process_backspace`, `process_word_break` and the session controls).
//! Every returned [`EditInstruction`] fully describes the screen change;
//! a host that consults the engine must not additionally apply the raw
//! key or its own backspace.

use tracing::{debug, trace};

use crate::buffer::{CharacterEntry, Tone, TypingBuffer};
use crate::edit::EditInstruction;
use crate::history::{History, HistoryUnit};
use crate::keys::{self, KeyStroke};
use crate::oracle::SpellChecker;
use crate::styles::{self, StyleTable};
use crate::syllable;
use crate::Config;

/// Codas and glides that pull a plain `uo` pair into `ươ`; `thuong`
/// becomes `thương` with no horn key pressed.
const HORN_PAIR_FOLLOWERS: [char; 6] = ['n', 'c', 'i', 'm', 'p', 't'];

pub struct Engine {
    config: Config,
    buffer: TypingBuffer,
    history: History,
    checker: SpellChecker,
    /// The host reported a caret move; on-screen text left of the caret
    /// no longer lines up with the history stack.
    cursor_moved: bool,
    /// The host reported a focus change mid-session.
    focus_changed: bool,
    /// A blind backspace was issued while the screen position was
    /// unknown; restore stays off until the next word boundary.
    desynced: bool,
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new(Config::default())
    }
}

impl Engine {
    pub fn new(config: Config) -> Self {
        Engine {
            config,
            buffer: TypingBuffer::new(),
            history: History::new(),
            checker: SpellChecker::new(),
            cursor_moved: false,
            focus_changed: false,
            desynced: false,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// The spell checker, for installing dictionaries.
    pub fn checker_mut(&mut self) -> &mut SpellChecker {
        &mut self.checker
    }

    /// Whether a word is currently being composed.
    pub fn composing(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// The rendering of the word in progress.
    pub fn current_word(&self) -> String {
        self.buffer.render(self.config.encoding)
    }

    /// Feed one printable keystroke. `caps` is the shift state; `chorded`
    /// means another modifier was down, which ends the word without
    /// typing anything itself.
    pub fn process_key(&mut self, key: char, caps: bool, chorded: bool) -> EditInstruction {
        if chorded {
            // Whatever the chord did to the screen is unknown afterwards.
            let edit = self.flush_word();
            self.cursor_moved = true;
            return edit;
        }
        if keys::is_word_break(key) && !self.table().is_special(key) {
            // Keys the style claims (the Telex bracket vowels) never
            // break the word.
            return self.process_word_break(key);
        }
        if key.is_ascii_digit() && caps {
            // Shifted digits escape the VNI transform roles.
            return self.process_word_break(key);
        }
        self.process_typing(KeyStroke::new(key, caps))
    }

    /// Feed a backspace. The returned instruction covers the deletion;
    /// the host suppresses its native one.
    pub fn process_backspace(&mut self) -> EditInstruction {
        if self.buffer.is_empty() {
            return self.backspace_into_history();
        }
        let before = self.buffer.render(self.config.encoding);
        self.buffer.pop();
        // Deletion re-derives orthographic state rather than merely
        // popping: horns placed by the auto-fix fall away with their
        // trigger context, and the mark moves back when its rule says so.
        self.revert_auto_fix();
        self.reposition_mark();
        self.refresh_after_delete();
        let after = self.buffer.render(self.config.encoding);
        EditInstruction::diff(&before, &after)
    }

    /// End the word with a literal break character (space, punctuation,
    /// Enter). Flushes the word to history and types the break.
    pub fn process_word_break(&mut self, brk: char) -> EditInstruction {
        let mut edit = self.flush_word();
        if brk == ' ' {
            self.history.push_space();
        } else {
            self.history.push_literal(KeyStroke::from_char(brk));
        }
        edit.push(brk);
        edit
    }

    /// End the word without typing a break character: the boundary
    /// processing (quick-consonant expansion, restore) still runs and the
    /// returned edit carries any correction.
    pub fn finish_word(&mut self) -> EditInstruction {
        self.flush_word()
    }

    /// Flush the word in progress to history without emitting anything.
    /// For hosts that are about to lose the text field.
    pub fn commit_word(&mut self) {
        if !self.buffer.is_empty() {
            let (entries, raw) = self.buffer.snapshot();
            self.history.push_word(entries, raw);
            self.buffer.clear();
        }
    }

    /// Full session reset: buffer, history and all flags.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.history.clear();
        self.cursor_moved = false;
        self.focus_changed = false;
        self.desynced = false;
    }

    /// The host saw the caret move (mouse click, arrow key). The word in
    /// progress is abandoned; history is kept but stays untouchable until
    /// the next word boundary re-anchors it.
    pub fn reset_with_cursor_moved(&mut self) {
        self.buffer.clear();
        self.cursor_moved = true;
    }

    pub fn notify_focus_changed(&mut self) {
        self.buffer.clear();
        self.focus_changed = true;
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    // ---- in-word typing ----

    fn process_typing(&mut self, ks: KeyStroke) -> EditInstruction {
        let before = self.buffer.render(self.config.encoding);
        self.dispatch(ks);
        let after = self.buffer.render(self.config.encoding);
        EditInstruction::diff(&before, &after)
    }

    fn dispatch(&mut self, ks: KeyStroke) {
        if self.buffer.suspended() || self.buffer.overflowed() {
            self.buffer.push_key(ks);
            return;
        }
        let table = self.table();
        let key = ks.key;
        if let Some(tone) = table.tone_of(key) {
            if self.try_tone(ks, tone) {
                self.post_pass(false);
                return;
            }
        }
        if let Some(target) = table.circumflex_target(key) {
            if self.try_circumflex(ks, target) {
                self.post_pass(false);
                return;
            }
        }
        if let Some(targets) = table.horn_targets(key) {
            if self.try_horn(ks, targets) {
                self.post_pass(false);
                return;
            }
        }
        if let Some((base, force_caps)) = table.standalone_of(key) {
            if self.try_standalone(ks, base, force_caps) {
                self.post_pass(false);
                return;
            }
        }
        if table.d_key == Some(key) && self.try_stroke(ks) {
            self.post_pass(false);
            return;
        }
        if table.remove_key == Some(key) && self.try_remove(ks) {
            // No pair fix here: it would put the horns the key just
            // stripped straight back.
            if !self.config.free_tone_mark {
                self.reposition_mark();
            }
            self.refresh_suspension();
            return;
        }
        self.append_plain(ks);
    }

    fn append_plain(&mut self, ks: KeyStroke) {
        if self.config.quick_telex && self.quick_double(ks) {
            self.post_pass(true);
            return;
        }
        let consonant = keys::is_letter_key(ks.key) && !keys::is_vowel_key(ks.key);
        self.buffer.push_key(ks);
        self.post_pass(consonant);
    }

    /// Orthography upkeep after a consumed keystroke. Repositioning is
    /// skipped in free-mark mode except when a trailing consonant was
    /// typed; a coda moves the mark regardless of preference.
    fn post_pass(&mut self, typed_consonant: bool) {
        self.auto_fix_horn_pair();
        if !self.config.free_tone_mark || typed_consonant {
            self.reposition_mark();
        }
        self.refresh_suspension();
    }

    fn table(&self) -> &'static StyleTable {
        styles::table(self.config.style)
    }

    fn progress_ok_now(&self) -> bool {
        syllable::progress_ok(
            self.buffer.slots(),
            self.config.quick_end_consonant,
            self.config.allow_foreign_consonants,
        )
    }

    /// Suspension is sticky while typing forward.
    fn refresh_suspension(&mut self) {
        if !self.buffer.suspended() && !self.progress_ok_now() {
            self.buffer.suspend();
            debug!(raw = %self.buffer.raw_text(), "suspended: no syllable shape");
        }
    }

    /// A backspace may remove the offending suffix, so the flag is
    /// recomputed from scratch here.
    fn refresh_after_delete(&mut self) {
        self.buffer.clear_suspended();
        if !self.progress_ok_now() {
            self.buffer.suspend();
        }
    }

    // ---- transform handlers ----

    /// Two identical trailing consonants invalidate any mark match; the
    /// cluster cannot be Vietnamese and the key is wanted literally.
    fn doubled_consonant_tail(&self) -> bool {
        match self.buffer.slots() {
            [.., a, b] => !a.is_vowel() && !b.is_vowel() && a.base == b.base,
            _ => false,
        }
    }

    fn try_tone(&mut self, ks: KeyStroke, tone: Tone) -> bool {
        if self.doubled_consonant_tail() {
            return false;
        }
        let target = {
            let slots = self.buffer.slots();
            let shape = match syllable::parse(slots) {
                Some(s) => s,
                None => return false,
            };
            if !shape.has_nucleus() {
                return false;
            }
            let nucleus = &slots[shape.nucleus.clone()];
            if !syllable::base_nucleus_tonable(nucleus) {
                return false;
            }
            shape.nucleus.start
                + syllable::mark_target(
                    nucleus,
                    shape.has_coda(),
                    self.config.modern_tone_placement,
                )
        };
        if self.table().adjacent_only && target + 1 != self.buffer.len() {
            return false;
        }
        if self.buffer.entry(target).tone == tone {
            // Same key again takes the mark back off; the keystroke is
            // consumed, not echoed, and the word stops transforming.
            self.buffer.entry_mut(target).tone = Tone::Level;
            self.buffer.entry_mut(target).record(ks);
            self.buffer.log_raw(ks);
            self.buffer.suspend();
            trace!(tone = ?tone, "tone toggled off");
            self.maybe_instant_restore();
            return true;
        }
        // One tone per syllable.
        for i in 0..self.buffer.len() {
            self.buffer.entry_mut(i).tone = Tone::Level;
        }
        let entry = self.buffer.entry_mut(target);
        entry.tone = tone;
        entry.record(ks);
        self.buffer.log_raw(ks);
        trace!(tone = ?tone, at = target, "tone placed");
        self.maybe_instant_restore();
        true
    }

    fn try_circumflex(&mut self, ks: KeyStroke, target_base: Option<char>) -> bool {
        let candidate = {
            let slots = self.buffer.slots();
            let mut found = None;
            for idx in (0..slots.len()).rev() {
                let matches_base = match target_base {
                    Some(b) => slots[idx].base == b,
                    None => matches!(slots[idx].base, 'a' | 'e' | 'o'),
                };
                if matches_base && self.circumflex_suffix_ok(idx, slots[idx].base) {
                    found = Some(idx);
                    break;
                }
            }
            match found {
                Some(i) => i,
                None => return false,
            }
        };
        if self.table().adjacent_only && candidate + 1 != self.buffer.len() {
            return false;
        }
        if self.buffer.entry(candidate).circumflex {
            self.shape_undo(ks);
            return true;
        }
        let entry = self.buffer.entry_mut(candidate);
        entry.circumflex = true;
        entry.horn = false;
        entry.record(ks);
        self.buffer.log_raw(ks);
        trace!(at = candidate, "circumflex set");
        true
    }

    /// What may stand between a circumflex target and its trigger key:
    /// nothing, a coda prefix of at most two consonants (`thana` becomes
    /// `thân`), or the one glide the target forms a closed pair with
    /// (`caua` becomes `câu`, `toio` becomes `tôi`).
    fn circumflex_suffix_ok(&self, idx: usize, base: char) -> bool {
        let suffix = &self.buffer.slots()[idx + 1..];
        if suffix.is_empty() {
            return true;
        }
        if suffix.len() > 2 {
            return false;
        }
        if suffix.iter().all(|e| !e.is_vowel()) {
            let coda: String = suffix.iter().map(|e| e.base).collect();
            return syllable::coda_prefix_ok(&coda, self.config.quick_end_consonant);
        }
        if let [glide] = suffix {
            if !glide.is_modified() {
                return matches!(
                    (base, glide.base),
                    ('a', 'u') | ('a', 'y') | ('e', 'u') | ('o', 'i')
                );
            }
        }
        false
    }

    fn try_horn(&mut self, ks: KeyStroke, targets: &[char]) -> bool {
        let span = {
            let slots = self.buffer.slots();
            let shape = match syllable::parse(slots) {
                Some(s) => s,
                None => return false,
            };
            if !shape.has_nucleus() {
                return false;
            }
            let nucleus = shape.nucleus.clone();
            let bases: String = slots[nucleus.clone()].iter().map(|e| e.base).collect();
            // The uo pair may sit under a further glide (tươi); other
            // pairs are matched at the end of the nucleus only.
            if let Some(pos) = bases.find("uo") {
                let i = nucleus.start + pos;
                vec![i, i + 1]
            } else if bases.len() >= 2 {
                let last = nucleus.end - 1;
                match &bases[bases.len() - 2..] {
                    "ua" | "ui" | "uu" | "oi" => vec![last - 1],
                    "io" | "oa" => vec![last],
                    _ => return false,
                }
            } else {
                vec![nucleus.start]
            }
        };
        {
            let slots = self.buffer.slots();
            if span.iter().any(|&i| !targets.contains(&slots[i].base)) {
                return false;
            }
            if self.table().adjacent_only && span.last() != Some(&(slots.len() - 1)) {
                return false;
            }
            if span.iter().all(|&i| slots[i].horn) {
                let explicit = span.iter().any(|&i| {
                    slots[i].keys.iter().any(|k| self.table().is_horn_key(k.key))
                });
                if explicit {
                    // A second explicit horn key undoes the transform.
                    self.shape_undo(ks);
                    return true;
                }
                // The horns came from the uo auto-fix; the key claims
                // them as explicit and falls through to the recording.
            }
        }
        for &i in &span {
            let entry = self.buffer.entry_mut(i);
            entry.horn = true;
            entry.circumflex = false;
        }
        if let Some(&last) = span.last() {
            self.buffer.entry_mut(last).record(ks);
        }
        self.buffer.log_raw(ks);
        trace!(?span, "horn set");
        true
    }

    /// A horn key with no target makes a standalone ơ/ư, but only after
    /// nothing, one plausible onset consonant, or an onset digraph.
    fn standalone_allowed(&self) -> bool {
        match self.buffer.slots() {
            [] => true,
            [one] => !one.is_vowel() && !matches!(one.base, 'q' | 'f' | 'j' | 'w' | 'z'),
            [a, b] => matches!(
                [a.base, b.base],
                ['t', 'h'] | ['c', 'h'] | ['n', 'h'] | ['k', 'h'] | ['n', 'g'] | ['p', 'h']
                    | ['t', 'r'] | ['g', 'i']
            ),
            _ => false,
        }
    }

    fn try_standalone(&mut self, ks: KeyStroke, base: char, force_caps: bool) -> bool {
        if !self.standalone_allowed() {
            return false;
        }
        let mut entry = CharacterEntry::standalone_horn(base, ks);
        entry.caps |= force_caps;
        self.buffer.push_entry(entry);
        trace!(base = %base, "standalone horn vowel");
        true
    }

    /// `dd` (or the VNI `9`) strokes a word-initial d into đ; đ never
    /// occurs anywhere else.
    fn try_stroke(&mut self, ks: KeyStroke) -> bool {
        let first_is_d = matches!(self.buffer.slots().first(), Some(e) if e.base == 'd');
        if !first_is_d {
            return false;
        }
        if self.table().adjacent_only && self.buffer.len() != 1 {
            return false;
        }
        if self.buffer.entry(0).circumflex {
            self.shape_undo(ks);
            return true;
        }
        let entry = self.buffer.entry_mut(0);
        entry.circumflex = true;
        entry.record(ks);
        self.buffer.log_raw(ks);
        true
    }

    /// The remove key strips the tone first, shape modifiers second, and
    /// falls through to a literal keystroke when there is nothing left to
    /// strip. It never suspends.
    fn try_remove(&mut self, ks: KeyStroke) -> bool {
        let toned = (0..self.buffer.len()).find(|&i| self.buffer.entry(i).tone != Tone::Level);
        if let Some(i) = toned {
            let entry = self.buffer.entry_mut(i);
            entry.tone = Tone::Level;
            entry.record(ks);
            self.buffer.log_raw(ks);
            return true;
        }
        let shaped: Vec<usize> = (0..self.buffer.len())
            .filter(|&i| self.buffer.entry(i).is_modified())
            .collect();
        match shaped.last() {
            Some(&last) => {
                for &i in &shaped {
                    let entry = self.buffer.entry_mut(i);
                    entry.circumflex = false;
                    entry.horn = false;
                    entry.standalone = false;
                }
                self.buffer.entry_mut(last).record(ks);
                self.buffer.log_raw(ks);
                true
            }
            None => false,
        }
    }

    /// Word-initial doubled consonant shorthand (cc to ch, gg to gi and
    /// friends), active only with the quick-telex setting.
    fn quick_double(&mut self, ks: KeyStroke) -> bool {
        let second = match ks.key {
            'c' | 'k' | 'p' | 't' => 'h',
            'g' => 'i',
            'n' => 'g',
            'q' => 'u',
            _ => return false,
        };
        let expandable = {
            let slots = self.buffer.slots();
            slots.iter().all(|e| !e.is_vowel())
                && matches!(slots.last(), Some(e) if e.base == ks.key && e.keys.len() == 1)
        };
        if !expandable {
            return false;
        }
        let mut entry = CharacterEntry::from_key(ks);
        entry.base = second;
        self.buffer.push_entry(entry);
        trace!(key = %ks.key, "doubled consonant expanded");
        true
    }

    // ---- orthography upkeep ----

    /// Force both horns onto an adjacent `u`,`o` pair once a qualifying
    /// follower arrives. Runs after every consumed keystroke; this is
    /// orthography, not preference, so the free-mark setting does not
    /// gate it.
    fn auto_fix_horn_pair(&mut self) {
        let fix = {
            let slots = self.buffer.slots();
            let mut found = None;
            for i in 0..slots.len().saturating_sub(2) {
                let (u, o, follow) = (&slots[i], &slots[i + 1], &slots[i + 2]);
                if u.base == 'u'
                    && o.base == 'o'
                    && !u.circumflex
                    && !o.circumflex
                    && !(u.horn && o.horn)
                    && !(i > 0 && slots[i - 1].base == 'q')
                    && HORN_PAIR_FOLLOWERS.contains(&follow.base)
                {
                    found = Some(i);
                    break;
                }
            }
            found
        };
        if let Some(i) = fix {
            self.buffer.entry_mut(i).horn = true;
            self.buffer.entry_mut(i + 1).horn = true;
            trace!(at = i, "uo pair horned");
        }
    }

    /// The inverse, on deletion: a horned pair whose follower vanished
    /// drops back to plain `u`,`o` unless either horn came from an
    /// explicit keystroke.
    fn revert_auto_fix(&mut self) {
        let table = self.table();
        let undo = {
            let slots = self.buffer.slots();
            let mut found = None;
            for i in 0..slots.len().saturating_sub(1) {
                let (u, o) = (&slots[i], &slots[i + 1]);
                if u.base != 'u' || !u.horn || o.base != 'o' || !o.horn {
                    continue;
                }
                let follow_ok = slots
                    .get(i + 2)
                    .map_or(false, |f| HORN_PAIR_FOLLOWERS.contains(&f.base));
                if !follow_ok {
                    let explicit = u
                        .keys
                        .iter()
                        .chain(o.keys.iter())
                        .any(|k| table.is_horn_key(k.key));
                    if !explicit {
                        found = Some(i);
                    }
                }
                break;
            }
            found
        };
        if let Some(i) = undo {
            self.buffer.entry_mut(i).horn = false;
            self.buffer.entry_mut(i + 1).horn = false;
            trace!(at = i, "uo pair horn reverted");
        }
    }

    /// Move a placed mark to wherever the placement rule now points.
    fn reposition_mark(&mut self) {
        let (current, target) = {
            let slots = self.buffer.slots();
            let shape = match syllable::parse(slots) {
                Some(s) => s,
                None => return,
            };
            if !shape.has_nucleus() {
                return;
            }
            let toned: Vec<usize> = (0..slots.len())
                .filter(|&i| slots[i].tone != Tone::Level)
                .collect();
            let current = match toned.as_slice() {
                [one] => *one,
                _ => return,
            };
            let nucleus = &slots[shape.nucleus.clone()];
            let target = shape.nucleus.start
                + syllable::mark_target(
                    nucleus,
                    shape.has_coda(),
                    self.config.modern_tone_placement,
                );
            (current, target)
        };
        if target != current {
            let tone = self.buffer.entry(current).tone;
            self.buffer.entry_mut(current).tone = Tone::Level;
            self.buffer.entry_mut(target).tone = tone;
            trace!(from = current, to = target, "mark repositioned");
        }
    }

    // ---- restore ----

    /// Rebuild the word as the literal keystrokes it came from, in typed
    /// order, and stop interpreting it.
    fn rebuild_literal(&mut self) {
        let raw: Vec<KeyStroke> = self.buffer.raw_keys().to_vec();
        self.buffer.clear();
        for ks in raw {
            self.buffer.push_key(ks);
        }
        self.buffer.suspend();
    }

    /// A repeated shape key undoes its transform: the word reverts to its
    /// raw keystrokes and the trigger is consumed silently.
    fn shape_undo(&mut self, ks: KeyStroke) {
        self.rebuild_literal();
        if !self.buffer.is_empty() {
            let last = self.buffer.len() - 1;
            self.buffer.entry_mut(last).record(ks);
        }
        self.buffer.log_raw(ks);
        trace!(raw = %self.buffer.raw_text(), "shape undone");
    }

    /// Mid-word restore, consulted right after a tone event. Only the
    /// English signal counts here; half-typed words fail phonotactics and
    /// word lists all the time.
    fn maybe_instant_restore(&mut self) {
        if !self.config.instant_restore {
            return;
        }
        let raw = self.buffer.raw_text();
        if self.checker.should_restore_instantly(&raw) {
            debug!(raw = %raw, "instant restore");
            self.rebuild_literal();
        }
    }

    fn maybe_restore_at_boundary(&mut self) {
        if !self.config.spell_check || !self.config.restore_on_invalid_word {
            return;
        }
        if self.cursor_moved || self.focus_changed || self.desynced {
            // The buffer does not reflect the full on-screen word.
            return;
        }
        let phonotactic_ok = !self.buffer.overflowed()
            && syllable::full_valid(
                self.buffer.slots(),
                self.config.quick_end_consonant,
                self.config.allow_foreign_consonants,
            );
        let rendered = self.buffer.render(self.config.encoding);
        let raw = self.buffer.raw_text();
        if self.checker.should_restore_at_boundary(
            phonotactic_ok,
            &rendered,
            &raw,
            self.config.spelling_style(),
        ) {
            self.rebuild_literal();
        }
    }

    // ---- word boundary ----

    /// Commit the word in progress: quick-consonant expansion, the
    /// restore check, then a push to history. Returns the corrective
    /// edit (usually none).
    fn flush_word(&mut self) -> EditInstruction {
        if self.cursor_moved || self.focus_changed || self.desynced {
            // Units behind the old caret position are unreachable now.
            self.history.clear();
        }
        let mut edit = EditInstruction::none();
        if !self.buffer.is_empty() {
            let before = self.buffer.render(self.config.encoding);
            if self.expand_quick_consonants() {
                self.reposition_mark();
            }
            self.maybe_restore_at_boundary();
            let after = self.buffer.render(self.config.encoding);
            edit = EditInstruction::diff(&before, &after);
            let (entries, raw) = self.buffer.snapshot();
            self.history.push_word(entries, raw);
            self.buffer.clear();
        }
        self.cursor_moved = false;
        self.focus_changed = false;
        self.desynced = false;
        edit
    }

    /// Boundary-time single-consonant shorthands: word-initial f to ph,
    /// j to gi, standalone ư to qu; word-final g to ng, h to nh, k to ch.
    /// The cluster's keystrokes replace the quick key in the raw log too,
    /// so the spell check and any restore after it see the expansion.
    fn expand_quick_consonants(&mut self) -> bool {
        if self.buffer.overflowed() {
            return false;
        }
        let mut changed = false;
        if self.config.quick_start_consonant && self.buffer.len() >= 2 {
            let head = self.buffer.entry(0).clone();
            let body_caps = self.buffer.entry(1).caps;
            let expansion = if head.standalone && head.base == 'u' && head.horn {
                Some(('q', 'u'))
            } else if head.keys.len() == 1 {
                match head.base {
                    'f' => Some(('p', 'h')),
                    'j' => Some(('g', 'i')),
                    _ => None,
                }
            } else {
                None
            };
            if let Some((a, b)) = expansion {
                let mut first = head.clone();
                first.base = a;
                first.circumflex = false;
                first.horn = false;
                first.standalone = false;
                first.keys = vec![KeyStroke::new(a, first.caps)];
                let second = CharacterEntry::from_key(KeyStroke::new(b, first.caps && body_caps));
                let with: Vec<KeyStroke> =
                    first.keys.iter().chain(second.keys.iter()).copied().collect();
                self.buffer.replace(0..1, vec![first, second]);
                self.buffer.substitute_raw(&head.keys, &with);
                debug!("start consonant expanded");
                changed = true;
            }
        }
        if self.config.quick_end_consonant {
            let tail = {
                let slots = self.buffer.slots();
                match syllable::parse(slots) {
                    Some(shape) if shape.has_nucleus() && shape.coda.len() == 1 => {
                        let idx = shape.coda.start;
                        matches!(slots[idx].base, 'g' | 'h' | 'k').then_some(idx)
                    }
                    _ => None,
                }
            };
            if let Some(idx) = tail {
                let old = self.buffer.entry(idx).clone();
                let (a, b) = match old.base {
                    'g' => ('n', 'g'),
                    'h' => ('n', 'h'),
                    _ => ('c', 'h'),
                };
                let mut first = old.clone();
                first.base = a;
                first.keys = vec![KeyStroke::new(a, old.caps)];
                let second = CharacterEntry::from_key(KeyStroke::new(b, old.caps));
                let with: Vec<KeyStroke> =
                    first.keys.iter().chain(second.keys.iter()).copied().collect();
                self.buffer.replace(idx..idx + 1, vec![first, second]);
                self.buffer.substitute_raw(&old.keys, &with);
                debug!("end consonant expanded");
                changed = true;
            }
        }
        changed
    }

    // ---- backspace across the boundary ----

    fn backspace_into_history(&mut self) -> EditInstruction {
        if self.cursor_moved || self.focus_changed {
            // A blind restore would edit text the engine cannot see.
            self.history.clear();
            self.desynced = true;
            debug!("history dropped: screen position unknown");
            return EditInstruction::backspace(1);
        }
        match self.history.pop() {
            None => EditInstruction::backspace(1),
            Some(HistoryUnit::Spaces(n)) => {
                if n > 1 {
                    self.history.push_back_unit(HistoryUnit::Spaces(n - 1));
                }
                EditInstruction::backspace(1)
            }
            Some(HistoryUnit::Literals(mut run)) => {
                run.pop();
                if !run.is_empty() {
                    self.history.push_back_unit(HistoryUnit::Literals(run));
                }
                EditInstruction::backspace(1)
            }
            Some(HistoryUnit::Word(entries, raw)) => {
                // The word becomes editable again, then the deletion
                // applies to it as usual.
                self.buffer.load(entries, raw);
                trace!(word = %self.current_word(), "word reloaded from history");
                self.process_backspace()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::Encoding;
    use crate::styles::InputStyle;

    fn apply(screen: &mut String, edit: &EditInstruction) {
        for _ in 0..edit.backspaces {
            screen.pop();
        }
        screen.push_str(&edit.insert);
    }

    fn feed(engine: &mut Engine, screen: &mut String, keys: &str) {
        for c in keys.chars() {
            let edit = engine.process_key(c, c.is_ascii_uppercase(), false);
            apply(screen, &edit);
        }
    }

    fn type_fresh(config: Config, keys: &str) -> String {
        let mut engine = Engine::new(config);
        let mut screen = String::new();
        feed(&mut engine, &mut screen, keys);
        screen
    }

    #[test]
    fn horn_pair_fixes_itself() {
        assert_eq!(type_fresh(Config::default(), "thuong"), "thương");
        assert_eq!(type_fresh(Config::default(), "cuoi"), "cươi");
        assert_eq!(type_fresh(Config::default(), "suongs"), "sướng");
    }

    #[test]
    fn tone_prefers_the_circumflexed_vowel() {
        assert_eq!(type_fresh(Config::default(), "tieengs"), "tiếng");
        assert_eq!(type_fresh(Config::default(), "vieetj"), "việt");
    }

    #[test]
    fn d_doubling() {
        assert_eq!(type_fresh(Config::default(), "dd"), "đ");
        assert_eq!(type_fresh(Config::default(), "ddi"), "đi");
        // Stroke key in free position.
        assert_eq!(type_fresh(Config::default(), "did"), "đi");
        // A third d undoes back to the literal letters.
        assert_eq!(type_fresh(Config::default(), "ddd"), "dd");
    }

    #[test]
    fn hook_above_placement_modern_and_old() {
        assert_eq!(type_fresh(Config::default(), "hoar"), "hoả");
        assert_eq!(type_fresh(Config::default(), "hoanr"), "hoản");
        let old = Config {
            modern_tone_placement: false,
            ..Config::default()
        };
        assert_eq!(type_fresh(old.clone(), "hoar"), "hỏa");
        assert_eq!(type_fresh(old, "hoanr"), "hoản");
    }

    #[test]
    fn centering_pair_marks_first_vowel() {
        assert_eq!(type_fresh(Config::default(), "cuas"), "cúa");
        assert_eq!(type_fresh(Config::default(), "mais"), "mái");
    }

    #[test]
    fn tone_toggle_is_an_exact_inverse() {
        let mut engine = Engine::new(Config::default());
        let mut screen = String::new();
        feed(&mut engine, &mut screen, "las");
        assert_eq!(screen, "lá");
        feed(&mut engine, &mut screen, "s");
        assert_eq!(screen, "la");
        // The word is suspended: further keys stay literal.
        feed(&mut engine, &mut screen, "s");
        assert_eq!(screen, "las");
    }

    #[test]
    fn deleting_rederives_orthography() {
        let mut engine = Engine::new(Config::default());
        let mut screen = String::new();
        feed(&mut engine, &mut screen, "thuong");
        assert_eq!(screen, "thương");
        apply(&mut screen, &engine.process_backspace());
        assert_eq!(screen, "thươn");
        apply(&mut screen, &engine.process_backspace());
        // Without the follower the auto-fixed horns fall away.
        assert_eq!(screen, "thuo");
        assert_eq!(screen, type_fresh(Config::default(), "thuo"));
    }

    #[test]
    fn explicit_horn_survives_deletion() {
        let mut engine = Engine::new(Config::default());
        let mut screen = String::new();
        feed(&mut engine, &mut screen, "tuwown");
        assert_eq!(screen, "tươn");
        apply(&mut screen, &engine.process_backspace());
        assert_eq!(screen, "tươ");
    }

    #[test]
    fn shape_undo_reverts_to_raw() {
        assert_eq!(type_fresh(Config::default(), "aaa"), "aa");
        assert_eq!(type_fresh(Config::default(), "aww"), "aw");
        assert_eq!(type_fresh(Config::default(), "muaww"), "muaw");
    }

    #[test]
    fn invalid_word_restores_at_the_boundary() {
        let mut engine = Engine::new(Config::default());
        let mut screen = String::new();
        feed(&mut engine, &mut screen, "will");
        assert_eq!(screen, "ưill");
        feed(&mut engine, &mut screen, " ");
        assert_eq!(screen, "will ");
    }

    #[test]
    fn backspace_walks_history_units() {
        let mut engine = Engine::new(Config::default());
        let mut screen = String::new();
        feed(&mut engine, &mut screen, "chaof  ");
        assert_eq!(screen, "chào  ");
        apply(&mut screen, &engine.process_backspace());
        apply(&mut screen, &engine.process_backspace());
        assert_eq!(screen, "chào");
        // The word is live again; deletion continues inside it.
        apply(&mut screen, &engine.process_backspace());
        assert_eq!(screen, "chà");
        feed(&mut engine, &mut screen, "y");
        assert_eq!(screen, "chày");
    }

    #[test]
    fn desync_skips_restore_and_clears_history() {
        let mut engine = Engine::new(Config::default());
        let mut screen = String::new();
        feed(&mut engine, &mut screen, "chao ");
        engine.reset_with_cursor_moved();
        let edit = engine.process_backspace();
        assert_eq!(edit, EditInstruction::backspace(1));
        // History is gone: the next empty-buffer backspace is blind too.
        let edit = engine.process_backspace();
        assert_eq!(edit, EditInstruction::backspace(1));
    }

    #[test]
    fn vni_digits_transform() {
        let vni = Config {
            style: InputStyle::Vni,
            ..Config::default()
        };
        assert_eq!(type_fresh(vni.clone(), "tuong71"), "tướng");
        assert_eq!(type_fresh(vni.clone(), "dd"), "dd");
        assert_eq!(type_fresh(vni, "d9i"), "đi");
    }

    #[test]
    fn legacy_encoding_streams_through_the_engine() {
        let cfg = Config {
            encoding: Encoding::VniWindows,
            ..Config::default()
        };
        assert_eq!(type_fresh(cfg, "vieetj"), "vieät");
    }

    #[test]
    fn quick_consonant_expansions_at_boundary() {
        let cfg = Config {
            quick_start_consonant: true,
            quick_end_consonant: true,
            ..Config::default()
        };
        assert_eq!(type_fresh(cfg.clone(), "fai "), "phai ");
        assert_eq!(type_fresh(cfg.clone(), "hoag "), "hoang ");
        assert_eq!(type_fresh(cfg, "wen "), "quen ");
    }

    #[test]
    fn quick_telex_doubles_word_initial_consonants() {
        let cfg = Config {
            quick_telex: true,
            ..Config::default()
        };
        assert_eq!(type_fresh(cfg.clone(), "cc"), "ch");
        assert_eq!(type_fresh(cfg, "ttanh"), "thanh");
    }

    #[test]
    fn standalone_horn_gating() {
        assert_eq!(type_fresh(Config::default(), "w"), "ư");
        assert_eq!(type_fresh(Config::default(), "thw"), "thư");
        assert_eq!(type_fresh(Config::default(), "]"), "ư");
        assert_eq!(type_fresh(Config::default(), "}"), "Ư");
        // After a vowel the bracket key has no role and stays literal.
        assert_eq!(type_fresh(Config::default(), "a]"), "a]");
    }
}
