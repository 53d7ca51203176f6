//! Host-facing event layer: key events in, a shadowed text field out.
//!
//! A real host (an input method framework hook) owns the text field; the
//! [`Screen`] here shadows one so the CLI and the tests can observe what
//! the user would see. [`Ime`] routes events to the engine and applies
//! every returned edit to its screen.

use libviet_core::{Config, EditInstruction, Engine};

/// Key events as a host would deliver them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    /// A printable character; its case carries the shift state.
    Char(char),
    Backspace,
    Space,
    Enter,
    /// Abandon composition. The word stays on screen as rendered.
    Escape,
    /// Any caret movement (arrows, mouse click reported as movement).
    ArrowKey,
    /// A character typed with a non-shift modifier held (Ctrl/Alt).
    Chord(char),
}

/// A shadow of the host text field: applies [`EditInstruction`]s the way
/// the host would.
#[derive(Debug, Clone, Default)]
pub struct Screen {
    text: String,
}

impl Screen {
    pub fn new() -> Self {
        Screen::default()
    }

    pub fn apply(&mut self, edit: &EditInstruction) {
        for _ in 0..edit.backspaces {
            self.text.pop();
        }
        self.text.push_str(&edit.insert);
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }
}

pub struct Ime {
    engine: Engine,
    screen: Screen,
}

impl Ime {
    pub fn new(engine: Engine) -> Self {
        Ime {
            engine,
            screen: Screen::new(),
        }
    }

    pub fn with_config(config: Config) -> Self {
        Ime::new(Engine::new(config))
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    pub fn screen(&self) -> &str {
        self.screen.text()
    }

    /// Process one key event and apply its edit to the screen.
    pub fn feed(&mut self, event: KeyEvent) -> EditInstruction {
        let edit = match event {
            KeyEvent::Char(c) => {
                self.engine
                    .process_key(c.to_ascii_lowercase(), c.is_ascii_uppercase(), false)
            }
            KeyEvent::Backspace => self.engine.process_backspace(),
            KeyEvent::Space => self.engine.process_word_break(' '),
            KeyEvent::Enter => self.engine.process_word_break('\n'),
            KeyEvent::Escape => {
                self.engine.commit_word();
                EditInstruction::none()
            }
            KeyEvent::ArrowKey => {
                self.engine.reset_with_cursor_moved();
                EditInstruction::none()
            }
            KeyEvent::Chord(c) => self.engine.process_key(c, false, true),
        };
        self.screen.apply(&edit);
        edit
    }

    /// Drive a whole string through the engine: space and newline map to
    /// their events, everything else is a character key.
    pub fn type_str(&mut self, text: &str) {
        for c in text.chars() {
            let event = match c {
                ' ' => KeyEvent::Space,
                '\n' => KeyEvent::Enter,
                _ => KeyEvent::Char(c),
            };
            self.feed(event);
        }
    }

    /// End the word in progress, applying any boundary correction to the
    /// screen without typing a break character.
    pub fn finish(&mut self) -> EditInstruction {
        let edit = self.engine.finish_word();
        self.screen.apply(&edit);
        edit
    }

    /// Forget everything: engine state and screen. A fresh text field.
    pub fn clear(&mut self) {
        self.engine.reset();
        self.screen.clear();
    }
}
