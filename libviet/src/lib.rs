//! libviet crate root
//!
//! Vietnamese input method front-end over `libviet-core`: host event
//! routing, word list loading and the flattened configuration file. The
//! companion binary is a line-based converter for trying the engine out.
//!
//! Public API exported here:
//! - `Ime`, `KeyEvent` and `Screen` from `ime`
//! - `WordList` from `wordlist`
//! - `VietConfig` from `config`

pub mod config;
pub mod ime;
pub mod wordlist;

// Convenience re-exports for common types used by callers.
pub use config::VietConfig;
pub use ime::{Ime, KeyEvent, Screen};
pub use wordlist::WordList;

// The core types hosts interact with directly.
pub use libviet_core::{
    Config, Dictionary, EditInstruction, Encoding, Engine, InputStyle, SpellingStyle,
};
