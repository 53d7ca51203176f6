//! Front-end configuration: the core engine config plus word list paths.
//!
//! The core fields are flattened, so one TOML file configures everything:
//!
//! ```toml
//! style = "telex"
//! quick-telex = true
//! vietnamese-wordlist = "/usr/share/libviet/vi-modern.txt"
//! english-wordlist = "/usr/share/libviet/en.fst"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use libviet_core::Engine;

use crate::wordlist;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct VietConfig {
    /// Engine configuration (style, encoding, feature flags).
    #[serde(flatten)]
    pub base: libviet_core::Config,

    /// Vietnamese word list for the boundary restore check. Must match
    /// the tone placement setting (a modern list with modern placement).
    pub vietnamese_wordlist: Option<PathBuf>,

    /// English word list backing the English-typing heuristics.
    pub english_wordlist: Option<PathBuf>,
}

impl VietConfig {
    /// Load from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(config)
    }

    pub fn into_base(self) -> libviet_core::Config {
        self.base
    }

    pub fn base(&self) -> &libviet_core::Config {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut libviet_core::Config {
        &mut self.base
    }

    /// Build an engine from this configuration, loading any word lists.
    pub fn build_engine(&self) -> Result<Engine> {
        let mut engine = Engine::new(self.base.clone());
        if let Some(path) = &self.vietnamese_wordlist {
            let dict = wordlist::load(path)?;
            engine
                .checker_mut()
                .set_vietnamese(dict, self.base.spelling_style());
            debug!(path = %path.display(), "vietnamese word list installed");
        }
        if let Some(path) = &self.english_wordlist {
            engine.checker_mut().set_english(wordlist::load(path)?);
            debug!(path = %path.display(), "english word list installed");
        }
        Ok(engine)
    }
}
