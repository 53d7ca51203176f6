//! Word lists for the restore heuristics.
//!
//! Two backing stores behind one type: a hash set for text files that fit
//! comfortably in memory, and a prebuilt FST set for the large English
//! list. Entries are normalized to lowercase NFC, which is the key form
//! the spell checker looks up.

use std::path::Path;

use ahash::AHashSet;
use anyhow::{Context, Result};
use fst::{Set, SetBuilder};
use tracing::debug;

use libviet_core::{utils, Dictionary};

pub enum WordList {
    Memory(AHashSet<String>),
    Fst(Set<Vec<u8>>),
}

impl WordList {
    /// Build an in-memory list from an iterator of words.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        WordList::Memory(
            words
                .into_iter()
                .map(|w| utils::normalize(w.as_ref()).to_lowercase())
                .collect(),
        )
    }

    /// Parse a word-per-line text. Blank lines and `#` comments are
    /// skipped.
    pub fn from_lines(text: &str) -> Self {
        WordList::from_words(
            text.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#')),
        )
    }

    pub fn load_text<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading word list {}", path.display()))?;
        let list = WordList::from_lines(&text);
        debug!(words = list.len(), path = %path.display(), "word list loaded");
        Ok(list)
    }

    /// Load a list compiled by [`compile_fst`](Self::compile_fst).
    /// Lookup never allocates; the whole set is one contiguous buffer.
    pub fn load_fst<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("reading fst word list {}", path.display()))?;
        let set =
            Set::new(bytes).with_context(|| format!("parsing fst word list {}", path.display()))?;
        debug!(words = set.len(), path = %path.display(), "fst word list loaded");
        Ok(WordList::Fst(set))
    }

    /// Compile a text word list into the FST format, normalizing entries
    /// exactly as [`from_lines`](Self::from_lines) does so the two
    /// formats answer lookups identically.
    pub fn compile_fst<P: AsRef<Path>>(text_path: P, out_path: P) -> Result<()> {
        let text_path = text_path.as_ref();
        let out_path = out_path.as_ref();
        let text = std::fs::read_to_string(text_path)
            .with_context(|| format!("reading word list {}", text_path.display()))?;
        let mut words: Vec<String> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(|l| utils::normalize(l).to_lowercase())
            .collect();
        // FST construction requires sorted unique keys.
        words.sort();
        words.dedup();

        let writer = std::io::BufWriter::new(
            std::fs::File::create(out_path)
                .with_context(|| format!("creating {}", out_path.display()))?,
        );
        let mut builder = SetBuilder::new(writer)?;
        for word in &words {
            builder.insert(word)?;
        }
        builder.finish()?;
        debug!(words = words.len(), path = %out_path.display(), "fst word list compiled");
        Ok(())
    }

    pub fn len(&self) -> usize {
        match self {
            WordList::Memory(set) => set.len(),
            WordList::Fst(set) => set.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Dictionary for WordList {
    fn contains(&self, word: &str) -> bool {
        match self {
            WordList::Memory(set) => set.contains(word),
            WordList::Fst(set) => set.contains(word),
        }
    }
}

/// Load a word list by extension: `.fst` files as FST sets, anything
/// else as text.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Box<dyn Dictionary>> {
    let path = path.as_ref();
    let list = if path.extension().is_some_and(|e| e == "fst") {
        WordList::load_fst(path)?
    } else {
        WordList::load_text(path)?
    };
    Ok(Box::new(list))
}
