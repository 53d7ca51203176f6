//! Phonotactics of the Vietnamese syllable.
//!
//! Two validity tiers serve two moments. While a word is being typed the
//! engine asks [`progress_ok`]: a prefix-tolerant check over the typed
//! base letters, so an unfinished `thuo` does not suspend the word that
//! will become `thương`. At a word boundary it asks [`full_valid`]: the
//! strict check over resolved vowel identities (diacritics included),
//! coda legality and the stop-coda tone rule.

use ahash::AHashSet;
use once_cell::sync::Lazy;

use crate::buffer::{CharacterEntry, Tone};
use crate::charset::{self, Encoding};

/// Onset clusters of native orthography.
static INITIALS: Lazy<AHashSet<&'static str>> = Lazy::new(|| {
    [
        "b", "c", "ch", "d", "đ", "g", "gh", "gi", "h", "k", "kh", "l", "m", "n", "ng", "ngh",
        "nh", "p", "ph", "qu", "r", "s", "t", "th", "tr", "v", "x",
    ]
    .into_iter()
    .collect()
});

/// Extra onsets tolerated for loanwords when foreign consonants are on.
static FOREIGN_INITIALS: &[&str] = &["f", "j", "w", "z"];

/// Legal codas.
static FINALS: &[&str] = &["c", "ch", "m", "n", "ng", "nh", "p", "t"];

/// Single-letter codas the quick-consonant feature expands at word break
/// (g -> ng, h -> nh, k -> ch).
static QUICK_FINALS: &[char] = &['g', 'h', 'k'];

/// Vowel runs as typed (base keys, before any diacritic resolution).
/// Prefix matching makes every left prefix of an entry acceptable too.
static BASE_NUCLEI: Lazy<AHashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "e", "i", "o", "u", "y", // singles
        "ai", "ao", "au", "ay", "eo", "eu", "ia", "ie", "iu", "oa", "oe", "oi", "oo", "ua", "ue",
        "ui", "uo", "uu", "uy", "ye", // pairs
        "ieu", "oai", "oao", "oay", "oeo", "uoi", "uou", "uya", "uye", "uyu", "yeu", // triples
    ]
    .into_iter()
    .collect()
});

/// Whether a nucleus may, must, or must not be followed by a coda.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodaRule {
    None,
    Optional,
    Required,
}

/// Resolved nuclei (diacritics included, tone excluded) with their coda
/// rule. This is the word-boundary table.
static IDENTITY_NUCLEI: Lazy<AHashMapNuclei> = Lazy::new(|| {
    use CodaRule::*;
    let entries: &[(&str, CodaRule)] = &[
        ("a", Optional),
        ("ă", Required),
        ("â", Required),
        ("e", Optional),
        ("ê", Optional),
        ("i", Optional),
        ("o", Optional),
        ("ô", Optional),
        ("ơ", Optional),
        ("u", Optional),
        ("ư", Optional),
        ("y", Optional),
        ("ai", None),
        ("ao", None),
        ("au", None),
        ("ay", None),
        ("âu", None),
        ("ây", None),
        ("eo", None),
        ("êu", None),
        ("ia", None),
        ("iê", Required),
        ("iu", None),
        ("oa", Optional),
        ("oă", Required),
        ("oe", Optional),
        ("oi", None),
        ("ôi", None),
        ("ơi", None),
        ("oo", Required),
        ("ua", None),
        ("uâ", Required),
        ("uê", Optional),
        ("ui", None),
        ("uy", Optional),
        ("uô", Required),
        ("uơ", None),
        ("ươ", Required),
        ("ưa", None),
        ("ưi", None),
        ("ưu", None),
        ("yê", Required),
        ("iêu", None),
        ("yêu", None),
        ("oai", None),
        ("oao", None),
        ("oay", None),
        ("oeo", None),
        ("uây", None),
        ("uôi", None),
        ("ươi", None),
        ("ươu", None),
        ("uya", None),
        ("uyê", Required),
        ("uyu", None),
    ];
    entries.iter().copied().collect()
});

type AHashMapNuclei = ahash::AHashMap<&'static str, CodaRule>;

/// Base-key vowel pairs whose tone lands on the first vowel in modern
/// orthography (glide-final and centering diphthongs).
static FIRST_VOWEL_PAIRS: &[(char, char)] = &[
    ('a', 'i'),
    ('a', 'o'),
    ('a', 'u'),
    ('a', 'y'),
    ('e', 'o'),
    ('e', 'u'),
    ('i', 'a'),
    ('i', 'u'),
    ('o', 'i'),
    ('u', 'a'),
    ('u', 'i'),
    ('u', 'u'),
    ('y', 'a'),
];

/// Structural split of the buffer into onset, vowel run and coda.
/// Ranges index into the slot list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordShape {
    pub initial: std::ops::Range<usize>,
    pub nucleus: std::ops::Range<usize>,
    pub coda: std::ops::Range<usize>,
}

impl WordShape {
    pub fn has_nucleus(&self) -> bool {
        !self.nucleus.is_empty()
    }

    pub fn has_coda(&self) -> bool {
        !self.coda.is_empty()
    }
}

/// Split the slots into onset + nucleus + coda, or `None` if they do not
/// fit that shape (a second vowel run, a digit, a symbol).
///
/// Two digraph adjustments keep `qu` and `gi` out of the nucleus: a `u`
/// after onset-final `q` always joins the onset (`quý` marks the `y`),
/// and an `i` after onset-final `g` joins it only when further vowels
/// follow (`giá` marks the `a`, but `gì` keeps `i` as its nucleus).
pub fn parse(slots: &[CharacterEntry]) -> Option<WordShape> {
    if slots.iter().any(|e| !e.base.is_ascii_alphabetic()) {
        return None;
    }
    let mut i = 0;
    while i < slots.len() && !slots[i].is_vowel() {
        i += 1;
    }
    let mut nucleus_start = i;
    while i < slots.len() && slots[i].is_vowel() {
        i += 1;
    }
    let nucleus_end = i;
    while i < slots.len() && !slots[i].is_vowel() {
        i += 1;
    }
    if i != slots.len() {
        // A vowel after the coda: not a single syllable.
        return None;
    }

    // Digraph onsets.
    if nucleus_start > 0 && nucleus_end > nucleus_start {
        let onset_last = &slots[nucleus_start - 1];
        let first = &slots[nucleus_start];
        if onset_last.base == 'q' && first.base == 'u' {
            nucleus_start += 1;
        } else if onset_last.base == 'g'
            && !onset_last.circumflex
            && first.base == 'i'
            && !first.is_modified()
            && nucleus_end - nucleus_start > 1
        {
            nucleus_start += 1;
        }
    }

    Some(WordShape {
        initial: 0..nucleus_start,
        nucleus: nucleus_start..nucleus_end,
        coda: nucleus_end..slots.len(),
    })
}

fn identity_string(slots: &[CharacterEntry]) -> String {
    let mut s = String::new();
    for e in slots {
        let mut plain = e.clone();
        plain.tone = Tone::Level;
        plain.caps = false;
        charset::push_entry(&mut s, &plain, Encoding::Unicode);
    }
    s
}

fn base_string(slots: &[CharacterEntry]) -> String {
    slots.iter().map(|e| e.base).collect()
}

fn initial_matches(prefix: &str, foreign: bool) -> bool {
    if prefix.is_empty() {
        return true;
    }
    if INITIALS.iter().any(|i| i.starts_with(prefix)) {
        return true;
    }
    foreign && FOREIGN_INITIALS.contains(&prefix)
}

/// Whether `prefix` is (or could still grow into) a legal coda. The
/// circumflex handler validates the tail behind a transform target with
/// this, so `thana` can still become `thân`.
pub fn coda_prefix_ok(prefix: &str, quick_finals: bool) -> bool {
    if prefix.is_empty() {
        return true;
    }
    if FINALS.iter().any(|f| f.starts_with(prefix)) {
        return true;
    }
    quick_finals && prefix.len() == 1 && prefix.chars().all(|c| QUICK_FINALS.contains(&c))
}

/// Prefix-tolerant mid-word check over base letters. A `false` here
/// suspends further transforms for the word.
pub fn progress_ok(slots: &[CharacterEntry], quick_finals: bool, foreign: bool) -> bool {
    let shape = match parse(slots) {
        Some(s) => s,
        None => return false,
    };
    let initial = identity_string(&slots[shape.initial.clone()]);
    if !initial_matches(&initial, foreign) {
        return false;
    }
    let bases = base_string(&slots[shape.nucleus.clone()]);
    if !bases.is_empty() && !BASE_NUCLEI.iter().any(|n| n.starts_with(bases.as_str())) {
        return false;
    }
    let coda = base_string(&slots[shape.coda.clone()]);
    coda_prefix_ok(&coda, quick_finals)
}

/// Spelling conventions tying certain onsets to front or back vowels.
/// The `gi` digraph is already out of the nucleus when this runs, so the
/// native exception `gì` never reaches the `g` + front check.
fn onset_vowel_agreement(initial: &str, first_vowel: &str, foreign: bool) -> bool {
    let front = matches!(first_vowel, "i" | "e" | "ê");
    match initial {
        "gh" | "ngh" => front,
        "g" => first_vowel != "e" && first_vowel != "ê",
        "ng" => !front,
        "c" if !foreign => !front && first_vowel != "y",
        "k" if !foreign => front || first_vowel == "y",
        _ => true,
    }
}

/// Strict word-boundary validation over resolved vowel identities.
pub fn full_valid(slots: &[CharacterEntry], quick_finals: bool, foreign: bool) -> bool {
    let shape = match parse(slots) {
        Some(s) => s,
        None => return false,
    };
    if !shape.has_nucleus() {
        return false;
    }
    let initial = identity_string(&slots[shape.initial.clone()]);
    if !initial.is_empty()
        && !INITIALS.contains(initial.as_str())
        && !(foreign && FOREIGN_INITIALS.contains(&initial.as_str()))
    {
        return false;
    }
    let nucleus = identity_string(&slots[shape.nucleus.clone()]);
    let rule = match IDENTITY_NUCLEI.get(nucleus.as_str()) {
        Some(r) => *r,
        None => return false,
    };
    let coda = identity_string(&slots[shape.coda.clone()]);
    match rule {
        CodaRule::None if !coda.is_empty() => return false,
        CodaRule::Required if coda.is_empty() => return false,
        _ => {}
    }
    if !coda.is_empty()
        && !FINALS.contains(&coda.as_str())
        && !(quick_finals && coda.len() == 1 && coda.chars().all(|c| QUICK_FINALS.contains(&c)))
    {
        return false;
    }
    let first_vowel = identity_string(&slots[shape.nucleus.start..shape.nucleus.start + 1]);
    if !onset_vowel_agreement(&initial, &first_vowel, foreign) {
        return false;
    }
    // Stop codas admit only the two checked tones.
    if matches!(coda.as_str(), "c" | "ch" | "p" | "t") {
        let tone = slots
            .iter()
            .map(|e| e.tone)
            .find(|t| *t != Tone::Level)
            .unwrap_or(Tone::Level);
        if !matches!(tone, Tone::Acute | Tone::DotBelow) {
            return false;
        }
    }
    true
}

/// Whether the typed vowel run may carry a tone at all.
pub fn base_nucleus_tonable(nucleus: &[CharacterEntry]) -> bool {
    let bases = base_string(nucleus);
    !bases.is_empty() && BASE_NUCLEI.iter().any(|n| n.starts_with(bases.as_str()))
}

/// Index within the nucleus that receives the tone mark.
///
/// A modified last vowel always attracts the mark. Otherwise modern
/// orthography puts the mark on the second vowel when a coda follows or
/// for the glide-initial pairs (`hoả`, `thuỷ`), and on the first for
/// glide-final and centering pairs (`mái`, `của`); old orthography
/// defaults to the first vowel unless a coda follows (`hỏa`, `thủy`,
/// but still `hoàn`). Three-vowel nuclei mark the middle.
pub fn mark_target(nucleus: &[CharacterEntry], has_coda: bool, modern: bool) -> usize {
    let n = nucleus.len();
    if n == 1 {
        return 0;
    }
    if nucleus[n - 1].is_modified() {
        return n - 1;
    }
    if n >= 3 {
        return 1;
    }
    if has_coda {
        return 1;
    }
    if modern {
        let pair = (nucleus[0].base, nucleus[1].base);
        if FIRST_VOWEL_PAIRS.contains(&pair) {
            0
        } else {
            1
        }
    } else {
        0
    }
}
