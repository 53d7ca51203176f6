//! Keystroke primitives shared by the typing buffer and the engine.

/// A single literal keystroke as received from the host keyboard hook.
///
/// The key is stored lowercase; `caps` remembers the shift state so that
/// restored words reproduce the user's capitalization exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyStroke {
    pub key: char,
    pub caps: bool,
}

impl KeyStroke {
    pub fn new(key: char, caps: bool) -> Self {
        KeyStroke {
            key: key.to_ascii_lowercase(),
            caps,
        }
    }

    /// Build from a host character, deriving `caps` from its case.
    pub fn from_char(c: char) -> Self {
        KeyStroke {
            key: c.to_ascii_lowercase(),
            caps: c.is_ascii_uppercase(),
        }
    }

    /// The character this keystroke types when no transform applies.
    pub fn render(&self) -> char {
        if self.caps {
            self.key.to_ascii_uppercase()
        } else {
            self.key
        }
    }
}

/// Render a keystroke sequence as the literal text it would have typed.
pub fn render_keys(keys: &[KeyStroke]) -> String {
    keys.iter().map(KeyStroke::render).collect()
}

/// The six vowel letters of the Vietnamese alphabet, as typed (base keys).
pub fn is_vowel_key(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y')
}

pub fn is_letter_key(c: char) -> bool {
    c.is_ascii_alphabetic()
}

/// Characters that terminate the current word when typed.
///
/// Digits are not breaks: VNI uses them as mark keys and Telex treats them
/// as in-word literals that merely suspend further transforms.
pub fn is_word_break(c: char) -> bool {
    c.is_whitespace() || (c.is_ascii() && !c.is_ascii_alphanumeric() && !c.is_ascii_control())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_char_derives_caps() {
        assert_eq!(KeyStroke::from_char('T'), KeyStroke::new('t', true));
        assert_eq!(KeyStroke::from_char('t'), KeyStroke::new('t', false));
    }

    #[test]
    fn render_restores_case() {
        assert_eq!(KeyStroke::new('a', true).render(), 'A');
        assert_eq!(KeyStroke::new('a', false).render(), 'a');
        let keys = [
            KeyStroke::from_char('V'),
            KeyStroke::from_char('n'),
            KeyStroke::from_char('1'),
        ];
        assert_eq!(render_keys(&keys), "Vn1");
    }

    #[test]
    fn vowel_keys() {
        for c in ['a', 'e', 'i', 'o', 'u', 'y'] {
            assert!(is_vowel_key(c));
        }
        for c in ['b', 'w', 'd', 'z'] {
            assert!(!is_vowel_key(c));
        }
    }

    #[test]
    fn word_break_classification() {
        for c in [' ', '\t', '\n', '.', ',', '!', '?', '(', ')', '"'] {
            assert!(is_word_break(c), "{c:?} should break the word");
        }
        for c in ['a', 'Z', '1', '9'] {
            assert!(!is_word_break(c), "{c:?} should not break the word");
        }
    }
}
