//! Corrective edits the host applies to its text field.

/// Delete `backspaces` characters before the caret, then type `insert`.
///
/// An instruction fully describes the screen change for one engine call;
/// the host must not additionally apply the raw key or its own backspace.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EditInstruction {
    pub backspaces: usize,
    pub insert: String,
}

impl EditInstruction {
    pub fn none() -> Self {
        EditInstruction::default()
    }

    pub fn is_none(&self) -> bool {
        self.backspaces == 0 && self.insert.is_empty()
    }

    pub fn backspace(n: usize) -> Self {
        EditInstruction {
            backspaces: n,
            insert: String::new(),
        }
    }

    pub fn insert(text: impl Into<String>) -> Self {
        EditInstruction {
            backspaces: 0,
            insert: text.into(),
        }
    }

    /// The minimal instruction turning `before` into `after`: strip the
    /// longest common prefix (in characters), delete the rest, type the
    /// new tail.
    pub fn diff(before: &str, after: &str) -> Self {
        let common = before
            .chars()
            .zip(after.chars())
            .take_while(|(b, a)| b == a)
            .count();
        EditInstruction {
            backspaces: before.chars().count() - common,
            insert: after.chars().skip(common).collect(),
        }
    }

    /// Append one more typed character to this edit.
    pub fn push(&mut self, c: char) {
        self.insert.push(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(text: &str, edit: &EditInstruction) -> String {
        let keep = text.chars().count() - edit.backspaces;
        let mut out: String = text.chars().take(keep).collect();
        out.push_str(&edit.insert);
        out
    }

    #[test]
    fn diff_appends() {
        let e = EditInstruction::diff("thuon", "thuong");
        assert_eq!(e, EditInstruction::insert("g"));
    }

    #[test]
    fn diff_rewrites_changed_tail() {
        // thuong -> thương: the rewrite starts at the first changed char.
        let e = EditInstruction::diff("thuong", "thương");
        assert_eq!(e.backspaces, 3);
        assert_eq!(e.insert, "ương");
        assert_eq!(apply("thuong", &e), "thương");
    }

    #[test]
    fn diff_counts_characters_not_bytes() {
        let e = EditInstruction::diff("tiếng", "tiến");
        assert_eq!(e, EditInstruction::backspace(1));
        let e = EditInstruction::diff("ă", "ắ");
        assert_eq!(e.backspaces, 1);
        assert_eq!(e.insert, "ắ");
    }

    #[test]
    fn diff_of_equal_strings_is_none() {
        assert!(EditInstruction::diff("chào", "chào").is_none());
    }

    #[test]
    fn apply_round_trips_samples() {
        for (before, after) in [
            ("", "x"),
            ("hoa", "hoà"),
            ("hoà", "ho"),
            ("aess", "assess"),
            ("tröôø", "tröôøng"),
        ] {
            let e = EditInstruction::diff(before, after);
            assert_eq!(apply(before, &e), after, "{before} -> {after}");
            assert!(e.backspaces <= before.chars().count());
        }
    }
}
