//! Orthography rules end to end: where marks land, how shapes interact,
//! and what the legacy encodings emit.

use libviet_core::buffer::{CharacterEntry, Tone};
use libviet_core::charset::{render_entry, Encoding};
use libviet_core::keys::KeyStroke;
use libviet_core::{Config, Engine};

fn type_fresh(config: Config, keys: &str) -> String {
    let mut engine = Engine::new(config);
    let mut screen = String::new();
    for c in keys.chars() {
        let edit = engine.process_key(c, c.is_ascii_uppercase(), false);
        for _ in 0..edit.backspaces {
            screen.pop();
        }
        screen.push_str(&edit.insert);
    }
    screen
}

fn telex() -> Config {
    Config::default()
}

fn old_style() -> Config {
    Config {
        modern_tone_placement: false,
        ..Config::default()
    }
}

#[test]
fn glide_final_pairs_mark_the_first_vowel() {
    for (keys, want) in [
        ("mais", "mái"),
        ("baor", "bảo"),
        ("keox", "kẽo"),
        ("cays", "cáy"),
        ("cuar", "của"),
        ("nuij", "nụi"),
    ] {
        assert_eq!(type_fresh(telex(), keys), want, "{keys}");
    }
}

#[test]
fn glide_initial_pairs_differ_between_styles() {
    assert_eq!(type_fresh(telex(), "hoar"), "hoả");
    assert_eq!(type_fresh(telex(), "thuyr"), "thuỷ");
    assert_eq!(type_fresh(old_style(), "hoar"), "hỏa");
    assert_eq!(type_fresh(old_style(), "thuyr"), "thủy");
    // A coda overrides the style difference.
    assert_eq!(type_fresh(telex(), "hoanf"), "hoàn");
    assert_eq!(type_fresh(old_style(), "hoanf"), "hoàn");
}

#[test]
fn circumflex_beats_position() {
    // The modified vowel takes the mark wherever it sits.
    assert_eq!(type_fresh(telex(), "muoonj"), "muộn");
    assert_eq!(type_fresh(telex(), "muonj"), "mượn");
    assert_eq!(type_fresh(telex(), "quaas"), "quấ");
}

#[test]
fn the_mark_follows_the_growing_word() {
    // Old style places hỏa on the o; the coda then pulls the mark over.
    let mut engine = Engine::new(old_style());
    let mut screen = String::new();
    for c in "hoa".chars() {
        let edit = engine.process_key(c, false, false);
        for _ in 0..edit.backspaces {
            screen.pop();
        }
        screen.push_str(&edit.insert);
    }
    for (c, want) in [('r', "hỏa"), ('n', "hoản"), ('g', "hoảng")] {
        let edit = engine.process_key(c, false, false);
        for _ in 0..edit.backspaces {
            screen.pop();
        }
        screen.push_str(&edit.insert);
        assert_eq!(screen, want);
    }
}

#[test]
fn qu_and_gi_digraphs_release_their_vowel() {
    assert_eq!(type_fresh(telex(), "quys"), "quý");
    assert_eq!(type_fresh(telex(), "quar"), "quả");
    assert_eq!(type_fresh(telex(), "gias"), "giá");
    // With no further vowel the i is the nucleus.
    assert_eq!(type_fresh(telex(), "gif"), "gì");
}

#[test]
fn literal_oo_needs_the_undo() {
    assert_eq!(type_fresh(telex(), "xoong"), "xông");
    assert_eq!(type_fresh(telex(), "xooong "), "xoong ");
}

#[test]
fn remove_key_strips_in_tiers() {
    // Tone first; the word stays live, so a retyped tone lands again.
    assert_eq!(type_fresh(telex(), "lasz"), "la");
    assert_eq!(type_fresh(telex(), "laszs"), "lá");
    // Then shapes, then the key is literal.
    assert_eq!(type_fresh(telex(), "aaz"), "a");
    assert_eq!(type_fresh(telex(), "tuwowngz"), "tuong");
    assert_eq!(type_fresh(telex(), "laz"), "laz");
    let vni = Config {
        style: libviet_core::InputStyle::Vni,
        ..Config::default()
    };
    assert_eq!(type_fresh(vni, "toan20"), "toan");
}

#[test]
fn standalone_brackets_type_shaped_vowels() {
    assert_eq!(type_fresh(telex(), "[if "), "ời ");
    assert_eq!(type_fresh(telex(), "M[is "), "Mới ");
    assert_eq!(type_fresh(telex(), "th]af "), "thừa ");
}

#[test]
fn legacy_encodings_cover_every_vowel_shape_tone() {
    let tones = [
        Tone::Level,
        Tone::Acute,
        Tone::Grave,
        Tone::HookAbove,
        Tone::Tilde,
        Tone::DotBelow,
    ];
    for enc in [Encoding::Unicode, Encoding::VniWindows, Encoding::Tcvn3] {
        for base in ['a', 'e', 'i', 'o', 'u', 'y'] {
            for (circumflex, horn) in [(false, false), (true, false), (false, true)] {
                for tone in tones {
                    for caps in [false, true] {
                        let mut e = CharacterEntry::from_key(KeyStroke::new(base, caps));
                        e.circumflex = circumflex;
                        e.horn = horn;
                        e.tone = tone;
                        let out = render_entry(&e, enc);
                        assert!(
                            !out.is_empty(),
                            "{base} circ={circumflex} horn={horn} {tone:?} {enc:?}"
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn legacy_encodings_match_known_words() {
    assert_eq!(
        type_fresh(
            Config {
                encoding: Encoding::VniWindows,
                ..Config::default()
            },
            "vieetj nam"
        ),
        "vieät nam"
    );
    assert_eq!(
        type_fresh(
            Config {
                encoding: Encoding::Tcvn3,
                ..Config::default()
            },
            "ddoongf"
        ),
        "®ång"
    );
}
