//! End-to-end: config to engine to screen, as a host would drive it.

use libviet::{Config, Encoding, Ime, InputStyle, KeyEvent, VietConfig, WordList};

fn ime_with(config: Config) -> Ime {
    Ime::with_config(config)
}

#[test]
fn telex_sentence() {
    let mut ime = ime_with(Config::default());
    ime.type_str("xin chaof thees giowis ");
    assert_eq!(ime.screen(), "xin chào thế giới ");
}

#[test]
fn vni_sentence() {
    let mut ime = ime_with(Config {
        style: InputStyle::Vni,
        ..Config::default()
    });
    ime.type_str("vie65t nam ");
    assert_eq!(ime.screen(), "việt nam ");
}

#[test]
fn finish_applies_boundary_restore_without_a_break() {
    let mut ime = ime_with(Config::default());
    ime.type_str("will");
    assert_eq!(ime.screen(), "ưill");
    ime.finish();
    assert_eq!(ime.screen(), "will");
}

#[test]
fn word_lists_steer_the_boundary_restore() {
    let mut ime = ime_with(Config::default());
    ime.engine_mut().checker_mut().set_vietnamese(
        Box::new(WordList::from_words(["chào"])),
        Config::default().spelling_style(),
    );
    // chào passes the list; sán fails it, and past the phonotactic
    // check the list has the final say, so the word comes back raw.
    ime.type_str("chaof sans ");
    assert_eq!(ime.screen(), "chào sans ");
}

#[test]
fn instant_restore_fires_on_the_tone_key() {
    let mut ime = ime_with(Config {
        instant_restore: true,
        ..Config::default()
    });
    ime.engine_mut()
        .checker_mut()
        .set_english(Box::new(WordList::from_words(["user"])));
    ime.type_str("user");
    assert_eq!(ime.screen(), "user");
}

#[test]
fn chorded_key_commits_and_marks_the_caret_unknown() {
    let mut ime = ime_with(Config::default());
    ime.type_str("chao");
    ime.feed(KeyEvent::Chord('s'));
    assert_eq!(ime.screen(), "chao");
    assert!(!ime.engine().composing());
    // The caret position is unknown, so the backspace is blind.
    ime.feed(KeyEvent::Backspace);
    assert_eq!(ime.screen(), "cha");
}

#[test]
fn arrow_key_desync_recovers_at_the_next_boundary() {
    let mut ime = ime_with(Config::default());
    ime.type_str("vieetj");
    assert_eq!(ime.screen(), "việt");
    ime.feed(KeyEvent::ArrowKey);
    ime.feed(KeyEvent::Backspace);
    ime.feed(KeyEvent::Backspace);
    assert_eq!(ime.screen(), "vi");
    // A boundary re-anchors the session; typing works as usual again.
    ime.feed(KeyEvent::Space);
    ime.type_str("las ");
    assert_eq!(ime.screen(), "vi lá ");
}

#[test]
fn flattened_config_reaches_the_engine() {
    let config: VietConfig = toml::from_str(
        "encoding = \"vni-windows\"\nquick-start-consonant = true\nquick-end-consonant = true\n",
    )
    .expect("valid config");
    assert_eq!(config.base.encoding, Encoding::VniWindows);
    let mut ime = Ime::new(config.build_engine().expect("build"));
    ime.type_str("vieetj ");
    assert_eq!(ime.screen(), "vieät ");
    ime.clear();
    ime.type_str("fai hoag ");
    assert_eq!(ime.screen(), "phai hoang ");
}
