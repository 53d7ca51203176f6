//! Scenario tests: whole phrases typed key by key against a simulated
//! text field, across input styles.

use libviet_core::{Config, EditInstruction, Engine, InputStyle};

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

fn telex() -> Config {
    Config::default()
}

fn vni() -> Config {
    Config {
        style: InputStyle::Vni,
        ..Config::default()
    }
}

#[test]
fn telex_phrase_with_capitals() {
    assert_eq!(
        type_fresh(telex(), "ddaay laf tieengs Vieetj "),
        "đây là tiếng Việt "
    );
}

#[test]
fn telex_full_mark_families() {
    assert_eq!(type_fresh(telex(), "nguyeenx "), "nguyễn ");
    assert_eq!(type_fresh(telex(), "hoawcj "), "hoặc ");
    assert_eq!(type_fresh(telex(), "khuyar "), "khuỷa ");
    assert_eq!(type_fresh(telex(), "nghieng "), "nghieng ");
}

#[test]
fn vni_phrase() {
    assert_eq!(type_fresh(vni(), "tie6ng1 vie6t5 "), "tiếng việt ");
    assert_eq!(type_fresh(vni(), "tuye6t5 "), "tuyệt ");
    assert_eq!(type_fresh(vni(), "d9u7o7ng2 "), "đường ");
}

#[test]
fn free_position_marks_match_adjacent_ones() {
    // Tone and shape keys may trail the whole word.
    assert_eq!(type_fresh(telex(), "vietej"), type_fresh(telex(), "vieetj"));
    assert_eq!(type_fresh(telex(), "thana"), "thân");
    assert_eq!(type_fresh(telex(), "caua"), "câu");
    assert_eq!(type_fresh(telex(), "toio"), "tôi");
}

#[test]
fn simple_telex_variants_restrict_the_keys() {
    let simple1 = Config {
        style: InputStyle::SimpleTelex1,
        ..Config::default()
    };
    // No standalone horn vowels.
    assert_eq!(type_fresh(simple1.clone(), "w"), "w");
    assert_eq!(type_fresh(simple1.clone(), "thw"), "thw");
    // Targeted horn still works.
    assert_eq!(type_fresh(simple1, "thuw"), "thư");

    let simple2 = Config {
        style: InputStyle::SimpleTelex2,
        ..Config::default()
    };
    // Transforms must touch the final position.
    assert_eq!(type_fresh(simple2.clone(), "thana"), "thana");
    assert_eq!(type_fresh(simple2.clone(), "thaan"), "thân");
    assert_eq!(type_fresh(simple2, "chafo"), "chào");
}

#[test]
fn word_breaks_pass_through_punctuation() {
    assert_eq!(type_fresh(telex(), "chaof, thees giowis!"), "chào, thế giới!");
}

#[test]
fn digits_suspend_but_do_not_break_in_telex() {
    assert_eq!(type_fresh(telex(), "mk21 "), "mk21 ");
    // A digit before any transform keeps the rest literal.
    assert_eq!(type_fresh(telex(), "a1s "), "a1s ");
}

#[test]
fn backspace_through_a_phrase() {
    let mut engine = Engine::new(telex());
    let mut screen = String::new();
    feed(&mut engine, &mut screen, "xin chaof ");
    assert_eq!(screen, "xin chào ");
    for _ in 0..3 {
        apply(&mut screen, &engine.process_backspace());
    }
    assert_eq!(screen, "xin ch");
    feed(&mut engine, &mut screen, "uws ");
    assert_eq!(screen, "xin chứ ");
}

#[test]
fn backspace_rederives_the_horn_pair_on_retype() {
    let mut engine = Engine::new(telex());
    let mut screen = String::new();
    feed(&mut engine, &mut screen, "thuongw");
    // The pair was already horned by the auto-fix; w claims it.
    assert_eq!(screen, "thương");
    apply(&mut screen, &engine.process_backspace());
    assert_eq!(screen, "thươn");
    feed(&mut engine, &mut screen, "g");
    assert_eq!(screen, "thương");
}

#[test]
fn commit_and_reset_lifecycle() {
    let mut engine = Engine::new(telex());
    let mut screen = String::new();
    feed(&mut engine, &mut screen, "chaof");
    assert!(engine.composing());
    assert_eq!(engine.current_word(), "chào");
    engine.commit_word();
    assert!(!engine.composing());
    // The committed word is still reachable through history.
    apply(&mut screen, &engine.process_backspace());
    assert_eq!(screen, "chà");
    engine.reset();
    let edit = engine.process_backspace();
    assert_eq!(edit, EditInstruction::backspace(1));
}
