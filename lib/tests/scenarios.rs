//! End-to-end scenarios a real IME session would hit, one call chain per
//! test rather than a unit test per handler branch.

use hangul_ime_core::bulk::{compose_string, decompose_string};
use hangul_ime_core::ime::{Action, ImeState};
use hangul_ime_core::layout::Token2;

fn cp(r: char) -> u32 {
    r as u32
}

#[test]
fn compose_han_letter_by_letter() {
    let mut s = ImeState::new();

    let r = s.process_key_2bulsik(Token2::Consonant(30)); // ㅎ
    assert_eq!(r.action, Action::Replace);
    assert_eq!(r.current_cp, cp('ㅎ'));

    let r = s.process_key_2bulsik(Token2::Vowel(31)); // ㅏ
    assert_eq!(r.action, Action::Replace);
    assert_eq!(r.current_cp, cp('하'));

    let r = s.process_key_2bulsik(Token2::Consonant(4)); // ㄴ
    assert_eq!(r.action, Action::Replace);
    assert_eq!(r.current_cp, cp('한'));
}

#[test]
fn double_initial_on_repeated_consonant() {
    let mut s = ImeState::new();
    s.process_key_2bulsik(Token2::Consonant(1)); // ㄱ
    let r = s.process_key_2bulsik(Token2::Consonant(1)); // ㄱ again
    assert_eq!(r.action, Action::Replace);
    assert_eq!(r.current_cp, cp('ㄲ'));
}

#[test]
fn compound_vowel_gwa() {
    let mut s = ImeState::new();
    s.process_key_2bulsik(Token2::Consonant(1)); // ㄱ
    s.process_key_2bulsik(Token2::Vowel(39)); // ㅗ
    let r = s.process_key_2bulsik(Token2::Vowel(31)); // ㅏ -> 과
    assert_eq!(r.action, Action::Replace);
    assert_eq!(r.current_cp, cp('과'));
}

#[test]
fn syllable_split_on_vowel() {
    let mut s = ImeState::new();
    s.process_key_2bulsik(Token2::Consonant(30)); // ㅎ
    s.process_key_2bulsik(Token2::Vowel(31)); // ㅏ
    s.process_key_2bulsik(Token2::Consonant(4)); // ㄴ -> 한
    let r = s.process_key_2bulsik(Token2::Vowel(31)); // ㅏ -> splits: 하 + 나
    assert_eq!(r.action, Action::EmitAndNew);
    assert_eq!(r.prev_cp, cp('하'));
    assert_eq!(r.current_cp, cp('나'));
}

#[test]
fn double_final_splits_on_following_vowel() {
    let mut s = ImeState::new();
    s.process_key_2bulsik(Token2::Consonant(7)); // ㄷ
    s.process_key_2bulsik(Token2::Vowel(31)); // ㅏ
    s.process_key_2bulsik(Token2::Consonant(9)); // ㄹ
    s.process_key_2bulsik(Token2::Consonant(1)); // ㄱ -> forms ㄺ, state is 닭
    assert_eq!(s.to_codepoint(), cp('닭'));
    let r = s.process_key_2bulsik(Token2::Vowel(31)); // ㅏ -> splits to 달 + 가
    assert_eq!(r.action, Action::EmitAndNew);
    assert_eq!(r.prev_cp, cp('달'));
    assert_eq!(r.current_cp, cp('가'));
}

#[test]
fn backspace_decomposes_han_one_step_at_a_time() {
    let mut s = ImeState::new();
    s.process_key_2bulsik(Token2::Consonant(30));
    s.process_key_2bulsik(Token2::Vowel(31));
    s.process_key_2bulsik(Token2::Consonant(4));
    assert_eq!(s.to_codepoint(), cp('한'));

    assert_eq!(s.backspace(), Some(cp('하')));
    assert_eq!(s.backspace(), Some(cp('ㅎ')));
    assert_eq!(s.backspace(), None);
    assert!(s.is_empty());
}

#[test]
fn backspace_clears_a_double_final_whole_rather_than_splitting_it() {
    // ㄷ ㅏ ㄹ ㄱ -> 닭 (final ㄺ is a double final). Per spec.md §4.4.5,
    // backspace clears `final_` and its flag entirely in one step, so this
    // must land on 다 (final gone outright), not 달 (final split down to
    // its base ㄹ).
    let mut s = ImeState::new();
    s.process_key_2bulsik(Token2::Consonant(7)); // ㄷ
    s.process_key_2bulsik(Token2::Vowel(31)); // ㅏ
    s.process_key_2bulsik(Token2::Consonant(9)); // ㄹ
    s.process_key_2bulsik(Token2::Consonant(1)); // ㄱ -> forms ㄺ, state is 닭
    assert_eq!(s.to_codepoint(), cp('닭'));

    assert_eq!(s.backspace(), Some(cp('다')));
    assert_eq!(s.backspace(), Some(cp('ㄷ')));
    assert_eq!(s.backspace(), None);
    assert!(s.is_empty());
}

#[test]
fn utf8_string_decomposition() {
    let bytes = "한".as_bytes();
    assert_eq!(bytes, [0xED, 0x95, 0x9C]);
    let out = decompose_string(bytes);
    assert_eq!(out, vec![cp('ㅎ'), cp('ㅏ'), cp('ㄴ')]);
}

#[test]
fn compose_inverse_of_jamo_stream() {
    let cps: Vec<u32> = ['ㅎ', 'ㅏ', 'ㄴ', 'ㄱ', 'ㅡ', 'ㄹ'].iter().map(|&c| c as u32).collect();
    let out = compose_string(&cps);
    assert_eq!(out, vec![cp('한'), cp('글')]);
}
