//! Property-based tests for the codec and IME state machine. P1/P2 are
//! exhaustive over the full 11,172-syllable space rather than sampled;
//! everything else uses `proptest` strategies.

use hangul_ime_core::codec::{self, SYLLABLE_BASE, SYLLABLE_LAST};
use hangul_ime_core::ime::ImeState;
use hangul_ime_core::layout::{self, Ohi, Token2};
use proptest::prelude::*;

#[test]
fn p1_codec_roundtrip_exhaustive() {
    for s in SYLLABLE_BASE..=SYLLABLE_LAST {
        let d = codec::decompose(s).expect("every value in range is a syllable");
        let back = codec::compose(d.initial, d.medial, d.final_).expect("decomposed parts recompose");
        assert_eq!(back, s);
    }
}

#[test]
fn p2_composition_coverage_exhaustive() {
    use std::collections::HashSet;
    let mut seen = HashSet::new();
    for i in 0..19u32 {
        for m in 0..21u32 {
            for f in 0..28u32 {
                let cp = SYLLABLE_BASE + (i * 21 * 28) + (m * 28) + f;
                assert!(codec::is_syllable(cp));
                seen.insert(cp);
            }
        }
    }
    assert_eq!(seen.len(), 11172);
}

fn arb_ohi_initial() -> impl Strategy<Value = Ohi> {
    prop_oneof![
        Just(1), Just(2), Just(4), Just(7), Just(8), Just(9), Just(17), Just(18), Just(19),
        Just(21), Just(22), Just(23), Just(24), Just(25), Just(26), Just(27), Just(28), Just(29), Just(30),
    ]
}

fn arb_ohi_vowel() -> impl Strategy<Value = Ohi> {
    (31u8..=51u8).boxed()
}

fn arb_token2() -> impl Strategy<Value = Token2> {
    prop_oneof![
        arb_ohi_initial().prop_map(Token2::Consonant),
        arb_ohi_vowel().prop_map(Token2::Vowel),
    ]
}

fn to_codepoint_domain_ok(cp: u32) -> bool {
    cp == 0 || codec::is_jamo(cp) || codec::is_syllable(cp)
}

proptest! {
    #[test]
    fn p3_invalid_composition_rejected(i in 0u32..0x3170, m in 0u32..0x3170, f in 0u32..0x3170) {
        // Any tuple where at least one part falls outside its valid jamo
        // role must fail composition, except the legal final=0 sentinel.
        if !codec::is_consonant(i) || !codec::is_vowel(m) || (f != 0 && !codec::is_consonant(f)) {
            prop_assert!(codec::compose(i, m, f).is_none());
        }
    }

    #[test]
    fn p4_ime_state_validity(tokens in prop::collection::vec(arb_token2(), 0..30)) {
        let mut s = ImeState::new();
        for t in tokens {
            s.process_key_2bulsik(t);
            let cp = s.to_codepoint();
            prop_assert!(to_codepoint_domain_ok(cp));
        }
    }

    #[test]
    fn p5_backspace_monotonic(tokens in prop::collection::vec(arb_token2(), 1..15)) {
        let mut s = ImeState::new();
        for t in tokens {
            s.process_key_2bulsik(t);
        }
        let mut prev_nonzero = count_nonzero(&s);
        loop {
            let result = s.backspace();
            let now = count_nonzero(&s);
            if result.is_some() {
                prop_assert!(now < prev_nonzero);
            } else {
                prop_assert!(s.is_empty());
            }
            if s.is_empty() {
                break;
            }
            prev_nonzero = now;
        }
        // further backspaces on an empty state must not panic or change it
        prop_assert_eq!(s.backspace(), None);
        prop_assert!(s.is_empty());
    }

    #[test]
    fn p6_commit_idempotent(tokens in prop::collection::vec(arb_token2(), 0..10)) {
        let mut s = ImeState::new();
        for t in tokens {
            s.process_key_2bulsik(t);
        }
        let was_empty = s.is_empty();
        let expected = s.to_codepoint();
        let first = s.commit();
        if was_empty {
            prop_assert_eq!(first, 0);
        } else {
            prop_assert_eq!(first, expected);
        }
        prop_assert!(s.is_empty());
        prop_assert_eq!(s.commit(), 0);
    }

    #[test]
    fn p7_utf8_stream_identity_for_ascii(s in "[ -~]{0,64}") {
        let decomposed = hangul_ime_core::bulk::decompose_string(s.as_bytes());
        let expected: Vec<u32> = s.chars().map(|c| c as u32).collect();
        prop_assert_eq!(decomposed, expected);
    }

    #[test]
    fn p8_utf8_robustness_no_panic(bytes in prop::collection::vec(any::<u8>(), 0..32)) {
        // Just must not panic or read out of bounds; len() on the result
        // is bounded by the input length.
        let out = hangul_ime_core::bulk::decompose_string(&bytes);
        prop_assert!(out.len() <= bytes.len());
    }
}

/// The real per-slot count P5 talks about: `raw_state()` is `[initial,
/// initial_flag, medial, medial_flag, final, final_flag]`, so indices
/// 0/2/4 are the three Ohi slot values (`0` means empty).
fn count_nonzero(s: &ImeState) -> u32 {
    let raw = s.raw_state();
    [raw[0], raw[2], raw[4]].iter().filter(|&&v| v != 0).count() as u32
}

#[test]
fn double_jamo_tables_are_mutually_consistent() {
    for ohi in 1..=30u8 {
        if layout::can_follow_as_initial(ohi) {
            assert!(layout::ohi_initial_to_idx(ohi).is_some());
            assert!(layout::ohi_final_to_idx(ohi).is_none());
        }
    }
}
