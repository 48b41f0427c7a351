//! Keyboard layouts and the sparse "Ohi index" slot space the IME state
//! machine operates over.
//!
//! An Ohi index is `cp - 0x3130` for a compatibility jamo code point `cp`:
//! `1..=30` addresses the consonant block (`U+3131..=U+314E`), `31..=51`
//! the vowel block (`U+314F..=U+3163`). This single arithmetic relation is
//! why [`ohi_index_to_single_jamo`] needs no lookup table, while the
//! *codec*'s dense `InitialIdx`/`MedialIdx`/`FinalIdx` domains (§4.1) are a
//! different, smaller numbering that excludes slots a given position can't
//! hold (e.g. `ㄸ`/`ㅃ`/`ㅉ` are valid Ohi consonants but never valid
//! `FinalIdx` values); [`ohi_initial_to_idx`]/[`ohi_medial_to_idx`]/
//! [`ohi_final_to_idx`] bridge the two.

pub type Ohi = u8;

pub fn ohi_index_to_single_jamo(ohi: Ohi) -> u32 {
    0x3130 + ohi as u32
}

/// Direct-address `InitialIdx` table, indexed by Ohi value (`0..=30`);
/// `-1` marks "not a valid initial". Same shape as `codec::REVERSE_INITIAL`.
const INITIAL_IDX: [i8; 31] = {
    let mut t = [-1i8; 31];
    const PAIRS: [(Ohi, u8); 19] = [
        (1, 0), (2, 1), (4, 2), (7, 3), (8, 4), (9, 5), (17, 6), (18, 7), (19, 8), (21, 9),
        (22, 10), (23, 11), (24, 12), (25, 13), (26, 14), (27, 15), (28, 16), (29, 17), (30, 18),
    ];
    let mut i = 0;
    while i < PAIRS.len() {
        let (ohi, idx) = PAIRS[i];
        t[ohi as usize] = idx as i8;
        i += 1;
    }
    t
};

/// `InitialIdx` for the 19 Ohi consonants valid as an initial, else `None`.
pub fn ohi_initial_to_idx(ohi: Ohi) -> Option<u8> {
    let idx = *INITIAL_IDX.get(ohi as usize)?;
    if idx < 0 {
        None
    } else {
        Some(idx as u8)
    }
}

/// `MedialIdx` for an Ohi medial (`31..=51`); all 21 are valid.
pub fn ohi_medial_to_idx(ohi: Ohi) -> Option<u8> {
    if (31..=51).contains(&ohi) {
        Some(ohi - 31)
    } else {
        None
    }
}

/// Direct-address `FinalIdx` table, indexed by Ohi value (`0..=30`); `-1`
/// marks "not a valid final". `ㄸ`(8)/`ㅃ`(19)/`ㅉ`(25) are excluded:
/// Korean orthography never places a tensed stop in final position.
const FINAL_IDX: [i8; 31] = {
    let mut t = [-1i8; 31];
    const PAIRS: [(Ohi, u8); 27] = [
        (1, 1), (2, 2), (3, 3), (4, 4), (5, 5), (6, 6), (7, 7), (9, 8), (10, 9), (11, 10),
        (12, 11), (13, 12), (14, 13), (15, 14), (16, 15), (17, 16), (18, 17), (20, 18), (21, 19),
        (22, 20), (23, 21), (24, 22), (26, 23), (27, 24), (28, 25), (29, 26), (30, 27),
    ];
    let mut i = 0;
    while i < PAIRS.len() {
        let (ohi, idx) = PAIRS[i];
        t[ohi as usize] = idx as i8;
        i += 1;
    }
    t
};

/// `FinalIdx` for the 27 Ohi consonants valid as a final, else `None`.
pub fn ohi_final_to_idx(ohi: Ohi) -> Option<u8> {
    let idx = *FINAL_IDX.get(ohi as usize)?;
    if idx < 0 {
        None
    } else {
        Some(idx as u8)
    }
}

/// Ohi consonants that can only ever be an *initial*, never a final
/// (`ㄸ`, `ㅃ`, `ㅉ`). Seeing one of these while the current syllable's
/// final slot is still empty means it cannot possibly be extending the
/// current syllable as a final; it must be starting the next syllable's
/// initial. Load-bearing for the 2-Bulsik branch-2/branch-3 gate; do not
/// "simplify" this to a range check, it is exactly these three values.
pub fn can_follow_as_initial(ohi: Ohi) -> bool {
    matches!(ohi, 8 | 19 | 25)
}

/// Direct-address `[a][b] -> compound` table over the consonant domain
/// (`0..=30`), `0` meaning "no such pair" (a valid compound result is
/// always `> 0`). Shared shape for double initials and double finals,
/// which both pair two consonants.
const fn build_consonant_pair_table(pairs: &[(Ohi, Ohi, Ohi)]) -> [[Ohi; 31]; 31] {
    let mut t = [[0u8; 31]; 31];
    let mut i = 0;
    while i < pairs.len() {
        let (a, b, r) = pairs[i];
        t[a as usize][b as usize] = r;
        i += 1;
    }
    t
}

/// The 5 double initials: pressing the same base consonant twice.
const DOUBLE_INITIAL: [[Ohi; 31]; 31] =
    build_consonant_pair_table(&[(1, 1, 2), (7, 7, 8), (18, 18, 19), (21, 21, 22), (24, 24, 25)]);

pub fn double_initial(a: Ohi, b: Ohi) -> Option<Ohi> {
    match DOUBLE_INITIAL.get(a as usize).and_then(|row| row.get(b as usize)) {
        Some(&r) if r != 0 => Some(r),
        _ => None,
    }
}

/// The 11 double finals, grouped by base consonant `ㄱ`/`ㄴ`/`ㄹ`/`ㅂ`.
const DOUBLE_FINAL: [[Ohi; 31]; 31] = build_consonant_pair_table(&[
    (1, 21, 3),   // ㄱ+ㅅ -> ㄳ
    (4, 24, 5),   // ㄴ+ㅈ -> ㄵ
    (4, 30, 6),   // ㄴ+ㅎ -> ㄶ
    (9, 1, 10),   // ㄹ+ㄱ -> ㄺ
    (9, 17, 11),  // ㄹ+ㅁ -> ㄻ
    (9, 18, 12),  // ㄹ+ㅂ -> ㄼ
    (9, 21, 13),  // ㄹ+ㅅ -> ㄽ
    (9, 28, 14),  // ㄹ+ㅌ -> ㄾ
    (9, 29, 15),  // ㄹ+ㅍ -> ㄿ
    (9, 30, 16),  // ㄹ+ㅎ -> ㅀ
    (18, 21, 20), // ㅂ+ㅅ -> ㅄ
]);

pub fn double_final(a: Ohi, b: Ohi) -> Option<Ohi> {
    match DOUBLE_FINAL.get(a as usize).and_then(|row| row.get(b as usize)) {
        Some(&r) if r != 0 => Some(r),
        _ => None,
    }
}

/// The 7 double medials, grouped by base vowel `ㅗ`/`ㅜ`/`ㅡ`, direct-
/// addressed over the vowel domain (`31..=51`, offset by 31 to keep the
/// table to 21x21 rather than 52x52). `0` means "no such pair".
const DOUBLE_MEDIAL: [[Ohi; 21]; 21] = {
    const PAIRS: [(Ohi, Ohi, Ohi); 7] = [
        (39, 31, 40), // ㅗ+ㅏ -> ㅘ
        (39, 32, 41), // ㅗ+ㅐ -> ㅙ
        (39, 51, 42), // ㅗ+ㅣ -> ㅚ
        (44, 35, 45), // ㅜ+ㅓ -> ㅝ
        (44, 36, 46), // ㅜ+ㅔ -> ㅞ
        (44, 51, 47), // ㅜ+ㅣ -> ㅟ
        (49, 51, 50), // ㅡ+ㅣ -> ㅢ
    ];
    let mut t = [[0u8; 21]; 21];
    let mut i = 0;
    while i < PAIRS.len() {
        let (a, b, r) = PAIRS[i];
        t[(a - 31) as usize][(b - 31) as usize] = r;
        i += 1;
    }
    t
};

pub fn double_medial(a: Ohi, b: Ohi) -> Option<Ohi> {
    if !(31..=51).contains(&a) || !(31..=51).contains(&b) {
        return None;
    }
    match DOUBLE_MEDIAL[(a - 31) as usize][(b - 31) as usize] {
        0 => None,
        r => Some(r),
    }
}

/// Direct-address split table over the consonant domain (`0..=30`):
/// `SPLIT_FINAL_BASE[ohi]`/`SPLIT_FINAL_SECOND[ohi]` are both `0` unless
/// `ohi` is one of the 11 double-final-only compounds, in which case they
/// hold `(base_kept, second_moved)`. Single-letter finals (including
/// self-paired ones like `ㄲ`/`ㅆ`) move to the next syllable's initial
/// whole, they do not split.
const SPLIT_FINAL: ([Ohi; 31], [Ohi; 31]) = {
    const PAIRS: [(Ohi, Ohi, Ohi); 11] = [
        (3, 1, 21), (5, 4, 24), (6, 4, 30), (10, 9, 1), (11, 9, 17), (12, 9, 18), (13, 9, 21),
        (14, 9, 28), (15, 9, 29), (16, 9, 30), (20, 18, 21),
    ];
    let mut base = [0u8; 31];
    let mut second = [0u8; 31];
    let mut i = 0;
    while i < PAIRS.len() {
        let (c, b, s) = PAIRS[i];
        base[c as usize] = b;
        second[c as usize] = s;
        i += 1;
    }
    (base, second)
};

/// Splits a double-final-only compound into `(base_kept, second_moved)`.
/// `None` if `ohi` is not one of those 11.
pub fn split_double_final(ohi: Ohi) -> Option<(Ohi, Ohi)> {
    let (base_table, second_table) = &SPLIT_FINAL;
    match (base_table.get(ohi as usize), second_table.get(ohi as usize)) {
        (Some(&0), _) | (_, Some(&0)) | (None, _) | (_, None) => None,
        (Some(&base), Some(&second)) => Some((base, second)),
    }
}

/// Whether `ohi` is a consonant that is valid in the *initial* position
/// (used when moving a final whole to become the next syllable's initial).
pub fn is_valid_initial_ohi(ohi: Ohi) -> bool {
    ohi_initial_to_idx(ohi).is_some()
}

/// One decoded 2-Bulsik key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token2 {
    Consonant(Ohi),
    Vowel(Ohi),
    Unmapped,
}

/// 26-entry tables (`'a'..='z'` by `key - 'a'`), grounded verbatim on the
/// teacher's `tui/src/main.rs::map_key_to_jamo` 2-Bulsik mock mapping.
/// Built from an explicit per-letter list rather than a positional array
/// literal, so each entry stays legible next to the jamo it represents.
const fn build_2b(entries: &[(u8, Token2); 26]) -> [Token2; 26] {
    let mut table = [Token2::Unmapped; 26];
    let mut i = 0;
    while i < entries.len() {
        let (key, tok) = entries[i];
        table[(key - b'a') as usize] = tok;
        i += 1;
    }
    table
}

pub const LAYOUT_2B_BASE: [Token2; 26] = build_2b(&{
    use Token2::{Consonant as C, Vowel as V};
    [
        (b'r', C(1)),  // ㄱ
        (b's', C(4)),  // ㄴ
        (b'e', C(7)),  // ㄷ
        (b'f', C(9)),  // ㄹ
        (b'a', C(17)), // ㅁ
        (b'q', C(18)), // ㅂ
        (b't', C(21)), // ㅅ
        (b'd', C(23)), // ㅇ
        (b'w', C(24)), // ㅈ
        (b'c', C(26)), // ㅊ
        (b'z', C(27)), // ㅋ
        (b'x', C(28)), // ㅌ
        (b'v', C(29)), // ㅍ
        (b'g', C(30)), // ㅎ
        (b'k', V(31)), // ㅏ
        (b'o', V(32)), // ㅐ
        (b'i', V(33)), // ㅑ
        (b'j', V(35)), // ㅓ
        (b'p', V(36)), // ㅔ
        (b'u', V(37)), // ㅕ
        (b'h', V(39)), // ㅗ
        (b'y', V(43)), // ㅛ
        (b'n', V(44)), // ㅜ
        (b'b', V(48)), // ㅠ
        (b'm', V(49)), // ㅡ
        (b'l', V(51)), // ㅣ
    ]
});

/// Shift only changes the 5 tensable consonants and the 2 `y`-vowels
/// (`ㅐ`→`ㅒ`, `ㅔ`→`ㅖ`); every other key is identical to
/// [`LAYOUT_2B_BASE`].
pub const LAYOUT_2B_SHIFTED: [Token2; 26] = {
    let mut table = LAYOUT_2B_BASE;
    table[(b'r' - b'a') as usize] = Token2::Consonant(2); // ㄲ
    table[(b'e' - b'a') as usize] = Token2::Consonant(8); // ㄸ
    table[(b'q' - b'a') as usize] = Token2::Consonant(19); // ㅃ
    table[(b't' - b'a') as usize] = Token2::Consonant(22); // ㅆ
    table[(b'w' - b'a') as usize] = Token2::Consonant(25); // ㅉ
    table[(b'o' - b'a') as usize] = Token2::Vowel(34); // ㅒ
    table[(b'p' - b'a') as usize] = Token2::Vowel(38); // ㅖ
    table
};

pub fn key2_to_token(key: u8, shift: bool) -> Token2 {
    let lower = key.to_ascii_lowercase();
    if !lower.is_ascii_lowercase() {
        return Token2::Unmapped;
    }
    let table = if shift { &LAYOUT_2B_SHIFTED } else { &LAYOUT_2B_BASE };
    table[(lower - b'a') as usize]
}

/// One decoded 3-Bulsik key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token3 {
    Initial(Ohi),
    Medial(Ohi),
    Final(Ohi),
    Literal(u32),
    Unmapped,
}

/// The raw 94-entry table (ASCII `33..=126`, indexed by `ascii - 33`).
/// Each stored value's *magnitude* selects the token kind on decode,
/// independent of which ASCII key holds it:
///
/// - `93..=122` → initial consonant, `Ohi = value - 92`
/// - `66..=86` → medial vowel, `Ohi = value - 35`
/// - `1..=30` → final consonant, `Ohi = value`
/// - anything else → a literal code point, inserted verbatim
///
/// No 3-Bulsik reference survives in this corpus (the original was Zig and
/// was filtered out of retrieval before it reached this crate), so the
/// specific ASCII key chosen for each Ohi value below is an original,
/// internally-consistent assignment rather than a transcription of a real
/// Sebeolsik keyboard: initials on `a..=s`, medials on `A..=U`, finals
/// spread across the digit row, a handful of symbols, and `t..=z`, and the
/// untouched punctuation/symbol keys as literals. See DESIGN.md Open
/// Question 4.
const TABLE_3BULSIK: [i16; 94] = build_3b();

const fn idx(ascii: u8) -> usize {
    (ascii - 33) as usize
}

const fn build_3b() -> [i16; 94] {
    let mut t = [0i16; 94];
    // Literal: default every slot to its own ASCII code, fixed up below
    // wherever that would collide with an active decode range.
    let mut b = 33u8;
    while b <= 126 {
        t[idx(b)] = b as i16;
        b += 1;
    }

    // Initials: Ohi 1..=30 valid-initial subset -> value = ohi + 92, on a..=s.
    const INITIALS: [(u8, u8); 19] = [
        (b'a', 1), (b'b', 2), (b'c', 4), (b'd', 7), (b'e', 8), (b'f', 9), (b'g', 17), (b'h', 18),
        (b'i', 19), (b'j', 21), (b'k', 22), (b'l', 23), (b'm', 24), (b'n', 25), (b'o', 26),
        (b'p', 27), (b'q', 28), (b'r', 29), (b's', 30),
    ];
    let mut i = 0;
    while i < INITIALS.len() {
        let (key, ohi) = INITIALS[i];
        t[idx(key)] = ohi as i16 + 92;
        i += 1;
    }

    // Medials: Ohi 31..=51 -> value = ohi + 35, on A..=U.
    const MEDIALS: [(u8, u8); 21] = [
        (b'A', 31), (b'B', 32), (b'C', 33), (b'D', 34), (b'E', 35), (b'F', 36), (b'G', 37),
        (b'H', 38), (b'I', 39), (b'J', 40), (b'K', 41), (b'L', 42), (b'M', 43), (b'N', 44),
        (b'O', 45), (b'P', 46), (b'Q', 47), (b'R', 48), (b'S', 49), (b'T', 50), (b'U', 51),
    ];
    let mut i = 0;
    while i < MEDIALS.len() {
        let (key, ohi) = MEDIALS[i];
        t[idx(key)] = ohi as i16 + 35;
        i += 1;
    }

    // Finals: Ohi valid-final subset -> value = ohi directly.
    const FINALS: [(u8, u8); 27] = [
        (b't', 1), (b'u', 4), (b'v', 9), (b'w', 17), (b'x', 18), (b'y', 21), (b'z', 23),
        (b'1', 2), (b'2', 3), (b'3', 5), (b'4', 6), (b'5', 7), (b'6', 10), (b'7', 11), (b'8', 12),
        (b'9', 13), (b'0', 14), (b'-', 15), (b'=', 16), (b'[', 20), (b']', 22), (b';', 24),
        (b'\'', 26), (b'`', 27), (b'{', 28), (b'}', 29), (b'~', 30),
    ];
    let mut i = 0;
    while i < FINALS.len() {
        let (key, ohi) = FINALS[i];
        t[idx(key)] = ohi as i16;
        i += 1;
    }

    // Two literal slots whose own ASCII value (94, 95) falls inside the
    // initial-decode range (93..=122) purely by coincidence of where '^'
    // and '_' sit in ASCII; remap them to full-width variants, a real
    // convention some Korean layouts use for punctuation under load.
    t[idx(b'^')] = 0xFF3E;
    t[idx(b'_')] = 0xFF3F;

    // V..=Z carry no initial/medial/final assignment above; give them
    // distinct literal Korean bracket punctuation instead of raw ASCII.
    t[idx(b'V')] = 0x00B7; // ·
    t[idx(b'W')] = 0x300C; // 「
    t[idx(b'X')] = 0x300D; // 」
    t[idx(b'Y')] = 0x300E; // 『
    t[idx(b'Z')] = 0x300F; // 』

    t
}

pub fn key3_to_token(ascii: u8) -> Token3 {
    if !(33..=126).contains(&ascii) {
        return Token3::Unmapped;
    }
    let value = TABLE_3BULSIK[idx(ascii)];
    if (93..=122).contains(&value) {
        Token3::Initial((value - 92) as Ohi)
    } else if (66..=86).contains(&value) {
        Token3::Medial((value - 35) as Ohi)
    } else if (1..=30).contains(&value) {
        Token3::Final(value as Ohi)
    } else {
        Token3::Literal(value as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_follow_as_initial_is_exactly_the_spec_set() {
        assert!(can_follow_as_initial(8));
        assert!(can_follow_as_initial(19));
        assert!(can_follow_as_initial(25));
        assert!(!can_follow_as_initial(1));
        assert!(!can_follow_as_initial(21));
        assert!(!can_follow_as_initial(30));
    }

    #[test]
    fn ohi_index_roundtrips_through_codec_tables() {
        for ohi in 1..=30u8 {
            if let Some(idx) = ohi_initial_to_idx(ohi) {
                assert!((0..19).contains(&idx));
            }
        }
        for ohi in 1..=30u8 {
            if let Some(idx) = ohi_final_to_idx(ohi) {
                assert!((1..28).contains(&idx));
            }
        }
        for ohi in 31..=51u8 {
            assert_eq!(ohi_medial_to_idx(ohi), Some(ohi - 31));
        }
    }

    #[test]
    fn double_final_split_table_covers_exactly_the_non_initial_finals() {
        for ohi in 1..=30u8 {
            let is_final = ohi_final_to_idx(ohi).is_some();
            let is_initial = is_valid_initial_ohi(ohi);
            let splits = split_double_final(ohi).is_some();
            if is_final && !is_initial {
                assert!(splits, "ohi {ohi} should split");
            }
            if splits {
                assert!(is_final && !is_initial);
            }
        }
    }

    #[test]
    fn layout_2b_matches_known_jamo() {
        assert_eq!(key2_to_token(b'r', false), Token2::Consonant(1));
        assert_eq!(key2_to_token(b'R', false), Token2::Consonant(1)); // case-insensitive key id
        assert_eq!(key2_to_token(b'r', true), Token2::Consonant(2));
        assert_eq!(key2_to_token(b'k', false), Token2::Vowel(31));
        assert_eq!(key2_to_token(b'1', false), Token2::Unmapped);
    }

    #[test]
    fn layout_3b_decodes_initial_medial_final_and_literal() {
        assert_eq!(key3_to_token(b'a'), Token3::Initial(1));
        assert_eq!(key3_to_token(b'A'), Token3::Medial(31));
        assert_eq!(key3_to_token(b't'), Token3::Final(1));
        assert_eq!(key3_to_token(b'!'), Token3::Literal('!' as u32));
    }
}
