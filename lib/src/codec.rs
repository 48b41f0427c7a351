//! Precomposed Hangul syllable codec.
//!
//! Composition is the direct arithmetic identity over the Unicode Hangul
//! Syllables block:
//!
//! ```text
//! syllable = 0xAC00 + (initial_idx * 21 * 28) + (medial_idx * 28) + final_idx
//! ```
//!
//! Every jamo this module produces or accepts is a Hangul Compatibility
//! Jamo code point (`U+3131`..=`U+3163`), never a modern conjoining jamo
//! (`U+1100` range); hosts never see the conjoining block.

use crate::error::CoreError;
use log::warn;

pub const SYLLABLE_BASE: u32 = 0xAC00;
pub const SYLLABLE_LAST: u32 = 0xD7A3;
const MEDIAL_COUNT: u32 = 21;
const FINAL_COUNT: u32 = 28;

const JAMO_FIRST: u32 = 0x3131;
const JAMO_LAST: u32 = 0x3163;
const CONSONANT_LAST: u32 = 0x314E;
const VOWEL_FIRST: u32 = 0x314F;

/// The 19 initial consonants, in composition order (`InitialIdx` 0..=18).
const INITIALS: [char; 19] = [
    'ㄱ', 'ㄲ', 'ㄴ', 'ㄷ', 'ㄸ', 'ㄹ', 'ㅁ', 'ㅂ', 'ㅃ', 'ㅅ', 'ㅆ', 'ㅇ', 'ㅈ', 'ㅉ', 'ㅊ', 'ㅋ',
    'ㅌ', 'ㅍ', 'ㅎ',
];

/// The 21 medial vowels, in composition order (`MedialIdx` 0..=20).
const MEDIALS: [char; 21] = [
    'ㅏ', 'ㅐ', 'ㅑ', 'ㅒ', 'ㅓ', 'ㅔ', 'ㅕ', 'ㅖ', 'ㅗ', 'ㅘ', 'ㅙ', 'ㅚ', 'ㅛ', 'ㅜ', 'ㅝ', 'ㅞ',
    'ㅟ', 'ㅠ', 'ㅡ', 'ㅢ', 'ㅣ',
];

/// The 28 final consonants, in composition order (`FinalIdx` 0..=27).
/// Index 0 is "no final" and is never dereferenced as a char.
const FINALS: [char; 28] = [
    '\0', 'ㄱ', 'ㄲ', 'ㄳ', 'ㄴ', 'ㄵ', 'ㄶ', 'ㄷ', 'ㄹ', 'ㄺ', 'ㄻ', 'ㄼ', 'ㄽ', 'ㄾ', 'ㄿ', 'ㅀ',
    'ㅁ', 'ㅂ', 'ㅄ', 'ㅅ', 'ㅆ', 'ㅇ', 'ㅈ', 'ㅊ', 'ㅋ', 'ㅌ', 'ㅍ', 'ㅎ',
];

/// `pub(crate)` reverse-lookup tables over the 51-slot compatibility jamo
/// range (`U+3131..=U+3163`), direct-addressed by `cp - JAMO_FIRST`. `-1`
/// marks "not valid in this position". Built once here rather than at
/// startup: the domain is 51 entries, small enough to hand-transcribe from
/// `INITIALS`/`MEDIALS`/`FINALS` above and verify by inspection.
pub(crate) const REVERSE_INITIAL: [i8; 51] = [
    0, 1, -1, 2, -1, -1, 3, 4, 5, -1, -1, -1, -1, -1, -1, -1, 6, 7, 8, -1, 9, 10, 11, 12, 13, 14,
    15, 16, 17, 18, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    -1, -1,
];

pub(crate) const REVERSE_MEDIAL: [i8; 51] = [
    -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    -1, -1, -1, -1, -1, -1, -1, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18,
    19, 20,
];

pub(crate) const REVERSE_FINAL: [i8; 51] = [
    1, 2, 3, 4, 5, 6, 7, -1, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, -1, 18, 19, 20, 21, 22, -1, 23,
    24, 25, 26, 27, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1,
    -1, -1,
];

fn reverse_lookup(table: &[i8; 51], cp: u32) -> Option<u32> {
    if !(JAMO_FIRST..=JAMO_LAST).contains(&cp) {
        return None;
    }
    let idx = table[(cp - JAMO_FIRST) as usize];
    if idx < 0 {
        None
    } else {
        Some(idx as u32)
    }
}

/// A decomposed syllable. `final_` is `0` when the syllable has no final
/// consonant, mirroring the sentinel the codec also accepts on `compose`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decomposed {
    pub initial: u32,
    pub medial: u32,
    pub final_: u32,
}

pub fn is_syllable(cp: u32) -> bool {
    (SYLLABLE_BASE..=SYLLABLE_LAST).contains(&cp)
}

pub fn is_jamo(cp: u32) -> bool {
    (JAMO_FIRST..=JAMO_LAST).contains(&cp)
}

pub fn is_consonant(cp: u32) -> bool {
    (JAMO_FIRST..=CONSONANT_LAST).contains(&cp)
}

pub fn is_vowel(cp: u32) -> bool {
    (VOWEL_FIRST..=JAMO_LAST).contains(&cp)
}

pub fn is_double_consonant(cp: u32) -> bool {
    matches!(char::from_u32(cp), Some('ㄲ' | 'ㄸ' | 'ㅃ' | 'ㅆ' | 'ㅉ'))
}

pub fn is_double_vowel(cp: u32) -> bool {
    matches!(
        char::from_u32(cp),
        Some('ㅘ' | 'ㅙ' | 'ㅚ' | 'ㅝ' | 'ㅞ' | 'ㅟ' | 'ㅢ')
    )
}

/// Decomposes a precomposed syllable into its compatibility-jamo parts.
/// Returns `None` if `cp` is not a precomposed syllable.
pub fn decompose(cp: u32) -> Option<Decomposed> {
    if !is_syllable(cp) {
        return None;
    }
    let offset = cp - SYLLABLE_BASE;
    let initial_idx = offset / (MEDIAL_COUNT * FINAL_COUNT);
    let rem = offset % (MEDIAL_COUNT * FINAL_COUNT);
    let medial_idx = rem / FINAL_COUNT;
    let final_idx = rem % FINAL_COUNT;
    Some(Decomposed {
        initial: INITIALS[initial_idx as usize] as u32,
        medial: MEDIALS[medial_idx as usize] as u32,
        final_: if final_idx == 0 {
            0
        } else {
            FINALS[final_idx as usize] as u32
        },
    })
}

pub fn decompose_checked(cp: u32) -> Result<Decomposed, CoreError> {
    decompose(cp).ok_or(CoreError::NotAHangulSyllable(cp))
}

/// Composes a syllable from compatibility-jamo code points. `final_cp = 0`
/// means "no final". Returns `None` if any part is not a valid jamo in its
/// position (including an initial/medial that is itself a valid jamo but
/// the wrong kind, e.g. passing a vowel where an initial is expected).
pub fn compose(initial_cp: u32, medial_cp: u32, final_cp: u32) -> Option<u32> {
    let i = reverse_lookup(&REVERSE_INITIAL, initial_cp)?;
    let m = reverse_lookup(&REVERSE_MEDIAL, medial_cp)?;
    let f = if final_cp == 0 {
        0
    } else {
        reverse_lookup(&REVERSE_FINAL, final_cp)?
    };
    Some(SYLLABLE_BASE + (i * MEDIAL_COUNT * FINAL_COUNT) + (m * FINAL_COUNT) + f)
}

pub fn compose_checked(initial_cp: u32, medial_cp: u32, final_cp: u32) -> Result<u32, CoreError> {
    compose(initial_cp, medial_cp, final_cp).ok_or(CoreError::InvalidJamoForComposition {
        initial: initial_cp,
        medial: medial_cp,
        final_: final_cp,
    })
}

pub fn has_final(cp: u32) -> bool {
    decompose(cp).is_some_and(|d| d.final_ != 0)
}

pub fn get_initial(cp: u32) -> Option<u32> {
    decompose(cp).map(|d| d.initial)
}

pub fn get_medial(cp: u32) -> Option<u32> {
    decompose(cp).map(|d| d.medial)
}

pub fn get_final(cp: u32) -> Option<u32> {
    decompose(cp).map(|d| d.final_)
}

/// One decoded UTF-8 code point. `len == 0` signals a decode failure
/// (premature end of input or a structurally invalid byte sequence); the
/// caller advances by at least one byte to resynchronize on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Utf8Char {
    pub cp: u32,
    pub len: usize,
}

/// Strict structural UTF-8 decode of one code point starting at `start`,
/// reading no more than `max_len` bytes. Does not reject overlong encodings
/// or surrogate code points beyond what the byte-pattern structure itself
/// rules out; this is a fast structural decoder, not a validator.
pub fn decode_utf8_char(bytes: &[u8], start: usize, max_len: usize) -> Utf8Char {
    let end = bytes.len().min(start.saturating_add(max_len));
    if start >= end {
        return Utf8Char { cp: 0, len: 0 };
    }
    let b0 = bytes[start];
    let (len, lead_bits) = if b0 & 0x80 == 0 {
        (1usize, b0 as u32)
    } else if b0 & 0xE0 == 0xC0 {
        (2, (b0 & 0x1F) as u32)
    } else if b0 & 0xF0 == 0xE0 {
        (3, (b0 & 0x0F) as u32)
    } else if b0 & 0xF8 == 0xF0 {
        (4, (b0 & 0x07) as u32)
    } else {
        warn!("utf8 decode: byte {b0:#04x} at offset {start} is not a valid lead byte");
        return Utf8Char { cp: 0, len: 0 };
    };
    if start + len > end {
        warn!("utf8 decode: {len}-byte sequence at offset {start} runs past the input");
        return Utf8Char { cp: 0, len: 0 };
    }
    let mut cp = lead_bits;
    for b in &bytes[start + 1..start + len] {
        if b & 0xC0 != 0x80 {
            warn!("utf8 decode: bad continuation byte {b:#04x} at offset {start}");
            return Utf8Char { cp: 0, len: 0 };
        }
        cp = (cp << 6) | (b & 0x3F) as u32;
    }
    Utf8Char { cp, len }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decompose_han() {
        let d = decompose('한' as u32).unwrap();
        assert_eq!(char::from_u32(d.initial), Some('ㅎ'));
        assert_eq!(char::from_u32(d.medial), Some('ㅏ'));
        assert_eq!(char::from_u32(d.final_), Some('ㄴ'));
    }

    #[test]
    fn compose_han() {
        let cp = compose('ㅎ' as u32, 'ㅏ' as u32, 'ㄴ' as u32).unwrap();
        assert_eq!(char::from_u32(cp), Some('한'));
    }

    #[test]
    fn compose_without_final() {
        let cp = compose('ㄱ' as u32, 'ㅡ' as u32, 0).unwrap();
        assert_eq!(char::from_u32(cp), Some('그'));
    }

    #[test]
    fn roundtrip_every_syllable() {
        for cp in SYLLABLE_BASE..=SYLLABLE_LAST {
            let d = decompose(cp).unwrap();
            let back = compose(d.initial, d.medial, d.final_).unwrap();
            assert_eq!(back, cp);
        }
    }

    #[test]
    fn rejects_non_syllable() {
        assert!(decompose('a' as u32).is_none());
        assert!(decompose(0x1100).is_none());
    }

    #[test]
    fn rejects_invalid_composition() {
        // vowel where an initial is expected
        assert!(compose('ㅏ' as u32, 'ㅏ' as u32, 0).is_none());
        // ㄸ/ㅃ/ㅉ are not valid finals
        assert!(compose('ㄱ' as u32, 'ㅏ' as u32, 'ㄸ' as u32).is_none());
    }

    #[test]
    fn utf8_decode_ascii_and_multibyte() {
        let d = decode_utf8_char(b"a", 0, 4);
        assert_eq!(d, Utf8Char { cp: 'a' as u32, len: 1 });

        let bytes = "한".as_bytes();
        let d = decode_utf8_char(bytes, 0, 4);
        assert_eq!(d.cp, '한' as u32);
        assert_eq!(d.len, 3);
    }

    #[test]
    fn utf8_decode_truncated_is_zero_len() {
        let bytes = "한".as_bytes();
        let d = decode_utf8_char(&bytes[..2], 0, 4);
        assert_eq!(d, Utf8Char { cp: 0, len: 0 });
    }

    #[test]
    fn utf8_decode_bad_continuation_is_zero_len() {
        let bytes = [0xE0u8, 0x41, 0x42];
        let d = decode_utf8_char(&bytes, 0, 4);
        assert_eq!(d, Utf8Char { cp: 0, len: 0 });
    }
}
