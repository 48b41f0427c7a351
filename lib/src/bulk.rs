//! Whole-string transforms built on top of [`crate::codec`]: explode every
//! syllable in a byte stream down to its jamo, or greedily re-compose a
//! jamo stream back into syllables.

use crate::codec::{self, Utf8Char};

/// Decodes `bytes` as UTF-8 and decomposes every precomposed syllable into
/// its jamo code points; anything else passes through unchanged. Stops at
/// the first malformed byte rather than skipping over it, mirroring
/// [`codec::decode_utf8_char`]'s failure contract.
pub fn decompose_string(bytes: &[u8]) -> Vec<u32> {
    let mut out = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        let Utf8Char { cp, len } = codec::decode_utf8_char(bytes, pos, 4);
        if len == 0 {
            break;
        }
        if codec::is_syllable(cp) {
            let d = codec::decompose(cp).expect("is_syllable implies decompose succeeds");
            out.push(d.initial);
            out.push(d.medial);
            if d.final_ != 0 {
                out.push(d.final_);
            }
        } else {
            out.push(cp);
        }
        pos += len;
    }
    out
}

/// Greedily re-composes a stream of code points: a consonant immediately
/// followed by a vowel combine, and swallow one more trailing consonant as
/// a final only if *that* consonant isn't itself followed by another
/// vowel (which would mean it belongs to the next syllable's initial
/// instead). This one-token lookahead is a documented, intentionally
/// lossy inverse of [`decompose_string`]; genuinely ambiguous triples
/// (e.g. which syllable a lone final belongs to) are not disambiguated
/// any further than this.
pub fn compose_string(cps: &[u32]) -> Vec<u32> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < cps.len() {
        let c = cps[i];
        if codec::is_consonant(c) && i + 1 < cps.len() && codec::is_vowel(cps[i + 1]) {
            let initial = c;
            let medial = cps[i + 1];
            let next_is_final = i + 2 < cps.len()
                && codec::is_consonant(cps[i + 2])
                && !(i + 3 < cps.len() && codec::is_vowel(cps[i + 3]));
            if next_is_final {
                let final_ = cps[i + 2];
                match codec::compose(initial, medial, final_) {
                    Some(s) => {
                        out.push(s);
                        i += 3;
                        continue;
                    }
                    None => {
                        out.push(c);
                        i += 1;
                        continue;
                    }
                }
            }
            match codec::compose(initial, medial, 0) {
                Some(s) => {
                    out.push(s);
                    i += 2;
                }
                None => {
                    out.push(c);
                    i += 1;
                }
            }
        } else {
            out.push(c);
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_utf8(cps: &[u32]) -> String {
        cps.iter().filter_map(|&cp| char::from_u32(cp)).collect()
    }

    #[test]
    fn decompose_then_compose_roundtrips_han() {
        let decomposed = decompose_string("한글".as_bytes());
        let composed = compose_string(&decomposed);
        assert_eq!(to_utf8(&composed), "한글");
    }

    #[test]
    fn decompose_passes_non_hangul_through() {
        let decomposed = decompose_string("a한b".as_bytes());
        assert_eq!(to_utf8(&decomposed), "a\u{314E}\u{314F}\u{3134}b");
    }

    #[test]
    fn compose_handles_jamo_stream_from_spec_scenario() {
        // ㅎ ㅏ ㄴ ㄱ ㅡ ㄹ -> 한 글
        let cps: Vec<u32> = ['ㅎ', 'ㅏ', 'ㄴ', 'ㄱ', 'ㅡ', 'ㄹ'].iter().map(|&c| c as u32).collect();
        assert_eq!(to_utf8(&compose_string(&cps)), "한글");
    }
}
