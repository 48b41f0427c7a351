//! C-ABI surface: every exported function takes/returns plain integers and
//! byte offsets into the arena's linear-memory region rather than Rust
//! references, so the crate can be linked into a host with no shared type
//! system (a WASM guest, a C caller, …). Single-threaded cooperative
//! scheduling only: state lives in `thread_local!`s, not behind a `Mutex`.

use std::cell::RefCell;

use crate::arena::Arena;
use crate::codec;
use crate::ime::{Action, Action3, ImeState, Key3Result, KeyResult};

thread_local! {
    static ARENA: RefCell<Arena> = RefCell::new(Arena::default());
    static SESSIONS: RefCell<Vec<Option<ImeState>>> = const { RefCell::new(Vec::new()) };
}

const INVALID_HANDLE: u32 = u32::MAX;
/// spec.md §6: `alloc` "returns a non-zero offset or `0` on failure" — the
/// arena itself guarantees offset `0` is never a live allocation, so this
/// is just that same sentinel, not a distinct FFI-layer concept.
const ALLOC_FAILED: u32 = 0;

fn write_u32_le(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

// ---- memory ----------------------------------------------------------

#[no_mangle]
pub extern "C" fn arena_alloc(size: u32) -> u32 {
    ARENA.with(|a| a.borrow_mut().alloc(size as usize).unwrap_or(ALLOC_FAILED))
}

/// `size` is accepted to mirror spec.md §6's `free(ptr, size)` signature
/// but unused: a bump allocator has nothing to do with an individual
/// block's extent, only with how many outstanding blocks remain (see
/// `arena::Arena::free`).
#[no_mangle]
pub extern "C" fn arena_free(_offset: u32, _size: u32) {
    ARENA.with(|a| a.borrow_mut().free());
}

#[no_mangle]
pub extern "C" fn arena_reset() {
    ARENA.with(|a| a.borrow_mut().reset());
}

#[no_mangle]
pub extern "C" fn arena_used() -> u32 {
    ARENA.with(|a| a.borrow().used() as u32)
}

#[no_mangle]
pub extern "C" fn arena_count_active() -> u32 {
    ARENA.with(|a| a.borrow().count_active() as u32)
}

#[no_mangle]
pub extern "C" fn arena_high_water_mark() -> u32 {
    ARENA.with(|a| a.borrow().high_water_mark() as u32)
}

// ---- codec -------------------------------------------------------------

#[no_mangle]
pub extern "C" fn codec_is_syllable(cp: u32) -> u32 {
    codec::is_syllable(cp) as u32
}

#[no_mangle]
pub extern "C" fn codec_is_jamo(cp: u32) -> u32 {
    codec::is_jamo(cp) as u32
}

#[no_mangle]
pub extern "C" fn codec_is_consonant(cp: u32) -> u32 {
    codec::is_consonant(cp) as u32
}

#[no_mangle]
pub extern "C" fn codec_is_vowel(cp: u32) -> u32 {
    codec::is_vowel(cp) as u32
}

#[no_mangle]
pub extern "C" fn codec_is_double_consonant(cp: u32) -> u32 {
    codec::is_double_consonant(cp) as u32
}

#[no_mangle]
pub extern "C" fn codec_is_double_vowel(cp: u32) -> u32 {
    codec::is_double_vowel(cp) as u32
}

#[no_mangle]
pub extern "C" fn codec_has_final(cp: u32) -> u32 {
    codec::has_final(cp) as u32
}

#[no_mangle]
pub extern "C" fn codec_compose(initial: u32, medial: u32, final_: u32) -> u32 {
    codec::compose(initial, medial, final_).unwrap_or(0)
}

#[no_mangle]
pub extern "C" fn codec_get_initial(cp: u32) -> u32 {
    codec::get_initial(cp).unwrap_or(0)
}

#[no_mangle]
pub extern "C" fn codec_get_medial(cp: u32) -> u32 {
    codec::get_medial(cp).unwrap_or(0)
}

#[no_mangle]
pub extern "C" fn codec_get_final(cp: u32) -> u32 {
    codec::get_final(cp).unwrap_or(0)
}

/// Writes `[initial, medial, final_]` as three little-endian `u32`s at
/// `out_offset` in the arena. Returns `1` on success, `0` if `cp` is not a
/// precomposed syllable or `out_offset + 12` would run past the arena.
#[no_mangle]
pub extern "C" fn codec_decompose(cp: u32, out_offset: u32) -> u32 {
    let Some(d) = codec::decompose(cp) else { return 0 };
    ARENA.with(|a| {
        let mut a = a.borrow_mut();
        let buf = a.bytes_mut();
        let off = out_offset as usize;
        if off + 12 > buf.len() {
            return 0;
        }
        write_u32_le(buf, off, d.initial);
        write_u32_le(buf, off + 4, d.medial);
        write_u32_le(buf, off + 8, d.final_);
        1
    })
}

/// Identical to `codec_decompose`, but rejects up front if the caller's
/// buffer (`out_cap_u32` `u32`-sized slots) is too small to hold the three
/// outputs, rather than relying on the caller to have sized it correctly.
#[no_mangle]
pub extern "C" fn codec_decompose_safe(cp: u32, out_offset: u32, out_cap_u32: u32) -> u32 {
    if out_cap_u32 < 3 {
        return 0;
    }
    codec_decompose(cp, out_offset)
}

/// Decomposes every Hangul syllable in the arena bytes `in_offset..in_offset
/// + in_len` into compatibility jamo (UTF-8-decoded first, per
/// `bulk::decompose_string`), writing the resulting code points as
/// little-endian `u32`s starting at `out_offset`. Returns how many `u32`s
/// were written. Stops writing (without panicking) if `out_offset` would
/// run past the arena before all output is written; the host is expected
/// to size its output buffer generously, as spec.md's interface carries no
/// output-capacity parameter for this call.
#[no_mangle]
pub extern "C" fn codec_decompose_string(in_offset: u32, in_len: u32, out_offset: u32) -> u32 {
    ARENA.with(|a| {
        let mut a = a.borrow_mut();
        let in_start = in_offset as usize;
        let in_end = in_start.saturating_add(in_len as usize).min(a.bytes().len());
        if in_start >= in_end {
            return 0;
        }
        let decomposed = crate::bulk::decompose_string(&a.bytes()[in_start..in_end]);
        let buf = a.bytes_mut();
        let mut written = 0u32;
        for (i, cp) in decomposed.iter().enumerate() {
            let off = out_offset as usize + i * 4;
            if off + 4 > buf.len() {
                break;
            }
            write_u32_le(buf, off, *cp);
            written += 1;
        }
        written
    })
}

/// Greedily recomposes `in_len_u32` little-endian `u32` code points read
/// from `in_offset_u32` (see `bulk::compose_string`), writing the result
/// at `out_offset_u32`. Returns how many `u32`s were written, subject to
/// the same no-panic truncation behavior as `codec_decompose_string`.
#[no_mangle]
pub extern "C" fn codec_compose_string(in_offset_u32: u32, in_len_u32: u32, out_offset_u32: u32) -> u32 {
    ARENA.with(|a| {
        let mut a = a.borrow_mut();
        let in_start = in_offset_u32 as usize;
        let bytes_needed = (in_len_u32 as usize).saturating_mul(4);
        let in_end = in_start.saturating_add(bytes_needed).min(a.bytes().len());
        if in_start >= in_end || (in_end - in_start) % 4 != 0 {
            return 0;
        }
        let cps: Vec<u32> = a.bytes()[in_start..in_end]
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        let composed = crate::bulk::compose_string(&cps);
        let buf = a.bytes_mut();
        let mut written = 0u32;
        for (i, cp) in composed.iter().enumerate() {
            let off = out_offset_u32 as usize + i * 4;
            if off + 4 > buf.len() {
                break;
            }
            write_u32_le(buf, off, *cp);
            written += 1;
        }
        written
    })
}

/// Decodes one UTF-8 code point from the arena's own backing bytes
/// (`start..start+max_len`) and writes `[cp, len]` at `out_offset`.
#[no_mangle]
pub extern "C" fn codec_decode_utf8_char(start: u32, max_len: u32, out_offset: u32) -> u32 {
    ARENA.with(|a| {
        let mut a = a.borrow_mut();
        let buf = a.bytes_mut();
        let decoded = codec::decode_utf8_char(buf, start as usize, max_len as usize);
        let off = out_offset as usize;
        if off + 8 > buf.len() {
            return 0;
        }
        write_u32_le(buf, off, decoded.cp);
        write_u32_le(buf, off + 4, decoded.len as u32);
        1
    })
}

// ---- ime -----------------------------------------------------------------

#[no_mangle]
pub extern "C" fn ime_create() -> u32 {
    SESSIONS.with(|s| {
        let mut s = s.borrow_mut();
        s.push(Some(ImeState::new()));
        (s.len() - 1) as u32
    })
}

#[no_mangle]
pub extern "C" fn ime_destroy(handle: u32) {
    SESSIONS.with(|s| {
        let mut s = s.borrow_mut();
        if let Some(slot) = s.get_mut(handle as usize) {
            *slot = None;
        }
    });
}

fn with_session<F: FnOnce(&mut ImeState) -> u32>(handle: u32, f: F) -> u32 {
    SESSIONS.with(|s| {
        let mut s = s.borrow_mut();
        match s.get_mut(handle as usize) {
            Some(Some(state)) => f(state),
            _ => INVALID_HANDLE,
        }
    })
}

#[no_mangle]
pub extern "C" fn ime_reset(handle: u32) -> u32 {
    with_session(handle, |state| {
        state.reset();
        0
    })
}

#[no_mangle]
pub extern "C" fn ime_commit(handle: u32) -> u32 {
    with_session(handle, |state| state.commit())
}

#[no_mangle]
pub extern "C" fn ime_backspace(handle: u32) -> u32 {
    with_session(handle, |state| state.backspace().unwrap_or(0))
}

fn action_code(action: Action) -> u32 {
    match action {
        Action::NoChange => 0,
        Action::Replace => 1,
        Action::EmitAndNew => 2,
    }
}

fn action3_code(action: Action3) -> u32 {
    match action {
        Action3::NoChange => 0,
        Action3::Replace => 1,
        Action3::EmitAndNew => 2,
        Action3::Literal => 3,
    }
}

/// spec.md §6's literal 2-Bulsik entry point: the host has already
/// resolved a physical key to an Ohi index (e.g. via its own copy of the
/// §4.3 layout tables, or via `ime_process_key_2bulsik` below) and hands it
/// over directly. Writes `[action, prev_cp, current_cp]` at `out_offset`
/// and returns whether the handle was valid; `ohi_index <= 0` or outside
/// `1..=51` is treated as an unmapped key (`Action::NoChange`), not a
/// handle failure.
#[no_mangle]
pub extern "C" fn ime_process_key(handle: u32, ohi_index: i8, out_offset: u32) -> u32 {
    let token = match u8::try_from(ohi_index) {
        Ok(ohi @ 1..=30) => crate::layout::Token2::Consonant(ohi),
        Ok(ohi @ 31..=51) => crate::layout::Token2::Vowel(ohi),
        _ => crate::layout::Token2::Unmapped,
    };
    let result: Option<KeyResult> = SESSIONS.with(|s| {
        let mut s = s.borrow_mut();
        match s.get_mut(handle as usize) {
            Some(Some(state)) => Some(state.process_key_2bulsik(token)),
            _ => None,
        }
    });
    let Some(result) = result else { return 0 };
    ARENA.with(|a| {
        let mut a = a.borrow_mut();
        let buf = a.bytes_mut();
        let off = out_offset as usize;
        if off + 12 <= buf.len() {
            write_u32_le(buf, off, action_code(result.action));
            write_u32_le(buf, off + 4, result.prev_cp);
            write_u32_le(buf, off + 8, result.current_cp);
        }
    });
    1
}

/// spec.md §6's literal 3-Bulsik entry point: unlike `ime_process_key`
/// above, the host passes a raw ASCII key and this function does the §4.3
/// layout mapping itself (3-Bulsik's physical-key table is part of the
/// core, not duplicated host-side). Writes `[action, prev_cp, current_cp,
/// literal_cp]` at `out_offset` and returns whether the handle was valid.
#[no_mangle]
pub extern "C" fn ime_process_key3(handle: u32, ascii: u8, out_offset: u32) -> u32 {
    let token = crate::layout::key3_to_token(ascii);
    let result: Option<Key3Result> = SESSIONS.with(|s| {
        let mut s = s.borrow_mut();
        match s.get_mut(handle as usize) {
            Some(Some(state)) => Some(state.process_key_3bulsik(token)),
            _ => None,
        }
    });
    let Some(result) = result else { return 0 };
    ARENA.with(|a| {
        let mut a = a.borrow_mut();
        let buf = a.bytes_mut();
        let off = out_offset as usize;
        if off + 16 <= buf.len() {
            write_u32_le(buf, off, action3_code(result.action));
            write_u32_le(buf, off + 4, result.prev_cp);
            write_u32_le(buf, off + 8, result.current_cp);
            write_u32_le(buf, off + 12, result.literal_cp);
        }
    });
    1
}

/// Writes the six raw state bytes (`initial, initial_flag, medial,
/// medial_flag, final, final_flag`) at `out_offset`. A no-op (writes
/// nothing) for an invalid handle or a too-small buffer.
#[no_mangle]
pub extern "C" fn ime_get_state(handle: u32, out_offset: u32) {
    SESSIONS.with(|s| {
        let mut s = s.borrow_mut();
        let Some(Some(state)) = s.get_mut(handle as usize) else { return };
        let raw = state.raw_state();
        ARENA.with(|a| {
            let mut a = a.borrow_mut();
            let buf = a.bytes_mut();
            let off = out_offset as usize;
            if off + 6 <= buf.len() {
                buf[off..off + 6].copy_from_slice(&raw);
            }
        });
    });
}

/// Advances a 2-Bulsik session by one ASCII key (`shift != 0` for the
/// shifted table). This is a convenience beyond spec.md §6's literal
/// `ime_process_key` (which expects the host to already hold an Ohi
/// index): it additionally performs the §4.3 2-Bulsik ASCII mapping, for
/// hosts that would rather hand over a raw key than duplicate the layout
/// table. Writes `[prev_cp, current_cp]` at `out_offset` and returns the
/// action code (`0` NoChange, `1` Replace, `2` EmitAndNew), or `u32::MAX`
/// for an invalid handle.
#[no_mangle]
pub extern "C" fn ime_process_key_2bulsik(handle: u32, key: u32, shift: u32, out_offset: u32) -> u32 {
    let Ok(key_byte) = u8::try_from(key) else { return INVALID_HANDLE };
    let token = crate::layout::key2_to_token(key_byte, shift != 0);
    let result: Option<KeyResult> = SESSIONS.with(|s| {
        let mut s = s.borrow_mut();
        match s.get_mut(handle as usize) {
            Some(Some(state)) => Some(state.process_key_2bulsik(token)),
            _ => None,
        }
    });
    let Some(result) = result else { return INVALID_HANDLE };
    ARENA.with(|a| {
        let mut a = a.borrow_mut();
        let buf = a.bytes_mut();
        let off = out_offset as usize;
        if off + 8 <= buf.len() {
            write_u32_le(buf, off, result.prev_cp);
            write_u32_le(buf, off + 4, result.current_cp);
        }
    });
    action_code(result.action)
}

/// Advances a 3-Bulsik session by one ASCII key. Writes
/// `[prev_cp, current_cp, literal_cp]` at `out_offset` and returns the
/// action code (`3` = Literal), or `u32::MAX` for an invalid handle.
#[no_mangle]
pub extern "C" fn ime_process_key_3bulsik(handle: u32, key: u32, out_offset: u32) -> u32 {
    let Ok(key_byte) = u8::try_from(key) else { return INVALID_HANDLE };
    let token = crate::layout::key3_to_token(key_byte);
    let result: Option<Key3Result> = SESSIONS.with(|s| {
        let mut s = s.borrow_mut();
        match s.get_mut(handle as usize) {
            Some(Some(state)) => Some(state.process_key_3bulsik(token)),
            _ => None,
        }
    });
    let Some(result) = result else { return INVALID_HANDLE };
    ARENA.with(|a| {
        let mut a = a.borrow_mut();
        let buf = a.bytes_mut();
        let off = out_offset as usize;
        if off + 12 <= buf.len() {
            write_u32_le(buf, off, result.prev_cp);
            write_u32_le(buf, off + 4, result.current_cp);
            write_u32_le(buf, off + 8, result.literal_cp);
        }
    });
    action3_code(result.action)
}

#[no_mangle]
pub extern "C" fn ime_get_state_codepoint(handle: u32) -> u32 {
    with_session(handle, |state| state.to_codepoint())
}

#[no_mangle]
pub extern "C" fn ime_is_empty(handle: u32) -> u32 {
    with_session(handle, |state| state.is_empty() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_lifecycle() {
        let h = ime_create();
        assert_ne!(h, INVALID_HANDLE);
        assert_eq!(ime_is_empty(h), 1);
        ime_destroy(h);
        assert_eq!(ime_is_empty(h), INVALID_HANDLE);
    }

    #[test]
    fn arena_roundtrip_for_decompose() {
        let off = arena_alloc(12);
        assert_ne!(off, ALLOC_FAILED);
        let ok = codec_decompose('간' as u32, off);
        assert_eq!(ok, 1);
    }

    #[test]
    fn process_key_2bulsik_through_ffi() {
        let h = ime_create();
        let out = arena_alloc(8);
        ime_process_key_2bulsik(h, b'r' as u32, 0, out);
        let cp = ime_process_key_2bulsik(h, b'k' as u32, 0, out);
        let _ = cp;
        assert_eq!(ime_get_state_codepoint(h), '가' as u32);
    }

    #[test]
    fn process_key_literal_ohi_index_composes_ga() {
        let h = ime_create();
        let out = arena_alloc(12);
        assert_eq!(ime_process_key(h, 1, out), 1); // ㄱ
        assert_eq!(ime_process_key(h, 31, out), 1); // ㅏ
        assert_eq!(ime_get_state_codepoint(h), '가' as u32);
        assert_eq!(ime_process_key(INVALID_HANDLE, 1, out), 0);
    }

    #[test]
    fn process_key3_literal_writes_four_words() {
        let h = ime_create();
        let out = arena_alloc(16);
        ime_process_key3(h, b'a', out); // initial ㄱ
        ime_process_key3(h, b'A', out); // medial ㅏ
        assert_eq!(ime_get_state_codepoint(h), '가' as u32);
    }

    #[test]
    fn get_state_reports_partial_composition() {
        let h = ime_create();
        let key_out = arena_alloc(12);
        ime_process_key(h, 30, key_out); // ㅎ
        ime_process_key(h, 31, key_out); // ㅏ
        let state_out = arena_alloc(6);
        ime_get_state(h, state_out);
        ARENA.with(|a| {
            let a = a.borrow();
            let buf = a.bytes();
            let off = state_out as usize;
            assert_eq!(buf[off], 30); // initial ohi
            assert_eq!(buf[off + 2], 31); // medial ohi
            assert_eq!(buf[off + 4], 0); // no final yet
        });
    }

    #[test]
    fn get_initial_medial_final_accessors() {
        let cp = '간' as u32;
        assert_eq!(codec_get_initial(cp), 'ㄱ' as u32);
        assert_eq!(codec_get_medial(cp), 'ㅏ' as u32);
        assert_eq!(codec_get_final(cp), 'ㄴ' as u32);
        assert_eq!(codec_get_final('가' as u32), 0);
    }

    #[test]
    fn decompose_safe_rejects_small_capacity() {
        let off = arena_alloc(12);
        assert_eq!(codec_decompose_safe('간' as u32, off, 2), 0);
        assert_eq!(codec_decompose_safe('간' as u32, off, 3), 1);
    }

    #[test]
    fn decompose_and_compose_string_through_ffi() {
        let bytes = "한글".as_bytes();
        let in_off = arena_alloc(bytes.len() as u32);
        ARENA.with(|a| a.borrow_mut().bytes_mut()[in_off as usize..in_off as usize + bytes.len()].copy_from_slice(bytes));
        let jamo_off = arena_alloc(6 * 4);
        let n = codec_decompose_string(in_off, bytes.len() as u32, jamo_off);
        assert_eq!(n, 6); // ㅎㅏㄴ ㄱㅡㄹ

        let syllable_off = arena_alloc(2 * 4);
        let m = codec_compose_string(jamo_off, n, syllable_off);
        assert_eq!(m, 2);
        ARENA.with(|a| {
            let a = a.borrow();
            let buf = a.bytes();
            let off = syllable_off as usize;
            let first = u32::from_le_bytes(buf[off..off + 4].try_into().unwrap());
            let second = u32::from_le_bytes(buf[off + 4..off + 8].try_into().unwrap());
            assert_eq!(char::from_u32(first), Some('한'));
            assert_eq!(char::from_u32(second), Some('글'));
        });
    }
}
