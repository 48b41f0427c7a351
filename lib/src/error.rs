//! Error taxonomy for callers linking this crate as an `rlib`.
//!
//! The hot-path codec and IME functions never panic and never return
//! `Result` (see `codec`, `ime`): a malformed call produces a documented
//! sentinel (`0`, `None`, or a zeroed [`crate::ime::ImeState`]) so the
//! calling convention stays stable across the C-ABI boundary in `ffi`.
//! `CoreError` is a convenience layer over the same failures for
//! Rust-only callers who want a `Result` instead of interpreting a
//! sentinel themselves.

use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    #[error("code point U+{0:04X} is not a precomposed Hangul syllable")]
    NotAHangulSyllable(u32),

    #[error("jamo combination (initial=U+{initial:04X}, medial=U+{medial:04X}, final=U+{final_:04X}) does not compose")]
    InvalidJamoForComposition { initial: u32, medial: u32, final_: u32 },

    #[error("output buffer of {given} bytes is too small, needed at least {needed}")]
    BufferTooSmall { needed: usize, given: usize },

    #[error("arena allocator could not satisfy a request for {0} bytes")]
    AllocationFailure(usize),

    #[error("byte stream is truncated or malformed UTF-8 at offset {0}")]
    TruncatedOrMalformedUtf8(usize),

    #[error("key {0:#x} is not mapped in the active layout")]
    UnmappedKey(u32),
}
