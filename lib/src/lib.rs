//! Stateful Hangul syllable codec and 2-Bulsik/3-Bulsik IME core.
//!
//! [`codec`] converts between precomposed syllables and compatibility jamo.
//! [`layout`] maps physical keys to [`layout::Token2`]/[`layout::Token3`]
//! and holds the Ohi-index tables the state machine in [`ime`] runs on.
//! [`bulk`] offers whole-string decompose/compose helpers built on top of
//! [`codec`]. [`arena`] is the bump allocator backing [`ffi`], the crate's
//! C-ABI surface for embedding into a host with no Rust type system of its
//! own.

pub mod arena;
pub mod bulk;
pub mod codec;
pub mod error;
pub mod ffi;
pub mod ime;
pub mod layout;

pub use codec::{Decomposed, Utf8Char};
pub use error::CoreError;
pub use ime::{Action, Action3, ImeState, Key3Result, KeyResult};
pub use layout::{Ohi, Token2, Token3};
