//! The stateful IME: one in-progress syllable, advanced one key at a time.
//!
//! Each of the three jamo slots is a tagged [`Slot`] (`Empty`/`Blocked`/
//! `Filled`) instead of a signed-integer-with-`-1`-sentinel field, so the
//! handler rules below are exhaustive matches rather than sign checks.
//! The per-slot "just-formed-double" flags stay as plain `bool`s alongside
//! each slot; see DESIGN.md Open Question 5 for why `initial_flag` is, by
//! design, not simply `true` iff the slot holds a double.

use crate::codec;
use crate::layout::{self, Ohi, Token2, Token3};
use log::{trace, warn};

/// `Empty` ⇒ slot holds nothing. `Blocked` ⇒ the reference's `-1`
/// sentinel: a combination was attempted here and rejected, and this slot
/// must not accept further input until the next syllable boundary.
/// `Filled(ohi)` ⇒ a live jamo at the given Ohi index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Empty,
    Blocked,
    Filled(Ohi),
}

impl Slot {
    fn ohi(self) -> Option<Ohi> {
        match self {
            Slot::Filled(o) => Some(o),
            _ => None,
        }
    }

    fn is_filled(self) -> bool {
        matches!(self, Slot::Filled(_))
    }
}

/// The in-progress syllable. Invariants (I1-I4 in spec terms):
///
/// - I1: all three slots `Empty` ⇔ the state is freshly reset/committed.
/// - I2: a flag may be `true` only while its companion slot is `Filled`.
/// - I3: `final_` is `Filled`/`Blocked` only if both `initial` and `medial`
///   are `Filled` (a lone final makes no sense), except transiently under
///   3-Bulsik, see `process_key_3bulsik`'s `jong` handling.
/// - I4: every `Filled(ohi)` carries an `ohi` within that slot's declared
///   domain (`initial`: valid-initial Ohi, `medial`: `31..=51`, `final_`:
///   valid-final Ohi).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImeState {
    initial: Slot,
    initial_flag: bool,
    medial: Slot,
    medial_flag: bool,
    final_: Slot,
    final_flag: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    NoChange,
    Replace,
    EmitAndNew,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyResult {
    pub action: Action,
    pub prev_cp: u32,
    pub current_cp: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action3 {
    NoChange,
    Replace,
    EmitAndNew,
    Literal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key3Result {
    pub action: Action3,
    pub prev_cp: u32,
    pub current_cp: u32,
    pub literal_cp: u32,
}

impl Default for ImeState {
    fn default() -> Self {
        Self::new()
    }
}

impl ImeState {
    pub fn new() -> Self {
        ImeState {
            initial: Slot::Empty,
            initial_flag: false,
            medial: Slot::Empty,
            medial_flag: false,
            final_: Slot::Empty,
            final_flag: false,
        }
    }

    /// Raw per-slot Ohi indices and flags, in the order `ime_get_state`
    /// (spec.md §6) writes them: `[initial, initial_flag, medial,
    /// medial_flag, final, final_flag]`. `Slot::Blocked` reads as `0`,
    /// the same as `Slot::Empty`; it never survives past the keystroke
    /// that set it, so no caller observes it through this accessor.
    pub fn raw_state(&self) -> [u8; 6] {
        [
            self.initial.ohi().unwrap_or(0),
            self.initial_flag as u8,
            self.medial.ohi().unwrap_or(0),
            self.medial_flag as u8,
            self.final_.ohi().unwrap_or(0),
            self.final_flag as u8,
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.initial == Slot::Empty && self.medial == Slot::Empty && self.final_ == Slot::Empty
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Projects the current slots to a single code point: the composed
    /// syllable if initial+medial are both filled, the lone jamo if
    /// exactly one slot is filled, or `0` for an empty/invalid state.
    pub fn to_codepoint(&self) -> u32 {
        match (self.initial.ohi(), self.medial.ohi()) {
            (Some(i), Some(m)) => {
                let i_cp = layout::ohi_index_to_single_jamo(i);
                let m_cp = layout::ohi_index_to_single_jamo(m);
                let f_cp = self.final_.ohi().map(layout::ohi_index_to_single_jamo).unwrap_or(0);
                codec::compose(i_cp, m_cp, f_cp).unwrap_or(0)
            }
            _ => {
                let filled: [Option<Ohi>; 3] = [self.initial.ohi(), self.medial.ohi(), self.final_.ohi()];
                let mut it = filled.iter().filter_map(|o| *o);
                match (it.next(), it.next()) {
                    (Some(only), None) => layout::ohi_index_to_single_jamo(only),
                    _ => 0,
                }
            }
        }
    }

    /// Commits the in-progress syllable (if any) and resets to empty,
    /// returning the final projected code point (`0` if nothing was
    /// in-progress). Idempotent: calling `commit` twice in a row returns
    /// `0` the second time.
    pub fn commit(&mut self) -> u32 {
        let cp = self.to_codepoint();
        self.reset();
        cp
    }

    /// Removes the rightmost non-empty slot whole, innermost first (final,
    /// then medial, then initial), never panicking on an already-empty
    /// state. Per spec.md §4.4.5 this clears the entire slot and its flag
    /// in one step — a double final/medial/initial is *not* split back to
    /// its base component, it disappears entirely (so 닭 backspaces to 다,
    /// not 달). Returns `None` exactly when the state is empty after the
    /// call (including when it was already empty before it), matching P5:
    /// the host reads `None` as "delete the whole displayed character"
    /// rather than "replace its glyph".
    pub fn backspace(&mut self) -> Option<u32> {
        if self.final_.is_filled() || self.final_ == Slot::Blocked {
            self.final_ = Slot::Empty;
            self.final_flag = false;
        } else if self.medial.is_filled() || self.medial == Slot::Blocked {
            self.medial = Slot::Empty;
            self.medial_flag = false;
        } else if self.initial.is_filled() {
            self.initial = Slot::Empty;
            self.initial_flag = false;
        }
        if self.is_empty() {
            None
        } else {
            Some(self.to_codepoint())
        }
    }

    /// Advances the state machine by one 2-Bulsik key press.
    pub fn process_key_2bulsik(&mut self, token: Token2) -> KeyResult {
        match token {
            Token2::Consonant(c) => self.key2_consonant(c),
            Token2::Vowel(v) => self.key2_vowel(v),
            Token2::Unmapped => {
                warn!("2-Bulsik: unmapped key, no change");
                KeyResult {
                    action: Action::NoChange,
                    prev_cp: 0,
                    current_cp: self.to_codepoint(),
                }
            }
        }
    }

    fn key2_consonant(&mut self, incoming: Ohi) -> KeyResult {
        let mut should_emit = false;

        // Step 1: try extending a plain final into a double final.
        if let (Slot::Filled(_), Slot::Filled(f)) = (self.medial, self.final_) {
            if !self.final_flag {
                if let Some(compound) = layout::double_final(f, incoming) {
                    self.final_ = Slot::Filled(compound);
                    self.final_flag = true;
                    trace!("2b consonant: formed double final {compound}");
                    return KeyResult {
                        action: Action::Replace,
                        prev_cp: 0,
                        current_cp: self.to_codepoint(),
                    };
                }
                should_emit = true;
            }
        }

        let medial_is_zero = !self.medial.is_filled();
        let final_is_filled = self.final_.is_filled();
        let final_flag_is_zero = !final_is_filled || !self.final_flag;
        let cond_c = self.initial.is_filled()
            && final_flag_is_zero
            && (final_is_filled || layout::can_follow_as_initial(incoming));

        let branch2 = medial_is_zero || should_emit || cond_c;

        if branch2 {
            if !self.medial.is_filled() && !self.final_.is_filled() {
                if let Some(i) = self.initial.ohi() {
                    if let Some(compound) = layout::double_initial(i, incoming) {
                        self.initial = Slot::Filled(compound);
                        self.initial_flag = true;
                        trace!("2b consonant: formed double initial {compound}");
                        return KeyResult {
                            action: Action::Replace,
                            prev_cp: 0,
                            current_cp: self.to_codepoint(),
                        };
                    }
                }
            }
            let was_empty = self.is_empty();
            let prev = self.to_codepoint();
            self.reset();
            self.initial = Slot::Filled(incoming);
            self.initial_flag = true;
            let current = self.to_codepoint();
            trace!("2b consonant: start new syllable (was_empty={was_empty})");
            return KeyResult {
                action: if was_empty { Action::Replace } else { Action::EmitAndNew },
                prev_cp: if was_empty { 0 } else { prev },
                current_cp: current,
            };
        }

        // Branch 3: extend current syllable.
        if !self.initial.is_filled() {
            self.initial = Slot::Filled(incoming);
            self.initial_flag = true;
        } else if !self.final_.is_filled() {
            self.final_ = Slot::Filled(incoming);
            self.final_flag = false;
        }
        KeyResult {
            action: Action::Replace,
            prev_cp: 0,
            current_cp: self.to_codepoint(),
        }
    }

    fn key2_vowel(&mut self, incoming: Ohi) -> KeyResult {
        // Snapshot before step 1 can blow away the medial slot (marking it
        // Blocked on a failed double-vowel attempt) so that if step 3 below
        // ends up emitting the prior syllable, it emits what was actually
        // on screen a moment ago, not a one-slot-short reading of it.
        let prev_before = self.to_codepoint();

        // Step 1: try extending a plain medial into a double medial.
        if let Slot::Filled(m) = self.medial {
            if !self.medial_flag && self.final_ == Slot::Empty {
                if let Some(compound) = layout::double_medial(m, incoming) {
                    self.medial = Slot::Filled(compound);
                    self.medial_flag = true;
                    trace!("2b vowel: formed double medial {compound}");
                    return KeyResult {
                        action: Action::Replace,
                        prev_cp: 0,
                        current_cp: self.to_codepoint(),
                    };
                }
                self.medial = Slot::Blocked;
            }
        }

        // Step 2: a final is present -> the vowel starts a new syllable;
        // split or move the final whole to become the new initial.
        if let Slot::Filled(f) = self.final_ {
            let prev_initial = self.initial;
            let prev_medial = self.medial;
            let (kept_final, new_initial) = match layout::split_double_final(f) {
                Some((base, second)) => (Some(base), second),
                None => (None, f),
            };
            self.final_ = match kept_final {
                Some(base) => Slot::Filled(base),
                None => Slot::Empty,
            };
            self.final_flag = false;
            let prev = ImeState {
                initial: prev_initial,
                initial_flag: self.initial_flag,
                medial: prev_medial,
                medial_flag: self.medial_flag,
                final_: self.final_,
                final_flag: false,
            }
            .to_codepoint();
            self.initial = Slot::Filled(new_initial);
            self.initial_flag = false;
            self.medial = Slot::Filled(incoming);
            self.medial_flag = false;
            trace!("2b vowel: syllable split, migrated final as new initial {new_initial}");
            return KeyResult {
                action: Action::EmitAndNew,
                prev_cp: prev,
                current_cp: self.to_codepoint(),
            };
        }

        // Step 3: start a new syllable rather than extend the current one
        // when there's no initial to extend, the medial slot already holds
        // a maxed-out double vowel step 1 didn't even attempt to touch, or
        // step 1 just blocked it a moment ago. Otherwise (initial filled,
        // medial genuinely empty) this vowel simply fills the medial slot.
        let start_new =
            !self.initial.is_filled() || self.medial.is_filled() || self.medial == Slot::Blocked;
        if start_new {
            let was_empty = self.is_empty();
            self.reset();
            self.medial = Slot::Filled(incoming);
            self.medial_flag = false;
            let current = self.to_codepoint();
            return KeyResult {
                action: if was_empty { Action::Replace } else { Action::EmitAndNew },
                prev_cp: if was_empty { 0 } else { prev_before },
                current_cp: current,
            };
        }

        // Extend: initial is filled, medial slot is genuinely empty.
        self.medial = Slot::Filled(incoming);
        self.medial_flag = false;
        KeyResult {
            action: Action::Replace,
            prev_cp: 0,
            current_cp: self.to_codepoint(),
        }
    }

    /// Advances the state machine by one 3-Bulsik key press. Unlike
    /// 2-Bulsik, each key already names its position (초성/중성/종성), so
    /// there is no splitting ambiguity, only whether the position is
    /// already occupied.
    pub fn process_key_3bulsik(&mut self, token: Token3) -> Key3Result {
        match token {
            Token3::Initial(i) => self.key3_cho(i),
            Token3::Medial(m) => self.key3_jung(m),
            Token3::Final(f) => self.key3_jong(f),
            Token3::Literal(cp) => Key3Result {
                action: Action3::Literal,
                prev_cp: 0,
                current_cp: self.to_codepoint(),
                literal_cp: cp,
            },
            Token3::Unmapped => {
                warn!("3-Bulsik: unmapped key, no change");
                Key3Result {
                    action: Action3::NoChange,
                    prev_cp: 0,
                    current_cp: self.to_codepoint(),
                    literal_cp: 0,
                }
            }
        }
    }

    fn key3_cho(&mut self, incoming: Ohi) -> Key3Result {
        if let Slot::Filled(i) = self.initial {
            if !self.initial_flag && self.medial == Slot::Empty {
                if let Some(compound) = layout::double_initial(i, incoming) {
                    self.initial = Slot::Filled(compound);
                    self.initial_flag = true;
                    trace!("3b cho: formed double initial {compound}");
                    return Key3Result {
                        action: Action3::Replace,
                        prev_cp: 0,
                        current_cp: self.to_codepoint(),
                        literal_cp: 0,
                    };
                }
            }
        }
        if !self.is_empty() {
            let prev = self.to_codepoint();
            self.reset();
            self.initial = Slot::Filled(incoming);
            self.initial_flag = false;
            return Key3Result {
                action: Action3::EmitAndNew,
                prev_cp: prev,
                current_cp: self.to_codepoint(),
                literal_cp: 0,
            };
        }
        self.initial = Slot::Filled(incoming);
        self.initial_flag = false;
        Key3Result {
            action: Action3::Replace,
            prev_cp: 0,
            current_cp: self.to_codepoint(),
            literal_cp: 0,
        }
    }

    fn key3_jung(&mut self, incoming: Ohi) -> Key3Result {
        if let Slot::Filled(m) = self.medial {
            if !self.medial_flag && self.final_ == Slot::Empty {
                if let Some(compound) = layout::double_medial(m, incoming) {
                    self.medial = Slot::Filled(compound);
                    self.medial_flag = true;
                    trace!("3b jung: formed double medial {compound}");
                    return Key3Result {
                        action: Action3::Replace,
                        prev_cp: 0,
                        current_cp: self.to_codepoint(),
                        literal_cp: 0,
                    };
                }
            }
            // absorb failed or not eligible: this medial cannot take the
            // incoming vowel, and since 3-Bulsik names position directly
            // (no initial-borrowing ambiguity) the only sane move is to
            // emit the finished syllable and start a bare vowel.
            let prev = self.to_codepoint();
            self.reset();
            self.medial = Slot::Filled(incoming);
            self.medial_flag = false;
            return Key3Result {
                action: Action3::EmitAndNew,
                prev_cp: prev,
                current_cp: self.to_codepoint(),
                literal_cp: 0,
            };
        }
        self.medial = Slot::Filled(incoming);
        self.medial_flag = false;
        Key3Result {
            action: Action3::Replace,
            prev_cp: 0,
            current_cp: self.to_codepoint(),
            literal_cp: 0,
        }
    }

    /// A lone 종성 key (no initial/medial yet) is tolerated transiently:
    /// the reference accepts it and the resulting out-of-order state is
    /// cleared at the next syllable boundary (the next `cho`/`jung` that
    /// starts a fresh syllable resets everything via `reset`), rather than
    /// rejecting the keystroke outright. See DESIGN.md Open Question 1.
    fn key3_jong(&mut self, incoming: Ohi) -> Key3Result {
        if self.final_.is_filled() {
            if let Slot::Filled(f) = self.final_ {
                if !self.final_flag {
                    if let Some(compound) = layout::double_final(f, incoming) {
                        self.final_ = Slot::Filled(compound);
                        self.final_flag = true;
                        trace!("3b jong: formed double final {compound}");
                        return Key3Result {
                            action: Action3::Replace,
                            prev_cp: 0,
                            current_cp: self.to_codepoint(),
                            literal_cp: 0,
                        };
                    }
                }
            }
            let prev = self.to_codepoint();
            self.reset();
            self.final_ = Slot::Filled(incoming);
            self.final_flag = false;
            return Key3Result {
                action: Action3::EmitAndNew,
                prev_cp: prev,
                current_cp: self.to_codepoint(),
                literal_cp: 0,
            };
        }
        if self.initial == Slot::Empty && self.medial == Slot::Empty {
            trace!("3b jong: lone final with no cho/jung yet, tolerated transiently (I3 exception)");
        }
        self.final_ = Slot::Filled(incoming);
        self.final_flag = false;
        Key3Result {
            action: Action3::Replace,
            prev_cp: 0,
            current_cp: self.to_codepoint(),
            literal_cp: 0,
        }
    }
}
