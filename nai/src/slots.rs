//! Bounded ordered sets of enumerated kinds
//!
//! The header stores the requested vertex attributes and material values as
//! fixed 8-byte slot arrays: one kind code per byte, in order, padded with
//! the `0` ("none") sentinel. In memory they are a [`SlotSet`], which holds
//! the ordering and rejects duplicates and overflow at construction, so every
//! value of the type maps to exactly one well-formed slot array.
//!
//! # Layout
//! ```text
//! [k0][k1]...[kn-1][0]...[0]     (n <= 8, no duplicates, no gaps)
//! ```

use std::fmt;

use crate::error::{NaiError, Result};

/// Number of slots in an on-disk slot array
pub const MAX_SLOTS: usize = 8;

/// On-disk code of an empty slot
pub const NONE_SLOT: u8 = 0;

/// A closed enumeration that can occupy a slot.
///
/// `code()` must never return [`NONE_SLOT`].
pub trait SlotKind: Copy + Eq + fmt::Debug + 'static {
    /// Name used in error messages (e.g. "vertex attribute")
    const NAME: &'static str;

    fn code(self) -> u8;

    fn from_code(code: u8) -> Option<Self>;
}

/// Ordered, duplicate-free set of at most [`MAX_SLOTS`] kinds
#[derive(Clone, PartialEq, Eq)]
pub struct SlotSet<K> {
    kinds: Vec<K>,
}

impl<K: SlotKind> SlotSet<K> {
    pub fn new() -> Self {
        Self { kinds: Vec::new() }
    }

    /// Build a set from kinds in order.
    ///
    /// Fails with [`NaiError::InvalidArgument`] on duplicates or more than
    /// [`MAX_SLOTS`] entries.
    pub fn from_kinds(kinds: &[K]) -> Result<Self> {
        let mut set = Self::new();
        for &kind in kinds {
            set.push(kind)?;
        }
        Ok(set)
    }

    /// Append a kind at the end of the order.
    pub fn push(&mut self, kind: K) -> Result<()> {
        if self.kinds.contains(&kind) {
            return Err(NaiError::invalid(format!(
                "duplicate {} {:?}",
                K::NAME,
                kind
            )));
        }
        if self.kinds.len() == MAX_SLOTS {
            return Err(NaiError::invalid(format!(
                "too many {} kinds (max {})",
                K::NAME,
                MAX_SLOTS
            )));
        }
        self.kinds.push(kind);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn contains(&self, kind: K) -> bool {
        self.kinds.contains(&kind)
    }

    /// Position of `kind` in the order
    pub fn position(&self, kind: K) -> Option<usize> {
        self.kinds.iter().position(|&k| k == kind)
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = K> + '_ {
        self.kinds.iter().copied()
    }

    pub fn as_slice(&self) -> &[K] {
        &self.kinds
    }

    /// Project onto the on-disk slot array.
    pub fn to_slots(&self) -> [u8; MAX_SLOTS] {
        let mut slots = [NONE_SLOT; MAX_SLOTS];
        for (slot, kind) in slots.iter_mut().zip(&self.kinds) {
            *slot = kind.code();
        }
        slots
    }

    /// Expand an on-disk slot array.
    ///
    /// Fails with [`NaiError::Format`] on unknown codes, duplicates, or a
    /// kind appearing after a none slot.
    pub fn from_slots(slots: &[u8; MAX_SLOTS]) -> Result<Self> {
        let mut kinds = Vec::with_capacity(MAX_SLOTS);
        let mut terminated = false;

        for (i, &code) in slots.iter().enumerate() {
            if code == NONE_SLOT {
                terminated = true;
                continue;
            }
            if terminated {
                return Err(NaiError::format(
                    K::NAME,
                    format!("slot {} holds code {} after a none slot", i, code),
                ));
            }
            let kind = K::from_code(code).ok_or_else(|| {
                NaiError::format(K::NAME, format!("unknown code {} in slot {}", code, i))
            })?;
            if kinds.contains(&kind) {
                return Err(NaiError::format(
                    K::NAME,
                    format!("duplicate {:?} in slot {}", kind, i),
                ));
            }
            kinds.push(kind);
        }

        Ok(Self { kinds })
    }
}

impl<K: SlotKind> Default for SlotSet<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: SlotKind> fmt::Debug for SlotSet<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.kinds).finish()
    }
}

impl<K: SlotKind> TryFrom<&[K]> for SlotSet<K> {
    type Error = NaiError;

    fn try_from(kinds: &[K]) -> Result<Self> {
        Self::from_kinds(kinds)
    }
}

impl<'a, K: SlotKind> IntoIterator for &'a SlotSet<K> {
    type Item = K;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.kinds.iter().copied()
    }
}
