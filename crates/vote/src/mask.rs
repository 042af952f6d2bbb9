//! Gesture codes and the capability bitmask built from them.
//!
//! Pure domain logic - no I/O, no locking.

use serde::{Deserialize, Serialize};
use std::ops::{BitOr, BitOrAssign};

/// Gesture codes reported by the IR detector.
///
/// The discriminant is the code the detector writes into the second axis of
/// a raw event, and also the bit index used in a [`CapabilityMask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gesture {
    Swipe = 1,
    Approach = 2,
    Cover = 3,
    Depart = 4,
    Hover = 5,
    HoverPulse = 6,
    ProximityNone = 7,
    HoverFist = 8,
    ObjectDetected = 9,
    ObjectNotDetected = 10,
}

impl Gesture {
    pub const ALL: [Gesture; 10] = [
        Gesture::Swipe,
        Gesture::Approach,
        Gesture::Cover,
        Gesture::Depart,
        Gesture::Hover,
        Gesture::HoverPulse,
        Gesture::ProximityNone,
        Gesture::HoverFist,
        Gesture::ObjectDetected,
        Gesture::ObjectNotDetected,
    ];

    /// Wire code of this gesture.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Decode a wire code. Unknown codes are `None`.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|g| g.code() == code)
    }

    fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

/// Set of gestures the detector should recognize, one bit per gesture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilityMask(u32);

impl CapabilityMask {
    pub const EMPTY: CapabilityMask = CapabilityMask(0);

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub fn of(gesture: Gesture) -> Self {
        Self(gesture.bit())
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, gesture: Gesture) -> bool {
        self.0 & gesture.bit() != 0
    }

    pub const fn union(self, other: CapabilityMask) -> Self {
        Self(self.0 | other.0)
    }

    pub fn with(self, gesture: Gesture) -> Self {
        self.union(Self::of(gesture))
    }

    /// Gestures present in this mask, in code order.
    pub fn gestures(self) -> impl Iterator<Item = Gesture> {
        Gesture::ALL.into_iter().filter(move |g| self.contains(*g))
    }
}

impl BitOr for CapabilityMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl BitOr<Gesture> for CapabilityMask {
    type Output = Self;

    fn bitor(self, rhs: Gesture) -> Self {
        self.with(rhs)
    }
}

impl BitOrAssign for CapabilityMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl From<Gesture> for CapabilityMask {
    fn from(gesture: Gesture) -> Self {
        Self::of(gesture)
    }
}

impl FromIterator<Gesture> for CapabilityMask {
    fn from_iter<I: IntoIterator<Item = Gesture>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

impl std::fmt::Display for CapabilityMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#06x}", self.0)
    }
}
