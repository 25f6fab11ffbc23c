//! The 14-slot observation vector: slots 0/1 carry the buy price (or are
//! both missing), slots 2..13 carry sell prices. A missing observation is
//! encoded as `f64::NAN`.

use crate::error::InputError;

pub const SLOT_COUNT: usize = 14;

/// Sentinel for "not observed." `f64::NAN` compares unequal to everything
/// including itself, so `is_nan()` is the only correct missing-check.
pub const MISSING: f64 = f64::NAN;

#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRow {
    slots: [f64; SLOT_COUNT],
}

impl ObservationRow {
    pub fn new(slots: [f64; SLOT_COUNT]) -> Result<Self, InputError> {
        let slot0 = slots[0];
        let slot1 = slots[1];
        if !slot0.is_nan() && !slot1.is_nan() && slot0 != slot1 {
            return Err(InputError::BuyMismatch { slot0, slot1 });
        }
        Ok(ObservationRow { slots })
    }

    pub fn from_vec(values: Vec<f64>) -> Result<Self, InputError> {
        let len = values.len();
        let slots: [f64; SLOT_COUNT] = values
            .try_into()
            .map_err(|_| InputError::WrongLength(len))?;
        Self::new(slots)
    }

    pub fn slots(&self) -> &[f64; SLOT_COUNT] {
        &self.slots
    }

    pub fn slot(&self, i: usize) -> f64 {
        self.slots[i]
    }

    pub fn buy_price(&self) -> Option<f64> {
        if self.slots[0].is_nan() {
            None
        } else {
            Some(self.slots[0])
        }
    }

    /// A copy with slots 0 and 1 both pinned to `buy`.
    pub fn with_buy(&self, buy: f64) -> ObservationRow {
        let mut slots = self.slots;
        slots[0] = buy;
        slots[1] = buy;
        ObservationRow { slots }
    }
}
