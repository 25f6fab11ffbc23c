//! The crate's one recoverable domain error: a malformed observation row.
//! Mirrors the teacher's hand-rolled `std::error::Error` impls rather than
//! pulling in `thiserror` for a single small enum.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum InputError {
    WrongLength(usize),
    BuyMismatch { slot0: f64, slot1: f64 },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::WrongLength(n) => {
                write!(f, "observation row must have exactly 14 slots, got {}", n)
            }
            InputError::BuyMismatch { slot0, slot1 } => write!(
                f,
                "slot 0 and slot 1 must carry the same buy price, got {} and {}",
                slot0, slot1
            ),
        }
    }
}

impl std::error::Error for InputError {}
