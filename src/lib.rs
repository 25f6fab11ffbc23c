//! `turnip_oracle` — a probabilistic price-path inference engine for a
//! week of a game's commodity market.
//!
//! Given a partial, possibly-noisy sequence of observed half-day prices
//! (see [`observation::ObservationRow`]), together with optional side
//! information about whether this is the player's first week and what
//! pattern governed the previous week, [`inference::analyze_possibilities`]
//! enumerates every internally-consistent generative scenario, computes
//! each scenario's posterior probability, and returns a ranked list of
//! [`pattern::PredictionResult`] rows plus an aggregated `ALL` row.
//!
//! The engine itself (everything below) never touches a file, a socket, or
//! stdout — CSV ingestion, JSON output, and the CLI live in `cli_io` and
//! `main.rs` as external collaborators that consume this crate's types.

pub mod compensated_sum;
pub mod error;
pub mod inference;
pub mod observation;
pub mod pattern;
pub mod patterns;
pub mod pdf;
pub mod phases;
pub mod range;
pub mod rates;

pub mod cli_io;

pub use error::InputError;
pub use inference::analyze_possibilities;
pub use observation::ObservationRow;
pub use pattern::{MinMax, Pattern, PredictionResult};
