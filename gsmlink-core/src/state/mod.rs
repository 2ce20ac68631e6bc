//! Dialogue state identifiers and the generic state engine

mod engine;
mod id;

pub use engine::{Diversions, StateEngine, Stopwatch};
pub use id::StateId;
