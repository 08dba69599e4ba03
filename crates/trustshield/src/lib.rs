pub mod server;

pub mod error;
pub mod config;
pub mod random;
pub mod utils;

pub mod catalog;
pub mod signals;
pub mod score;
pub mod identity;
pub mod gates;
pub mod session;
pub mod events;
pub mod bus;
pub mod admin;
pub mod payments;
pub mod engine;

pub use crate::config::EngineConfig;
pub use crate::engine::{TrustEngine, TrustEngineBuilder};
pub use crate::error::{EngineError, EngineResult};
pub use crate::random::{DeltaRange, PinnedRandom, RandomSource, SeededRandom, ThreadRandom};
pub use crate::score::{ScoreBand, SubjectId};
pub use crate::signals::{Signal, Verdict};
