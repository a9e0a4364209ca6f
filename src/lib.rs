//! Searchers hopping between mutually exclusive binding sites.
//!
//! A run places searchers on distinct sites and advances them in discrete
//! steps: once its dwell time has elapsed, a searcher jumps to a free site
//! drawn from its row of the transition weights. [`engine::Engine`] performs
//! a single run; [`sweep::JumpingModel`] repeats it over searcher counts and
//! independent systems and derives occupancy statistics.

pub mod analysis;
pub mod config;
pub mod dwell;
pub mod engine;
pub mod error;
pub mod init;
pub mod lattice;
pub mod manager;
pub mod model;
pub mod sampling;
pub mod stats;
pub mod sweep;
pub mod transition;
pub mod utils;
