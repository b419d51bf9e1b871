//! Area-controlled simplification.
//!
//! A [`Simplifier`] repeatedly asks a [`Decider`] for moves over the current
//! [`SimplificationData`] and applies them until no move is proposed.

pub mod cleanup;
pub mod config;
pub mod configuration;
pub mod data;
pub mod decider;
pub mod driver;
pub mod moves;
pub mod stats;

pub use config::{OrientationSet, SimplifyConfig};
pub use configuration::{Configuration, Window};
pub use data::{ConfigurationReport, MoveSummary, SimplificationData, StepOutcome};
pub use decider::{Decider, DeciderKind, DeciderRegistry};
pub use driver::{RunState, Simplifier};
pub use moves::{Decision, Move, MoveKind};
pub use stats::{IterationStats, Statistics};
