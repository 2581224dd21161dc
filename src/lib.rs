//! Time series storage and data exchange for coupled, time-stepped
//! simulation models.
//!
//! Every model element owns a set of named sequences (inputs, fluxes,
//! states, logs, aides and links) whose values change over the simulation
//! period.  This crate provides:
//!
//! - the sequence entities themselves, with shape management and the
//!   old/new double buffering explicit time stepping requires
//!   ([`sequence`]),
//! - per-sequence series persistence in RAM or in run-scratch disk files,
//!   with free movement between the two ([`storage`]),
//! - exchange of complete series with external data files, including time
//!   grid validation and short-series alignment ([`external`]),
//! - zero-copy value passing between neighboring models through shared
//!   cells ([`link`], [`node`]),
//! - snapshotting and restoring of the non-recomputable run conditions
//!   ([`condition`]).

pub mod condition;
pub mod errors;
pub mod external;
pub mod group;
pub mod link;
pub mod node;
pub mod options;
pub mod sequence;
pub mod storage;
pub mod timegrid;
pub mod value;

pub use errors::{SequenceError, SequenceResult};
pub use options::{FileType, Options, RunContext, SeriesManager};
pub use timegrid::Timegrid;
pub use value::{FloatValue, SequenceValue, ValueArgs};
