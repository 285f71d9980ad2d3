//! Core types for the rundex run catalog
//!
//! This crate defines the fundamental types shared by the store, the engine,
//! and the CLI:
//! - [`Value`]: the closed scalar set for run input parameters
//! - [`Entry`]: one indexed run, keyed by filename
//! - [`ScalarKind`]: the declared-type registry that turns command-line text
//!   into typed constraint values

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entry;
pub mod kind;
pub mod value;

pub use entry::{inputs_from, Entry, ExtraFields, Inputs};
pub use kind::{KindError, ScalarKind};
pub use value::Value;
