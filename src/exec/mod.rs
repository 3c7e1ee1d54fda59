// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the commands defined by
//! units, using `tokio::process::Command`, and recording what they print.
//!
//! - [`runner`] implements `Unit::run`.
//! - [`stream`] drains one output pipe into the unit's results.

pub mod runner;
pub mod stream;

use std::sync::Arc;

use crate::unit::Unit;

/// Callback invoked whenever a unit's status or captured output changes.
///
/// Shared by every worker, so it may be called from several tasks at once.
pub type UpdateHandler = Arc<dyn Fn(&Unit) + Send + Sync>;

pub use stream::StreamKind;
