//! Stage orchestration.
//!
//! Each [`Stage`] resolves through the [`StageRegistry`] to one
//! [`Implementation`]: a registered in-process callable first, then an
//! external script found on the search path. A stage with nothing available
//! is skipped or fails according to its [`UnresolvedPolicy`]. The
//! [`Orchestrator`] runs stages one after another and stops at the first
//! failure.

mod context;
mod implementation;
mod registry;
mod runner;
mod stage;

pub use context::RunContext;
pub use implementation::{find_script, Candidate, Implementation, StageAction};
pub use registry::{StageBinding, StageRegistry, UnresolvedPolicy};
pub use runner::{Orchestrator, RunResult, StageOutcome, StageReport};
pub use stage::Stage;
