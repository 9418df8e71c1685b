//! # tattle-core
//!
//! Detection engine for tattle: given a file path, which running
//! applications currently display it, is it the visible view there, and
//! which window/tab should be raised to reveal it.
//!
//! ## Design principles
//!
//! - **Synchronous**: one resolution is a plain call against a snapshot of
//!   running applications; no async runtime, no background state, nothing
//!   persisted between invocations.
//! - **Collaborators behind traits**: application enumeration, UI
//!   accessibility, process introspection, and the state-store reader are
//!   host facilities injected through [`Platform`]; the engine owns only
//!   the fusion, traversal, and scoring logic.
//! - **Absence of evidence over errors**: transient host failures degrade
//!   to "no signal" locally; one heuristic's failure never aborts the
//!   pipeline for other heuristics or applications.
//! - **Deterministic**: heuristic ordering, vote merging, and reveal
//!   scoring are total orders; equal inputs give equal verdicts.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use tattle_core::{DetectionOptions, FileUsageReport, HeuristicRegistry, Platform};
//!
//! let platform = Platform::system();
//! let registry = HeuristicRegistry::standard(&platform);
//! let report = FileUsageReport::resolve(
//!     "~/notes/todo.txt",
//!     &platform,
//!     &registry,
//!     &DetectionOptions::default(),
//! )?;
//! for usage in &report.apps {
//!     println!("{} {:?}", usage.name, usage.file_visibility());
//! }
//! ```

pub mod ax;
pub mod error;
pub mod heuristics;
pub mod model;
pub mod path;
pub mod pipeline;
pub mod platform;
pub mod process;
pub mod registry;
pub mod resolve;
pub mod reveal;
pub mod statedb;
pub mod testkit;
pub mod walker;

pub use error::{Result, TattleError};
pub use model::{AppDescriptor, AppUsage, DetectionOptions, DetectionStep, FileVisibility};
pub use path::TargetFile;
pub use platform::{AppEnumerator, Platform};
pub use registry::{Heuristic, HeuristicEntry, HeuristicRegistry, HeuristicVote, MatchRule};
pub use resolve::FileUsageReport;
