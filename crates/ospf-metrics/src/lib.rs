//! ospf-metrics - where metric samples come from.
//!
//! The cost engine never talks to routers. Samples reach it through a
//! [`MetricsSource`], one per link per cycle; a link whose sample cannot be
//! obtained is skipped for that cycle.
//!
//! # Architecture
//!
//! ```text
//! MetricsSource (trait)
//!   ├── SimulatedNetwork  ← randomized samples, in-memory cost table
//!   └── FileSource        ← JSON array of samples written by an external collector
//!
//! SampleHistory
//!   ├── record()  ← every collected sample, bounded per link
//!   └── average() → windowed mean used for smoothing
//! ```

pub mod file;
pub mod history;
pub mod simulated;
pub mod source;

pub use file::FileSource;
pub use history::SampleHistory;
pub use simulated::{LinkCondition, LoadProfile, SimulatedNetwork};
pub use source::{MetricsSource, SourceError};
