//! Grievance reporting analytics.
//!
//! Turns a flat set of already-fetched grievance records into trend,
//! department efficiency, leaderboard and status views. Start at
//! [`view::assemble`].

pub mod buckets;
pub mod error;
pub mod loader;
pub mod normalize;
pub mod output;
pub mod reports;
pub mod types;
pub mod util;
pub mod view;

pub use buckets::{Granularity, TrendWindow};
pub use error::ReportError;
pub use types::{RawRecord, ReportViewModel};
pub use view::{assemble, assemble_in};
