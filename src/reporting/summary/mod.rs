mod aggregate;
pub mod views;

pub use aggregate::{AggregateSummary, BestPerformer, RecruiterHighlights};
