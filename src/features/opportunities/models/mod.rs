mod opportunity;

pub use opportunity::{NewOpportunity, OpportunitySummary};
