//! Ambient helpers shared by every crate in the workspace: tracing setup and
//! small wire types that are not tied to the customer domain.

pub mod types;
pub mod utils;
