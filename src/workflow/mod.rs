//! The facilitation workflow.
//!
//! - [`WorkflowState`] and [`reduce`]: pure state machine over [`Action`]s
//! - [`Facilitator`]: async controller running the requests the reducer asks for

mod controller;
mod state;

pub use controller::Facilitator;
pub use state::*;
