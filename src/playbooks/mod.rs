//! Strategy playbooks: ready-made problem statements with framework,
//! stakeholder, risk and KPI templates.
//!
//! This module provides:
//! - `Playbook`: playbook definition and its nested templates
//! - `PlaybookRegistry`: registration and lookup of playbooks
//! - Built-in playbooks for cost reduction, digital transformation and ESG

mod builtins;
mod registry;
mod types;

pub use builtins::*;
pub use registry::PlaybookRegistry;
pub use types::*;
