//! Playbook registry.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tracing::error;

use super::builtins;
use super::types::{Playbook, PlaybookSummary, ProblemCategory};

/// Registry for playbooks.
///
/// Thread-safe storage with the built-in playbooks registered on creation.
pub struct PlaybookRegistry {
    playbooks: RwLock<HashMap<String, Playbook>>,
}

impl PlaybookRegistry {
    /// Create a new registry with built-in playbooks.
    pub fn new() -> Self {
        let registry = Self {
            playbooks: RwLock::new(HashMap::new()),
        };
        registry.register_builtins();
        registry
    }

    /// Register a playbook.
    ///
    /// # Errors
    /// Returns error if the id or prefill fields are empty, or if the id is
    /// already taken.
    pub fn register(&self, playbook: Playbook) -> Result<(), String> {
        if playbook.id.is_empty() {
            return Err("Playbook ID is required".to_string());
        }
        if playbook.name.is_empty() {
            return Err("Playbook name is required".to_string());
        }
        if playbook.objective.trim().is_empty() || playbook.context.trim().is_empty() {
            return Err("Playbook must prefill both objective and context".to_string());
        }

        let mut playbooks = self
            .playbooks
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if playbooks.contains_key(&playbook.id) {
            return Err(format!("Playbook '{}' already exists", playbook.id));
        }

        playbooks.insert(playbook.id.clone(), playbook);
        Ok(())
    }

    /// Get a playbook by ID.
    pub fn get(&self, id: &str) -> Option<Playbook> {
        self.playbooks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// List playbooks sorted by ID, optionally filtered by category.
    pub fn list(&self, category: Option<ProblemCategory>) -> Vec<PlaybookSummary> {
        let mut summaries: Vec<_> = self
            .playbooks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|p| category.map_or(true, |c| p.problem_category == c))
            .map(Playbook::to_summary)
            .collect();
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        summaries
    }

    /// Get the number of registered playbooks.
    pub fn count(&self) -> usize {
        self.playbooks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn register_builtins(&self) {
        let playbooks = [
            ("cost-reduction", builtins::cost_reduction_playbook()),
            (
                "digital-transformation",
                builtins::digital_transformation_playbook(),
            ),
            ("esg-roadmap", builtins::esg_roadmap_playbook()),
        ];

        for (name, playbook) in playbooks {
            if let Err(e) = self.register(playbook) {
                error!(
                    playbook = name,
                    error = %e,
                    "Failed to register builtin playbook"
                );
            }
        }
    }
}

impl Default for PlaybookRegistry {
    fn default() -> Self {
        Self::new()
    }
}
