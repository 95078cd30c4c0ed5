pub mod catalog;
pub mod execute;
pub mod handlers;
pub mod validation;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::AppError;
use crate::model::{DeviceCommand, OptionSpec, OptionValues};
use crate::state::ToggleState;

// ── Action metadata ─────────────────────────────────────────────

/// Computes the command for one invocation from its resolved options,
/// updating toggle state where the action is stateful.
pub type ActionCallback = fn(&OptionValues, &ToggleState) -> Result<DeviceCommand, AppError>;

/// A named, parameterized operation an external trigger can invoke.
/// Built once with the registry and never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct ActionSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub options: Vec<OptionSpec>,
    #[serde(skip)]
    pub callback: ActionCallback,
}

impl ActionSpec {
    pub fn new(
        id: &'static str,
        name: &'static str,
        description: &'static str,
        callback: ActionCallback,
    ) -> Self {
        Self {
            id,
            name,
            description,
            options: Vec::new(),
            callback,
        }
    }

    pub fn with_options(mut self, options: Vec<OptionSpec>) -> Self {
        self.options = options;
        self
    }

    pub fn command(
        &self,
        values: &OptionValues,
        toggles: &ToggleState,
    ) -> Result<DeviceCommand, AppError> {
        (self.callback)(values, toggles)
    }
}

// ── Action output ───────────────────────────────────────────────

/// Result of executing an action. `message` serves the CLI, the rest is
/// structured data for API callers.
#[derive(Debug, Clone, Serialize)]
pub struct ActionOutput {
    pub message: String,
    pub action: &'static str,
    pub command: String,
    pub status: u16,
}

// ── Registry ────────────────────────────────────────────────────

/// Every invokable action, keyed by id in declaration order.
#[derive(Debug, Clone)]
pub struct ActionRegistry {
    actions: IndexMap<&'static str, ActionSpec>,
}

impl ActionRegistry {
    /// The built-in action set.
    pub fn builtin() -> Result<Self, AppError> {
        Self::from_specs(handlers::all())
    }

    /// Build a registry, validating each action's option schema on its own.
    pub fn from_specs(specs: Vec<ActionSpec>) -> Result<Self, AppError> {
        let mut actions = IndexMap::with_capacity(specs.len());
        for spec in specs {
            validation::validate_action(&spec)?;
            if actions.contains_key(spec.id) {
                return Err(AppError::validation(format!(
                    "Duplicate action id '{}'",
                    spec.id
                )));
            }
            actions.insert(spec.id, spec);
        }
        Ok(Self { actions })
    }

    pub fn list_actions(&self) -> &IndexMap<&'static str, ActionSpec> {
        &self.actions
    }

    pub fn get(&self, id: &str) -> Result<&ActionSpec, AppError> {
        self.actions.get(id).ok_or_else(|| AppError::UnknownAction {
            id: id.to_string(),
        })
    }

    /// Options a UI should currently show for `id`, given the values so far.
    pub fn visible_options(
        &self,
        id: &str,
        values: &OptionValues,
    ) -> Result<Vec<&OptionSpec>, AppError> {
        Ok(self
            .get(id)?
            .options
            .iter()
            .filter(|o| o.is_visible(values))
            .collect())
    }
}
