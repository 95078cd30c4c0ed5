//! Schema checks for action option lists.
//!
//! Each action is validated on its own; nothing here looks across actions.

use std::collections::HashSet;

use crate::error::AppError;
use crate::model::{OptionKind, OptionSpec};

use super::ActionSpec;

/// Validate one option: numeric defaults inside [min, max], dropdown defaults
/// among the declared choices.
pub fn validate_option(action: &str, option: &OptionSpec) -> Result<(), AppError> {
    match &option.kind {
        OptionKind::Number { min, max, default } => {
            if min > max {
                return Err(AppError::validation(format!(
                    "{action}.{}: min ({min}) is greater than max ({max})",
                    option.id
                )));
            }
            if !(*min..=*max).contains(default) {
                return Err(AppError::validation(format!(
                    "{action}.{}: default ({default}) is outside [{min}, {max}]",
                    option.id
                )));
            }
        }
        OptionKind::Dropdown { choices, default } => {
            if choices.is_empty() {
                return Err(AppError::validation(format!(
                    "{action}.{}: dropdown has no choices",
                    option.id
                )));
            }
            if !choices.iter().any(|c| c.id == *default) {
                return Err(AppError::validation(format!(
                    "{action}.{}: default '{default}' is not a declared choice",
                    option.id
                )));
            }
        }
    }
    Ok(())
}

/// Validate every option of an action and reject repeated option ids.
pub fn validate_action(action: &ActionSpec) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    for option in &action.options {
        if !seen.insert(option.id) {
            return Err(AppError::validation(format!(
                "{}: duplicate option id '{}'",
                action.id, option.id
            )));
        }
        validate_option(action.id, option)?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::model::{Choice, DeviceCommand};
    use crate::registry::handlers;

    fn spec_with(options: Vec<OptionSpec>) -> ActionSpec {
        ActionSpec::new("probe", "Probe", "", |_, _| Ok(DeviceCommand::NextCue)).with_options(options)
    }

    #[test]
    fn builtin_actions_pass_validation() {
        for action in handlers::all() {
            validate_action(&action)
                .unwrap_or_else(|e| panic!("{} failed validation: {e}", action.id));
        }
    }

    #[test]
    fn builtin_numeric_defaults_within_bounds() {
        for action in handlers::all() {
            for option in &action.options {
                if let OptionKind::Number { min, max, default } = option.kind {
                    assert!(
                        (min..=max).contains(&default),
                        "{}.{} default {default} outside [{min}, {max}]",
                        action.id,
                        option.id
                    );
                }
            }
        }
    }

    #[test]
    fn numeric_default_out_of_range_is_a_defect() {
        let err = validate_action(&spec_with(vec![OptionSpec::number("value", "Value", 1, 255, 0)]))
            .unwrap_err();
        assert!(err.to_string().contains("outside [1, 255]"));
    }

    #[test]
    fn inverted_bounds_are_a_defect() {
        let err = validate_action(&spec_with(vec![OptionSpec::number("value", "Value", 10, 1, 5)]))
            .unwrap_err();
        assert!(err.to_string().contains("greater than max"));
    }

    #[test]
    fn undeclared_dropdown_default_is_a_defect() {
        let option = OptionSpec::dropdown("mode", "Mode", vec![Choice::new("set", "Set")], "toggle");
        let err = validate_action(&spec_with(vec![option])).unwrap_err();
        assert!(err.to_string().contains("not a declared choice"));
    }

    #[test]
    fn empty_dropdown_is_a_defect() {
        let option = OptionSpec::dropdown("mode", "Mode", Vec::new(), "set");
        assert!(validate_action(&spec_with(vec![option])).is_err());
    }

    #[test]
    fn duplicate_option_ids_are_a_defect() {
        let err = validate_action(&spec_with(vec![
            OptionSpec::number("value", "Value", 0, 255, 0),
            OptionSpec::number("value", "Again", 0, 255, 0),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("duplicate option id"));
    }
}
