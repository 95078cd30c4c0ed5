use serde_json::Value;

use crate::model::{OptionKind, OptionSpec, Visibility};

use super::{ActionRegistry, ActionSpec};

/// The action catalog as JSON, for host UIs that render option forms.
pub fn to_json(registry: &ActionRegistry) -> Value {
    serde_json::to_value(registry.list_actions().values().collect::<Vec<&ActionSpec>>())
        .unwrap_or(Value::Array(Vec::new()))
}

fn describe_option(option: &OptionSpec) -> String {
    let kind = match &option.kind {
        OptionKind::Dropdown { choices, default } => {
            let ids: Vec<&str> = choices.iter().map(|c| c.id.as_str()).collect();
            format!("one of [{}], default {default}", ids.join(", "))
        }
        OptionKind::Number { min, max, default } => {
            format!("number {min}..={max}, default {default}")
        }
    };
    match option.visible_when {
        Some(Visibility::ChoiceIn { option: other, any_of }) => format!(
            "  {:<14} {} ({kind}; shown when {other} is {})",
            option.id,
            option.label,
            any_of.join("/")
        ),
        None => format!("  {:<14} {} ({kind})", option.id, option.label),
    }
}

/// Help text for the CLI.
/// No topic → every action on one line each; an action id → its options.
pub fn help_text(registry: &ActionRegistry, topic: Option<&str>) -> String {
    match topic {
        None => {
            let mut lines = vec!["Available actions:".to_string()];
            for action in registry.list_actions().values() {
                lines.push(format!("  {:<16} {}", action.id, action.description));
            }
            lines.push(String::new());
            lines.push("Use `help <action>` for its options.".to_string());
            lines.join("\n")
        }
        Some(topic) => match registry.get(topic) {
            Ok(action) => {
                let mut lines = vec![format!("{} ({}): {}", action.name, action.id, action.description)];
                if action.options.is_empty() {
                    lines.push("No options.".to_string());
                } else {
                    lines.push("Options:".to_string());
                    lines.extend(action.options.iter().map(describe_option));
                }
                lines.join("\n")
            }
            Err(_) => format!("Unknown action '{topic}'. Use `help` to list actions."),
        },
    }
}
