use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::AppError;

/// One entry of a dropdown option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub id: String,
    pub label: String,
}

impl Choice {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Type and constraints of an option.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OptionKind {
    Dropdown { choices: Vec<Choice>, default: String },
    Number { min: i64, max: i64, default: i64 },
}

/// Presentation-only predicate over the sibling values of the same
/// invocation. Never consulted when executing an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "when", rename_all = "snake_case")]
pub enum Visibility {
    /// Visible while the dropdown `option` holds one of `any_of`.
    ChoiceIn {
        option: &'static str,
        any_of: &'static [&'static str],
    },
}

impl Visibility {
    pub fn evaluate(&self, values: &OptionValues) -> bool {
        match self {
            Visibility::ChoiceIn { option, any_of } => values
                .get(option)
                .and_then(OptionValue::as_choice)
                .is_some_and(|current| any_of.iter().any(|id| *id == current)),
        }
    }
}

/// Schema entry for one action option: id, label, type constraints, default.
#[derive(Debug, Clone, Serialize)]
pub struct OptionSpec {
    pub id: &'static str,
    pub label: &'static str,
    #[serde(flatten)]
    pub kind: OptionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible_when: Option<Visibility>,
}

impl OptionSpec {
    pub fn dropdown(
        id: &'static str,
        label: &'static str,
        choices: Vec<Choice>,
        default: impl Into<String>,
    ) -> Self {
        Self {
            id,
            label,
            kind: OptionKind::Dropdown {
                choices,
                default: default.into(),
            },
            visible_when: None,
        }
    }

    pub fn number(id: &'static str, label: &'static str, min: i64, max: i64, default: i64) -> Self {
        Self {
            id,
            label,
            kind: OptionKind::Number { min, max, default },
            visible_when: None,
        }
    }

    /// Show this option only while `option` holds one of `any_of`.
    pub fn visible_when(mut self, option: &'static str, any_of: &'static [&'static str]) -> Self {
        self.visible_when = Some(Visibility::ChoiceIn { option, any_of });
        self
    }

    pub fn default_value(&self) -> OptionValue {
        match &self.kind {
            OptionKind::Dropdown { default, .. } => OptionValue::Choice(default.clone()),
            OptionKind::Number { default, .. } => OptionValue::Number(*default),
        }
    }

    pub fn is_visible(&self, values: &OptionValues) -> bool {
        self.visible_when.as_ref().is_none_or(|v| v.evaluate(values))
    }

    /// Parse a submitted JSON value against this option's constraints.
    /// Out-of-range numbers are rejected, never clamped.
    pub fn parse_value(&self, raw: &Value) -> Result<OptionValue, AppError> {
        match &self.kind {
            OptionKind::Dropdown { choices, .. } => {
                let id = match raw {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    other => {
                        return Err(AppError::validation(format!(
                            "Option '{}' expects a choice id, got {other}",
                            self.id
                        )))
                    }
                };
                if choices.iter().any(|c| c.id == id) {
                    Ok(OptionValue::Choice(id))
                } else {
                    let allowed: Vec<&str> = choices.iter().map(|c| c.id.as_str()).collect();
                    Err(AppError::validation(format!(
                        "Option '{}' has no choice '{id}' (expected one of: {})",
                        self.id,
                        allowed.join(", ")
                    )))
                }
            }
            OptionKind::Number { min, max, .. } => {
                let n = match raw {
                    Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole_number)),
                    Value::String(s) => s.trim().parse::<i64>().ok(),
                    _ => None,
                }
                .ok_or_else(|| {
                    AppError::validation(format!(
                        "Option '{}' expects an integer, got {raw}",
                        self.id
                    ))
                })?;
                if !(*min..=*max).contains(&n) {
                    return Err(AppError::validation(format!(
                        "Option '{}' ({n}) must be between {min} and {max}",
                        self.id
                    )));
                }
                Ok(OptionValue::Number(n))
            }
        }
    }
}

/// `26.0` → `26`. Fractional or out-of-range floats yield `None`.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::float_cmp)]
fn whole_number(f: f64) -> Option<i64> {
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.is_finite() && f.fract() == 0.0 && in_range).then(|| f as i64)
}

/// A resolved option value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    Choice(String),
    Number(i64),
}

impl OptionValue {
    pub fn as_choice(&self) -> Option<&str> {
        match self {
            OptionValue::Choice(s) => Some(s),
            OptionValue::Number(_) => None,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            OptionValue::Number(n) => Some(*n),
            OptionValue::Choice(_) => None,
        }
    }
}

/// Option values for one action invocation, keyed by option id in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OptionValues(IndexMap<String, OptionValue>);

impl OptionValues {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn set(mut self, id: impl Into<String>, value: OptionValue) -> Self {
        self.0.insert(id.into(), value);
        self
    }

    pub fn get(&self, id: &str) -> Option<&OptionValue> {
        self.0.get(id)
    }

    /// Every option at its default.
    pub fn defaults(specs: &[OptionSpec]) -> Self {
        Self(
            specs
                .iter()
                .map(|s| (s.id.to_string(), s.default_value()))
                .collect(),
        )
    }

    /// Build the full value set for an invocation: submitted values where
    /// present, defaults elsewhere. Keys the schema does not declare are ignored.
    pub fn resolve(specs: &[OptionSpec], submitted: &Map<String, Value>) -> Result<Self, AppError> {
        let mut values = IndexMap::with_capacity(specs.len());
        for spec in specs {
            let value = match submitted.get(spec.id) {
                Some(Value::Null) | None => spec.default_value(),
                Some(raw) => spec.parse_value(raw)?,
            };
            values.insert(spec.id.to_string(), value);
        }
        Ok(Self(values))
    }

    pub fn choice(&self, id: &str) -> Result<&str, AppError> {
        self.get(id)
            .and_then(OptionValue::as_choice)
            .ok_or_else(|| AppError::validation(format!("Missing choice option '{id}'")))
    }

    pub fn number(&self, id: &str) -> Result<i64, AppError> {
        self.get(id)
            .and_then(OptionValue::as_number)
            .ok_or_else(|| AppError::validation(format!("Missing number option '{id}'")))
    }

    /// A numeric option as a device byte (0-255).
    pub fn byte(&self, id: &str) -> Result<u8, AppError> {
        let n = self.number(id)?;
        u8::try_from(n)
            .map_err(|_| AppError::validation(format!("Option '{id}' ({n}) does not fit 0-255")))
    }
}
