use serde_json::{Map, Value};

use crate::error::AppError;
use crate::model::OptionValues;
use crate::state::AppState;
use crate::transport::{self, Transport};

use super::ActionOutput;

/// Execute one action invocation: resolve its options, compute the command
/// (updating toggles where the action is stateful), and send it.
///
/// This is the single dispatch point for every surface (CLI, HTTP API).
/// Errors from the transport are returned unchanged.
pub async fn execute<T: Transport>(
    state: &AppState<T>,
    id: &str,
    submitted: &Map<String, Value>,
) -> Result<ActionOutput, AppError> {
    let action = state.registry.get(id)?;
    let values = OptionValues::resolve(&action.options, submitted)?;
    let command = action.command(&values, &state.toggles)?;
    let outcome = transport::send(state, &command).await?;

    Ok(ActionOutput {
        message: format!("{}: sent {} (HTTP {})", action.name, outcome.query, outcome.status),
        action: action.id,
        command: outcome.query,
        status: outcome.status,
    })
}

/// Same as [`execute`], taking the options as a JSON value (`null` or an object).
pub async fn execute_json<T: Transport>(
    state: &AppState<T>,
    id: &str,
    input: &Value,
) -> Result<ActionOutput, AppError> {
    match input {
        Value::Null => execute(state, id, &Map::new()).await,
        Value::Object(map) => execute(state, id, map).await,
        other => Err(AppError::validation(format!(
            "Options for '{id}' must be a JSON object, got {other}"
        ))),
    }
}
