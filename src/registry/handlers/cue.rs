use crate::error::AppError;
use crate::model::{DeviceCommand, OptionSpec, OptionValues};
use crate::registry::ActionSpec;
use crate::state::ToggleState;

pub fn cue() -> ActionSpec {
    ActionSpec::new(
        "cue",
        "Specific Cue",
        "Jump to a specific cue number",
        cue_command,
    )
    .with_options(vec![OptionSpec::number("value", "Cue Number", 1, 255, 1)])
}

fn cue_command(values: &OptionValues, _toggles: &ToggleState) -> Result<DeviceCommand, AppError> {
    Ok(DeviceCommand::Cue {
        number: values.byte("value")?,
    })
}

pub fn previous_cue() -> ActionSpec {
    ActionSpec::new(
        "previous_cue",
        "Previous Cue",
        "Go to the previous cue",
        |_, _| Ok(DeviceCommand::PreviousCue),
    )
}

pub fn next_cue() -> ActionSpec {
    ActionSpec::new(
        "next_cue",
        "Next Cue",
        "Go to the next cue",
        |_, _| Ok(DeviceCommand::NextCue),
    )
}
