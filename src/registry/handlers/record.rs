use crate::error::AppError;
use crate::model::{DeviceCommand, OptionValues};
use crate::registry::ActionSpec;
use crate::state::ToggleState;

pub fn record() -> ActionSpec {
    ActionSpec::new("record", "Record", "Start/stop recording", record_command)
}

/// `stop` while recording, `record` otherwise. The toggle itself only moves
/// once the device has accepted the command (see `ToggleState::commit`).
fn record_command(_values: &OptionValues, toggles: &ToggleState) -> Result<DeviceCommand, AppError> {
    if toggles.recording() {
        Ok(DeviceCommand::STOP)
    } else {
        Ok(DeviceCommand::Record)
    }
}
