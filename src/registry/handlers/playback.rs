use serde::Deserialize;

use crate::error::AppError;
use crate::model::{Choice, DeviceCommand, OptionSpec, OptionValues, PlaybackState};
use crate::registry::ActionSpec;
use crate::state::ToggleState;
use crate::util::parse_choice;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum PlaybackMode {
    Set,
    Toggle,
}

fn state_choices() -> Vec<Choice> {
    PlaybackState::all()
        .iter()
        .map(|s| Choice::new(s.token(), s.label()))
        .collect()
}

pub fn playback_state() -> ActionSpec {
    ActionSpec::new(
        "playback_state",
        "Playback State",
        "Control playback: set a specific state or toggle between two states",
        playback_command,
    )
    .with_options(vec![
        OptionSpec::dropdown(
            "mode",
            "Mode",
            vec![
                Choice::new("set", "Set State"),
                Choice::new("toggle", "Toggle Between States"),
            ],
            "set",
        ),
        OptionSpec::dropdown("state", "State", state_choices(), "play")
            .visible_when("mode", &["set"]),
        OptionSpec::dropdown("toggle_state1", "Toggle State 1", state_choices(), "play")
            .visible_when("mode", &["toggle"]),
        OptionSpec::dropdown("toggle_state2", "Toggle State 2", state_choices(), "pause")
            .visible_when("mode", &["toggle"]),
    ])
}

fn playback_command(values: &OptionValues, toggles: &ToggleState) -> Result<DeviceCommand, AppError> {
    let mode: PlaybackMode = parse_choice("mode", values.choice("mode")?)?;
    let state = match mode {
        PlaybackMode::Set => parse_choice("state", values.choice("state")?)?,
        PlaybackMode::Toggle => {
            let first = parse_choice("toggle_state1", values.choice("toggle_state1")?)?;
            let second = parse_choice("toggle_state2", values.choice("toggle_state2")?)?;
            toggles.toggle_playback(first, second)
        }
    };
    Ok(DeviceCommand::Playback { state })
}
