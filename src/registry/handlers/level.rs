//! Intensity, speed and per-group intensity: one shape, three targets.

use crate::error::AppError;
use crate::model::{Adjust, Choice, DeviceCommand, LevelTarget, OptionSpec, OptionValues};
use crate::registry::ActionSpec;
use crate::state::ToggleState;
use crate::util::parse_choice;

pub const GROUP_COUNT: u8 = 8;

fn mode_option() -> OptionSpec {
    OptionSpec::dropdown(
        "mode",
        "Mode",
        vec![
            Choice::new("set", "Set Value"),
            Choice::new("increase", "Increase"),
            Choice::new("decrease", "Decrease"),
        ],
        "set",
    )
}

fn level_options(value_default: i64, step_default: i64) -> Vec<OptionSpec> {
    vec![
        mode_option(),
        OptionSpec::number("value", "Value", 0, 255, value_default).visible_when("mode", &["set"]),
        OptionSpec::number("step", "Step Value", 0, 255, step_default)
            .visible_when("mode", &["increase", "decrease"]),
    ]
}

/// Pick the adjust mode and the matching amount: `value` for set, `step` otherwise.
fn level_command(target: LevelTarget, values: &OptionValues) -> Result<DeviceCommand, AppError> {
    let adjust: Adjust = parse_choice("mode", values.choice("mode")?)?;
    let value = match adjust {
        Adjust::Set => values.byte("value")?,
        Adjust::Increase | Adjust::Decrease => values.byte("step")?,
    };
    Ok(DeviceCommand::Level {
        target,
        adjust,
        value,
    })
}

pub fn intensity() -> ActionSpec {
    ActionSpec::new(
        "intensity",
        "Intensity",
        "Control master intensity: set to a specific value, increase, or decrease",
        |values, _| level_command(LevelTarget::Intensity, values),
    )
    .with_options(level_options(255, 26))
}

pub fn speed() -> ActionSpec {
    ActionSpec::new(
        "speed",
        "Speed",
        "Control playback speed: set to a specific value, increase, or decrease",
        |values, _| level_command(LevelTarget::Speed, values),
    )
    .with_options(level_options(100, 10))
}

pub fn group_intensity() -> ActionSpec {
    let groups = (1..=GROUP_COUNT)
        .map(|n| Choice::new(n.to_string(), format!("Group {n}")))
        .collect();
    let mut options = vec![OptionSpec::dropdown("group", "Group", groups, "1")];
    options.extend(level_options(100, 26));

    ActionSpec::new(
        "group_intensity",
        "Group Intensity",
        "Control intensity for a specific group (1-8): set to a specific value, increase, or decrease",
        group_command,
    )
    .with_options(options)
}

fn group_command(values: &OptionValues, _toggles: &ToggleState) -> Result<DeviceCommand, AppError> {
    let raw = values.choice("group")?;
    let group = raw
        .parse::<u8>()
        .ok()
        .filter(|n| (1..=GROUP_COUNT).contains(n))
        .ok_or_else(|| AppError::validation(format!("Option 'group' has no choice '{raw}'")))?;
    level_command(LevelTarget::Group(group), values)
}
