pub mod command;
pub mod options;

pub use command::{Adjust, DeviceCommand, LevelTarget, PlaybackState};
pub use options::{Choice, OptionKind, OptionSpec, OptionValue, OptionValues, Visibility};
