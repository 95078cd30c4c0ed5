use std::fmt;

use serde::{Deserialize, Serialize};

/// Transport states the device accepts as bare command tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    Play,
    Pause,
    Stop,
}

impl PlaybackState {
    pub fn all() -> &'static [PlaybackState] {
        &[Self::Play, Self::Pause, Self::Stop]
    }

    pub fn token(self) -> &'static str {
        match self {
            Self::Play => "play",
            Self::Pause => "pause",
            Self::Stop => "stop",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Play => "Play",
            Self::Pause => "Pause",
            Self::Stop => "Stop",
        }
    }
}

/// How a level command changes its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Adjust {
    Set,
    Increase,
    Decrease,
}

impl Adjust {
    fn suffix(self) -> &'static str {
        match self {
            Self::Set => "",
            Self::Increase => "inc",
            Self::Decrease => "dec",
        }
    }
}

/// What a level command addresses. Groups are numbered 1..=8 on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelTarget {
    Intensity,
    Speed,
    Group(u8),
}

/// A single command for the device's `remote.cgi` endpoint.
///
/// Tokens are only assembled into strings at the transport boundary via
/// [`DeviceCommand::token`] / [`DeviceCommand::query`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCommand {
    Playback { state: PlaybackState },
    Level {
        target: LevelTarget,
        adjust: Adjust,
        value: u8,
    },
    Cue { number: u8 },
    PreviousCue,
    NextCue,
    Record,
}

impl DeviceCommand {
    pub const STOP: DeviceCommand = DeviceCommand::Playback {
        state: PlaybackState::Stop,
    };

    pub fn token(&self) -> String {
        match self {
            Self::Playback { state } => state.token().to_string(),
            Self::Level { target, adjust, .. } => {
                let base = match target {
                    LevelTarget::Intensity => "intensity".to_string(),
                    LevelTarget::Speed => "speed".to_string(),
                    LevelTarget::Group(n) => format!("group{n}"),
                };
                format!("{base}{}", adjust.suffix())
            }
            Self::Cue { .. } => "cue".to_string(),
            Self::PreviousCue => "previous".to_string(),
            Self::NextCue => "next".to_string(),
            Self::Record => "record".to_string(),
        }
    }

    pub fn value(&self) -> Option<u8> {
        match self {
            Self::Level { value, .. } => Some(*value),
            Self::Cue { number } => Some(*number),
            Self::Playback { .. } | Self::PreviousCue | Self::NextCue | Self::Record => None,
        }
    }

    /// The query string sent after `remote.cgi?`: `token` or `token=value`.
    pub fn query(&self) -> String {
        match self.value() {
            Some(v) => format!("{}={v}", self.token()),
            None => self.token(),
        }
    }

    /// True when this is the bare `stop` token, whichever action produced it.
    pub fn is_stop(&self) -> bool {
        *self == Self::STOP
    }
}

impl fmt::Display for DeviceCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.query())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_tokens_take_mode_suffix() {
        let inc = DeviceCommand::Level {
            target: LevelTarget::Intensity,
            adjust: Adjust::Increase,
            value: 26,
        };
        assert_eq!(inc.query(), "intensityinc=26");

        let set = DeviceCommand::Level {
            target: LevelTarget::Intensity,
            adjust: Adjust::Set,
            value: 255,
        };
        assert_eq!(set.query(), "intensity=255");

        let speed = DeviceCommand::Level {
            target: LevelTarget::Speed,
            adjust: Adjust::Decrease,
            value: 10,
        };
        assert_eq!(speed.query(), "speeddec=10");
    }

    #[test]
    fn group_token_carries_group_number() {
        let cmd = DeviceCommand::Level {
            target: LevelTarget::Group(3),
            adjust: Adjust::Decrease,
            value: 10,
        };
        assert_eq!(cmd.token(), "group3dec");
        assert_eq!(cmd.query(), "group3dec=10");
    }

    #[test]
    fn valueless_commands_have_bare_query() {
        assert_eq!(DeviceCommand::NextCue.query(), "next");
        assert_eq!(DeviceCommand::PreviousCue.query(), "previous");
        assert_eq!(DeviceCommand::Record.query(), "record");
        assert_eq!(DeviceCommand::STOP.query(), "stop");
        assert_eq!(DeviceCommand::Cue { number: 1 }.query(), "cue=1");
    }

    #[test]
    fn only_playback_stop_is_stop() {
        assert!(DeviceCommand::STOP.is_stop());
        assert!(!DeviceCommand::Record.is_stop());
        assert!(!DeviceCommand::Playback { state: PlaybackState::Pause }.is_stop());
    }
}
