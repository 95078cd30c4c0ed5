pub mod cue;
pub mod level;
pub mod playback;
pub mod record;

use super::ActionSpec;

/// Every built-in action, in presentation order.
pub fn all() -> Vec<ActionSpec> {
    vec![
        playback::playback_state(),
        level::intensity(),
        level::speed(),
        cue::cue(),
        cue::previous_cue(),
        cue::next_cue(),
        record::record(),
        level::group_intensity(),
    ]
}
