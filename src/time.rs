//! Tick and game-clock conversions.
//!
//! Dota 2 demos advance at a fixed 30 simulation ticks per second. The
//! in-game clock starts at the horn (the "match started" transition), so a
//! tick before the horn maps to a *negative* game time: the pre-game
//! countdown. All conversions in the engine go through this module.

/// Simulation ticks per second in a recorded match.
pub const TICKS_PER_SECOND: f32 = 30.0;

/// Converts a tick to game time in seconds relative to the match start.
///
/// Pre-horn ticks produce negative values. When the match start has not
/// been detected (`match_start_tick == 0`), game time is measured from the
/// beginning of the recording.
///
/// # Example
///
/// ```
/// use demo_timeline::time::tick_to_game_time;
///
/// // One minute after a horn at tick 30000
/// assert_eq!(tick_to_game_time(31_800, 30_000), 60.0);
/// // Forty seconds before the horn
/// assert_eq!(tick_to_game_time(28_800, 30_000), -40.0);
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn tick_to_game_time(tick: u32, match_start_tick: u32) -> f32 {
    (i64::from(tick) - i64::from(match_start_tick)) as f32 / TICKS_PER_SECOND
}

/// Converts game time in seconds to the corresponding tick.
///
/// Saturates at tick 0 for game times that precede the recording itself.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn game_time_to_tick(game_time: f32, match_start_tick: u32) -> u32 {
    let tick = i64::from(match_start_tick) + (game_time * TICKS_PER_SECOND) as i64;
    tick.max(0) as u32
}

/// Formats game time as a clock string.
///
/// Examples: `-40.0` → `"-0:40"`, `187.0` → `"3:07"`, `0.0` → `"0:00"`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_game_time(seconds: f32) -> String {
    let negative = seconds < 0.0;
    let abs = seconds.abs() as u32;
    let mins = abs / 60;
    let secs = abs % 60;
    if negative {
        format!("-{mins}:{secs:02}")
    } else {
        format!("{mins}:{secs:02}")
    }
}
