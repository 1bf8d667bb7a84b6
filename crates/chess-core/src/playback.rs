//! Playback sequencer: ply pointer plus the play/pause state machine.
//!
//! The sequencer owns no timer. A driver schedules ticks carrying the
//! [`Sequencer::generation`] they were scheduled for; any command bumps the
//! generation, so a tick scheduled before it is ignored.

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::replay::INITIAL_PLY;

pub const DEFAULT_DELAY: Duration = Duration::from_millis(1000);
/// Shortest accepted inter-move delay.
pub const MIN_DELAY: Duration = Duration::from_millis(50);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
}

#[derive(Clone, Debug)]
pub struct Sequencer {
    len: usize,
    ply: isize,
    state: PlaybackState,
    delay: Duration,
    generation: u64,
}

impl Sequencer {
    pub fn new(len: usize) -> Self {
        Self::with_delay(len, DEFAULT_DELAY)
    }

    pub fn with_delay(len: usize, delay: Duration) -> Self {
        Self {
            len,
            ply: INITIAL_PLY,
            state: PlaybackState::Stopped,
            delay: delay.max(MIN_DELAY),
            generation: 0,
        }
    }

    pub fn ply(&self) -> isize {
        self.ply
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn last_ply(&self) -> isize {
        self.len as isize - 1
    }

    pub fn at_end(&self) -> bool {
        self.ply >= self.last_ply()
    }

    /// Start playing. Returns false when there is nothing left to play.
    pub fn play(&mut self) -> bool {
        if self.is_empty() || self.at_end() {
            debug!(ply = self.ply, "Play ignored at end of game");
            return false;
        }
        self.state = PlaybackState::Playing;
        self.bump();
        true
    }

    pub fn pause(&mut self) {
        self.state = PlaybackState::Stopped;
        self.bump();
    }

    /// Stop and rewind to the initial position.
    pub fn reset(&mut self) {
        self.state = PlaybackState::Stopped;
        self.ply = INITIAL_PLY;
        self.bump();
    }

    /// Swap in a game of `len` plies: stopped, at the initial position.
    ///
    /// The generation keeps counting, so ticks scheduled for the previous
    /// game stay stale.
    pub fn restart(&mut self, len: usize) {
        self.len = len;
        self.reset();
    }

    /// Change the inter-move delay, raised to at least [`MIN_DELAY`].
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay.max(MIN_DELAY);
        self.bump();
    }

    pub fn next(&mut self) -> bool {
        self.go_to_ply(self.ply + 1)
    }

    pub fn previous(&mut self) -> bool {
        self.go_to_ply(self.ply - 1)
    }

    pub fn go_to_start(&mut self) -> bool {
        self.go_to_ply(INITIAL_PLY)
    }

    pub fn go_to_end(&mut self) -> bool {
        if self.is_empty() {
            return false;
        }
        self.go_to_ply(self.last_ply())
    }

    /// Move the pointer to `ply`. Out-of-range targets are ignored.
    pub fn go_to_ply(&mut self, ply: isize) -> bool {
        if ply < INITIAL_PLY || ply > self.last_ply() {
            debug!(ply, len = self.len, "Navigation out of range ignored");
            return false;
        }
        self.ply = ply;
        if self.is_playing() && self.at_end() {
            self.state = PlaybackState::Stopped;
        }
        self.bump();
        true
    }

    /// Advance one ply for a tick scheduled at `generation`.
    ///
    /// Stale ticks and ticks while stopped do nothing.
    pub fn tick(&mut self, generation: u64) -> bool {
        if generation != self.generation || !self.is_playing() {
            debug!(generation, current = self.generation, "Stale tick dropped");
            return false;
        }
        self.next()
    }

    /// Rounded share of the game already shown, 0..=100.
    pub fn progress_percent(&self) -> u8 {
        if self.is_empty() {
            return 0;
        }
        let shown = (self.ply + 1) as f64 / self.len as f64;
        (shown * 100.0).round() as u8
    }

    fn bump(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let seq = Sequencer::new(4);
        assert_eq!(seq.ply(), -1);
        assert_eq!(seq.state(), PlaybackState::Stopped);
        assert_eq!(seq.delay(), Duration::from_millis(1000));
        assert_eq!(seq.progress_percent(), 0);
    }

    #[test]
    fn test_navigation_in_and_out_of_range() {
        let mut seq = Sequencer::new(3);
        assert!(!seq.previous());
        assert!(seq.next());
        assert!(seq.go_to_end());
        assert_eq!(seq.ply(), 2);
        assert!(!seq.next());
        assert!(!seq.go_to_ply(7));
        assert!(!seq.go_to_ply(-2));
        assert_eq!(seq.ply(), 2);
        assert!(seq.go_to_start());
        assert_eq!(seq.ply(), -1);
    }

    #[test]
    fn test_play_requires_remaining_moves() {
        let mut empty = Sequencer::new(0);
        assert!(!empty.play());
        assert!(!empty.go_to_end());

        let mut seq = Sequencer::new(2);
        seq.go_to_end();
        assert!(!seq.play());
        assert_eq!(seq.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_ticks_advance_until_end_then_stop() {
        let mut seq = Sequencer::new(2);
        assert!(seq.play());
        assert!(seq.tick(seq.generation()));
        assert_eq!(seq.ply(), 0);
        assert!(seq.is_playing());
        assert!(seq.tick(seq.generation()));
        assert_eq!(seq.ply(), 1);
        assert_eq!(seq.state(), PlaybackState::Stopped);
        assert!(!seq.tick(seq.generation()));
    }

    #[test]
    fn test_stale_tick_is_ignored() {
        let mut seq = Sequencer::new(5);
        seq.play();
        let scheduled = seq.generation();
        seq.pause();
        assert!(!seq.tick(scheduled));
        assert_eq!(seq.ply(), -1);

        seq.play();
        let scheduled = seq.generation();
        seq.next();
        assert!(seq.is_playing());
        assert!(!seq.tick(scheduled));
        assert_eq!(seq.ply(), 0);
    }

    #[test]
    fn test_reset_stops_and_rewinds() {
        let mut seq = Sequencer::new(5);
        seq.go_to_ply(3);
        seq.play();
        seq.reset();
        assert_eq!(seq.ply(), -1);
        assert_eq!(seq.state(), PlaybackState::Stopped);
    }

    #[test]
    fn test_restart_keeps_old_ticks_stale() {
        let mut seq = Sequencer::new(4);
        seq.play();
        let scheduled = seq.generation();
        seq.restart(6);
        assert_eq!(seq.len(), 6);
        assert_eq!(seq.ply(), -1);
        assert_eq!(seq.state(), PlaybackState::Stopped);

        seq.play();
        assert_ne!(seq.generation(), scheduled);
        assert!(!seq.tick(scheduled));
        assert_eq!(seq.ply(), -1);
    }

    #[test]
    fn test_set_delay_invalidates_pending_tick() {
        let mut seq = Sequencer::new(5);
        seq.play();
        let scheduled = seq.generation();
        seq.set_delay(Duration::from_millis(250));
        assert_eq!(seq.delay(), Duration::from_millis(250));
        assert!(!seq.tick(scheduled));

        seq.set_delay(Duration::from_millis(1));
        assert_eq!(seq.delay(), MIN_DELAY);
    }

    #[test]
    fn test_progress_percent() {
        let mut seq = Sequencer::new(3);
        seq.next();
        assert_eq!(seq.progress_percent(), 33);
        seq.next();
        assert_eq!(seq.progress_percent(), 67);
        seq.go_to_end();
        assert_eq!(seq.progress_percent(), 100);
    }
}
