//! Timer-driven playback of a decoded frame sequence.

use std::sync::Arc;
use std::time::Duration;

use super::decoder::{Frame, FrameSequence, decode_frames};
use super::observer::{FrameUpdate, Observers, SubscriptionId};
use super::timer::{Clock, FrameTimer};

/// Playback state of an [`AnimationPlayer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing to play; no timer is ever armed.
    Idle,
    /// Cursor valid, timer armed for the current frame.
    Playing,
    /// Torn down. Terminal.
    Disposed,
}

/// Loops a [`FrameSequence`] forever, one frame per timer fire.
///
/// The player owns its timer: a single one-shot deadline that is re-armed
/// after every fire and cancelled by [`dispose`](Self::dispose). The host
/// drives it by calling [`poll`](Self::poll) from its own loop, typically
/// after sleeping until [`next_deadline`](Self::next_deadline).
///
/// Usage:
/// ```ignore
/// let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
/// let mut player = AnimationPlayer::from_bytes(&bytes, Arc::clone(&clock));
/// player.subscribe(|update| println!("frame {}", update.index));
///
/// while let Some(deadline) = player.next_deadline() {
///     clock.sleep_until(deadline);
///     player.poll();
/// }
/// ```
pub struct AnimationPlayer {
    frames: FrameSequence,
    cursor: usize,
    state: PlaybackState,
    timer: FrameTimer,
    clock: Arc<dyn Clock>,
    observers: Observers,
}

impl AnimationPlayer {
    /// Start playing `frames` immediately, or go idle if there are none.
    pub fn new(frames: FrameSequence, clock: Arc<dyn Clock>) -> Self {
        let mut player = Self {
            frames,
            cursor: 0,
            state: PlaybackState::Idle,
            timer: FrameTimer::new(),
            clock,
            observers: Observers::default(),
        };

        if let Some(delay) = player.frames.get(0).map(Frame::delay) {
            player.state = PlaybackState::Playing;
            player.publish();
            player.timer.arm(player.clock.now(), delay);
            log::debug!(
                "Playing {} frames ({:?} per loop)",
                player.frames.len(),
                player.frames.total_duration()
            );
        } else {
            log::debug!("Nothing to play, player idle");
        }

        player
    }

    /// Decode `bytes` and start playing.
    pub fn from_bytes(bytes: &[u8], clock: Arc<dyn Clock>) -> Self {
        Self::new(decode_frames(bytes), clock)
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// True while there is a frame to show.
    pub fn has_content(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Index of the current frame while playing.
    pub fn cursor(&self) -> Option<usize> {
        self.has_content().then_some(self.cursor)
    }

    pub fn current_frame(&self) -> Option<&Frame> {
        if self.has_content() {
            self.frames.get(self.cursor)
        } else {
            None
        }
    }

    pub fn frames(&self) -> &FrameSequence {
        &self.frames
    }

    /// When the armed timer is due, if one is armed.
    pub fn next_deadline(&self) -> Option<Duration> {
        if self.has_content() {
            self.timer.deadline()
        } else {
            None
        }
    }

    /// Register for current-frame publications.
    ///
    /// The current frame, if any, is delivered to the new subscriber right
    /// away; afterwards it sees every advance.
    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&FrameUpdate<'_>) + 'static,
    ) -> SubscriptionId {
        let id = self.observers.add(Box::new(callback));
        if self.has_content()
            && let Some(frame) = self.frames.get(self.cursor)
        {
            self.observers.notify_one(
                id,
                &FrameUpdate {
                    index: self.cursor,
                    frame,
                },
            );
        }
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.remove(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.observers.len()
    }

    /// Fire the timer if it is due.
    ///
    /// Advances by exactly one frame per fire and re-arms from the actual
    /// fire time, so a late poll lengthens the hold instead of skipping
    /// frames. Returns the new cursor if a frame was published.
    pub fn poll(&mut self) -> Option<usize> {
        if self.state != PlaybackState::Playing {
            return None;
        }

        let now = self.clock.now();
        if !self.timer.fire_if_due(now) {
            return None;
        }

        self.cursor = (self.cursor + 1) % self.frames.len();
        self.publish();

        let delay = self.frames.get(self.cursor).map(Frame::delay)?;
        self.timer.arm(now, delay);
        Some(self.cursor)
    }

    /// Cancel the timer and release the frames and subscribers.
    ///
    /// Safe to call more than once; the player never publishes again.
    pub fn dispose(&mut self) {
        if self.state == PlaybackState::Disposed {
            return;
        }
        self.timer.cancel();
        self.observers.clear();
        self.frames = FrameSequence::empty();
        self.cursor = 0;
        self.state = PlaybackState::Disposed;
    }

    fn publish(&mut self) {
        if let Some(frame) = self.frames.get(self.cursor) {
            self.observers.notify(&FrameUpdate {
                index: self.cursor,
                frame,
            });
        }
    }
}

impl Drop for AnimationPlayer {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for AnimationPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationPlayer")
            .field("state", &self.state)
            .field("cursor", &self.cursor)
            .field("frames", &self.frames.len())
            .field("deadline", &self.timer.deadline())
            .field("observers", &self.observers)
            .finish()
    }
}
