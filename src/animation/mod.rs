//! Animated sprite decoding and playback.
//!
//! A byte buffer holding a GIF is decoded once into an immutable
//! [`FrameSequence`]; an [`AnimationPlayer`] then loops over it, advancing
//! one frame each time its one-shot timer fires and publishing the current
//! frame to subscribers.
//!
//! ```text
//! bytes ──decode_frames──▶ FrameSequence ──AnimationPlayer::new──▶ Idle | Playing
//!                                                                   │
//!                          poll(): timer due? ──▶ cursor+1 mod len ─┤
//!                                                 publish, re-arm   │
//!                          dispose(): cancel timer, drop frames ──▶ Disposed
//! ```

mod decoder;
mod observer;
mod player;
mod timer;

#[cfg(test)]
pub(crate) mod test_support;

pub use decoder::{
    Bitmap, DEFAULT_FRAME_DELAY, DecodeError, Frame, FrameError, FrameSequence, MAX_CANVAS_PIXELS,
    decode_frames, try_decode_frames,
};
pub use observer::{FrameUpdate, SubscriptionId};
pub use player::{AnimationPlayer, PlaybackState};
pub use timer::{Clock, FrameTimer, ManualClock, SystemClock};
