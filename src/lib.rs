//! PocketPal - Animated creature sprites with a shared, persisted selection.
//!
//! The crate decodes animated GIF sprites and plays them back on a per-frame
//! timer, lets a user pick a creature by identifier, persists that choice in
//! a store shared with a home-screen widget, and builds the widget's
//! timeline from it.
//!
//! # Architecture
//!
//! - `animation`: GIF decoding, clocks and the frame player (the core)
//! - `schema`: Configuration and catalog record types
//! - `catalog`: Loading and searching the entity dataset
//! - `storage`: Sprite assets and the shared selection store
//! - `widget`: Widget timeline provider and reload handling
//! - `host`: The sprite view and the application controller
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use pocketpal::{
//!     animation::{AnimationPlayer, Clock, SystemClock},
//!     storage::{AssetSource, DirAssets},
//! };
//!
//! let assets = DirAssets::new("assets/sprites");
//! let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
//!
//! if let Some(bytes) = assets.load(25) {
//!     let mut player = AnimationPlayer::from_bytes(&bytes, Arc::clone(&clock));
//!     player.subscribe(|update| println!("frame {}", update.index));
//!
//!     let end = clock.now() + Duration::from_secs(2);
//!     while let Some(deadline) = player.next_deadline().filter(|d| *d <= end) {
//!         clock.sleep_until(deadline);
//!         player.poll();
//!     }
//! }
//! ```

pub mod animation;
pub mod catalog;
pub mod host;
pub mod schema;
pub mod storage;
pub mod widget;

// Re-export commonly used types
pub use animation::{AnimationPlayer, Frame, FrameSequence, PlaybackState, decode_frames};
pub use host::{App, Render, SpriteView};
pub use schema::{AppConfig, Entity};
