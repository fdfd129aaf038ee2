//! Host view binding one live player to the current selection.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use crate::animation::{AnimationPlayer, Bitmap, Clock};
use crate::schema::DisplayConfig;
use crate::storage::AssetSource;

/// Text shown when there is no sprite to play.
pub const FALLBACK_MESSAGE: &str = "Failed to load GIF!";

/// Where a sprite lands inside the display box, in display points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Placement {
    /// Centre an image in a box.
    ///
    /// The natural size is the pixel size divided by `scale`; images larger
    /// than the box are shrunk uniformly until they fit, smaller ones keep
    /// their natural size.
    pub fn fit(image_width: u32, image_height: u32, scale: f32, box_width: f32, box_height: f32) -> Self {
        let natural_w = image_width as f32 / scale;
        let natural_h = image_height as f32 / scale;

        let shrink = if natural_w > 0.0 && natural_h > 0.0 {
            (box_width / natural_w).min(box_height / natural_h).min(1.0)
        } else {
            1.0
        };

        let width = natural_w * shrink;
        let height = natural_h * shrink;
        Self {
            x: (box_width - width) / 2.0,
            y: (box_height - height) / 2.0,
            width,
            height,
        }
    }
}

/// What the host should draw right now.
#[derive(Debug, Clone)]
pub enum Render {
    Sprite {
        bitmap: Arc<Bitmap>,
        frame_index: usize,
        placement: Placement,
    },
    Fallback {
        message: &'static str,
    },
}

impl Render {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Render::Fallback { .. })
    }
}

/// Last frame published by the live player.
#[derive(Debug, Default)]
struct Shown {
    frame_index: usize,
    bitmap: Option<Arc<Bitmap>>,
    publications: u64,
}

/// Displays the sprite of the selected identifier.
///
/// Holds at most one live [`AnimationPlayer`]. Changing the selection
/// disposes the old player and builds a fresh one from newly resolved
/// bytes; sequences are never patched in place.
pub struct SpriteView {
    assets: Box<dyn AssetSource>,
    clock: Arc<dyn Clock>,
    display: DisplayConfig,
    selected: Option<u32>,
    player: Option<AnimationPlayer>,
    shown: Rc<RefCell<Shown>>,
}

impl SpriteView {
    pub fn new(assets: Box<dyn AssetSource>, clock: Arc<dyn Clock>, display: DisplayConfig) -> Self {
        Self {
            assets,
            clock,
            display,
            selected: None,
            player: None,
            shown: Rc::new(RefCell::new(Shown::default())),
        }
    }

    pub fn selected(&self) -> Option<u32> {
        self.selected
    }

    pub fn player(&self) -> Option<&AnimationPlayer> {
        self.player.as_ref()
    }

    pub fn display(&self) -> &DisplayConfig {
        &self.display
    }

    pub fn set_scale(&mut self, scale: f32) {
        if scale > 0.0 {
            self.display.scale = scale;
        }
    }

    /// Show `id`. Returns false if it was already shown.
    pub fn select(&mut self, id: u32) -> bool {
        if self.selected == Some(id) {
            return false;
        }

        if let Some(mut old) = self.player.take() {
            old.dispose();
        }
        self.shown = Rc::new(RefCell::new(Shown::default()));
        self.selected = Some(id);

        self.player = match self.assets.load(id) {
            Some(bytes) => {
                let mut player = AnimationPlayer::from_bytes(&bytes, Arc::clone(&self.clock));
                let shown = Rc::clone(&self.shown);
                player.subscribe(move |update| {
                    let mut shown = shown.borrow_mut();
                    shown.frame_index = update.index;
                    shown.bitmap = Some(Arc::clone(update.frame.image()));
                    shown.publications += 1;
                });
                if !player.has_content() {
                    log::info!("Sprite for {} has no playable frames", id);
                }
                Some(player)
            }
            None => {
                log::info!("No sprite for {}, showing fallback", id);
                None
            }
        };
        true
    }

    /// True when a sprite (rather than the fallback) is on screen.
    pub fn has_content(&self) -> bool {
        self.player.as_ref().is_some_and(AnimationPlayer::has_content)
    }

    /// Frames published to this view since the last selection change.
    pub fn publications(&self) -> u64 {
        self.shown.borrow().publications
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.player.as_ref()?.next_deadline()
    }

    /// Advance the live player if its timer is due.
    pub fn poll(&mut self) -> Option<usize> {
        self.player.as_mut()?.poll()
    }

    /// Cooperative loop: sleep until each frame deadline and advance, until
    /// the clock reaches `end`. Returns the number of frames advanced.
    pub fn run_until(&mut self, end: Duration) -> usize {
        let mut advanced = 0;
        while self.clock.now() < end {
            match self.next_deadline() {
                Some(deadline) if deadline <= end => {
                    self.clock.sleep_until(deadline);
                    if self.poll().is_some() {
                        advanced += 1;
                    }
                }
                _ => {
                    self.clock.sleep_until(end);
                    break;
                }
            }
        }
        advanced
    }

    pub fn render(&self) -> Render {
        let shown = self.shown.borrow();
        match &shown.bitmap {
            Some(bitmap) if self.has_content() => Render::Sprite {
                bitmap: Arc::clone(bitmap),
                frame_index: shown.frame_index,
                placement: Placement::fit(
                    bitmap.width(),
                    bitmap.height(),
                    self.display.scale,
                    self.display.box_width,
                    self.display.box_height,
                ),
            },
            _ => Render::Fallback {
                message: FALLBACK_MESSAGE,
            },
        }
    }
}
