//! Widget host side: cached timelines and reload requests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::SystemTime;

use super::provider::{Timeline, TimelineEntry, TimelineProvider};

/// Receives "selection changed, rebuild your timeline" requests.
pub trait WidgetReloader: Send + Sync {
    fn reload_timelines(&self, kind: &str);
}

/// Holds the current timeline for one widget kind.
///
/// The timeline is regenerated lazily: after a reload request for this kind
/// or once the cached timeline's reload policy says it has run out.
pub struct WidgetCenter {
    provider: TimelineProvider,
    cache: Mutex<Option<Timeline>>,
    reloads: AtomicUsize,
}

impl WidgetCenter {
    pub fn new(provider: TimelineProvider) -> Self {
        Self {
            provider,
            cache: Mutex::new(None),
            reloads: AtomicUsize::new(0),
        }
    }

    pub fn kind(&self) -> &str {
        self.provider.kind()
    }

    /// Current timeline, regenerating it if needed.
    pub fn timeline(&self, now: SystemTime) -> Timeline {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        match cache.as_ref() {
            Some(timeline) if !timeline.is_expired(now) => timeline.clone(),
            _ => {
                let timeline = self.provider.timeline(now);
                log::debug!(
                    "Generated {} timeline with {} entries",
                    self.kind(),
                    timeline.entries.len()
                );
                *cache = Some(timeline.clone());
                timeline
            }
        }
    }

    /// Entry the widget shows at `now`.
    pub fn current_entry(&self, now: SystemTime) -> Option<TimelineEntry> {
        self.timeline(now).entry_at(now).copied()
    }

    /// Number of reload requests honoured so far.
    pub fn reload_count(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }
}

impl WidgetReloader for WidgetCenter {
    fn reload_timelines(&self, kind: &str) {
        if kind != self.kind() {
            return;
        }
        *self.cache.lock().unwrap_or_else(PoisonError::into_inner) = None;
        self.reloads.fetch_add(1, Ordering::SeqCst);
        log::debug!("Reload requested for {}", kind);
    }
}
