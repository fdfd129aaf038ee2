//! Timeline generation for the home-screen widget.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::schema::{AppConfig, IdRange, WidgetConfig};
use crate::storage::SelectionStore;

/// One widget snapshot: what to show from `date` onwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineEntry {
    pub date: SystemTime,
    pub id: u32,
}

/// When the widget host should ask for a fresh timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadPolicy {
    /// After the last entry's date has passed.
    AtEnd,
    /// Only when a reload is requested explicitly.
    Never,
}

/// Forward-looking list of entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    pub entries: Vec<TimelineEntry>,
    pub policy: ReloadPolicy,
}

impl Timeline {
    /// Entry on screen at `now`: the latest one whose date has been reached.
    pub fn entry_at(&self, now: SystemTime) -> Option<&TimelineEntry> {
        self.entries.iter().rev().find(|e| e.date <= now)
    }

    /// True once the policy says this timeline should be regenerated.
    pub fn is_expired(&self, now: SystemTime) -> bool {
        match self.policy {
            ReloadPolicy::AtEnd => self.entries.last().is_none_or(|e| now >= e.date),
            ReloadPolicy::Never => false,
        }
    }
}

/// Builds widget entries from the shared selection store.
pub struct TimelineProvider {
    store: Arc<dyn SelectionStore>,
    config: WidgetConfig,
    ids: IdRange,
    default_id: u32,
}

impl TimelineProvider {
    pub fn new(store: Arc<dyn SelectionStore>, config: &AppConfig) -> Self {
        Self {
            store,
            config: config.widget.clone(),
            ids: config.ids,
            default_id: config.storage.default_id,
        }
    }

    pub fn kind(&self) -> &str {
        &self.config.kind
    }

    /// Entry shown while the widget is first laid out.
    pub fn placeholder(&self, now: SystemTime) -> TimelineEntry {
        self.entry(now)
    }

    /// Single entry for transient previews.
    pub fn snapshot(&self, now: SystemTime) -> TimelineEntry {
        self.entry(now)
    }

    /// `entries` entries `interval` apart, starting at `now`.
    ///
    /// The store is read for every entry so the timeline reflects the
    /// selection as of generation time. Generation stops early at the
    /// first date that is not representable.
    pub fn timeline(&self, now: SystemTime) -> Timeline {
        let interval = self.config.interval();
        let entries = (0..self.config.entries)
            .map_while(|i| {
                let offset = interval.checked_mul(u32::try_from(i).ok()?)?;
                now.checked_add(offset)
            })
            .map(|date| self.entry(date))
            .collect();
        Timeline {
            entries,
            policy: ReloadPolicy::AtEnd,
        }
    }

    fn entry(&self, date: SystemTime) -> TimelineEntry {
        let stored = self.store.get();
        let id = if self.ids.contains(stored) {
            stored
        } else {
            self.default_id
        };
        TimelineEntry { date, id }
    }
}

/// Text lines of the widget view for `entry`.
pub fn render_entry(entry: &TimelineEntry) -> Vec<String> {
    vec![
        "Time:".to_string(),
        format_time(entry.date),
        "Id:".to_string(),
        entry.id.to_string(),
    ]
}

/// `HH:MM` in UTC.
pub fn format_time(time: SystemTime) -> String {
    let secs = time
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs();
    let minutes = (secs / 60) % 60;
    let hours = (secs / 3600) % 24;
    format!("{hours:02}:{minutes:02}")
}
