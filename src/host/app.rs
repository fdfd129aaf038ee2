//! Application controller tying selection, persistence and the widget together.

use std::sync::Arc;

use super::view::{Render, SpriteView};
use crate::animation::Clock;
use crate::catalog::Catalog;
use crate::schema::{AppConfig, Entity, IdRange, TypeStyles};
use crate::storage::{AssetSource, SelectionStore, StoreError};
use crate::widget::WidgetReloader;

/// Selection errors surfaced to the user.
#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("Please enter a number between {min} and {max}")]
    OutOfRange { min: u32, max: u32 },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Main application state.
///
/// The selection store and widget reloader are injected so the app and the
/// widget share one view of the stored selection.
pub struct App {
    ids: IdRange,
    widget_kind: String,
    catalog: Catalog,
    styles: TypeStyles,
    view: SpriteView,
    store: Arc<dyn SelectionStore>,
    widgets: Arc<dyn WidgetReloader>,
    input_error: Option<String>,
}

impl App {
    /// Build the app and show the stored selection.
    pub fn new(
        config: &AppConfig,
        catalog: Catalog,
        assets: Box<dyn AssetSource>,
        store: Arc<dyn SelectionStore>,
        widgets: Arc<dyn WidgetReloader>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let stored = store.get();
        let initial = if config.ids.contains(stored) {
            stored
        } else {
            log::warn!(
                "Stored selection {} outside {}..={}, using {}",
                stored,
                config.ids.min,
                config.ids.max,
                config.storage.default_id
            );
            // Repair the store so the widget agrees with the app
            if let Err(e) = store.set(config.storage.default_id) {
                log::warn!("Failed to repair stored selection: {}", e);
            }
            config.storage.default_id
        };

        let mut view = SpriteView::new(assets, clock, config.display);
        view.select(initial);

        Self {
            ids: config.ids,
            widget_kind: config.widget.kind.clone(),
            catalog,
            styles: TypeStyles::new(&config.type_colors),
            view,
            store,
            widgets,
            input_error: None,
        }
    }

    /// Currently selected identifier.
    pub fn selected(&self) -> Option<u32> {
        self.view.selected()
    }

    /// Catalog record of the current selection, if the dataset has one.
    pub fn selected_entity(&self) -> Option<&Entity> {
        self.catalog.get(self.view.selected()?)
    }

    /// Persist `id`, switch the view to it and ask the widget to reload.
    ///
    /// The view only changes once the store has accepted `id`, so a failed
    /// write leaves app and widget on the previous selection. Returns false
    /// if `id` was already both shown and stored.
    pub fn select(&mut self, id: u32) -> Result<bool, SelectionError> {
        if !self.ids.contains(id) {
            return Err(self.out_of_range());
        }
        self.input_error = None;

        if self.view.selected() == Some(id) && self.store.get() == id {
            return Ok(false);
        }

        self.store.set(id)?;
        self.view.select(id);
        self.widgets.reload_timelines(&self.widget_kind);
        log::info!("Selected {}", id);
        Ok(true)
    }

    /// Parse typed input and select it.
    ///
    /// Invalid input leaves the selection alone and records the error
    /// message for display.
    pub fn commit_input(&mut self, text: &str) -> Result<u32, SelectionError> {
        let parsed = text
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|id| self.ids.contains(*id));

        let Some(id) = parsed else {
            let error = self.out_of_range();
            self.input_error = Some(error.to_string());
            return Err(error);
        };

        self.select(id)?;
        Ok(id)
    }

    /// Message from the last rejected input, cleared by a valid selection.
    pub fn input_error(&self) -> Option<&str> {
        self.input_error.as_deref()
    }

    pub fn search(&self, query: &str) -> Vec<&Entity> {
        self.catalog.search(query)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn styles(&self) -> &TypeStyles {
        &self.styles
    }

    pub fn view(&self) -> &SpriteView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut SpriteView {
        &mut self.view
    }

    pub fn render(&self) -> Render {
        self.view.render()
    }

    fn out_of_range(&self) -> SelectionError {
        SelectionError::OutOfRange {
            min: self.ids.min,
            max: self.ids.max,
        }
    }
}
