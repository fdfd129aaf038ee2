//! Entity catalog: the static dataset of selectable creatures.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::schema::{Entity, IdRange};

/// Read every entity from a JSON array on disk.
///
/// A missing or corrupt dataset yields an empty list.
pub fn load_all<P: AsRef<Path>>(path: P) -> Vec<Entity> {
    let path = path.as_ref();
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("Catalog {} unavailable: {}", path.display(), e);
            return Vec::new();
        }
    };
    match serde_json::from_str(&text) {
        Ok(entities) => entities,
        Err(e) => {
            log::warn!("Catalog {} is corrupt: {}", path.display(), e);
            Vec::new()
        }
    }
}

/// Entities within the valid id range, sorted by id.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entities: Vec<Entity>,
}

impl Catalog {
    /// Filter `entities` to `range`, sort by id and drop duplicate ids
    /// (the first occurrence wins).
    pub fn new(entities: Vec<Entity>, range: IdRange) -> Self {
        let mut seen = HashSet::new();
        let mut entities: Vec<Entity> = entities
            .into_iter()
            .filter(|e| range.contains(e.id) && seen.insert(e.id))
            .collect();
        entities.sort_by_key(|e| e.id);
        Self { entities }
    }

    /// Load and filter the dataset at `path`.
    pub fn load<P: AsRef<Path>>(path: P, range: IdRange) -> Self {
        let catalog = Self::new(load_all(path), range);
        log::info!("Catalog loaded: {} entities", catalog.len());
        catalog
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Entity> {
        self.entities
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|i| &self.entities[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    /// Entities matching a free-text query.
    ///
    /// An empty query matches everything. A numeric query matches the exact
    /// id or any id whose zero-padded form starts with it (`"02"` finds
    /// 20..=29). Otherwise the query matches a case-insensitive substring of
    /// the name or an exact type tag.
    pub fn search(&self, query: &str) -> Vec<&Entity> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.entities.iter().collect();
        }

        if query.bytes().all(|b| b.is_ascii_digit()) {
            let exact = query.parse::<u32>().ok();
            return self
                .entities
                .iter()
                .filter(|e| Some(e.id) == exact || format!("{:03}", e.id).starts_with(&query))
                .collect();
        }

        self.entities
            .iter()
            .filter(|e| {
                e.name.to_lowercase().contains(&query)
                    || e.types.iter().any(|t| t.eq_ignore_ascii_case(&query))
            })
            .collect()
    }
}
