//! Catalog records and the type style table.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// One selectable creature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    #[serde(alias = "displayName")]
    pub name: String,
    /// Category tags, e.g. `["grass", "poison"]`.
    #[serde(default, alias = "tags")]
    pub types: Vec<String>,
}

/// Display style for one type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeStyle {
    pub color: [u8; 3],
}

impl TypeStyle {
    pub fn hex(&self) -> String {
        format!(
            "#{:02X}{:02X}{:02X}",
            self.color[0], self.color[1], self.color[2]
        )
    }
}

/// Style used for tags missing from the table.
pub const FALLBACK_STYLE: TypeStyle = TypeStyle {
    color: [0xA8, 0xA8, 0xA8],
};

const BUILTIN_COLORS: &[(&str, [u8; 3])] = &[
    ("normal", [0xA8, 0xA7, 0x7A]),
    ("fire", [0xEE, 0x81, 0x30]),
    ("water", [0x63, 0x90, 0xF0]),
    ("electric", [0xF7, 0xD0, 0x2C]),
    ("grass", [0x7A, 0xC7, 0x4C]),
    ("ice", [0x96, 0xD9, 0xD6]),
    ("fighting", [0xC2, 0x2E, 0x28]),
    ("poison", [0xA3, 0x3E, 0xA1]),
    ("ground", [0xE2, 0xBF, 0x65]),
    ("flying", [0xA9, 0x8F, 0xF3]),
    ("psychic", [0xF9, 0x55, 0x87]),
    ("bug", [0xA6, 0xB9, 0x1A]),
    ("rock", [0xB6, 0xA1, 0x36]),
    ("ghost", [0x73, 0x57, 0x97]),
    ("dragon", [0x6F, 0x35, 0xFC]),
    ("dark", [0x70, 0x57, 0x46]),
    ("steel", [0xB7, 0xB7, 0xCE]),
    ("fairy", [0xD6, 0x85, 0xAD]),
];

/// Immutable mapping from type tag to display style.
///
/// Built once at startup and then only read.
#[derive(Debug, Clone)]
pub struct TypeStyles {
    styles: HashMap<String, TypeStyle>,
}

impl TypeStyles {
    /// Built-in table overlaid with `overrides` (`"#RRGGBB"` values).
    ///
    /// Unparseable overrides are ignored; config validation rejects them
    /// earlier.
    pub fn new(overrides: &BTreeMap<String, String>) -> Self {
        let mut styles: HashMap<String, TypeStyle> = BUILTIN_COLORS
            .iter()
            .map(|&(name, color)| (name.to_string(), TypeStyle { color }))
            .collect();

        for (name, value) in overrides {
            if let Some(color) = parse_hex_color(value) {
                styles.insert(name.to_lowercase(), TypeStyle { color });
            }
        }

        Self { styles }
    }

    /// Style for a tag, case-insensitive.
    pub fn style_for(&self, type_name: &str) -> TypeStyle {
        self.styles
            .get(&type_name.to_lowercase())
            .copied()
            .unwrap_or(FALLBACK_STYLE)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

impl Default for TypeStyles {
    fn default() -> Self {
        Self::new(&BTreeMap::new())
    }
}

/// Parse `#RRGGBB` (leading `#` optional).
pub fn parse_hex_color(value: &str) -> Option<[u8; 3]> {
    let hex = value.strip_prefix('#').unwrap_or(value);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_accepts_display_name() {
        let entity: Entity =
            serde_json::from_str(r#"{ "id": 25, "displayName": "Pikachu", "types": ["electric"] }"#)
                .unwrap();
        assert_eq!(entity.name, "Pikachu");
        assert_eq!(entity.types, vec!["electric"]);

        let entity: Entity = serde_json::from_str(r#"{ "id": 1, "name": "Bulbasaur" }"#).unwrap();
        assert!(entity.types.is_empty());
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FF8000"), Some([255, 128, 0]));
        assert_eq!(parse_hex_color("00ff00"), Some([0, 255, 0]));
        assert_eq!(parse_hex_color("#FFF"), None);
        assert_eq!(parse_hex_color("#GG0000"), None);
    }

    #[test]
    fn test_styles_lookup_and_override() {
        let mut overrides = BTreeMap::new();
        overrides.insert("Fire".to_string(), "#010203".to_string());
        let styles = TypeStyles::new(&overrides);

        assert_eq!(styles.style_for("FIRE").color, [1, 2, 3]);
        assert_eq!(styles.style_for("water").hex(), "#6390F0");
        assert_eq!(styles.style_for("cosmic"), FALLBACK_STYLE);
        assert_eq!(styles.len(), BUILTIN_COLORS.len());
    }
}
