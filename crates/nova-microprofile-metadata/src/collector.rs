use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::{ItemHint, ItemMetadata, ProjectInfo};

/// Accumulates properties and hints, keeping the first descriptor seen for each
/// name and preserving insertion order.
///
/// A later descriptor with an already collected name is dropped even when its
/// metadata differs.
#[derive(Debug, Default)]
pub struct PropertiesCollector {
    properties: IndexMap<String, ItemMetadata>,
    hints: IndexMap<String, ItemHint>,
}

impl PropertiesCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the property was added.
    pub fn add_item_metadata(&mut self, item: ItemMetadata) -> bool {
        match self.properties.entry(item.name.clone()) {
            Entry::Occupied(_) => {
                tracing::trace!(
                    target = "nova.microprofile",
                    property = %item.name,
                    "dropping duplicate property"
                );
                false
            }
            Entry::Vacant(entry) => {
                entry.insert(item);
                true
            }
        }
    }

    /// Returns `true` when the hint was added.
    pub fn add_item_hint(&mut self, hint: ItemHint) -> bool {
        match self.hints.entry(hint.name.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(entry) => {
                entry.insert(hint);
                true
            }
        }
    }

    pub fn has_item_hint(&self, name: &str) -> bool {
        self.hints.contains_key(name)
    }

    pub fn into_project_info(self) -> ProjectInfo {
        ProjectInfo {
            project_uri: None,
            properties: self.properties.into_values().collect(),
            hints: self.hints.into_values().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ValueHint;
    use pretty_assertions::assert_eq;

    fn item(name: &str, source_type: &str) -> ItemMetadata {
        let mut item = ItemMetadata::new(name, "int");
        item.source_type = Some(source_type.to_string());
        item
    }

    #[test]
    fn first_descriptor_wins_and_order_is_preserved() {
        let mut collector = PropertiesCollector::new();
        assert!(collector.add_item_metadata(item("b", "First")));
        assert!(collector.add_item_metadata(item("a", "First")));
        assert!(!collector.add_item_metadata(item("b", "Second")));

        let info = collector.into_project_info();
        let names: Vec<_> = info.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(
            info.property("b").and_then(|p| p.source_type.as_deref()),
            Some("First")
        );
    }

    #[test]
    fn hints_are_deduplicated_by_name() {
        let hint = |desc: Option<&str>| ItemHint {
            name: "E".into(),
            description: desc.map(str::to_string),
            source_type: None,
            is_enum: true,
            binary: false,
            values: vec![ValueHint::new("A")],
        };

        let mut collector = PropertiesCollector::new();
        assert!(collector.add_item_hint(hint(Some("first"))));
        assert!(!collector.add_item_hint(hint(Some("second"))));
        assert!(collector.has_item_hint("E"));

        let info = collector.into_project_info();
        assert_eq!(info.hints.len(), 1);
        assert_eq!(info.hints[0].description.as_deref(), Some("first"));
    }
}
