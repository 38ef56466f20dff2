use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::option::OptionCatalog;

/// The shopper's current choice per option group.
///
/// Selections are values: every transition returns a new `Selection` and
/// leaves the previous one untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection {
    entries: BTreeMap<String, String>,
}

/// First choice of every non-empty group
pub fn initialize_selection(catalog: &OptionCatalog) -> Selection {
    let entries = catalog
        .groups()
        .iter()
        .filter_map(|group| {
            group
                .first_choice()
                .map(|choice| (group.name.clone(), choice.label.clone()))
        })
        .collect();

    Selection { entries }
}

/// Replace one group's entry, returning the updated selection
pub fn apply_choice(
    selection: &Selection,
    catalog: &OptionCatalog,
    group_name: &str,
    choice_label: &str,
) -> Result<Selection, SelectionError> {
    if !catalog.contains_group(group_name) {
        return Err(SelectionError::UnknownGroup(group_name.to_string()));
    }

    let mut next = selection.clone();
    next.entries.insert(group_name.to_string(), choice_label.to_string());
    Ok(next)
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, group_name: &str) -> Option<&str> {
        self.entries.get(group_name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(group, label)| (group.as_str(), label.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check every entry names a known group and one of its choices
    pub fn validate(&self, catalog: &OptionCatalog) -> Result<(), SelectionError> {
        for (group_name, label) in self.iter() {
            let group = catalog
                .group(group_name)
                .ok_or_else(|| SelectionError::UnknownGroup(group_name.to_string()))?;

            if group.choice(label).is_none() {
                return Err(SelectionError::UnknownChoice {
                    group: group_name.to_string(),
                    label: label.to_string(),
                });
            }
        }
        Ok(())
    }
}

impl FromIterator<(String, String)> for Selection {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("Unknown option group: {0}")]
    UnknownGroup(String),

    #[error("Unknown choice {label} for option group {group}")]
    UnknownChoice { group: String, label: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::{Choice, OptionGroup, PricingClass};
    use crate::pricing::PricingEngine;
    use settee_shared::Money;

    fn sofa_catalog() -> OptionCatalog {
        OptionCatalog::new(vec![
            OptionGroup::new(
                "Color",
                vec![Choice::included("Blue"), Choice::fixed("Red", Money::from_major(20))],
            ),
            OptionGroup::new(
                "Chaise Length",
                vec![
                    Choice::fixed("Long", Money::from_major(200)),
                    Choice::included("Short"),
                ],
            ),
            OptionGroup::new("Finish", vec![]),
        ])
        .unwrap()
    }

    #[test]
    fn test_initialize_picks_first_choices() {
        let selection = initialize_selection(&sofa_catalog());

        assert_eq!(selection.len(), 2);
        assert_eq!(selection.get("Color"), Some("Blue"));
        assert_eq!(selection.get("Chaise Length"), Some("Long"));
        assert_eq!(selection.get("Finish"), None);
    }

    #[test]
    fn test_initial_total_sums_first_choices() {
        let catalog = sofa_catalog();
        let engine = PricingEngine::default();
        let class = PricingClass::new();

        let selection = initialize_selection(&catalog);
        let expected = Money::checked_sum(
            std::iter::once(Money::from_major(500)).chain(
                catalog
                    .groups()
                    .iter()
                    .filter_map(|group| group.first_choice())
                    .map(|choice| engine.resolve_choice_price(choice, &class).amount()),
            ),
        )
        .unwrap();

        let total = engine.compute_total(Money::from_major(500), &selection, &catalog, &class).unwrap();
        assert_eq!(total, expected);
        assert_eq!(total, Money::from_major(700));
    }

    #[test]
    fn test_apply_choice_replaces_one_entry() {
        let catalog = sofa_catalog();
        let initial = initialize_selection(&catalog);

        let next = apply_choice(&initial, &catalog, "Color", "Red").unwrap();
        assert_eq!(next.get("Color"), Some("Red"));
        assert_eq!(next.get("Chaise Length"), Some("Long"));
        assert_eq!(initial.get("Color"), Some("Blue"));
    }

    #[test]
    fn test_apply_choice_is_idempotent() {
        let catalog = sofa_catalog();
        let engine = PricingEngine::default();
        let class = PricingClass::new();
        let initial = initialize_selection(&catalog);

        let once = apply_choice(&initial, &catalog, "Chaise Length", "Short").unwrap();
        let twice = apply_choice(&once, &catalog, "Chaise Length", "Short").unwrap();

        assert_eq!(once, twice);
        assert_eq!(
            engine.compute_total(Money::from_major(500), &once, &catalog, &class),
            engine.compute_total(Money::from_major(500), &twice, &catalog, &class)
        );
    }

    #[test]
    fn test_apply_choice_unknown_group() {
        let catalog = sofa_catalog();
        let result = apply_choice(&Selection::new(), &catalog, "Legs", "Oak");
        assert_eq!(result, Err(SelectionError::UnknownGroup("Legs".to_string())));
    }

    #[test]
    fn test_end_to_end_color_change() {
        let catalog = OptionCatalog::new(vec![OptionGroup::new(
            "Color",
            vec![Choice::included("Blue"), Choice::fixed("Red", Money::from_major(20))],
        )])
        .unwrap();
        let engine = PricingEngine::default();
        let class = PricingClass::new();
        let base = Money::from_major(500);

        let selection = initialize_selection(&catalog);
        assert_eq!(selection.get("Color"), Some("Blue"));
        assert_eq!(engine.compute_total(base, &selection, &catalog, &class), Ok(Money::from_major(500)));

        let selection = apply_choice(&selection, &catalog, "Color", "Red").unwrap();
        assert_eq!(engine.compute_total(base, &selection, &catalog, &class), Ok(Money::from_major(520)));
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = OptionCatalog::empty();
        let selection = initialize_selection(&catalog);

        assert!(selection.is_empty());
        let total = PricingEngine::default().compute_total(
            Money::from_major(500),
            &selection,
            &catalog,
            &PricingClass::new(),
        );
        assert_eq!(total, Ok(Money::from_major(500)));
    }

    #[test]
    fn test_validate_reports_unknown_choice() {
        let catalog = sofa_catalog();
        let selection = apply_choice(&initialize_selection(&catalog), &catalog, "Color", "Green").unwrap();

        assert_eq!(
            selection.validate(&catalog),
            Err(SelectionError::UnknownChoice {
                group: "Color".to_string(),
                label: "Green".to_string(),
            })
        );
        assert!(initialize_selection(&catalog).validate(&catalog).is_ok());
    }
}
