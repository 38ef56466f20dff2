use serde::{Deserialize, Serialize};
use settee_shared::Money;
use std::collections::HashMap;

/// How a choice contributes to the configured price
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceRule {
    /// No adjustment
    Included,

    /// Flat surcharge
    Fixed { amount: Money },

    /// Shown without a price and contributes nothing (e.g. a fabric with no
    /// tier assigned)
    Unpriced,

    /// Surcharge looked up in the product's pricing class by tier key,
    /// optionally reduced by a per-choice discount
    Tiered {
        tier: String,
        #[serde(default)]
        discount: Option<Money>,
    },
}

/// One selectable value within an option group
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Choice {
    pub label: String,
    pub price_rule: PriceRule,
}

impl Choice {
    pub fn included(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            price_rule: PriceRule::Included,
        }
    }

    pub fn fixed(label: impl Into<String>, amount: Money) -> Self {
        Self {
            label: label.into(),
            price_rule: PriceRule::Fixed { amount },
        }
    }

    pub fn unpriced(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            price_rule: PriceRule::Unpriced,
        }
    }

    pub fn tiered(label: impl Into<String>, tier: impl Into<String>, discount: Option<Money>) -> Self {
        Self {
            label: label.into(),
            price_rule: PriceRule::Tiered {
                tier: tier.into(),
                discount,
            },
        }
    }
}

/// A named axis of product customization ("Color", "Chaise Length")
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OptionGroup {
    pub name: String,
    pub choices: Vec<Choice>,
}

impl OptionGroup {
    pub fn new(name: impl Into<String>, choices: Vec<Choice>) -> Self {
        Self {
            name: name.into(),
            choices,
        }
    }

    pub fn first_choice(&self) -> Option<&Choice> {
        self.choices.first()
    }

    pub fn choice(&self, label: &str) -> Option<&Choice> {
        self.choices.iter().find(|c| c.label == label)
    }
}

/// Ordered option groups with a name index built once at construction
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<OptionGroup>", into = "Vec<OptionGroup>")]
pub struct OptionCatalog {
    groups: Vec<OptionGroup>,
    index: HashMap<String, usize>,
}

impl OptionCatalog {
    pub fn new(groups: Vec<OptionGroup>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(groups.len());
        for (position, group) in groups.iter().enumerate() {
            if index.insert(group.name.clone(), position).is_some() {
                return Err(CatalogError::DuplicateGroup(group.name.clone()));
            }
        }

        Ok(Self { groups, index })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn group(&self, name: &str) -> Option<&OptionGroup> {
        self.index.get(name).map(|&position| &self.groups[position])
    }

    pub fn contains_group(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn groups(&self) -> &[OptionGroup] {
        &self.groups
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }
}

impl PartialEq for OptionCatalog {
    fn eq(&self, other: &Self) -> bool {
        self.groups == other.groups
    }
}

impl TryFrom<Vec<OptionGroup>> for OptionCatalog {
    type Error = CatalogError;

    fn try_from(groups: Vec<OptionGroup>) -> Result<Self, Self::Error> {
        OptionCatalog::new(groups)
    }
}

impl From<OptionCatalog> for Vec<OptionGroup> {
    fn from(catalog: OptionCatalog) -> Self {
        catalog.groups
    }
}

/// Tier key -> base surcharge (fabric grades and the like)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PricingClass {
    tiers: HashMap<String, Money>,
}

impl PricingClass {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tier(mut self, tier: impl Into<String>, amount: Money) -> Self {
        self.insert(tier, amount);
        self
    }

    pub fn insert(&mut self, tier: impl Into<String>, amount: Money) {
        self.tiers.insert(tier.into(), amount);
    }

    pub fn get(&self, tier: &str) -> Option<Money> {
        self.tiers.get(tier).copied()
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}

/// The purchasable variant every configuration is priced against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseVariant {
    pub merchandise_id: String,
    pub price: Money,
}

/// A product as the picker sees it: base variant, option catalog and the
/// pricing class its tiered choices resolve against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurableProduct {
    pub title: String,
    pub variant: BaseVariant,
    pub catalog: OptionCatalog,
    pub pricing_class: PricingClass,
}

/// Catalog construction errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("Duplicate option group: {0}")]
    DuplicateGroup(String),
}
