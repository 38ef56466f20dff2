//! Ingestion of the CMS product record.
//!
//! The storefront API delivers each option set as a list of metaobject
//! references whose attributes are loose `{key, value}` field lists. They are
//! indexed and converted into the typed [`OptionCatalog`] once, when the
//! product is loaded.

use serde::Deserialize;
use settee_shared::Money;
use std::collections::HashMap;

use crate::option::{
    BaseVariant, CatalogError, Choice, ConfigurableProduct, OptionCatalog, OptionGroup, PricingClass,
};
use crate::pricing::PricingConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GroupPricing {
    Included,
    Fixed,
    Tiered,
}

struct GroupLayout {
    handle: &'static str,
    group: &'static str,
    label_field: &'static str,
    pricing: GroupPricing,
}

/// Option sets in display order
#[rustfmt::skip]
const OPTION_LAYOUT: [GroupLayout; 9] = [
    GroupLayout { handle: "chaise_side", group: "Chaise Side", label_field: "chaise_side", pricing: GroupPricing::Included },
    GroupLayout { handle: "fabric_options", group: "Color", label_field: "name", pricing: GroupPricing::Tiered },
    GroupLayout { handle: "chaise_length", group: "Chaise Length", label_field: "name", pricing: GroupPricing::Fixed },
    GroupLayout { handle: "total_depth", group: "Total Depth", label_field: "title", pricing: GroupPricing::Fixed },
    GroupLayout { handle: "legs", group: "Finish", label_field: "name", pricing: GroupPricing::Included },
    GroupLayout { handle: "chaise_width", group: "Chaise Width", label_field: "name", pricing: GroupPricing::Fixed },
    GroupLayout { handle: "size", group: "Length", label_field: "name", pricing: GroupPricing::Fixed },
    GroupLayout { handle: "seat_cushions", group: "Total Sofa Cushions", label_field: "name", pricing: GroupPricing::Fixed },
    GroupLayout { handle: "cushion_fill", group: "Cushion Fill", label_field: "name", pricing: GroupPricing::Fixed },
];

const PRICE_ADJUSTMENT: &str = "price_adjustment";

#[derive(Debug, Clone, Deserialize)]
pub struct MetaobjectField {
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub references: Option<ReferenceList>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Metaobject {
    #[serde(default)]
    pub fields: Vec<MetaobjectField>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReferenceList {
    #[serde(default)]
    pub nodes: Vec<Metaobject>,
}

/// A product metafield holding a list of references
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReferencesField {
    #[serde(default)]
    pub references: Option<ReferenceList>,
}

/// A product metafield holding a single reference
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReferenceField {
    #[serde(default)]
    pub reference: Option<Metaobject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VariantNode {
    pub id: String,
    #[serde(default)]
    pub price: Option<PriceNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceNode {
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub currency_code: Option<String>,
}

/// Product record as delivered by the storefront API
#[derive(Debug, Clone, Deserialize)]
pub struct CmsProduct {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub variants: Connection<VariantNode>,
    #[serde(default)]
    pub pricing_class: Option<ReferenceField>,
    /// Every other top-level field; option sets are picked out by handle
    #[serde(flatten)]
    pub metafields: HashMap<String, serde_json::Value>,
}

/// Field list of one metaobject, indexed by key
struct FieldMap<'a> {
    fields: HashMap<&'a str, &'a MetaobjectField>,
}

impl<'a> FieldMap<'a> {
    fn new(metaobject: &'a Metaobject) -> Self {
        Self {
            fields: metaobject.fields.iter().map(|f| (f.key.as_str(), f)).collect(),
        }
    }

    fn value(&self, key: &str) -> Option<&'a str> {
        self.fields.get(key).copied().and_then(|f| f.value.as_deref())
    }

    fn first_reference(&self, key: &str) -> Option<&'a Metaobject> {
        self.fields
            .get(key)
            .copied()
            .and_then(|f| f.references.as_ref())
            .and_then(|refs| refs.nodes.first())
    }

    /// Decimal field; malformed values are logged and treated as absent
    fn amount(&self, key: &str) -> Option<Money> {
        let raw = self.value(key)?;
        match Money::parse(raw) {
            Ok(amount) => Some(amount),
            Err(e) => {
                tracing::warn!("Ignoring {} field {:?}: {}", key, raw, e);
                None
            }
        }
    }
}

/// Parse a product record from JSON text
pub fn parse_product(json: &str, config: &PricingConfig) -> Result<ConfigurableProduct, MetaobjectError> {
    let record: CmsProduct = serde_json::from_str(json)?;
    record.into_product(config)
}

/// Convert an already-decoded JSON value
pub fn product_from_value(value: serde_json::Value, config: &PricingConfig) -> Result<ConfigurableProduct, MetaobjectError> {
    let record: CmsProduct = serde_json::from_value(value)?;
    record.into_product(config)
}

impl CmsProduct {
    pub fn into_product(self, config: &PricingConfig) -> Result<ConfigurableProduct, MetaobjectError> {
        let variant = self.base_variant()?;
        let pricing_class = self.build_pricing_class();

        let mut groups = Vec::new();
        for layout in &OPTION_LAYOUT {
            let Some(nodes) = self.option_nodes(layout.handle)? else {
                continue;
            };

            let choices: Vec<Choice> = nodes
                .nodes
                .iter()
                .filter_map(|node| build_choice(layout, &FieldMap::new(node), config))
                .collect();

            if choices.is_empty() {
                continue;
            }
            groups.push(OptionGroup::new(layout.group, choices));
        }

        let catalog = OptionCatalog::new(groups)?;
        tracing::debug!(
            "Loaded product {:?}: {} option groups, {} pricing tiers",
            self.title,
            catalog.len(),
            pricing_class.len()
        );

        Ok(ConfigurableProduct {
            title: self.title,
            variant,
            catalog,
            pricing_class,
        })
    }

    fn base_variant(&self) -> Result<BaseVariant, MetaobjectError> {
        let first = self.variants.nodes.first().ok_or(MetaobjectError::MissingVariant)?;

        let raw_price = first.price.as_ref().and_then(|p| p.amount.as_deref());
        let price = match raw_price.map(Money::parse) {
            Some(Ok(price)) => price,
            Some(Err(e)) => {
                tracing::warn!("Variant {} has unreadable price: {}", first.id, e);
                Money::ZERO
            }
            None => Money::ZERO,
        };

        Ok(BaseVariant {
            merchandise_id: first.id.clone(),
            price,
        })
    }

    fn build_pricing_class(&self) -> PricingClass {
        let mut class = PricingClass::new();
        let Some(reference) = self.pricing_class.as_ref().and_then(|p| p.reference.as_ref()) else {
            return class;
        };

        for field in &reference.fields {
            let Some(raw) = field.value.as_deref() else {
                continue;
            };
            match Money::parse(raw) {
                Ok(amount) => class.insert(field.key.clone(), amount),
                Err(e) => tracing::warn!("Skipping pricing tier {}: {}", field.key, e),
            }
        }
        class
    }

    fn option_nodes(&self, handle: &str) -> Result<Option<ReferenceList>, MetaobjectError> {
        let Some(raw) = self.metafields.get(handle) else {
            return Ok(None);
        };
        if raw.is_null() {
            return Ok(None);
        }

        let field: ReferencesField =
            serde_json::from_value(raw.clone()).map_err(|source| MetaobjectError::InvalidReferences {
                handle: handle.to_string(),
                source,
            })?;
        Ok(field.references)
    }
}

fn build_choice(layout: &GroupLayout, fields: &FieldMap<'_>, config: &PricingConfig) -> Option<Choice> {
    let Some(label) = fields.value(layout.label_field) else {
        tracing::warn!("Skipping {} entry without {} field", layout.handle, layout.label_field);
        return None;
    };

    let choice = match layout.pricing {
        GroupPricing::Included => Choice::included(label),
        GroupPricing::Fixed => match fields.amount(PRICE_ADJUSTMENT) {
            Some(amount) if amount.is_positive() => Choice::fixed(label, amount),
            _ => Choice::included(label),
        },
        GroupPricing::Tiered => {
            let tier = fields
                .first_reference("tier_option")
                .and_then(|tier_option| FieldMap::new(tier_option).value("type"));

            match tier {
                Some(tier) if tier == config.standard_tier_key => Choice::included(label),
                Some(tier) => {
                    let discount = (fields.value("discount") == Some("true"))
                        .then(|| fields.amount(PRICE_ADJUSTMENT).unwrap_or(Money::ZERO));
                    Choice::tiered(label, tier, discount)
                }
                // No tier assigned: listed without a price
                None => Choice::unpriced(label),
            }
        }
    };
    Some(choice)
}

#[derive(Debug, thiserror::Error)]
pub enum MetaobjectError {
    #[error("Invalid product payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Invalid references for {handle}: {source}")]
    InvalidReferences {
        handle: String,
        source: serde_json::Error,
    },

    #[error("Product has no variants")]
    MissingVariant,

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
