use serde::{Deserialize, Serialize};
use settee_catalog::{PricingError, Selection};
use settee_shared::Money;

/// How a non-positive quantity is handled at the cart boundary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityPolicy {
    #[default]
    Reject,
    ClampToOne,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartConfig {
    #[serde(default)]
    pub quantity_policy: QuantityPolicy,

    /// Attribute carrying the configured total for order fulfillment
    #[serde(default = "default_total_cost_key")]
    pub total_cost_key: String,
}

fn default_total_cost_key() -> String {
    "_total_cost".to_string()
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            quantity_policy: QuantityPolicy::default(),
            total_cost_key: default_total_cost_key(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLineAttribute {
    pub key: String,
    pub value: String,
}

impl CartLineAttribute {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Descriptor handed to the cart service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub merchandise_id: String,
    pub quantity: u32,
    pub attributes: Vec<CartLineAttribute>,
}

impl CartLine {
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }
}

/// Build the cart line for a configured variant.
///
/// The total-cost attribute comes first, followed by one attribute per
/// selection entry in group-name order.
pub fn build_cart_line(
    variant_id: &str,
    quantity: i64,
    total: Money,
    selection: &Selection,
    config: &CartConfig,
) -> Result<CartLine, CartError> {
    let quantity = checked_quantity(quantity, config.quantity_policy)?;

    let mut attributes = Vec::with_capacity(selection.len() + 1);
    attributes.push(CartLineAttribute::new(config.total_cost_key.as_str(), total.to_plain_string()));
    attributes.extend(
        selection
            .iter()
            .map(|(group, label)| CartLineAttribute::new(group, label)),
    );

    Ok(CartLine {
        merchandise_id: variant_id.to_string(),
        quantity,
        attributes,
    })
}

fn checked_quantity(quantity: i64, policy: QuantityPolicy) -> Result<u32, CartError> {
    if quantity <= 0 {
        return match policy {
            QuantityPolicy::Reject => Err(CartError::InvalidQuantity(quantity)),
            QuantityPolicy::ClampToOne => {
                tracing::debug!("Clamping quantity {} to 1", quantity);
                Ok(1)
            }
        };
    }

    u32::try_from(quantity).map_err(|_| CartError::InvalidQuantity(quantity))
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    #[error(transparent)]
    Pricing(#[from] PricingError),
}
