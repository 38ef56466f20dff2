use serde::{Deserialize, Serialize};
use settee_shared::Money;

use crate::option::{Choice, ConfigurableProduct, OptionCatalog, PriceRule, PricingClass};
use crate::selection::Selection;

/// What to do when a tiered choice's discount exceeds its tier base
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountPolicy {
    /// Floor the adjustment at zero
    #[default]
    ClampAtZero,

    /// Let the adjustment go negative (discount becomes a credit)
    AllowNegative,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingConfig {
    #[serde(default)]
    pub discount_policy: DiscountPolicy,

    /// Tier key whose fabrics are included in the base price
    #[serde(default = "default_standard_tier_key")]
    pub standard_tier_key: String,
}

fn default_standard_tier_key() -> String {
    "standard".to_string()
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            discount_policy: DiscountPolicy::default(),
            standard_tier_key: default_standard_tier_key(),
        }
    }
}

/// Resolved contribution of one choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "amount", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceAdjustment {
    Included,
    Charged(Money),
    /// Tier missing from the pricing class; shown without a price
    Unpriced,
}

impl PriceAdjustment {
    pub fn amount(self) -> Money {
        match self {
            PriceAdjustment::Charged(amount) => amount,
            PriceAdjustment::Included | PriceAdjustment::Unpriced => Money::ZERO,
        }
    }

    /// Suffix rendered after a choice label: " Included", " +$150" or nothing.
    pub fn display_suffix(self) -> String {
        match self {
            PriceAdjustment::Included => " Included".to_string(),
            PriceAdjustment::Charged(amount) if amount.cents() < 0 => {
                format!(" -${}", Money::ZERO.saturating_sub(amount).to_plain_string())
            }
            PriceAdjustment::Charged(amount) => format!(" +${}", amount.to_plain_string()),
            PriceAdjustment::Unpriced => String::new(),
        }
    }
}

/// Option pricing evaluator
#[derive(Debug, Clone, Default)]
pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    pub fn new(config: PricingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Resolve a single choice against the product's pricing class
    pub fn resolve_choice_price(&self, choice: &Choice, pricing_class: &PricingClass) -> PriceAdjustment {
        match &choice.price_rule {
            PriceRule::Included => PriceAdjustment::Included,
            PriceRule::Fixed { amount } => PriceAdjustment::Charged(*amount),
            PriceRule::Unpriced => PriceAdjustment::Unpriced,
            PriceRule::Tiered { tier, discount } => {
                let Some(tier_base) = pricing_class.get(tier) else {
                    return PriceAdjustment::Unpriced;
                };

                let adjusted = match discount {
                    Some(discount) => tier_base.saturating_sub(*discount),
                    None => tier_base,
                };

                match self.config.discount_policy {
                    DiscountPolicy::ClampAtZero => PriceAdjustment::Charged(adjusted.non_negative()),
                    DiscountPolicy::AllowNegative => PriceAdjustment::Charged(adjusted),
                }
            }
        }
    }

    /// Base price plus every selected choice's adjustment, recomputed from
    /// scratch on each call
    pub fn compute_total(
        &self,
        base_price: Money,
        selection: &Selection,
        catalog: &OptionCatalog,
        pricing_class: &PricingClass,
    ) -> Result<Money, PricingError> {
        let adjustments = selection
            .iter()
            .map(|(group_name, label)| {
                let choice = catalog.group(group_name).and_then(|group| group.choice(label));
                match choice {
                    Some(choice) => self.resolve_choice_price(choice, pricing_class).amount(),
                    None => {
                        tracing::warn!("Selection {}={} not in catalog, pricing as zero", group_name, label);
                        Money::ZERO
                    }
                }
            });

        let total = Money::checked_sum(std::iter::once(base_price).chain(adjustments))
            .ok_or(PricingError::TotalOverflow)?;
        tracing::debug!(
            base = base_price.cents(),
            total = total.cents(),
            "Computed configured price"
        );
        Ok(total)
    }

    /// Total for a product's own base variant and pricing class
    pub fn quote(&self, product: &ConfigurableProduct, selection: &Selection) -> Result<Money, PricingError> {
        self.compute_total(product.variant.price, selection, &product.catalog, &product.pricing_class)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PricingError {
    #[error("Configured price is out of range")]
    TotalOverflow,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::OptionGroup;

    fn fabric_class() -> PricingClass {
        PricingClass::new()
            .with_tier("tier_1", Money::from_major(100))
            .with_tier("tier_2", Money::from_major(250))
    }

    #[test]
    fn test_included_and_fixed() {
        let engine = PricingEngine::default();
        let class = PricingClass::new();

        assert_eq!(
            engine.resolve_choice_price(&Choice::included("Blue"), &class),
            PriceAdjustment::Included
        );
        assert_eq!(
            engine
                .resolve_choice_price(&Choice::fixed("Long", Money::from_major(200)), &class)
                .amount(),
            Money::from_major(200)
        );
    }

    #[test]
    fn test_tiered_discount() {
        let engine = PricingEngine::default();
        let oat = Choice::tiered("Oat", "tier_1", Some(Money::from_major(30)));

        let adjustment = engine.resolve_choice_price(&oat, &fabric_class());
        assert_eq!(adjustment, PriceAdjustment::Charged(Money::from_major(70)));
    }

    #[test]
    fn test_tiered_without_discount() {
        let engine = PricingEngine::default();
        let ink = Choice::tiered("Ink", "tier_2", None);

        assert_eq!(
            engine.resolve_choice_price(&ink, &fabric_class()).amount(),
            Money::from_major(250)
        );
    }

    #[test]
    fn test_missing_tier_is_unpriced() {
        let engine = PricingEngine::default();
        let velvet = Choice::tiered("Velvet", "tier_9", Some(Money::from_major(30)));

        let adjustment = engine.resolve_choice_price(&velvet, &fabric_class());
        assert_eq!(adjustment, PriceAdjustment::Unpriced);
        assert_eq!(adjustment.amount(), Money::ZERO);
        assert_eq!(adjustment.display_suffix(), "");
    }

    #[test]
    fn test_oversized_discount_clamps_by_default() {
        let oat = Choice::tiered("Oat", "tier_1", Some(Money::from_major(150)));

        let clamped = PricingEngine::default().resolve_choice_price(&oat, &fabric_class());
        assert_eq!(clamped.amount(), Money::ZERO);

        let unclamped = PricingEngine::new(PricingConfig {
            discount_policy: DiscountPolicy::AllowNegative,
            ..PricingConfig::default()
        })
        .resolve_choice_price(&oat, &fabric_class());
        assert_eq!(unclamped.amount(), Money::from_major(-50));
        assert_eq!(unclamped.display_suffix(), " -$50");
    }

    #[test]
    fn test_display_suffix() {
        assert_eq!(PriceAdjustment::Included.display_suffix(), " Included");
        assert_eq!(
            PriceAdjustment::Charged(Money::from_major(150)).display_suffix(),
            " +$150"
        );
        assert_eq!(
            PriceAdjustment::Charged(Money::from_cents(9_950)).display_suffix(),
            " +$99.5"
        );
    }

    #[test]
    fn test_compute_total_ignores_unknown_labels() {
        let engine = PricingEngine::default();
        let catalog = OptionCatalog::new(vec![OptionGroup::new(
            "Color",
            vec![Choice::included("Blue"), Choice::fixed("Red", Money::from_major(20))],
        )])
        .unwrap();

        let selection: Selection = [("Color".to_string(), "Green".to_string())].into_iter().collect();
        let total = engine.compute_total(Money::from_major(500), &selection, &catalog, &PricingClass::new());
        assert_eq!(total, Ok(Money::from_major(500)));
    }

    #[test]
    fn test_compute_total_overflow_is_an_error() {
        let engine = PricingEngine::default();
        let catalog = OptionCatalog::new(vec![OptionGroup::new(
            "Chaise Length",
            vec![Choice::fixed("Extended", Money::parse("1000000000000000").unwrap())],
        )])
        .unwrap();
        let selection: Selection = [("Chaise Length".to_string(), "Extended".to_string())]
            .into_iter()
            .collect();

        let base = Money::parse("92000000000000000").unwrap();
        let total = engine.compute_total(base, &selection, &catalog, &PricingClass::new());
        assert_eq!(total, Err(PricingError::TotalOverflow));
    }

    #[test]
    fn test_unpriced_rule() {
        let engine = PricingEngine::default();
        let sample = Choice::unpriced("Sample");

        let adjustment = engine.resolve_choice_price(&sample, &fabric_class());
        assert_eq!(adjustment, PriceAdjustment::Unpriced);
        assert_eq!(adjustment.amount(), Money::ZERO);
    }

    #[test]
    fn test_extreme_discount_does_not_overflow() {
        let oat = Choice::tiered("Oat", "tier_1", Some(Money::from_cents(i64::MAX)));

        let clamped = PricingEngine::default().resolve_choice_price(&oat, &fabric_class());
        assert_eq!(clamped.amount(), Money::ZERO);

        let unclamped = PricingEngine::new(PricingConfig {
            discount_policy: DiscountPolicy::AllowNegative,
            ..PricingConfig::default()
        })
        .resolve_choice_price(&oat, &fabric_class());
        assert!(unclamped.amount().cents() < 0);
    }

    #[test]
    fn test_config_defaults_from_partial_input() {
        let config: PricingConfig = serde_json::from_str(r#"{ "discount_policy": "allow_negative" }"#).unwrap();
        assert_eq!(config.discount_policy, DiscountPolicy::AllowNegative);
        assert_eq!(config.standard_tier_key, "standard");
    }
}
