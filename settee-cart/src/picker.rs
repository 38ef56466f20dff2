use serde::Serialize;
use settee_catalog::{apply_choice, initialize_selection, ConfigurableProduct, PriceAdjustment, PricingEngine, PricingError, Selection, SelectionError};
use settee_shared::Money;

use crate::line::{build_cart_line, CartConfig, CartError, CartLine};

/// One choice as a picker renders it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceView {
    pub label: String,
    pub adjustment: PriceAdjustment,
    /// Label with its price suffix, e.g. "Extended +$200"
    pub display: String,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupView {
    pub name: String,
    pub choices: Vec<ChoiceView>,
}

/// Selection and quantity state of a single product view.
///
/// The expanded and the minimal storefront pickers both drive this type; they
/// differ only in how they render [`OptionPicker::groups`].
#[derive(Debug, Clone)]
pub struct OptionPicker<'a> {
    product: &'a ConfigurableProduct,
    engine: &'a PricingEngine,
    selection: Selection,
    quantity: i64,
}

impl<'a> OptionPicker<'a> {
    pub fn new(product: &'a ConfigurableProduct, engine: &'a PricingEngine) -> Self {
        Self {
            product,
            engine,
            selection: initialize_selection(&product.catalog),
            quantity: 1,
        }
    }

    pub fn product(&self) -> &ConfigurableProduct {
        self.product
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// Handle a choice event
    pub fn choose(&mut self, group_name: &str, choice_label: &str) -> Result<(), SelectionError> {
        self.selection = apply_choice(&self.selection, &self.product.catalog, group_name, choice_label)?;
        tracing::debug!("{}: {} = {}", self.product.title, group_name, choice_label);
        Ok(())
    }

    /// Store the raw quantity input; it is validated when the cart line is built
    pub fn set_quantity(&mut self, quantity: i64) {
        self.quantity = quantity;
    }

    pub fn total(&self) -> Result<Money, PricingError> {
        self.engine.quote(self.product, &self.selection)
    }

    pub fn formatted_total(&self) -> Result<String, PricingError> {
        self.total().map(Money::format_currency)
    }

    pub fn groups(&self) -> Vec<GroupView> {
        self.product
            .catalog
            .groups()
            .iter()
            .map(|group| {
                let current = self.selection.get(&group.name);
                let choices = group
                    .choices
                    .iter()
                    .map(|choice| {
                        let adjustment = self.engine.resolve_choice_price(choice, &self.product.pricing_class);
                        ChoiceView {
                            label: choice.label.clone(),
                            adjustment,
                            display: format!("{}{}", choice.label, adjustment.display_suffix()),
                            selected: current == Some(choice.label.as_str()),
                        }
                    })
                    .collect();

                GroupView {
                    name: group.name.clone(),
                    choices,
                }
            })
            .collect()
    }

    pub fn cart_line(&self, config: &CartConfig) -> Result<CartLine, CartError> {
        build_cart_line(
            &self.product.variant.merchandise_id,
            self.quantity,
            self.total()?,
            &self.selection,
            config,
        )
    }
}
