use settee_cart::CartConfig;
use settee_catalog::PricingEngine;
use std::sync::Arc;

use crate::app_config::Config;

#[derive(Clone)]
pub struct AppState {
    pub pricing: Arc<PricingEngine>,
    pub cart: Arc<CartConfig>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            pricing: Arc::new(PricingEngine::new(config.pricing.clone())),
            cart: Arc::new(config.cart.clone()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            pricing: Arc::new(PricingEngine::default()),
            cart: Arc::new(CartConfig::default()),
        }
    }
}
