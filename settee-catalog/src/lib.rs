pub mod option;
pub mod pricing;
pub mod selection;
pub mod metaobject;

pub use option::{BaseVariant, CatalogError, Choice, ConfigurableProduct, OptionCatalog, OptionGroup, PriceRule, PricingClass};
pub use pricing::{DiscountPolicy, PriceAdjustment, PricingConfig, PricingEngine, PricingError};
pub use selection::{apply_choice, initialize_selection, Selection, SelectionError};
pub use metaobject::{parse_product, product_from_value, CmsProduct, MetaobjectError};
