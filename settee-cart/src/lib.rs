pub mod line;
pub mod picker;

pub use line::{build_cart_line, CartConfig, CartError, CartLine, CartLineAttribute, QuantityPolicy};
pub use picker::{ChoiceView, GroupView, OptionPicker};
