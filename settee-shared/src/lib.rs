pub mod money;

pub use money::{Money, MoneyError};
