pub mod rest_store;
pub mod util;

pub use rest_store::RestExpenseStore;
