pub mod category;
pub mod expense;

pub use category::Category;
pub use expense::ExpenseRecord;
