pub mod categories;
pub mod inspection;
