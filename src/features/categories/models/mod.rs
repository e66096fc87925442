mod category;
mod version;

pub use category::*;
pub use version::*;
