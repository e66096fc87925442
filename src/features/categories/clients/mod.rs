mod category_store_client;

pub use category_store_client::*;
