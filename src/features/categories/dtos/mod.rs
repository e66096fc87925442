mod category_dto;
mod session_dto;
mod sync_dto;
mod version_dto;

pub use category_dto::*;
pub use session_dto::*;
pub use sync_dto::*;
pub use version_dto::*;
