mod category_service;
mod completeness_validator;
mod draft_editor;
mod layout;
mod level_translator;
mod sync_coordinator;
mod tree_builder;
mod version_lifecycle;

pub use category_service::CategoryService;
pub use draft_editor::{CategoryPatch, NewCategory};
pub use level_translator::LevelTranslator;
