//! Read-only inspection of archived workspaces.
//!
//! While a workspace is inspected, every mutating call the category store
//! client would send to that workspace is refused before it leaves the
//! process. Activation calls stay allowed.

pub mod dtos;
pub mod handlers;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::InspectionService;
