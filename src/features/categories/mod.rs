//! Versioned category trees for workspace finances.
//!
//! Each workspace keeps expense and income categories in versions. A version
//! fixes how many levels its tree has; exactly one version per type is active.
//! Edits happen on a client-held draft and reach the category store in a
//! single sync call once every branch reaches the last level.
//!
//! ## Level numbering
//!
//! The store numbers levels so that leaves always sit at the maximum depth
//! (5 by default). A version with N levels is shown as `1..=N`; the
//! offset is `max_depth - N`.
//!
//! ## Endpoints
//!
//! All paths are relative to `/api/workspaces/{workspace_id}/{category_type}`.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/state` | Session state |
//! | GET | `/versions` | Reload versions |
//! | POST | `/versions` | Create a version |
//! | PATCH | `/versions/{version_id}` | Rename or describe a version |
//! | POST | `/versions/{version_id}/activate` | Activate a version |
//! | POST | `/versions/{version_id}/select` | Select a version for viewing |
//! | GET | `/categories` | Reload the category list |
//! | POST | `/categories` | Add a draft category |
//! | PATCH | `/categories` | Rename, describe, toggle or move a draft category |
//! | DELETE | `/categories` | Remove a draft category |
//! | GET | `/categories/tree` | Draft as a forest |
//! | GET | `/categories/layout` | Draft positioned for the graph view |
//! | POST | `/editing/start` | Enter edit mode |
//! | POST | `/editing/stop` | Leave edit mode and reload |
//! | POST | `/save` | Validate and sync the draft |

pub mod clients;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use routes::routes;
pub use services::CategoryService;
