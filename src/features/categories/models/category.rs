use std::fmt;

use uuid::Uuid;

use crate::core::error::{AppError, Result};

/// Identity of a category in the draft list.
///
/// A category known to the remote store carries its server-assigned id; a
/// category created during an edit session carries a client-generated temp id
/// until the next successful sync replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CategoryRef {
    Persisted(String),
    Pending(Uuid),
}

impl CategoryRef {
    /// Builds a reference from the wire pair, requiring exactly one half.
    /// An empty `id` counts as absent.
    pub fn from_parts(id: Option<String>, temp_id: Option<Uuid>) -> Result<Self> {
        match Self::parent_from_parts(id, temp_id)? {
            Some(key) => Ok(key),
            None => Err(AppError::BadRequest(
                "Either id or temp_id must be provided".to_string(),
            )),
        }
    }

    /// Like [`CategoryRef::from_parts`], but both halves absent means "no parent".
    pub fn parent_from_parts(id: Option<String>, temp_id: Option<Uuid>) -> Result<Option<Self>> {
        let id = id.filter(|s| !s.is_empty());
        match (id, temp_id) {
            (Some(_), Some(_)) => Err(AppError::BadRequest(
                "Only one of id or temp_id may be provided".to_string(),
            )),
            (Some(id), None) => Ok(Some(CategoryRef::Persisted(id))),
            (None, Some(temp_id)) => Ok(Some(CategoryRef::Pending(temp_id))),
            (None, None) => Ok(None),
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            CategoryRef::Persisted(id) => Some(id.as_str()),
            CategoryRef::Pending(_) => None,
        }
    }

    pub fn temp_id(&self) -> Option<Uuid> {
        match self {
            CategoryRef::Persisted(_) => None,
            CategoryRef::Pending(temp_id) => Some(*temp_id),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, CategoryRef::Pending(_))
    }
}

impl fmt::Display for CategoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryRef::Persisted(id) => f.write_str(id),
            CategoryRef::Pending(temp_id) => write!(f, "{}", temp_id),
        }
    }
}

/// A node of the flat, client-held category list.
/// `level` always uses display numbering (1 = root).
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub key: CategoryRef,
    pub parent: Option<CategoryRef>,
    pub name: String,
    pub description: Option<String>,
    pub level: i32,
    pub is_active: bool,
}

impl Category {
    pub fn is_new(&self) -> bool {
        self.key.is_pending()
    }

    /// Trimmed, lowercased name used for sibling comparisons
    pub fn normalized_name(&self) -> String {
        normalize_name(&self.name)
    }
}

pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
