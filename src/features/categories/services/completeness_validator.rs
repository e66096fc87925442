use std::collections::HashSet;

use crate::core::error::AppError;
use crate::features::categories::models::{Category, CategoryRef};

/// Leaves whose level differs from `levels_count`, in list order.
///
/// A leaf is a category no other category names as parent.
fn find_incomplete(categories: &[Category], levels_count: i32) -> Vec<&Category> {
    let parents: HashSet<&CategoryRef> = categories
        .iter()
        .filter_map(|c| c.parent.as_ref())
        .collect();

    categories
        .iter()
        .filter(|c| !parents.contains(&c.key) && c.level != levels_count)
        .collect()
}

/// Identifiers of every incomplete leaf; empty means the tree may be saved
pub fn validate(categories: &[Category], levels_count: i32) -> Vec<CategoryRef> {
    find_incomplete(categories, levels_count)
        .into_iter()
        .map(|c| c.key.clone())
        .collect()
}

/// Error reported when a save is blocked by the `invalid` leaves
pub fn validation_error(
    categories: &[Category],
    invalid: &[CategoryRef],
    levels_count: i32,
) -> AppError {
    let names: Vec<String> = categories
        .iter()
        .filter(|c| invalid.contains(&c.key))
        .map(|c| c.name.clone())
        .collect();
    let invalid_ids = invalid.iter().map(ToString::to_string).collect();

    AppError::ValidationFailed {
        message: format!(
            "Validation Failed: All branches must reach level {}. Incomplete categories: {}",
            levels_count,
            names.join(", ")
        ),
        names,
        invalid_ids,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn node(key: CategoryRef, parent: Option<CategoryRef>, level: i32, name: &str) -> Category {
        Category {
            key,
            parent,
            name: name.to_string(),
            description: None,
            level,
            is_active: true,
        }
    }

    fn id(value: &str) -> CategoryRef {
        CategoryRef::Persisted(value.to_string())
    }

    #[test]
    fn test_complete_tree_passes() {
        let categories = vec![
            node(id("1"), None, 1, "Food"),
            node(id("2"), Some(id("1")), 2, "Groceries"),
            node(id("3"), Some(id("1")), 2, "Restaurants"),
        ];

        assert!(validate(&categories, 2).is_empty());
    }

    #[test]
    fn test_short_branch_is_reported() {
        let temp = Uuid::new_v4();
        let categories = vec![
            node(id("1"), None, 1, "Food"),
            node(id("2"), Some(id("1")), 2, "Groceries"),
            node(CategoryRef::Pending(temp), None, 1, "Transport"),
        ];

        assert_eq!(validate(&categories, 2), vec![CategoryRef::Pending(temp)]);
    }

    #[test]
    fn test_only_leaves_are_checked() {
        let categories = vec![
            node(id("1"), None, 1, "Food"),
            node(id("2"), Some(id("1")), 2, "Groceries"),
            node(id("3"), Some(id("2")), 3, "Fruit"),
            node(id("4"), Some(id("1")), 2, "Snacks"),
        ];

        assert_eq!(validate(&categories, 3), vec![id("4")]);
    }

    #[test]
    fn test_single_level_root_is_complete() {
        let categories = vec![node(CategoryRef::Pending(Uuid::new_v4()), None, 1, "Misc")];

        assert!(validate(&categories, 1).is_empty());
    }

    #[test]
    fn test_validation_error_lists_names_and_ids() {
        let categories = vec![node(id("1"), None, 1, "Food"), node(id("9"), None, 1, "Rent")];
        let invalid = validate(&categories, 2);

        match validation_error(&categories, &invalid, 2) {
            AppError::ValidationFailed {
                message,
                names,
                invalid_ids,
            } => {
                assert_eq!(names, vec!["Food", "Rent"]);
                assert_eq!(invalid_ids, vec!["1", "9"]);
                assert!(message.contains("level 2"));
                assert!(message.contains("Food, Rent"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
