use std::collections::{HashMap, VecDeque};

use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::categories::models::{normalize_name, Category, CategoryRef};

/// Version the draft list is being edited against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditTarget {
    pub version_id: String,
    pub levels_count: i32,
}

/// Fields of a category created in the draft
#[derive(Debug, Clone, Default)]
pub struct NewCategory {
    pub name: Option<String>,
    pub description: Option<String>,
    pub level: i32,
}

/// Partial update of a draft category. Absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub level: Option<i32>,
    pub is_active: Option<bool>,
    /// `Some(None)` moves the category to the root
    pub parent: Option<Option<CategoryRef>>,
}

struct MovePlan {
    new_parent: Option<CategoryRef>,
    delta: i32,
    subtree: Vec<usize>,
}

/// Client-held flat category list plus the bookkeeping needed to sync it:
/// persisted ids removed since the last load, and ids flagged by the last
/// failed completeness check.
#[derive(Debug, Default)]
pub struct DraftEditor {
    target: Option<EditTarget>,
    categories: Vec<Category>,
    deleted_ids: Vec<String>,
    invalid_ids: Vec<CategoryRef>,
}

impl DraftEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(&self) -> Option<&EditTarget> {
        self.target.as_ref()
    }

    pub fn set_target(&mut self, target: Option<EditTarget>) {
        self.target = target;
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn deleted_ids(&self) -> &[String] {
        &self.deleted_ids
    }

    pub fn invalid_ids(&self) -> &[CategoryRef] {
        &self.invalid_ids
    }

    pub fn is_invalid(&self, key: &CategoryRef) -> bool {
        self.invalid_ids.contains(key)
    }

    pub fn find(&self, key: &CategoryRef) -> Option<&Category> {
        self.categories.iter().find(|c| &c.key == key)
    }

    /// Replaces the whole list, as after a fetch
    pub fn replace(&mut self, categories: Vec<Category>) {
        self.categories = categories;
        self.reset_tracking();
    }

    pub fn clear(&mut self) {
        self.categories.clear();
        self.reset_tracking();
    }

    pub fn reset_tracking(&mut self) {
        self.deleted_ids.clear();
        self.invalid_ids.clear();
    }

    pub fn set_invalid(&mut self, ids: Vec<CategoryRef>) {
        self.invalid_ids = ids;
    }

    pub fn clear_invalid(&mut self) {
        self.invalid_ids.clear();
    }

    /// Appends a new category with a fresh temp id and returns that id
    pub fn add_category(
        &mut self,
        parent: Option<CategoryRef>,
        data: NewCategory,
    ) -> Result<CategoryRef> {
        let levels_count = self
            .target
            .as_ref()
            .map(|t| t.levels_count)
            .ok_or(AppError::NoVersionSelected)?;

        if data.level < 1 || data.level > levels_count {
            return Err(AppError::Validation(format!(
                "Level must be between 1 and {}",
                levels_count
            )));
        }

        match &parent {
            Some(parent_ref) => {
                let parent_node = self.find(parent_ref).ok_or_else(|| {
                    AppError::NotFound(format!("Parent category {} not found", parent_ref))
                })?;
                if data.level != parent_node.level + 1 {
                    return Err(AppError::Validation(format!(
                        "A subcategory of a level {} category must be at level {}",
                        parent_node.level,
                        parent_node.level + 1
                    )));
                }
            }
            None if data.level != 1 => {
                return Err(AppError::Validation(
                    "Root categories must be at level 1".to_string(),
                ));
            }
            None => {}
        }

        let name = data
            .name
            .map(|n| n.trim().to_string())
            .unwrap_or_default();
        if !name.is_empty() {
            self.ensure_unique_name(parent.as_ref(), None, &name)?;
        }

        let key = CategoryRef::Pending(Uuid::new_v4());
        self.categories.push(Category {
            key: key.clone(),
            parent,
            name,
            description: data.description,
            level: data.level,
            is_active: true,
        });

        Ok(key)
    }

    /// Merges `patch` into the matching category without any checks.
    /// Returns false (and changes nothing) when no category matches.
    pub fn update_category(&mut self, key: &CategoryRef, patch: CategoryPatch) -> bool {
        let Some(category) = self.categories.iter_mut().find(|c| &c.key == key) else {
            return false;
        };

        if let Some(name) = patch.name {
            category.name = name;
        }
        if let Some(description) = patch.description {
            category.description = description;
        }
        if let Some(level) = patch.level {
            category.level = level;
        }
        if let Some(is_active) = patch.is_active {
            category.is_active = is_active;
        }
        if let Some(parent) = patch.parent {
            category.parent = parent;
        }

        true
    }

    /// Validated update: a new name goes through rename validation and a new
    /// parent through move validation. Nothing is mutated if either check fails.
    pub fn apply_patch(&mut self, key: &CategoryRef, mut patch: CategoryPatch) -> Result<bool> {
        let Some(position) = self.position(key) else {
            return Ok(false);
        };

        if patch.level.is_some() {
            return Err(AppError::BadRequest(
                "Category level follows its parent and cannot be set directly".to_string(),
            ));
        }

        let current = &self.categories[position];
        let renamed = match patch.name.take() {
            Some(name) => Some(clean_name(&name)?),
            None => None,
        };
        let effective_name = renamed.clone().unwrap_or_else(|| current.name.clone());
        let target_parent = match &patch.parent {
            Some(parent) => parent.clone(),
            None => current.parent.clone(),
        };
        let placement_changed = renamed.is_some() || target_parent != current.parent;

        if placement_changed && !effective_name.trim().is_empty() {
            self.ensure_unique_name(target_parent.as_ref(), Some(key), &effective_name)?;
        }

        let move_plan = match patch.parent.take() {
            Some(new_parent) if new_parent != current.parent => {
                Some(self.plan_move(position, new_parent)?)
            }
            _ => None,
        };

        if let Some(plan) = move_plan {
            self.apply_move(position, plan);
        }
        patch.name = renamed;
        Ok(self.update_category(key, patch))
    }

    /// Removes the category. Former children stay in the list and show up as
    /// roots until they are moved or deleted too. A persisted id is recorded
    /// for deletion on the next sync.
    pub fn delete_category(&mut self, key: &CategoryRef) -> bool {
        let Some(position) = self.position(key) else {
            return false;
        };

        let removed = self.categories.remove(position);
        if let CategoryRef::Persisted(id) = &removed.key {
            if !self.deleted_ids.contains(id) {
                self.deleted_ids.push(id.clone());
            }
        }
        self.invalid_ids.retain(|k| k != key);

        true
    }

    fn position(&self, key: &CategoryRef) -> Option<usize> {
        self.categories.iter().position(|c| &c.key == key)
    }

    fn ensure_unique_name(
        &self,
        parent: Option<&CategoryRef>,
        exclude: Option<&CategoryRef>,
        name: &str,
    ) -> Result<()> {
        let normalized = normalize_name(name);
        let duplicate = self
            .categories
            .iter()
            .filter(|c| Some(&c.key) != exclude)
            .filter(|c| c.parent.as_ref() == parent)
            .any(|c| c.normalized_name() == normalized);

        if duplicate {
            return Err(AppError::DuplicateSiblingName(name.trim().to_string()));
        }
        Ok(())
    }

    fn plan_move(&self, position: usize, new_parent: Option<CategoryRef>) -> Result<MovePlan> {
        let levels_count = self
            .target
            .as_ref()
            .map(|t| t.levels_count)
            .ok_or(AppError::NoVersionSelected)?;
        let moving = &self.categories[position];

        let new_level = match &new_parent {
            None => 1,
            Some(parent_ref) => {
                if parent_ref == &moving.key {
                    return Err(AppError::BadRequest(
                        "A category cannot be its own parent".to_string(),
                    ));
                }
                let parent = self.find(parent_ref).ok_or_else(|| {
                    AppError::NotFound(format!("Parent category {} not found", parent_ref))
                })?;
                parent.level + 1
            }
        };

        let subtree = self.subtree_positions(position);
        if let Some(parent_ref) = &new_parent {
            if subtree
                .iter()
                .any(|&i| &self.categories[i].key == parent_ref)
            {
                return Err(AppError::BadRequest(
                    "A category cannot be moved under its own subcategory".to_string(),
                ));
            }
        }

        let delta = new_level - moving.level;
        if subtree
            .iter()
            .any(|&i| self.categories[i].level + delta > levels_count)
        {
            return Err(AppError::Validation(format!(
                "Move would place categories deeper than level {}",
                levels_count
            )));
        }

        Ok(MovePlan {
            new_parent,
            delta,
            subtree,
        })
    }

    fn apply_move(&mut self, position: usize, plan: MovePlan) {
        for &i in &plan.subtree {
            self.categories[i].level += plan.delta;
        }
        self.categories[position].parent = plan.new_parent;
    }

    /// Positions of the category at `root` and all of its descendants
    fn subtree_positions(&self, root: usize) -> Vec<usize> {
        let mut children: HashMap<&CategoryRef, Vec<usize>> = HashMap::new();
        for (i, category) in self.categories.iter().enumerate() {
            if let Some(parent) = &category.parent {
                children.entry(parent).or_default().push(i);
            }
        }

        let mut visited = vec![false; self.categories.len()];
        let mut queue = VecDeque::from([root]);
        let mut subtree = Vec::new();

        while let Some(i) = queue.pop_front() {
            if visited[i] {
                continue;
            }
            visited[i] = true;
            subtree.push(i);
            if let Some(kids) = children.get(&self.categories[i].key) {
                queue.extend(kids.iter().copied());
            }
        }

        subtree
    }
}

fn clean_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(
            "Category name must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}
