use std::collections::HashMap;

use crate::features::categories::models::{Category, CategoryRef};

/// A category together with the categories that name it as parent
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryNode {
    pub category: Category,
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Builds a forest from the flat draft list.
///
/// Roots and siblings keep their input order. A parent reference that does not
/// resolve to a node in the list makes the node a root. Every input node appears
/// exactly once in the output.
pub fn build_tree(categories: &[Category]) -> Vec<CategoryNode> {
    let mut index: HashMap<&CategoryRef, usize> = HashMap::with_capacity(categories.len());
    for (position, category) in categories.iter().enumerate() {
        index.entry(&category.key).or_insert(position);
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); categories.len()];
    let mut roots = Vec::new();

    for (position, category) in categories.iter().enumerate() {
        let Some(parent) = category.parent.as_ref() else {
            roots.push(position);
            continue;
        };

        match index.get(parent) {
            Some(&parent_position) if parent_position != position => {
                children[parent_position].push(position);
            }
            Some(_) => {
                tracing::warn!(category = %category.key, "Category names itself as parent, showing it as root");
                roots.push(position);
            }
            None => {
                tracing::warn!(
                    category = %category.key,
                    parent = %parent,
                    "Dangling parent reference, showing category as root"
                );
                roots.push(position);
            }
        }
    }

    let mut visited = vec![false; categories.len()];
    let mut forest: Vec<CategoryNode> = roots
        .into_iter()
        .map(|root| materialize(root, categories, &children, &mut visited))
        .collect();

    // Nodes caught in a parent cycle are unreachable from any root
    for position in 0..categories.len() {
        if !visited[position] {
            tracing::warn!(
                category = %categories[position].key,
                "Category is part of a parent cycle, showing it as root"
            );
            forest.push(materialize(position, categories, &children, &mut visited));
        }
    }

    forest
}

fn materialize(
    position: usize,
    categories: &[Category],
    children: &[Vec<usize>],
    visited: &mut [bool],
) -> CategoryNode {
    visited[position] = true;

    let mut nodes = Vec::with_capacity(children[position].len());
    for &child in &children[position] {
        if !visited[child] {
            nodes.push(materialize(child, categories, children, visited));
        }
    }

    CategoryNode {
        category: categories[position].clone(),
        children: nodes,
    }
}
