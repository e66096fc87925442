use crate::features::categories::dtos::LayoutNodeDto;
use crate::features::categories::services::tree_builder::CategoryNode;

pub const NODE_WIDTH: f64 = 150.0;
pub const HORIZONTAL_SPACING: f64 = 15.0;
pub const VERTICAL_SPACING: f64 = 60.0;
pub const TOP_OFFSET: f64 = 50.0;

/// Positions every node of the forest for the graph view.
///
/// Subtree widths are measured bottom-up; parents are centered above their
/// children. Consecutive root trees get an extra gap.
pub fn layout_forest(forest: &[CategoryNode]) -> Vec<LayoutNodeDto> {
    let mut current_x = 0.0;
    forest
        .iter()
        .map(|root| {
            let node = layout_node(root, 0, current_x);
            current_x += node.width + HORIZONTAL_SPACING * 2.0;
            node
        })
        .collect()
}

fn layout_node(node: &CategoryNode, depth: usize, start_x: f64) -> LayoutNodeDto {
    let mut children = Vec::with_capacity(node.children.len());
    let mut width = 0.0;

    if node.is_leaf() {
        width = NODE_WIDTH + HORIZONTAL_SPACING;
    } else {
        let mut child_x = start_x;
        for child in &node.children {
            let laid_out = layout_node(child, depth + 1, child_x);
            child_x += laid_out.width;
            width += laid_out.width;
            children.push(laid_out);
        }
    }

    let category = &node.category;
    LayoutNodeDto {
        id: category.key.id().map(String::from),
        temp_id: category.key.temp_id(),
        name: category.name.clone(),
        level: category.level,
        x: start_x + (width - HORIZONTAL_SPACING) / 2.0 - NODE_WIDTH / 2.0,
        y: depth as f64 * VERTICAL_SPACING + TOP_OFFSET,
        subtree_x: start_x,
        width,
        children,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::categories::models::{Category, CategoryRef};
    use crate::features::categories::services::tree_builder::build_tree;

    fn category(id: &str, parent: Option<&str>, level: i32) -> Category {
        Category {
            key: CategoryRef::Persisted(id.to_string()),
            parent: parent.map(|p| CategoryRef::Persisted(p.to_string())),
            name: id.to_string(),
            description: None,
            level,
            is_active: true,
        }
    }

    fn assert_siblings_disjoint(nodes: &[LayoutNodeDto]) {
        for pair in nodes.windows(2) {
            assert!(
                pair[0].subtree_x + pair[0].width <= pair[1].subtree_x,
                "{} overlaps {}",
                pair[0].name,
                pair[1].name
            );
        }
        for node in nodes {
            assert_siblings_disjoint(&node.children);
        }
    }

    #[test]
    fn test_single_leaf() {
        let forest = build_tree(&[category("a", None, 1)]);
        let layout = layout_forest(&forest);

        assert_eq!(layout.len(), 1);
        assert_eq!(layout[0].width, NODE_WIDTH + HORIZONTAL_SPACING);
        assert_eq!(layout[0].x, 0.0);
        assert_eq!(layout[0].y, TOP_OFFSET);
    }

    #[test]
    fn test_parent_centered_over_children() {
        let forest = build_tree(&[
            category("root", None, 1),
            category("a", Some("root"), 2),
            category("b", Some("root"), 2),
        ]);
        let layout = layout_forest(&forest);
        let root = &layout[0];

        assert_eq!(root.width, 2.0 * (NODE_WIDTH + HORIZONTAL_SPACING));
        let children_center =
            (root.children[0].x + root.children[1].x + NODE_WIDTH) / 2.0;
        assert_eq!(root.x + NODE_WIDTH / 2.0, children_center);
        assert_eq!(root.children[0].y, TOP_OFFSET + VERTICAL_SPACING);
    }

    #[test]
    fn test_sibling_subtrees_do_not_overlap() {
        let forest = build_tree(&[
            category("r1", None, 1),
            category("a", Some("r1"), 2),
            category("a1", Some("a"), 3),
            category("a2", Some("a"), 3),
            category("a3", Some("a"), 3),
            category("b", Some("r1"), 2),
            category("c", Some("r1"), 2),
            category("c1", Some("c"), 3),
            category("r2", None, 1),
            category("d", Some("r2"), 2),
        ]);
        let layout = layout_forest(&forest);

        assert_siblings_disjoint(&layout);
        for pair in layout.windows(2) {
            assert_eq!(
                pair[1].subtree_x,
                pair[0].subtree_x + pair[0].width + HORIZONTAL_SPACING * 2.0
            );
        }
    }
}
