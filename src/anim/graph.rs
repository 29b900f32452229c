//! Scene graph: a tree of nodes with local transforms
//!
//! Nodes live in one arena and refer to their children by [`NodeId`].
//! World transforms are recomputed top-down once per frame from the locals,
//! so a node never keeps a world transform that outlives its parent's.

use super::entity::Transform;

/// Index of a node inside its [`SceneGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// How the animator poses a node each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    /// Local transform never changes
    Group,
    /// Assembly pivot (spin + scroll tilt)
    AssemblyRoot,
    /// Counter-rotating ring of structural parts
    Ring { index: usize },
    /// Drawable node for `scene.entities[index]`
    Entity { index: usize },
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub role: NodeRole,
    pub local: Transform,
    pub world: Transform,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    roots: Vec<NodeId>,
    /// Traversal scratch reused across frames
    stack: Vec<(NodeId, Transform)>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node under `parent` (or as a root)
    pub fn add(
        &mut self,
        name: impl Into<String>,
        role: NodeRole,
        local: Transform,
        parent: Option<NodeId>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(SceneNode {
            name: name.into(),
            role,
            local,
            world: local,
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(p) => self.nodes[p.0].children.push(id),
            None => self.roots.push(id),
        }
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn set_local(&mut self, id: NodeId, local: Transform) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.local = local;
        }
    }

    pub fn world(&self, id: NodeId) -> Option<Transform> {
        self.nodes.get(id.0).map(|n| n.world)
    }

    /// Recompute every world transform from the roots down
    pub fn update_world(&mut self) {
        let mut stack = std::mem::take(&mut self.stack);
        stack.clear();
        stack.extend(self.roots.iter().rev().map(|&id| (id, Transform::IDENTITY)));

        while let Some((id, parent_world)) = stack.pop() {
            let node = &mut self.nodes[id.0];
            node.world = parent_world.mul_transform(&node.local);
            let world = node.world;
            for &child in node.children.iter().rev() {
                stack.push((child, world));
            }
        }
        self.stack = stack;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Quat, Vec3};
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_root_world_equals_local() {
        let mut g = SceneGraph::new();
        let root = g.add(
            "root",
            NodeRole::Group,
            Transform::from_translation(Vec3::new(1.0, 2.0, 3.0)),
            None,
        );
        g.update_world();
        assert_eq!(g.world(root).map(|t| t.translation), Some(Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_child_inherits_parent_rotation() {
        let mut g = SceneGraph::new();
        let root = g.add(
            "root",
            NodeRole::AssemblyRoot,
            Transform::from_rotation(Quat::from_rotation_y(FRAC_PI_2)),
            None,
        );
        let child = g.add(
            "child",
            NodeRole::Entity { index: 0 },
            Transform::from_translation(Vec3::X),
            Some(root),
        );
        g.update_world();
        let world = g.world(child).map(|t| t.translation).unwrap_or_default();
        assert!((world - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn test_three_levels_and_relocalization() {
        let mut g = SceneGraph::new();
        let a = g.add("a", NodeRole::Group, Transform::from_translation(Vec3::X), None);
        let b = g.add("b", NodeRole::Ring { index: 0 }, Transform::from_translation(Vec3::Y), Some(a));
        let c = g.add("c", NodeRole::Entity { index: 0 }, Transform::from_translation(Vec3::Z), Some(b));
        g.update_world();
        assert_eq!(g.world(c).map(|t| t.translation), Some(Vec3::ONE));

        // Moving the parent moves the subtree on the next pass
        g.set_local(a, Transform::IDENTITY);
        g.update_world();
        assert_eq!(g.world(c).map(|t| t.translation), Some(Vec3::new(0.0, 1.0, 1.0)));
    }

    #[test]
    fn test_children_recorded() {
        let mut g = SceneGraph::new();
        let root = g.add("root", NodeRole::Group, Transform::IDENTITY, None);
        for i in 0..3 {
            g.add(format!("n{i}"), NodeRole::Entity { index: i }, Transform::IDENTITY, Some(root));
        }
        assert_eq!(g.get(root).map(|n| n.children.len()), Some(3));
        assert_eq!(g.roots(), &[root]);
        assert_eq!(g.len(), 4);
    }

    #[test]
    fn test_repeated_passes_are_stable() {
        let mut g = SceneGraph::new();
        let a = g.add("a", NodeRole::Group, Transform::from_translation(Vec3::X), None);
        let b = g.add("b", NodeRole::Group, Transform::from_translation(Vec3::Y), None);
        let a1 = g.add("a1", NodeRole::Entity { index: 0 }, Transform::from_translation(Vec3::Z), Some(a));
        let b1 = g.add("b1", NodeRole::Entity { index: 1 }, Transform::from_translation(Vec3::Z), Some(b));

        g.update_world();
        let first: Vec<_> = [a, b, a1, b1].iter().map(|&id| g.world(id)).collect();
        for _ in 0..3 {
            g.update_world();
        }
        let again: Vec<_> = [a, b, a1, b1].iter().map(|&id| g.world(id)).collect();
        assert_eq!(first, again);
        assert_eq!(g.world(b1).map(|t| t.translation), Some(Vec3::new(0.0, 1.0, 1.0)));
    }
}
