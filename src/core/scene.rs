//! Minimaler Szenengraph: Oberfläche als Wurzel, darunter Holder und Features.
//!
//! Knoten liegen in einer `IndexMap`, Kinder in Einfüge-Reihenfolge.
//! Neue Teilbäume werden vollständig als `NodeTree` vorbereitet und erst
//! danach in einem Schritt eingehängt.

use glam::DVec3;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::GeoPosition;

/// Eindeutige Knoten-ID innerhalb einer Szene
pub type NodeId = u64;

/// Lokaler Transform relativ zum Elternknoten.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalTransform {
    /// Lokale Position
    pub position: DVec3,
    /// Gier-Rotation in Grad
    pub yaw_degrees: f32,
    /// Lokale Skalierung
    pub scale: DVec3,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            yaw_degrees: 0.0,
            scale: DVec3::ONE,
        }
    }
}

/// Raster-Bindung eines Overlays (Material-Property → Raster-Quelle).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterBinding {
    /// Name der Material-Property, z.B. `_RadiationMap`
    pub property: String,
    /// Herkunft des Rasters (Pfad oder Bezeichner)
    pub source: String,
    /// Breite in Pixeln
    pub width: u32,
    /// Höhe in Pixeln
    pub height: u32,
}

/// Art eines Szenenknotens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    /// Terrain-Oberfläche (Wurzel)
    Surface,
    /// Gruppierungsknoten einer Kategorie, geographisch verankert
    Holder {
        /// Geographische Verankerung
        pin: GeoPosition,
    },
    /// Einzelnes Feature (z.B. Gebäude)
    Feature {
        /// Prefab-Name des Features
        prefab: String,
        /// Höhe aus den Tabellendaten in Metern
        height: f64,
    },
    /// Flächiges Raster-Overlay
    Overlay {
        /// Prefab-Name des Overlays
        prefab: String,
        /// LOD-Gruppengröße in Metern
        lod_size: f64,
        /// Gebundene Raster
        bindings: Vec<RasterBinding>,
    },
}

/// Knoten im Szenengraph
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    /// Anzeigename
    pub name: String,
    /// Elternknoten (`None` nur für die Wurzel)
    pub parent: Option<NodeId>,
    /// Kinder in Einfüge-Reihenfolge
    pub children: Vec<NodeId>,
    /// Lokaler Transform
    pub transform: LocalTransform,
    /// Knotenart
    pub kind: NodeKind,
}

/// ID-freier Teilbaum: Bauplan beim Einfügen, Schnappschuss beim Auslesen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeTree {
    /// Anzeigename
    pub name: String,
    /// Lokaler Transform
    pub transform: LocalTransform,
    /// Knotenart
    pub kind: NodeKind,
    /// Kinder
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeTree>,
}

impl NodeTree {
    /// Erstellt einen Knoten ohne Kinder.
    pub fn new(name: impl Into<String>, transform: LocalTransform, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            transform,
            kind,
            children: Vec::new(),
        }
    }

    /// Anzahl Knoten im Teilbaum (inkl. Wurzel)
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(NodeTree::node_count).sum::<usize>()
    }
}

/// Szenengraph mit genau einer Oberflächen-Wurzel.
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: IndexMap<NodeId, SceneNode>,
    root: NodeId,
    next_id: NodeId,
}

impl Scene {
    /// Erstellt eine Szene mit einer Oberflächen-Wurzel.
    pub fn new(surface_name: impl Into<String>) -> Self {
        let mut nodes = IndexMap::new();
        nodes.insert(
            1,
            SceneNode {
                name: surface_name.into(),
                parent: None,
                children: Vec::new(),
                transform: LocalTransform::default(),
                kind: NodeKind::Surface,
            },
        );
        Self {
            nodes,
            root: 1,
            next_id: 2,
        }
    }

    /// ID der Oberflächen-Wurzel
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Anzahl aller Knoten
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// `true` wenn nur die Wurzel existiert
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Knoten per ID
    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    /// Kinder eines Knotens (leer für unbekannte IDs)
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Direkte Kinder mit dem gegebenen Namen
    pub fn children_named(&self, parent: NodeId, name: &str) -> Vec<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .filter(|id| self.nodes.get(id).is_some_and(|node| node.name == name))
            .collect()
    }

    /// Hängt einen vollständigen Teilbaum unter `parent` ein.
    /// Gibt `None` zurück, wenn `parent` nicht existiert.
    pub fn insert(&mut self, parent: NodeId, tree: NodeTree) -> Option<NodeId> {
        if !self.nodes.contains_key(&parent) {
            return None;
        }
        let id = self.insert_unchecked(parent, tree);
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(id);
        }
        Some(id)
    }

    /// Hängt einen Teilbaum direkt unter der Oberflächen-Wurzel ein.
    pub fn insert_under_root(&mut self, tree: NodeTree) -> NodeId {
        let root = self.root;
        let id = self.insert_unchecked(root, tree);
        if let Some(node) = self.nodes.get_mut(&root) {
            node.children.push(id);
        }
        id
    }

    fn insert_unchecked(&mut self, parent: NodeId, tree: NodeTree) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;

        self.nodes.insert(
            id,
            SceneNode {
                name: tree.name,
                parent: Some(parent),
                children: Vec::with_capacity(tree.children.len()),
                transform: tree.transform,
                kind: tree.kind,
            },
        );

        for child in tree.children {
            let child_id = self.insert_unchecked(id, child);
            if let Some(node) = self.nodes.get_mut(&id) {
                node.children.push(child_id);
            }
        }
        id
    }

    /// Entfernt einen Knoten samt Teilbaum. Die Wurzel kann nicht entfernt werden.
    /// Gibt die Anzahl entfernter Knoten zurück.
    pub fn destroy(&mut self, id: NodeId) -> usize {
        if id == self.root {
            return 0;
        }
        let Some(node) = self.nodes.get(&id) else {
            return 0;
        };
        if let Some(parent) = node.parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|child| *child != id);
        }

        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.shift_remove(&current) {
                stack.extend(node.children);
                removed += 1;
            }
        }
        removed
    }

    /// ID-freier Schnappschuss eines Teilbaums
    pub fn snapshot(&self, id: NodeId) -> Option<NodeTree> {
        let node = self.nodes.get(&id)?;
        Some(NodeTree {
            name: node.name.clone(),
            transform: node.transform,
            kind: node.kind.clone(),
            children: node
                .children
                .iter()
                .filter_map(|child| self.snapshot(*child))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(name: &str) -> NodeTree {
        NodeTree::new(
            name,
            LocalTransform::default(),
            NodeKind::Feature {
                prefab: "Small Building".to_string(),
                height: 4.0,
            },
        )
    }

    fn holder(name: &str, children: usize) -> NodeTree {
        let mut tree = NodeTree::new(
            name,
            LocalTransform::default(),
            NodeKind::Holder {
                pin: GeoPosition::new(1.0, 2.0, 0.0),
            },
        );
        tree.children = (0..children).map(|i| feature(&format!("F{i}"))).collect();
        tree
    }

    #[test]
    fn test_insert_tree_links_parent_and_children() {
        let mut scene = Scene::new("Map");
        let id = scene.insert(scene.root(), holder("Holder", 3)).expect("Wurzel existiert");

        assert_eq!(scene.len(), 5);
        assert_eq!(scene.children(scene.root()), &[id]);
        assert_eq!(scene.children(id).len(), 3);
        let first = scene.children(id)[0];
        assert_eq!(scene.node(first).map(|n| n.parent), Some(Some(id)));
    }

    #[test]
    fn test_destroy_removes_whole_subtree() {
        let mut scene = Scene::new("Map");
        let id = scene.insert(scene.root(), holder("Holder", 2)).expect("Wurzel existiert");

        assert_eq!(scene.destroy(id), 3);
        assert!(scene.is_empty());
        assert!(scene.children(scene.root()).is_empty());
    }

    #[test]
    fn test_root_cannot_be_destroyed() {
        let mut scene = Scene::new("Map");
        assert_eq!(scene.destroy(scene.root()), 0);
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_children_named_and_snapshot() {
        let mut scene = Scene::new("Map");
        scene.insert(scene.root(), holder("A", 1));
        scene.insert(scene.root(), holder("B", 0));
        scene.insert(scene.root(), holder("A", 0));

        assert_eq!(scene.children_named(scene.root(), "A").len(), 2);
        let snapshot = scene.snapshot(scene.root()).expect("Wurzel");
        assert_eq!(snapshot.node_count(), 5);
        assert_eq!(snapshot.children[0].children[0], feature("F0"));
    }

    #[test]
    fn test_insert_under_unknown_parent_fails() {
        let mut scene = Scene::new("Map");
        assert!(scene.insert(99, feature("x")).is_none());
    }
}
