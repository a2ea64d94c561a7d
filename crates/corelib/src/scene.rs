//! Scene graph: lights, an optional model root and an optional ground plane.
//! Nodes live in a dense array; ids are indices and are never reused.

use crate::error::{CoreError, CoreResult};
use crate::light::Light;
use crate::transform::Transform;
use crate::Mat4;

/// Node id (dense, index into the node array).
pub type NodeId = u32;

/// Handle of a mesh uploaded to the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MeshId(pub u32);

/// One drawable piece of a model, positioned relative to the model root.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshPart {
    pub mesh: MeshId,
    pub local: Mat4,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Light(Light),
    Model { parts: Vec<MeshPart> },
    GroundPlane { mesh: MeshId },
}

impl NodeKind {
    fn label(&self) -> &'static str {
        match self {
            NodeKind::Light(_) => "light",
            NodeKind::Model { .. } => "model",
            NodeKind::GroundPlane { .. } => "ground plane",
        }
    }
}

#[derive(Clone, Debug)]
struct Node {
    kind: NodeKind,
    transform: Transform,
}

#[derive(Default)]
pub struct Scene {
    nodes: Vec<Node>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn push(&mut self, kind: NodeKind, transform: Transform) -> NodeId {
        let id = self.nodes.len() as NodeId;
        log::debug!("Scene: attached {} as node {}", kind.label(), id);
        self.nodes.push(Node { kind, transform });
        id
    }

    pub fn add_light(&mut self, light: Light) -> NodeId {
        self.push(NodeKind::Light(light), Transform::identity())
    }

    /// Attach the model root. A scene holds at most one.
    pub fn add_model(&mut self, transform: Transform, parts: Vec<MeshPart>) -> CoreResult<NodeId> {
        if self.model().is_some() {
            return Err(CoreError::DuplicateNode("model"));
        }
        Ok(self.push(NodeKind::Model { parts }, transform))
    }

    /// Attach the ground plane. A scene holds at most one.
    pub fn add_ground_plane(&mut self, transform: Transform, mesh: MeshId) -> CoreResult<NodeId> {
        if self.ground_plane().is_some() {
            return Err(CoreError::DuplicateNode("ground plane"));
        }
        Ok(self.push(NodeKind::GroundPlane { mesh }, transform))
    }

    fn find(&self, pred: impl Fn(&NodeKind) -> bool) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| pred(&n.kind))
            .map(|i| i as NodeId)
    }

    pub fn model(&self) -> Option<NodeId> {
        self.find(|k| matches!(k, NodeKind::Model { .. }))
    }

    pub fn ground_plane(&self) -> Option<NodeId> {
        self.find(|k| matches!(k, NodeKind::GroundPlane { .. }))
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id as usize).map(|n| &n.kind)
    }

    pub fn transform(&self, id: NodeId) -> CoreResult<&Transform> {
        self.nodes
            .get(id as usize)
            .map(|n| &n.transform)
            .ok_or(CoreError::UnknownNode(id))
    }

    /// Mutable access to a transform (for animation).
    pub fn transform_mut(&mut self, id: NodeId) -> CoreResult<&mut Transform> {
        self.nodes
            .get_mut(id as usize)
            .map(|n| &mut n.transform)
            .ok_or(CoreError::UnknownNode(id))
    }

    pub fn lights(&self) -> impl Iterator<Item = &Light> {
        self.nodes.iter().filter_map(|n| match &n.kind {
            NodeKind::Light(l) => Some(l),
            _ => None,
        })
    }

    /// Iterate over (world matrix, mesh) pairs of everything drawable.
    pub fn iter_drawables(&self) -> impl Iterator<Item = (Mat4, MeshId)> + '_ {
        self.nodes.iter().flat_map(|n| {
            let world = n.transform.matrix();
            let items: Vec<(Mat4, MeshId)> = match &n.kind {
                NodeKind::Light(_) => Vec::new(),
                NodeKind::Model { parts } => {
                    parts.iter().map(|p| (world * p.local, p.mesh)).collect()
                }
                NodeKind::GroundPlane { mesh } => vec![(world, *mesh)],
            };
            items
        })
    }
}
