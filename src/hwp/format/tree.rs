//! Tree assembly from the flat record sequence.
//!
//! Records carry no explicit parent pointer, only a nesting level. A record
//! at level `L` belongs to the nearest preceding record with a smaller level,
//! so a stack of open ancestors is enough to rebuild the hierarchy in one
//! pass. Nodes live in an arena and refer to each other by [`NodeId`].

use std::ops::Index;

use log::{debug, warn};

use super::payload::{decode_payload, Payload};
use super::record::{RecordHeader, RecordIter};
use crate::hwp::types::error::Result;
use crate::hwp::types::models::Version;
use crate::hwp::types::tags::HwpTag;

/// Index of a node inside its [`SectionTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub header: RecordHeader,
    /// Offset of the record header within its canonical stream.
    pub offset: usize,
    pub payload: Payload,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl Node {
    pub fn tag(&self) -> u16 {
        self.header.tag
    }

    pub fn level(&self) -> u16 {
        self.header.level
    }
}

/// The decoded records of one stream, arranged by nesting level.
///
/// The tree itself stands for the stream; records at the shallowest level
/// are its top-level nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionTree {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl SectionTree {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Top-level nodes in stream order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|node| node.children.as_slice()).unwrap_or(&[])
    }

    /// Nodes in stream order. Arena order is stream order, so this is also
    /// the pre-order traversal.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, node)| (NodeId(i), node))
    }

    /// Depth-first pre-order traversal following the child links.
    pub fn preorder(&self) -> Preorder<'_> {
        Preorder {
            tree: self,
            stack: self.roots.iter().rev().copied().collect(),
        }
    }

    /// Siblings sharing `id`'s parent (top-level nodes when it has none).
    fn siblings(&self, id: NodeId) -> &[NodeId] {
        match self.get(id).and_then(|node| node.parent) {
            Some(parent) => self.children(parent),
            None => &self.roots,
        }
    }

    /// Paragraphs owned by a LIST_HEADER node.
    ///
    /// They are the PARA_HEADER siblings that immediately follow the list
    /// header, up to its paragraph count. Returns an empty list when `id` is
    /// not a list header.
    pub fn list_paragraphs(&self, id: NodeId) -> Vec<NodeId> {
        let Some(list) = self.get(id).and_then(|node| node.payload.as_list_header()) else {
            return Vec::new();
        };
        let siblings = self.siblings(id);
        let Some(position) = siblings.iter().position(|&sibling| sibling == id) else {
            return Vec::new();
        };

        siblings[position + 1..]
            .iter()
            .copied()
            .take_while(|&sibling| self[sibling].tag() == HwpTag::ParaHeader.raw())
            .take(list.item_count())
            .collect()
    }

    /// Ids of all nodes carrying the given tag, in stream order.
    pub fn find_by_tag(&self, tag: u16) -> Vec<NodeId> {
        self.nodes()
            .filter(|(_, node)| node.tag() == tag)
            .map(|(id, _)| id)
            .collect()
    }
}

impl Index<NodeId> for SectionTree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

pub struct Preorder<'a> {
    tree: &'a SectionTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = &self.tree[id];
        self.stack.extend(node.children.iter().rev().copied());
        Some((id, node))
    }
}

/// Incremental tree builder driven by record levels.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    tree: SectionTree,
    open: Vec<(u16, NodeId)>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a record below the nearest open record with a smaller level.
    pub fn push(&mut self, header: RecordHeader, offset: usize, payload: Payload) -> NodeId {
        let level = header.level;
        while matches!(self.open.last(), Some(&(open_level, _)) if open_level >= level) {
            self.open.pop();
        }

        let parent = self.open.last().map(|&(parent_level, parent)| {
            if level > parent_level + 1 {
                warn!(
                    "Level gap at offset {}: level {} directly below level {}",
                    offset, level, parent_level
                );
            }
            parent
        });

        let id = NodeId(self.tree.nodes.len());
        self.tree.nodes.push(Node {
            header,
            offset,
            payload,
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(parent) => self.tree.nodes[parent.0].children.push(id),
            None => self.tree.roots.push(id),
        }
        self.open.push((level, id));
        id
    }

    pub fn finish(self) -> SectionTree {
        self.tree
    }
}

/// Decodes every record of a canonical stream and assembles the tree.
///
/// # Errors
/// The first `TruncatedRecord` or `MalformedPayload` error; no partial tree
/// is returned.
pub fn build_tree(data: &[u8], version: Version) -> Result<SectionTree> {
    let mut builder = TreeBuilder::new();
    for record in RecordIter::new(data) {
        let record = record?;
        let payload = decode_payload(record.header.tag, record.payload, record.payload_offset, version)?;
        builder.push(record.header, record.offset, payload);
    }
    let tree = builder.finish();
    debug!("Built tree of {} nodes ({} top-level)", tree.len(), tree.roots().len());
    Ok(tree)
}
