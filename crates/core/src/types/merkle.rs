use serde::{Deserialize, Serialize};

/// Node of a Merkle tree as computed and returned by the backend.
///
/// The client treats the tree as read-only payload data: hashes are displayed,
/// never recomputed or verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleNode {
    pub hash: String,
    #[serde(default)]
    pub left: Option<Box<MerkleNode>>,
    #[serde(default)]
    pub right: Option<Box<MerkleNode>>,
    #[serde(default)]
    pub product_id: Option<String>,
}

impl MerkleNode {
    #[must_use]
    pub fn leaf(hash: impl Into<String>, product_id: Option<String>) -> Self {
        Self {
            hash: hash.into(),
            left: None,
            right: None,
            product_id,
        }
    }

    #[must_use]
    pub fn branch(hash: impl Into<String>, left: Option<MerkleNode>, right: Option<MerkleNode>) -> Self {
        Self {
            hash: hash.into(),
            left: left.map(Box::new),
            right: right.map(Box::new),
            product_id: None,
        }
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Left then right, skipping absent children
    pub fn children(&self) -> impl Iterator<Item = &MerkleNode> {
        self.left.iter().chain(self.right.iter()).map(AsRef::as_ref)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleLeaf {
    pub product_id: String,
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleTreeResponse {
    #[serde(default)]
    pub merkle_root: Option<String>,
    #[serde(default)]
    pub leaves: Vec<MerkleLeaf>,
    #[serde(default)]
    pub tree: Option<MerkleNode>,
    #[serde(default)]
    pub message: Option<String>,
}
