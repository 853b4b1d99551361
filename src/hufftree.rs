use std::cmp::Ordering;
use std::fmt;
use std::io::{Read, Write};

use log::trace;

use crate::bit_reader::BitReader;
use crate::bit_writer::BitWriter;
use crate::error::{Error, Result};
use crate::frequency::FrequencyTable;
use crate::min_heap::MinHeap;

/// Deepest leaf a byte alphabet can produce (256 leaves in a chain).
pub const MAX_DEPTH: usize = 255;

/// Bits taken by a serialized leaf: marker bit plus the byte.
const LEAF_BITS: usize = 1 + 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuffNode {
    Leaf {
        weight: u64,
        byte: u8,
    },
    /// `right` is only `None` for the root synthesized around a lone symbol.
    Internal {
        weight: u64,
        left: Box<HuffNode>,
        right: Option<Box<HuffNode>>,
    },
}

impl HuffNode {
    pub fn new(byte: u8, weight: u64) -> Self {
        HuffNode::Leaf { weight, byte }
    }

    pub fn weight(&self) -> u64 {
        match self {
            HuffNode::Leaf { weight, .. } => *weight,
            HuffNode::Internal { weight, .. } => *weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, HuffNode::Leaf { .. })
    }

    pub fn merge(a: Self, b: Self) -> Self {
        let weight = a.weight() + b.weight();
        HuffNode::Internal {
            weight,
            left: Box::new(a),
            right: Some(Box::new(b)),
        }
    }

    fn wrap(leaf: Self) -> Self {
        HuffNode::Internal {
            weight: leaf.weight(),
            left: Box::new(leaf),
            right: None,
        }
    }

    fn children(&self) -> impl Iterator<Item = &HuffNode> {
        let (left, right) = match self {
            HuffNode::Leaf { .. } => (None, None),
            HuffNode::Internal { left, right, .. } => (Some(left.as_ref()), right.as_deref()),
        };
        left.into_iter().chain(right)
    }

    fn leaf_count(&self) -> usize {
        match self {
            HuffNode::Leaf { .. } => 1,
            _ => self.children().map(HuffNode::leaf_count).sum(),
        }
    }

    fn depth(&self) -> usize {
        match self {
            HuffNode::Leaf { .. } => 0,
            _ => 1 + self.children().map(HuffNode::depth).max().unwrap_or(0),
        }
    }

    fn bit_length(&self) -> usize {
        match self {
            HuffNode::Leaf { .. } => LEAF_BITS,
            _ => 1 + self.children().map(HuffNode::bit_length).sum::<usize>(),
        }
    }

    /// Pre-order: internal is `0` then left then right, leaf is `1` then
    /// its byte.
    fn write_bits<W: Write>(&self, writer: &mut BitWriter<W>) -> Result<()> {
        match self {
            HuffNode::Leaf { byte, .. } => {
                writer.write_bit(true)?;
                writer.write_byte(*byte)
            }
            HuffNode::Internal { left, right, .. } => {
                writer.write_bit(false)?;
                left.write_bits(writer)?;
                if let Some(right) = right {
                    right.write_bits(writer)?;
                }
                Ok(())
            }
        }
    }
}

/// Heap entry. Equal weights fall back to `sequence`: leaves are numbered
/// in ascending byte order, merged nodes continue the count.
struct Pending {
    node: HuffNode,
    sequence: u32,
}

impl Pending {
    fn key(&self) -> (u64, u32) {
        (self.node.weight(), self.sequence)
    }
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanTree {
    root: HuffNode,
}

impl HuffmanTree {
    /// Build the prefix tree for `frequencies`. Returns `None` when no
    /// symbol is present.
    pub fn build(frequencies: &FrequencyTable) -> Option<Self> {
        let leaves: Vec<Pending> = frequencies
            .iter()
            .enumerate()
            .map(|(i, (byte, weight))| Pending {
                node: HuffNode::new(byte, weight),
                sequence: i as u32,
            })
            .collect();

        if leaves.len() == 1 {
            let leaf = leaves.into_iter().next()?.node;
            return Some(HuffmanTree {
                root: HuffNode::wrap(leaf),
            });
        }

        let mut next_sequence = leaves.len() as u32;
        let mut heap = MinHeap::build(leaves);
        loop {
            let first = heap.extract_min()?;
            let Some(second) = heap.extract_min() else {
                return Some(HuffmanTree { root: first.node });
            };
            heap.insert(Pending {
                node: HuffNode::merge(first.node, second.node),
                sequence: next_sequence,
            });
            next_sequence += 1;
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        Self::build(&FrequencyTable::from_bytes(bytes))
    }

    pub fn root(&self) -> &HuffNode {
        &self.root
    }

    pub fn weight(&self) -> u64 {
        self.root.weight()
    }

    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Number of bits the serialized tree occupies.
    pub fn bit_length(&self) -> usize {
        self.root.bit_length()
    }

    pub fn write_bits<W: Write>(&self, writer: &mut BitWriter<W>) -> Result<()> {
        self.root.write_bits(writer)
    }

    /// Rebuild a tree from exactly `bit_length` serialized bits. Leaf
    /// weights are not stored, so they come back as zero.
    pub fn read_bits<R: Read>(reader: &mut BitReader<R>, bit_length: u16) -> Result<Option<Self>> {
        if bit_length == 0 {
            return Ok(None);
        }

        let mut parser = TreeParser {
            reader,
            remaining: bit_length as usize,
            seen: [false; 256],
        };
        let root = parser
            .node(0)?
            .ok_or_else(|| Error::invalid_structure("empty tree"))?;
        if parser.remaining > 0 {
            return Err(Error::invalid_structure(format!(
                "{} tree bits left after the root was complete",
                parser.remaining
            )));
        }

        trace!(
            "read tree: {} leaves, depth {}",
            root.leaf_count(),
            root.depth()
        );
        Ok(Some(HuffmanTree { root }))
    }
}

struct TreeParser<'a, R> {
    reader: &'a mut BitReader<R>,
    remaining: usize,
    seen: [bool; 256],
}

impl<R: Read> TreeParser<'_, R> {
    /// Parse one subtree, or `None` if the bit budget is already spent.
    fn node(&mut self, depth: usize) -> Result<Option<HuffNode>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        if depth > MAX_DEPTH {
            return Err(Error::invalid_structure(format!(
                "tree deeper than {MAX_DEPTH} levels"
            )));
        }

        let is_leaf = self.reader.read_bit().map_err(|e| e.truncated("tree"))?;
        self.remaining -= 1;

        if is_leaf {
            if self.remaining < 8 {
                return Err(Error::invalid_structure(
                    "leaf value runs past the declared tree length",
                ));
            }
            let byte = self.reader.read_byte().map_err(|e| e.truncated("tree"))?;
            self.remaining -= 8;
            if std::mem::replace(&mut self.seen[byte as usize], true) {
                return Err(Error::invalid_structure(format!(
                    "symbol {byte:#04x} appears twice in the tree"
                )));
            }
            return Ok(Some(HuffNode::new(byte, 0)));
        }

        let left = self
            .node(depth + 1)?
            .ok_or_else(|| Error::invalid_structure("internal node without children"))?;
        let right = self.node(depth + 1)?;
        let weight = left.weight() + right.as_ref().map_or(0, HuffNode::weight);
        Ok(Some(HuffNode::Internal {
            weight,
            left: Box::new(left),
            right: right.map(Box::new),
        }))
    }
}

impl fmt::Display for HuffmanTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn node(f: &mut fmt::Formatter<'_>, n: &HuffNode, depth: usize, label: &str) -> fmt::Result {
            let indent = "  ".repeat(depth);
            match n {
                HuffNode::Leaf { byte, weight } => {
                    writeln!(f, "{indent}{label}-> Leaf {byte:#04x} [weight: {weight}]")
                }
                HuffNode::Internal { weight, left, right } => {
                    writeln!(f, "{indent}{label}-> Internal [weight: {weight}]")?;
                    node(f, left, depth + 1, "L")?;
                    match right {
                        Some(right) => node(f, right, depth + 1, "R"),
                        None => Ok(()),
                    }
                }
            }
        }
        node(f, &self.root, 0, "root")
    }
}
