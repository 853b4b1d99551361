use std::collections::{BTreeMap, HashMap};

use bitvec::prelude::*;

use crate::frequency::FrequencyTable;
use crate::hufftree::{HuffNode, HuffmanTree};

/// A codeword, first bit first.
pub type Code = BitVec<u8, Msb0>;

/// Symbol ↔ codeword maps derived from a [`HuffmanTree`].
///
/// Left edges contribute a `1`, right edges a `0`. Encoder and decoder must
/// agree on this, so both sides build their table through here.
#[derive(Debug, Clone, Default)]
pub struct CodeTable {
    forward: BTreeMap<u8, Code>,
    reverse: HashMap<Code, u8>,
    max_len: usize,
}

impl CodeTable {
    pub fn from_tree(tree: &HuffmanTree) -> Self {
        let mut table = CodeTable::default();
        let mut prefix = Code::new();
        table.collect(tree.root(), &mut prefix);
        table
    }

    fn collect(&mut self, node: &HuffNode, prefix: &mut Code) {
        match node {
            HuffNode::Leaf { byte, .. } => {
                self.max_len = self.max_len.max(prefix.len());
                self.forward.insert(*byte, prefix.clone());
                self.reverse.insert(prefix.clone(), *byte);
            }
            HuffNode::Internal { left, right, .. } => {
                prefix.push(true);
                self.collect(left, prefix);
                prefix.pop();

                if let Some(right) = right {
                    prefix.push(false);
                    self.collect(right, prefix);
                    prefix.pop();
                }
            }
        }
    }

    pub fn code(&self, byte: u8) -> Option<&Code> {
        self.forward.get(&byte)
    }

    /// Symbol whose codeword is exactly `candidate`.
    pub fn symbol(&self, candidate: &Code) -> Option<u8> {
        self.reverse.get(candidate).copied()
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Length in bits of the longest codeword.
    pub fn max_code_len(&self) -> usize {
        self.max_len
    }

    /// Codewords in ascending symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (u8, &Code)> + '_ {
        self.forward.iter().map(|(&byte, code)| (byte, code))
    }

    /// Total bits needed to encode an input with these `frequencies`.
    /// Symbols missing from the table contribute nothing.
    pub fn content_bit_length(&self, frequencies: &FrequencyTable) -> u64 {
        frequencies
            .iter()
            .filter_map(|(byte, count)| self.code(byte).map(|code| count * code.len() as u64))
            .sum()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn code_str(code: &Code) -> String {
        code.iter().map(|bit| if *bit { '1' } else { '0' }).collect()
    }

    fn assert_prefix_free(table: &CodeTable) {
        for (a, code_a) in table.iter() {
            for (b, code_b) in table.iter() {
                if a != b {
                    assert!(
                        !code_b.starts_with(code_a),
                        "{a:#04x} ({}) is a prefix of {b:#04x} ({})",
                        code_str(code_a),
                        code_str(code_b)
                    );
                }
            }
        }
    }

    #[test]
    fn single_symbol_gets_one_bit() {
        let tree = HuffmanTree::from_bytes(b"AAA").unwrap();
        let table = CodeTable::from_tree(&tree);
        assert_eq!(table.len(), 1);
        assert_eq!(code_str(table.code(b'A').unwrap()), "1");
        assert_eq!(table.symbol(&bitvec![u8, Msb0; 1]), Some(b'A'));
        assert_eq!(table.symbol(&bitvec![u8, Msb0; 0]), None);
    }

    #[test]
    fn left_edges_are_ones() {
        // B is lighter, so it is the left child
        let tree = HuffmanTree::from_bytes(b"AAB").unwrap();
        let table = CodeTable::from_tree(&tree);
        assert_eq!(code_str(table.code(b'B').unwrap()), "1");
        assert_eq!(code_str(table.code(b'A').unwrap()), "0");
        assert_eq!(table.max_code_len(), 1);
    }

    #[test]
    fn forward_and_reverse_agree() {
        let tree = HuffmanTree::from_bytes(b"mississippi river").unwrap();
        let table = CodeTable::from_tree(&tree);
        for (byte, code) in table.iter() {
            assert_eq!(table.symbol(code), Some(byte));
        }
        assert_prefix_free(&table);
    }

    #[test]
    fn full_alphabet_is_prefix_free() {
        let data: Vec<u8> = (0..=255u8)
            .flat_map(|b| std::iter::repeat(b).take(1 + b as usize % 17))
            .collect();
        let tree = HuffmanTree::from_bytes(&data).unwrap();
        let table = CodeTable::from_tree(&tree);
        assert_eq!(table.len(), 256);
        assert_prefix_free(&table);
    }

    #[test]
    fn content_length_weighs_code_lengths() {
        let frequencies = FrequencyTable::from_bytes(b"aaaabbc");
        let tree = HuffmanTree::build(&frequencies).unwrap();
        let table = CodeTable::from_tree(&tree);
        // a: 1 bit, b and c: 2 bits
        assert_eq!(table.content_bit_length(&frequencies), 4 + 2 * 2 + 2);
    }
}
