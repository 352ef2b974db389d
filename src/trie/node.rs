//! Pure index-addressed accessor over a single frozen-trie node: header
//! bits, letter, child range, and the flag-child scan that lookup and
//! radix-word reconstruction both rely on.

use crate::error::Result;
use crate::tagmap::{self, unpack_code_units};
use crate::trie::reader::FrozenTrie;

/// A node is a `(trie, index)` pair, nothing more. Cheap to construct and
/// copy; every field below is recomputed from the blobs on demand rather
/// than cached, so a node never outlives the trie it borrows from.
#[derive(Clone, Copy)]
pub struct FrozenTrieNode<'t> {
    pub(crate) trie: &'t FrozenTrie,
    pub index: u32,
}

impl<'t> FrozenTrieNode<'t> {
    pub fn new(trie: &'t FrozenTrie, index: u32) -> Self {
        FrozenTrieNode { trie, index }
    }

    fn bitslen(&self) -> u32 {
        self.trie.width() + 2
    }

    fn entry_offset(&self) -> u32 {
        self.trie.letter_start() + self.index * self.bitslen()
    }

    /// Low bit of the 2-bit header: an internal link of a prefix-compressed
    /// run, or (together with `final_`) a tag-bitmap flag node.
    pub fn compressed(&self) -> Result<bool> {
        Ok(self.trie.td_get(self.entry_offset(), 1)? == 1)
    }

    /// High bit of the 2-bit header: the path ending here is a stored key.
    pub fn final_(&self) -> Result<bool> {
        Ok(self.trie.td_get(self.entry_offset() + 1, 1)? == 1)
    }

    /// `compressed && final`: a tag-bitmap code unit belonging to the
    /// parent, not a real trie edge.
    pub fn flag(&self) -> Result<bool> {
        Ok(self.compressed()? && self.final_()?)
    }

    /// `compressed && !final`: an internal link of a radix run (header `10`).
    pub fn is_radix_link(&self) -> Result<bool> {
        Ok(self.compressed()? && !self.final_()?)
    }

    pub fn letter(&self) -> Result<u32> {
        self.trie.td_get(self.entry_offset() + 2, self.trie.width())
    }

    /// Index of this node's first child slot.
    ///
    /// Node `i`'s own terminating zero is the `i`-th zero (0-indexed) of the
    /// LOUDS stream, so the total child-slot count contributed by every
    /// node before `i` is `select0(i - 1) + 1 - i` (the position right
    /// before `i`'s own unary code starts, less the `i` zeros already seen).
    /// Adding 1 for the super-root's own slot gives the formula below;
    /// `index == 0` (the super-root itself) is the one node with no
    /// preceding zero to look up.
    pub fn first_child(&self) -> Result<u32> {
        if self.index == 0 {
            return Ok(1);
        }
        let dir = self.trie.rank_dir()?;
        Ok(dir.select0(self.index - 1)? + 2 - self.index)
    }

    /// Number of child slots this node owns (a multi-letter edge spans
    /// several consecutive slots, so this is not the same as the number of
    /// distinct children).
    ///
    /// `first_child(i + 1) - first_child(i)` by construction, which reduces
    /// to `select0(i) - select0(i - 1) - 1` for `i >= 1`; `index == 0` reads
    /// its own terminating zero position directly.
    pub fn child_count(&self) -> Result<u32> {
        let dir = self.trie.rank_dir()?;
        if self.index == 0 {
            return dir.select0(0);
        }
        Ok(dir.select0(self.index)? - dir.select0(self.index - 1)? - 1)
    }

    /// Child-local position of the last flag child, or -1 if this node has
    /// none. Flag children are contiguous and precede all letter children,
    /// so the scan stops at the first non-flag child.
    pub fn last_flag_child(&self) -> Result<i64> {
        let first_child = self.first_child()?;
        let child_count = self.child_count()?;
        let mut last: i64 = -1;
        for loc in 0..child_count {
            let child = FrozenTrieNode::new(self.trie, first_child + loc);
            if child.flag()? {
                last = loc as i64;
            } else {
                break;
            }
        }
        Ok(last)
    }

    /// Decodes this node's tag set from its flag-child prefix: either raw
    /// inline ordinals (the optflags shortcut) or a packed tag bitmap.
    pub fn value(&self) -> Result<Vec<u32>> {
        let lo = self.last_flag_child()?;
        if lo < 0 {
            return Ok(Vec::new());
        }
        let count = (lo + 1) as u32;
        let first_child = self.first_child()?;
        let mut raw = Vec::with_capacity(count as usize);
        for loc in 0..count {
            let child = FrozenTrieNode::new(self.trie, first_child + loc);
            raw.push(child.letter()?);
        }
        let config = self.trie.config();
        if config.optflags && raw.len() <= config.optflags_limit() {
            Ok(raw)
        } else {
            let bytes = unpack_code_units(&raw, self.trie.width());
            tagmap::flags_to_tags(&bytes)
        }
    }
}
