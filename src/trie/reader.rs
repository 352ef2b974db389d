//! Frozen trie: owns the two immutable byte blobs and mounts bit views over
//! them on demand, plus the suffix-accumulating lookup state machine.

use std::collections::BTreeMap;

use crate::bits::{BitBuf, BitView};
use crate::cache::{Cursor, RadixCache};
use crate::codec::Codec;
use crate::config::Config;
use crate::error::{Result, TrieError};
use crate::rank::{PopcountDirectory, RankDirectory, SelectAsRankDirectory};
use crate::trie::node::FrozenTrieNode;
use crate::trie::radix::{radix_word, RadixDescriptor};

/// `decoded suffix -> ordinal set`, as returned by [`FrozenTrie::lookup`].
pub type LookupResult = BTreeMap<String, Vec<u32>>;

/// An immutable, mounted trie: the LOUDS/letter blob (`td`), the rank
/// directory blob (`rd`), and the config it was built with.
///
/// `RankDirectory` values borrow from `td`/`rd` for the duration of a single
/// call rather than being stored persistently — avoiding a self-referential
/// struct while keeping every rank/select call a cheap, allocation-free view
/// construction.
pub struct FrozenTrie {
    td: BitBuf,
    rd: BitBuf,
    config: Config,
    node_count: u32,
    num_bits: u32,
    letter_start: u32,
}

impl FrozenTrie {
    /// Mounts a frozen trie over its two byte blobs. `config.nodecount` must
    /// match what the blobs actually encode.
    pub fn open(td_bytes: Vec<u8>, rd_bytes: Vec<u8>, config: Config) -> Result<Self> {
        config.validate()?;
        let node_count = config.nodecount;
        let num_bits = 2 * node_count + 1;
        let letter_start = num_bits;
        let width = config.codec.width();
        let td = BitBuf::from_bytes(td_bytes);
        // `nodecount` excludes the synthetic super-root, so `node_count + 1`
        // physical entries actually occupy the letter stream.
        let needed_bits = letter_start as u64 + (node_count as u64 + 1) * (width as u64 + 2);
        if (td.len_bits() as u64) < needed_bits {
            return Err(TrieError::config(format!(
                "td blob has {} bits, need at least {needed_bits} for nodecount {node_count}",
                td.len_bits()
            )));
        }
        let rd = BitBuf::from_bytes(rd_bytes);
        log::debug!(
            "FrozenTrie::open: {node_count} nodes, {num_bits} LOUDS bits, codec width {width}"
        );
        Ok(FrozenTrie { td, rd, config, node_count, num_bits, letter_start })
    }

    pub fn node_count(&self) -> u32 {
        self.node_count
    }

    pub fn width(&self) -> u32 {
        self.config.codec.width()
    }

    pub fn codec(&self) -> Codec {
        self.config.codec
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn letter_start(&self) -> u32 {
        self.letter_start
    }

    pub(crate) fn td_get(&self, p: u32, n: u32) -> Result<u32> {
        self.td.view().get(p, n)
    }

    pub(crate) fn rank_dir(&self) -> Result<RankDirectory<'_>> {
        let louds = BitView::with_bit_len(self.td.as_bytes(), self.num_bits)?;
        let dir = self.rd.view();
        Ok(if self.config.selectsearch {
            RankDirectory::SelectAsRank(SelectAsRankDirectory::new(louds, dir, self.num_bits, self.config.l2))
        } else {
            RankDirectory::Popcount(PopcountDirectory::new(louds, dir, self.num_bits, self.config.l1, self.config.l2))
        })
    }

    /// The true root sits at index 1; index 0 is the synthetic super-root
    /// that anchors the LOUDS addressing scheme.
    pub fn root(&self) -> FrozenTrieNode<'_> {
        FrozenTrieNode::new(self, 1)
    }

    /// Looks up `encoded_reversed`: the reversed, encoded host (no tag
    /// prefix, no trailing delimiter). Returns every enclosing suffix of
    /// the input that is itself a stored key, mapped to its ordinal set.
    /// An empty map means no suffix of the input was found.
    pub fn lookup(&self, encoded_reversed: &[u32]) -> Result<LookupResult> {
        let mut cache = RadixCache::new(0);
        self.lookup_with_cache(encoded_reversed, &mut cache)
    }

    /// Same as [`Self::lookup`], but reuses a caller-supplied radix cache
    /// across calls (not internally synchronized; one per reader thread).
    pub fn lookup_with_cache(
        &self,
        word: &[u32],
        cache: &mut RadixCache<RadixDescriptor>,
    ) -> Result<LookupResult> {
        let mut result = LookupResult::new();
        let mut node = self.root();
        let mut i = 0usize;
        let mut cursor = Cursor::default();
        let label_sep = self.config.codec.label_separator();

        while i < word.len() {
            if word[i] == label_sep && node.final_()? {
                self.add_match(&mut result, &node, word, i)?;
            }

            let last_flag = node.last_flag_child()?;
            let child_count = node.child_count()? as i64;
            if last_flag >= child_count - 1 {
                return Ok(result);
            }

            let first_child = node.first_child()?;
            let mut low = last_flag + 1;
            let mut high = child_count - 1;
            let mut advanced = false;
            while low <= high {
                let mid = low + (high - low) / 2;
                let (r, next_cursor) = radix_word(&node, mid as u32, first_child, cache, cursor)?;
                cursor = next_cursor;
                let comp = &r.word;
                if comp.is_empty() {
                    return Err(TrieError::index("radix word reconstruction produced an empty word"));
                }
                let w0 = word.get(i).copied();
                if w0.is_none() || comp[0] > w0.unwrap() {
                    high = r.loc - 1;
                    continue;
                }
                if comp[0] < w0.unwrap() {
                    low = r.loc + comp.len() as i64;
                    continue;
                }
                let remaining = &word[i..];
                if remaining.len() < comp.len() || remaining[..comp.len()] != comp[..] {
                    return Ok(result);
                }
                node = FrozenTrieNode::new(self, r.branch);
                i += comp.len();
                advanced = true;
                break;
            }
            if !advanced {
                return Ok(result);
            }
        }

        if node.final_()? {
            self.add_match(&mut result, &node, word, word.len())?;
        }
        Ok(result)
    }

    fn add_match(
        &self,
        result: &mut LookupResult,
        node: &FrozenTrieNode<'_>,
        word: &[u32],
        upto: usize,
    ) -> Result<()> {
        let mut prefix = word[..upto].to_vec();
        prefix.reverse();
        let decoded = self.config.codec.decode_host(&prefix)?;
        result.insert(decoded, node.value()?);
        Ok(())
    }
}
