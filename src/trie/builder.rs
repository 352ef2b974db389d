//! Incremental construction from a lex-sorted stream of encoded insert
//! records, followed by level-order emission into the LOUDS child-count
//! stream and the fixed-width letter stream that together make up `td`.

use std::collections::VecDeque;

use dsi_progress_logger::ProgressLogger;

use crate::bits::BitWriter;
use crate::config::Config;
use crate::error::{Result, TrieError};
use crate::rank::{PopcountDirectory, SelectAsRankDirectory};
use crate::tagmap;

/// One node of the mutable build-time tree. Children are kept in ascending
/// order by their own first letter, since insert records arrive lex-sorted
/// and a node's children are appended in the order their subtrees are first
/// visited.
struct BuildNode {
    letters: Vec<u32>,
    final_: bool,
    children: Vec<usize>,
    tags: Vec<u32>,
}

/// Builds the two `td`/`rd` byte blobs consumed by
/// [`crate::trie::FrozenTrie::open`] from a stream of insert records.
///
/// Records must be inserted in ascending order of their reversed-host key;
/// this is what lets [`Self::insert`] avoid maintaining an explicit stack of
/// previously-descended nodes. Because insertion is strictly lex-ordered,
/// only the most-recently-added (rightmost) child of any node can possibly
/// share a prefix with the next key — every earlier sibling is already
/// closed off by the time a later key arrives.
pub struct TrieBuilder {
    arena: Vec<BuildNode>,
    root: usize,
    prev_key: Option<Vec<u32>>,
    config: Config,
}

impl TrieBuilder {
    pub fn new(config: Config) -> Self {
        let root = BuildNode { letters: Vec::new(), final_: false, children: Vec::new(), tags: Vec::new() };
        TrieBuilder { arena: vec![root], root: 0, prev_key: None, config }
    }

    /// Splits `reverse(ordinal-digits) + tag_delimiter + reverse(host)` into
    /// `(ordinal, reversed_host)`.
    fn parse_record(&self, record: &[u32]) -> Result<(u32, Vec<u32>)> {
        let delim = self.config.codec.tag_delimiter();
        let pos = record
            .iter()
            .position(|&u| u == delim)
            .ok_or_else(|| TrieError::domain("insert record missing tag delimiter"))?;
        let mut digits_rev = record[..pos].to_vec();
        digits_rev.reverse();
        let digit_str = self.config.codec.decode_host(&digits_rev)?;
        let ordinal: u32 = digit_str
            .parse()
            .map_err(|_| TrieError::domain(format!("invalid ordinal digits {digit_str:?}")))?;
        Ok((ordinal, record[pos + 1..].to_vec()))
    }

    /// Inserts one pre-encoded `reverse(ordinal-digits) + delim +
    /// reverse(host)` record. Records must arrive in ascending order of
    /// their reversed-host key.
    pub fn insert(&mut self, record: &[u32]) -> Result<()> {
        let (ordinal, reversed_host) = self.parse_record(record)?;
        if let Some(prev) = &self.prev_key {
            if reversed_host < *prev {
                return Err(TrieError::domain("insert: records must arrive in ascending order"));
            }
        }
        self.prev_key = Some(reversed_host.clone());

        let mut node = self.root;
        let mut pos = 0usize;
        loop {
            let remaining = &reversed_host[pos..];
            if remaining.is_empty() {
                self.arena[node].final_ = true;
                self.upsert_tag(node, ordinal);
                return Ok(());
            }
            if let Some(&last_child) = self.arena[node].children.last() {
                let letters = self.arena[last_child].letters.clone();
                if letters[0] == remaining[0] {
                    let lcp = common_prefix_len(&letters, remaining);
                    if lcp < letters.len() {
                        log::trace!("split_node: node {last_child} at offset {lcp}");
                        self.split_node(last_child, lcp);
                    }
                    node = last_child;
                    pos += lcp;
                    continue;
                }
            }
            let new_idx = self.new_node(remaining.to_vec());
            self.arena[new_idx].final_ = true;
            self.arena[node].children.push(new_idx);
            self.upsert_tag(new_idx, ordinal);
            return Ok(());
        }
    }

    fn new_node(&mut self, letters: Vec<u32>) -> usize {
        self.arena.push(BuildNode { letters, final_: false, children: Vec::new(), tags: Vec::new() });
        self.arena.len() - 1
    }

    fn upsert_tag(&mut self, node: usize, ordinal: u32) {
        let tags = &mut self.arena[node].tags;
        if let Err(pos) = tags.binary_search(&ordinal) {
            tags.insert(pos, ordinal);
        }
    }

    /// Splits `node`'s letter run at `at`: `node` keeps `letters[..at]` and
    /// gains a single child inheriting the rest of the run together with
    /// `node`'s former final bit, children and tags.
    fn split_node(&mut self, node: usize, at: usize) {
        let letters = std::mem::take(&mut self.arena[node].letters);
        let prefix = letters[..at].to_vec();
        let suffix = letters[at..].to_vec();
        let final_ = std::mem::replace(&mut self.arena[node].final_, false);
        let children = std::mem::take(&mut self.arena[node].children);
        let tags = std::mem::take(&mut self.arena[node].tags);

        let successor = self.arena.len();
        self.arena.push(BuildNode { letters: suffix, final_, children, tags });
        self.arena[node].letters = prefix;
        self.arena[node].children = vec![successor];
    }

    /// Finishes construction: a breadth-first walk emits the LOUDS
    /// child-count stream and the fixed-width letter stream (through one
    /// continuous [`BitWriter`], so the letter stream picks up at whatever
    /// bit offset the LOUDS stream ends on), then builds the rank directory
    /// over the LOUDS prefix. Returns `(td_bytes, rd_bytes, node_count)`,
    /// where `node_count` excludes the synthetic super-root.
    ///
    /// A multi-letter edge is not a vertical chain of single-letter nodes:
    /// it is a horizontal run of consecutive sibling slots under the same
    /// parent, all but the last marked `compressed` (a radix link carrying
    /// no children of its own), with the last — the "owner" — carrying the
    /// real continuation. This is what lets a binary search land in the
    /// middle of a run and [`crate::trie::radix::radix_word`] walk outward
    /// from there to reconstruct the full word.
    pub fn freeze(self) -> Result<(Vec<u8>, Vec<u8>, u32)> {
        log::debug!("freeze: {} build-time nodes", self.arena.len());
        let width = self.config.codec.width();
        let limit = self.config.optflags_limit();

        let mut entries: Vec<(bool, bool, u32)> = Vec::new();
        let mut child_counts: Vec<u32> = Vec::new();

        // Synthetic super-root: index 0, exactly one child (the true root).
        entries.push((false, false, 0));
        child_counts.push(1);
        // True root: index 1, a letterless placeholder never read by the
        // reader (only children's own letters are ever read). Patched below
        // once its own children are known.
        entries.push((false, self.arena[self.root].final_, 0));
        child_counts.push(0);

        let mut queue: VecDeque<(usize, usize)> = VecDeque::new();
        queue.push_back((1, self.root));

        let mut pl = ProgressLogger::default();
        pl.item_name("node");
        pl.expected_updates(Some(self.arena.len()));
        pl.start("Emitting level-order trie nodes...");

        while let Some((entry_idx, bn_idx)) = queue.pop_front() {
            pl.update();
            let bn = &self.arena[bn_idx];
            let mut slot_count = 0u32;

            let flag_units: Vec<u32> = if bn.final_ && !bn.tags.is_empty() {
                if self.config.optflags && tagmap::fits_as_optflags(&bn.tags, width, limit) {
                    bn.tags.clone()
                } else {
                    let bytes = tagmap::tags_to_flags(&bn.tags)?;
                    tagmap::pack_code_units(&bytes, width)
                }
            } else {
                Vec::new()
            };
            for u in flag_units {
                entries.push((true, true, u));
                child_counts.push(0);
                slot_count += 1;
            }

            for &child_idx in &bn.children {
                let letters = &self.arena[child_idx].letters;
                for &l in &letters[..letters.len() - 1] {
                    entries.push((true, false, l));
                    child_counts.push(0);
                    slot_count += 1;
                }
                let real_entry_idx = entries.len();
                entries.push((false, self.arena[child_idx].final_, *letters.last().unwrap()));
                child_counts.push(0);
                slot_count += 1;
                queue.push_back((real_entry_idx, child_idx));
            }

            child_counts[entry_idx] = slot_count;
        }

        pl.done();

        // `node_count` (as stored in `Config::nodecount`) excludes the
        // super-root; `entries.len()` includes it.
        let node_count = entries.len() as u32 - 1;
        log::debug!("freeze: emitted {node_count} nodes ({} letter-stream entries)", entries.len());

        let mut writer = BitWriter::new();
        for &child_count in &child_counts {
            for _ in 0..child_count {
                writer.write(1, 1);
            }
            writer.write(0, 1);
        }
        let num_bits = writer.bit_pos();
        debug_assert_eq!(num_bits, 2 * node_count + 1);

        for &(compressed, final_, letter) in &entries {
            let header = ((compressed as u32) << 1) | final_ as u32;
            writer.write((header << width) | letter, width + 2);
        }

        let td = writer.finish();
        let louds = crate::bits::BitView::with_bit_len(td.as_bytes(), num_bits)?;
        let rd = if self.config.selectsearch {
            SelectAsRankDirectory::build(louds, num_bits, self.config.l2)?
        } else {
            PopcountDirectory::build(louds, num_bits, self.config.l1, self.config.l2)?
        };

        Ok((td.into_bytes(), rd.into_bytes(), node_count))
    }
}

fn common_prefix_len(a: &[u32], b: &[u32]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}
