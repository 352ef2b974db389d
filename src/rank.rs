//! Rank/select directory over the trie's LOUDS child-count bit stream. Two
//! layouts, chosen at build time by [`crate::config::Config::selectsearch`]:
//!
//! - [`PopcountDirectory`]: classic two-level (L1/L2) popcount summary,
//!   `select` resolved by binary search over `rank`.
//! - [`SelectAsRankDirectory`]: precomputed positions of every L2-th zero,
//!   turning `select(0, ·)` into an O(1) lookup plus a short `pos0` walk.
//!
//! Both are narrow, trie-specific rank/select directories, not a
//! general-purpose succinct bit-vector library.

use crate::bits::{BitBuf, BitView, BitWriter};
use crate::error::{Result, TrieError};

#[inline]
fn bits_for(max_value: u32) -> u32 {
    if max_value == 0 {
        1
    } else {
        32 - max_value.leading_zeros()
    }
}

/// Classic L1/L2 popcount directory.
#[derive(Clone, Copy)]
pub struct PopcountDirectory<'a> {
    trie: BitView<'a>,
    dir: BitView<'a>,
    num_bits: u32,
    l1: u32,
    l2: u32,
    l1_width: u32,
    l2_width: u32,
}

impl<'a> PopcountDirectory<'a> {
    fn entry_block_bits(&self) -> u32 {
        self.l1_width + self.l2_width * (self.l1 / self.l2)
    }

    pub fn build(trie_bits: BitView<'a>, num_bits: u32, l1: u32, l2: u32) -> Result<BitBuf> {
        if l1 == 0 || l2 == 0 || l1 % l2 != 0 {
            return Err(TrieError::config(format!(
                "l1 ({l1}) must be a positive multiple of l2 ({l2})"
            )));
        }
        let l1_width = bits_for(num_bits);
        let l2_width = bits_for(l1);
        let num_l2_per_l1 = l1 / l2;
        let num_l1 = num_bits.div_ceil(l1).max(1);
        let mut writer = BitWriter::new();
        let mut cum_total = 0u32;
        for b1 in 0..num_l1 {
            writer.write(cum_total, l1_width);
            let block_start = b1 * l1;
            let mut cum_intra = 0u32;
            for b2 in 0..num_l2_per_l1 {
                writer.write(cum_intra, l2_width);
                let l2_start = block_start + b2 * l2;
                let ones = if l2_start < num_bits {
                    let len = l2.min(num_bits - l2_start);
                    trie_bits.count(l2_start, len)?
                } else {
                    0
                };
                cum_intra += ones;
            }
            cum_total += cum_intra;
        }
        Ok(writer.finish())
    }

    pub fn new(trie: BitView<'a>, dir: BitView<'a>, num_bits: u32, l1: u32, l2: u32) -> Self {
        PopcountDirectory {
            trie,
            dir,
            num_bits,
            l1,
            l2,
            l1_width: bits_for(num_bits),
            l2_width: bits_for(l1),
        }
    }

    pub fn rank1(&self, x: u32) -> Result<u32> {
        if x >= self.num_bits {
            return Err(TrieError::index(format!("rank1({x}) past {} bits", self.num_bits)));
        }
        let entry_bits = self.entry_block_bits();
        let b1 = x / self.l1;
        let b1_off = b1 * entry_bits;
        let l1_prefix = self.dir.get(b1_off, self.l1_width)?;
        let b2 = (x % self.l1) / self.l2;
        let l2_off = b1_off + self.l1_width + b2 * self.l2_width;
        let l2_prefix = self.dir.get(l2_off, self.l2_width)?;
        let l2_start = b1 * self.l1 + b2 * self.l2;
        let trailing = self.trie.count(l2_start, x - l2_start + 1)?;
        Ok(l1_prefix + l2_prefix + trailing)
    }

    pub fn rank0(&self, x: u32) -> Result<u32> {
        Ok(x + 1 - self.rank1(x)?)
    }

    fn select_generic(&self, which: u8, y: u32) -> Result<u32> {
        if self.num_bits == 0 {
            return Err(TrieError::index("select on empty directory"));
        }
        let mut lo = 0u32;
        let mut hi = self.num_bits - 1;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let r = if which == 0 { self.rank0(mid)? } else { self.rank1(mid)? };
            if r >= y + 1 {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        Ok(lo)
    }

    pub fn select0(&self, y: u32) -> Result<u32> {
        self.select_generic(0, y)
    }

    pub fn select1(&self, y: u32) -> Result<u32> {
        self.select_generic(1, y)
    }
}

/// Precomputed positions of every L2-th zero; `select(0, ·)` becomes a
/// direct lookup plus a bounded `pos0` walk. `select(1, ·)` is unsupported
/// under this layout — see DESIGN.md.
#[derive(Clone, Copy)]
pub struct SelectAsRankDirectory<'a> {
    trie: BitView<'a>,
    dir: BitView<'a>,
    num_bits: u32,
    l2: u32,
    l1_width: u32,
}

impl<'a> SelectAsRankDirectory<'a> {
    pub fn build(trie_bits: BitView<'a>, num_bits: u32, l2: u32) -> Result<BitBuf> {
        if l2 == 0 {
            return Err(TrieError::config("l2 must be positive"));
        }
        let l1_width = bits_for(num_bits.saturating_sub(1));
        let mut writer = BitWriter::new();
        let mut pos = 0u32;
        loop {
            match trie_bits.pos0(pos, l2) {
                Ok(p) => {
                    writer.write(p, l1_width);
                    pos = p + 1;
                }
                Err(_) => break,
            }
        }
        Ok(writer.finish())
    }

    pub fn new(trie: BitView<'a>, dir: BitView<'a>, num_bits: u32, l2: u32) -> Self {
        let l1_width = bits_for(num_bits.saturating_sub(1));
        SelectAsRankDirectory { trie, dir, num_bits, l2, l1_width }
    }

    fn num_checkpoints(&self) -> u32 {
        if self.l1_width == 0 {
            0
        } else {
            self.dir.len_bits() / self.l1_width
        }
    }

    fn checkpoint(&self, idx: u32) -> Result<u32> {
        self.dir.get(idx * self.l1_width, self.l1_width)
    }

    pub fn select0(&self, y: u32) -> Result<u32> {
        let group = y / self.l2;
        let remainder = y % self.l2;
        let n = self.num_checkpoints();
        if remainder == self.l2 - 1 && group < n {
            return self.checkpoint(group);
        }
        let start = if group == 0 {
            0
        } else {
            if group - 1 >= n {
                return Err(TrieError::index("select0: y exceeds checkpointed range"));
            }
            self.checkpoint(group - 1)? + 1
        };
        self.trie.pos0(start, remainder + 1)
    }

    /// Unsupported under this layout; see DESIGN.md.
    pub fn select1(&self, _y: u32) -> Result<u32> {
        Err(TrieError::index(
            "select(1, ·) is unsupported under the select-as-rank layout",
        ))
    }

    pub fn rank0(&self, x: u32) -> Result<u32> {
        if x >= self.num_bits {
            return Err(TrieError::index(format!("rank0({x}) past {} bits", self.num_bits)));
        }
        let n = self.num_checkpoints();
        let mut lo: i64 = 0;
        let mut hi: i64 = n as i64 - 1;
        let mut best: Option<(u32, u32)> = None;
        while lo <= hi {
            let mid = (lo + hi) / 2;
            let pos = self.checkpoint(mid as u32)?;
            if pos <= x {
                best = Some((mid as u32, pos));
                lo = mid + 1;
            } else {
                hi = mid - 1;
            }
        }
        match best {
            Some((idx, pos)) if pos == x => Ok((idx + 1) * self.l2),
            Some((idx, pos)) => {
                let already = (idx + 1) * self.l2;
                let range_start = pos + 1;
                let ones = self.trie.count(range_start, x - range_start + 1)?;
                Ok(already + (x - range_start + 1) - ones)
            }
            None => {
                let ones = self.trie.count(0, x + 1)?;
                Ok(x + 1 - ones)
            }
        }
    }

    pub fn rank1(&self, x: u32) -> Result<u32> {
        Ok(x + 1 - self.rank0(x)?)
    }
}

/// Dynamic wrapper selected by [`crate::config::Config::selectsearch`].
/// Value type holding only borrowed slices — trivially `Send + Sync`, so a
/// single mounted trie is naturally shareable across reader threads.
#[derive(Clone, Copy)]
pub enum RankDirectory<'a> {
    Popcount(PopcountDirectory<'a>),
    SelectAsRank(SelectAsRankDirectory<'a>),
}

impl<'a> RankDirectory<'a> {
    pub fn rank0(&self, x: u32) -> Result<u32> {
        match self {
            RankDirectory::Popcount(d) => d.rank0(x),
            RankDirectory::SelectAsRank(d) => d.rank0(x),
        }
    }

    pub fn rank1(&self, x: u32) -> Result<u32> {
        match self {
            RankDirectory::Popcount(d) => d.rank1(x),
            RankDirectory::SelectAsRank(d) => d.rank1(x),
        }
    }

    pub fn select0(&self, y: u32) -> Result<u32> {
        match self {
            RankDirectory::Popcount(d) => d.select0(y),
            RankDirectory::SelectAsRank(d) => d.select0(y),
        }
    }

    pub fn select1(&self, y: u32) -> Result<u32> {
        match self {
            RankDirectory::Popcount(d) => d.select1(y),
            RankDirectory::SelectAsRank(d) => d.select1(y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::BitWriter;
    use rand::Rng;

    fn random_stream(num_bits: u32) -> BitBuf {
        let mut rng = rand::rng();
        let mut w = BitWriter::new();
        for _ in 0..num_bits {
            w.write(rng.random_range(0..2u32), 1);
        }
        w.finish()
    }

    #[test]
    fn rank_property_popcount() {
        let num_bits = 10_000u32;
        let stream = random_stream(num_bits);
        let dir_bytes = PopcountDirectory::build(stream.view(), num_bits, 1024, 32).unwrap();
        let dir = PopcountDirectory::new(stream.view(), dir_bytes.view(), num_bits, 1024, 32);
        for x in (0..num_bits).step_by(37) {
            assert_eq!(dir.rank0(x).unwrap() + dir.rank1(x).unwrap(), x + 1);
        }
    }

    #[test]
    fn select_matches_rank_inverse_popcount() {
        let num_bits = 5000u32;
        let stream = random_stream(num_bits);
        let dir_bytes = PopcountDirectory::build(stream.view(), num_bits, 256, 16).unwrap();
        let dir = PopcountDirectory::new(stream.view(), dir_bytes.view(), num_bits, 256, 16);
        let zero_count = dir.rank0(num_bits - 1).unwrap();
        for y in (0..zero_count).step_by(13) {
            let pos = dir.select0(y).unwrap();
            assert_eq!(dir.rank0(pos).unwrap(), y + 1);
        }
    }

    #[test]
    fn select_as_rank_matches_popcount_layout() {
        let num_bits = 8000u32;
        let stream = random_stream(num_bits);
        let pop_bytes = PopcountDirectory::build(stream.view(), num_bits, 1024, 32).unwrap();
        let pop = PopcountDirectory::new(stream.view(), pop_bytes.view(), num_bits, 1024, 32);

        let sar_bytes = SelectAsRankDirectory::build(stream.view(), num_bits, 32).unwrap();
        let sar = SelectAsRankDirectory::new(stream.view(), sar_bytes.view(), num_bits, 32);

        let zero_count = pop.rank0(num_bits - 1).unwrap();
        for y in 0..zero_count {
            assert_eq!(pop.select0(y).unwrap(), sar.select0(y).unwrap());
        }
    }

    #[test]
    fn select_as_rank_select1_is_unsupported() {
        let num_bits = 100u32;
        let stream = random_stream(num_bits);
        let sar_bytes = SelectAsRankDirectory::build(stream.view(), num_bits, 8).unwrap();
        let sar = SelectAsRankDirectory::new(stream.view(), sar_bytes.view(), num_bits, 8);
        assert!(sar.select1(0).is_err());
    }
}
