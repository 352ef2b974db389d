//! The small configuration record consumed by `build`/`open`: one plain
//! struct of orthogonal knobs, no dispatch machinery.

use crate::codec::Codec;
use crate::error::{Result, TrieError};

/// Rank-directory block sizes; fixed at 1024/32 unless the caller overrides
/// them.
pub const DEFAULT_L1: u32 = 1024;
pub const DEFAULT_L2: u32 = 32;

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// Letter width: `Codec::Six` (6 bits, 64-symbol alphabet) or
    /// `Codec::Eight` (8 bits, raw).
    pub codec: Codec,
    /// Rank directory layout: select-as-rank when `true`, classic
    /// popcount L1/L2 directory otherwise.
    pub selectsearch: bool,
    /// Store tag lists of <= 3 (8-bit codec) or <= 4 (6-bit codec)
    /// elements as raw ordinals instead of a bitmap.
    pub optflags: bool,
    /// Diagnostics only; no observable effect on build/read outputs.
    pub inspect: bool,
    pub debug: bool,
    /// Required at load time; must equal the build's emitted node count.
    pub nodecount: u32,
    pub l1: u32,
    pub l2: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            codec: Codec::Six,
            selectsearch: false,
            optflags: true,
            inspect: false,
            debug: false,
            nodecount: 0,
            l1: DEFAULT_L1,
            l2: DEFAULT_L2,
        }
    }
}

impl Config {
    /// The inline-ordinal limit for this config's codec.
    pub fn optflags_limit(&self) -> usize {
        match self.codec {
            Codec::Eight => 3,
            Codec::Six => 4,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.l1 == 0 || self.l2 == 0 || self.l1 % self.l2 != 0 {
            return Err(TrieError::config(format!(
                "l1 ({}) must be a positive multiple of l2 ({})",
                self.l1, self.l2
            )));
        }
        Ok(())
    }
}
