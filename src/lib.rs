#![doc = include_str!("../README.md")]
#![deny(unstable_features)]
#![deny(trivial_casts)]
#![deny(unconditional_recursion)]
#![deny(clippy::empty_loop)]
#![deny(unreachable_code)]
#![deny(unreachable_pub)]
#![deny(unreachable_patterns)]
#![deny(unused_macro_rules)]
#![deny(unused_doc_comments)]

pub mod bits;
pub mod cache;
pub mod codec;
pub mod config;
pub mod error;
pub mod popcount;
pub mod rank;
pub mod tagmap;
pub mod trie;

pub use codec::Codec;
pub use config::Config;
pub use error::{Result, TrieError};
pub use trie::{FrozenTrie, LookupResult, TrieBuilder};
