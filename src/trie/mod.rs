//! The succinct trie itself: frozen-node accessors, radix-word
//! reconstruction, the incremental builder, and the lookup reader.

pub mod builder;
pub mod node;
pub mod radix;
pub mod reader;

pub use builder::TrieBuilder;
pub use node::FrozenTrieNode;
pub use radix::RadixDescriptor;
pub use reader::{FrozenTrie, LookupResult};
