//! Reconstructs the multi-letter word represented by a prefix-compressed
//! (radix) run of sibling nodes, given a probed child's local position.

use crate::cache::{Cursor, RadixCache, range_frequency};
use crate::error::{Result, TrieError};
use crate::trie::node::FrozenTrieNode;

/// The reconstructed word for a probed child, plus enough bookkeeping for
/// the caller's binary search to continue: `loc` is the child-local
/// position of the leftmost member of the run (so a probe that lands
/// anywhere inside it can be redirected there), and `branch` is the trie
/// index to descend into on a full match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RadixDescriptor {
    pub word: Vec<u32>,
    pub loc: i64,
    pub branch: u32,
}

/// Reconstructs the radix word for the child of `parent` at child-local
/// position `loc` (`first_child` is `parent.first_child()`, passed in so
/// callers that already have it don't recompute it on every probe).
pub fn radix_word<'t>(
    parent: &FrozenTrieNode<'t>,
    loc: u32,
    first_child: u32,
    cache: &mut RadixCache<RadixDescriptor>,
    cursor: Cursor,
) -> Result<(RadixDescriptor, Cursor)> {
    let child_index = first_child + loc;
    let child = FrozenTrieNode::new(parent.trie, child_index);

    let left_is_radix_link = if loc > 0 {
        FrozenTrieNode::new(parent.trie, child_index - 1).is_radix_link()?
    } else {
        false
    };

    // Fast path: a plain single-letter edge, never touches the cache.
    if !child.is_radix_link()? && !left_is_radix_link {
        return Ok((
            RadixDescriptor { word: vec![child.letter()?], loc: loc as i64, branch: child_index },
            cursor,
        ));
    }

    let (hit, new_cursor) = cache.find(child_index, cursor);
    if let Some(descriptor) = hit {
        return Ok((descriptor, new_cursor));
    }

    // Walk left while siblings are radix links (internal chain members),
    // collecting letters nearest-first; `startchild` is reversed below.
    let mut startchild = Vec::new();
    let mut k = loc;
    while k > 0 {
        let sib = FrozenTrieNode::new(parent.trie, first_child + k - 1);
        if sib.is_radix_link()? {
            startchild.push(sib.letter()?);
            k -= 1;
        } else {
            break;
        }
    }

    // The run's own letters, starting at `child`: if `child` is itself a
    // radix link, walk right collecting siblings until the non-compressed
    // owner (the node that carries the run's real children) is found.
    let mut endchild = vec![child.letter()?];
    let mut owner_index = child_index;
    if child.is_radix_link()? {
        let child_count = parent.child_count()?;
        let mut cur_loc = loc;
        loop {
            cur_loc += 1;
            if cur_loc >= child_count {
                return Err(TrieError::domain("radix run runs past its parent's child count"));
            }
            owner_index = first_child + cur_loc;
            let sib = FrozenTrieNode::new(parent.trie, owner_index);
            endchild.push(sib.letter()?);
            if !sib.is_radix_link()? {
                break;
            }
        }
    }

    let run_start = child_index - startchild.len() as u32;
    let lo = run_start;
    let hi = owner_index + 1;

    let mut word = startchild;
    word.reverse();
    word.extend(endchild);

    let descriptor = RadixDescriptor {
        word,
        loc: (lo as i64) - (first_child as i64),
        branch: owner_index,
    };

    cache.put(lo, hi, descriptor.clone(), range_frequency(lo, hi));
    let (_, cursor_after_put) = cache.find(child_index, Cursor::default());
    Ok((descriptor, cursor_after_put))
}
