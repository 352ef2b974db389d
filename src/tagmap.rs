//! Two-level variable-length tag bitmap: a 16-bit header selecting
//! populated 16-slot groups, followed by one 16-bit big-endian group word
//! per populated group.

use crate::error::{Result, TrieError};

/// Exclusive upper bound on a blocklist ordinal: 16 groups of 16 slots.
pub const MAX_ORDINAL: u32 = 256;

/// Encodes a set of blocklist ordinals (each < 256) as header + group words.
pub fn tags_to_flags(tags: &[u32]) -> Result<Vec<u8>> {
    for &t in tags {
        if t >= MAX_ORDINAL {
            return Err(TrieError::domain(format!("ordinal {t} out of range [0,256)")));
        }
    }
    let mut header: u16 = 0;
    let mut groups: Vec<(u32, u16)> = Vec::new();
    for &t in tags {
        let g = t / 16;
        let p = t % 16;
        header |= 1 << (15 - g);
        match groups.iter_mut().find(|(gg, _)| *gg == g) {
            Some((_, word)) => *word |= 1 << (15 - p),
            None => groups.push((g, 1 << (15 - p))),
        }
    }
    groups.sort_by_key(|(g, _)| *g);
    let mut out = Vec::with_capacity(2 * (1 + groups.len()));
    out.extend_from_slice(&header.to_be_bytes());
    for (_, word) in &groups {
        out.extend_from_slice(&word.to_be_bytes());
    }
    Ok(out)
}

/// Decodes header + group-word bytes back into the ordinal set, ascending.
pub fn flags_to_tags(bytes: &[u8]) -> Result<Vec<u32>> {
    if bytes.len() < 2 || bytes.len() % 2 != 0 {
        return Err(TrieError::domain(format!(
            "flag bitmap must be a non-empty even number of bytes, got {}",
            bytes.len()
        )));
    }
    let header = u16::from_be_bytes([bytes[0], bytes[1]]);
    let mut tags = Vec::new();
    let mut word_idx = 1usize;
    for g in 0..16u32 {
        if header & (1 << (15 - g)) == 0 {
            continue;
        }
        let off = word_idx * 2;
        if off + 1 >= bytes.len() {
            return Err(TrieError::domain(
                "flag bitmap header popcount disagrees with group-word count",
            ));
        }
        let word = u16::from_be_bytes([bytes[off], bytes[off + 1]]);
        for p in 0..16u32 {
            if word & (1 << (15 - p)) != 0 {
                tags.push(g * 16 + p);
            }
        }
        word_idx += 1;
    }
    if bytes.len() != 2 * word_idx {
        return Err(TrieError::domain(
            "flag bitmap header popcount disagrees with group-word count",
        ));
    }
    Ok(tags)
}

/// ORs `tag` into an existing encoded bitmap (or starts a fresh one).
pub fn upsert_flag(existing: Option<&[u8]>, tag: u32) -> Result<Vec<u8>> {
    let mut tags = match existing {
        Some(bytes) if !bytes.is_empty() => flags_to_tags(bytes)?,
        _ => Vec::new(),
    };
    if !tags.contains(&tag) {
        tags.push(tag);
        tags.sort_unstable();
    }
    tags_to_flags(&tags)
}

/// Whether `tags` can be stored as the inline-ordinal shortcut for a letter
/// alphabet of the given `width`: at most `limit` tags, each small enough
/// to fit in one raw code unit.
pub fn fits_as_optflags(tags: &[u32], width: u32, limit: usize) -> bool {
    tags.len() <= limit && tags.iter().all(|&t| t < (1 << width))
}

/// Splits `bytes` into `width`-bit code units, MSB-first, zero-padding the
/// last unit if `bytes.len() * 8` isn't a multiple of `width`.
pub(crate) fn pack_code_units(bytes: &[u8], width: u32) -> Vec<u32> {
    let width = width as usize;
    let mut bits = Vec::with_capacity(bytes.len() * 8 + width);
    for &b in bytes {
        for i in (0..8).rev() {
            bits.push((b >> i) & 1);
        }
    }
    while bits.len() % width != 0 {
        bits.push(0);
    }
    bits.chunks(width)
        .map(|chunk| chunk.iter().fold(0u32, |acc, &b| (acc << 1) | b as u32))
        .collect()
}

/// Inverse of [`pack_code_units`]: reassembles `width`-bit code units back
/// into bytes, dropping any trailing bits short of a whole byte (the
/// zero-padding `pack_code_units` may have added).
pub(crate) fn unpack_code_units(units: &[u32], width: u32) -> Vec<u8> {
    let width = width as usize;
    let mut bits = Vec::with_capacity(units.len() * width);
    for &u in units {
        for i in (0..width).rev() {
            bits.push(((u >> i) & 1) as u8);
        }
    }
    let whole_bytes = bits.len() / 8;
    bits[..whole_bytes * 8]
        .chunks(8)
        .map(|chunk| chunk.iter().fold(0u8, |acc, &b| (acc << 1) | b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s4_three_word_bitmap() {
        let bytes = tags_to_flags(&[0, 15, 16, 255]).unwrap();
        assert_eq!(bytes.len(), 6); // header + 2 group words
        assert_eq!(u16::from_be_bytes([bytes[0], bytes[1]]), 0x8001);
        let back = flags_to_tags(&bytes).unwrap();
        assert_eq!(back, vec![0, 15, 16, 255]);
    }

    #[test]
    fn round_trip_arbitrary_subsets() {
        for mask in 0u32..(1 << 10) {
            let tags: Vec<u32> = (0..10).filter(|i| mask & (1 << i) != 0).collect();
            let bytes = tags_to_flags(&tags).unwrap();
            assert_eq!(flags_to_tags(&bytes).unwrap(), tags);
        }
    }

    #[test]
    fn upsert_builds_incrementally() {
        let b1 = upsert_flag(None, 5).unwrap();
        let b2 = upsert_flag(Some(&b1), 200).unwrap();
        let b3 = upsert_flag(Some(&b2), 5).unwrap(); // no-op, already present
        assert_eq!(flags_to_tags(&b3).unwrap(), vec![5, 200]);
    }

    #[test]
    fn header_popcount_mismatch_is_rejected() {
        // header claims one group, but two words follow.
        let mut bytes = vec![0x80, 0x00];
        bytes.extend_from_slice(&[0u8, 1, 0, 1]);
        assert!(flags_to_tags(&bytes).is_err());
    }

    #[test]
    fn optflags_fit_check() {
        assert!(fits_as_optflags(&[1, 2, 3], 8, 3));
        assert!(!fits_as_optflags(&[1, 2, 3, 4], 8, 3));
        assert!(!fits_as_optflags(&[1, 70], 6, 4)); // 70 doesn't fit in 6 bits
    }

    #[test]
    fn code_unit_packing_round_trips_width_8() {
        let bytes = tags_to_flags(&[0, 15, 16, 255]).unwrap();
        let units = pack_code_units(&bytes, 8);
        assert_eq!(units.len(), bytes.len()); // 8 divides evenly, no padding
        assert_eq!(unpack_code_units(&units, 8), bytes);
    }

    #[test]
    fn code_unit_packing_round_trips_width_6() {
        let bytes = tags_to_flags(&[0, 15, 16, 255]).unwrap();
        let units = pack_code_units(&bytes, 6);
        assert_eq!(unpack_code_units(&units, 6), bytes);
    }
}
