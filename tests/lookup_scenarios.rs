//! End-to-end build -> freeze -> open -> lookup scenarios.

use hostfence::cache::RadixCache;
use hostfence::{Codec, Config, FrozenTrie, TrieBuilder};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn record(codec: Codec, ordinal: u32, host: &str) -> anyhow::Result<Vec<u32>> {
    let mut digits = codec.encode_host(&ordinal.to_string())?;
    digits.reverse();
    let mut out = digits;
    out.push(codec.tag_delimiter());
    out.extend(codec.encode_reversed(host)?);
    Ok(out)
}

fn build(config: Config, hosts: &[(u32, &str)]) -> anyhow::Result<FrozenTrie> {
    let codec = config.codec;
    let mut builder = TrieBuilder::new(config.clone());
    for &(ordinal, host) in hosts {
        builder.insert(&record(codec, ordinal, host)?)?;
    }
    let (td, rd, node_count) = builder.freeze()?;
    let config = Config { nodecount: node_count, ..config };
    Ok(FrozenTrie::open(td, rd, config)?)
}

#[test]
fn single_host_round_trips() -> anyhow::Result<()> {
    init_logger();
    let trie = build(Config::default(), &[(5, "com")])?;
    let encoded = trie.codec().encode_reversed("com")?;
    let hits = trie.lookup(&encoded)?;
    assert_eq!(hits.get("com"), Some(&vec![5]));
    assert_eq!(hits.len(), 1);
    Ok(())
}

#[test]
fn unrelated_host_has_no_hits() -> anyhow::Result<()> {
    init_logger();
    let trie = build(Config::default(), &[(5, "com")])?;
    let encoded = trie.codec().encode_reversed("net")?;
    let hits = trie.lookup(&encoded)?;
    assert!(hits.is_empty());
    Ok(())
}

#[test]
fn suffix_chain_reports_every_enclosing_match() -> anyhow::Result<()> {
    init_logger();
    let trie = build(
        Config::default(),
        &[(5, "com"), (7, "example.com"), (9, "www.example.com")],
    )?;

    let encoded = trie.codec().encode_reversed("www.example.com")?;
    let hits = trie.lookup(&encoded)?;
    assert_eq!(hits.get("com"), Some(&vec![5]));
    assert_eq!(hits.get("example.com"), Some(&vec![7]));
    assert_eq!(hits.get("www.example.com"), Some(&vec![9]));
    assert_eq!(hits.len(), 3);

    let other = trie.codec().encode_reversed("other.com")?;
    let other_hits = trie.lookup(&other)?;
    assert_eq!(other_hits.get("com"), Some(&vec![5]));
    assert_eq!(other_hits.len(), 1);

    let unrelated = trie.codec().encode_reversed("example.org")?;
    assert!(trie.lookup(&unrelated)?.is_empty());
    Ok(())
}

#[test]
fn shared_suffix_reuses_the_radix_cache() -> anyhow::Result<()> {
    init_logger();
    let trie = build(Config::default(), &[(1, "bbc.co.uk"), (2, "itv.co.uk")])?;

    let mut cache = RadixCache::new(8);
    let bbc = trie.codec().encode_reversed("bbc.co.uk")?;
    let hits = trie.lookup_with_cache(&bbc, &mut cache)?;
    assert_eq!(hits.get("bbc.co.uk"), Some(&vec![1]));

    let itv = trie.codec().encode_reversed("itv.co.uk")?;
    let hits = trie.lookup_with_cache(&itv, &mut cache)?;
    assert_eq!(hits.get("itv.co.uk"), Some(&vec![2]));

    // the shared "co.uk" radix run was reconstructed at least once and is
    // available for the second lookup to reuse
    assert!(!cache.is_empty());
    Ok(())
}

#[test]
fn optflags_shortcut_degrades_to_a_bitmap_past_the_limit() -> anyhow::Result<()> {
    init_logger();
    // Codec::Six's inline-ordinal shortcut tops out at 4 tags; a 5th forces
    // the packed bitmap representation. Both must decode to the same set.
    let trie = build(
        Config::default(),
        &[
            (1, "example.com"),
            (2, "example.com"),
            (3, "example.com"),
            (4, "example.com"),
            (200, "example.com"),
        ],
    )?;
    let encoded = trie.codec().encode_reversed("example.com")?;
    let hits = trie.lookup(&encoded)?;
    assert_eq!(hits.get("example.com"), Some(&vec![1, 2, 3, 4, 200]));
    Ok(())
}

#[test]
fn optflags_false_forces_the_bitmap_even_for_a_single_tag() -> anyhow::Result<()> {
    init_logger();
    // With `optflags` off, even a one-tag set must round-trip through the
    // packed bitmap representation rather than the inline-ordinal shortcut.
    let config = Config { optflags: false, ..Config::default() };
    let trie = build(config, &[(1, "example.com")])?;
    let encoded = trie.codec().encode_reversed("example.com")?;
    let hits = trie.lookup(&encoded)?;
    assert_eq!(hits.get("example.com"), Some(&vec![1]));
    Ok(())
}

#[test]
fn eight_bit_codec_round_trips_raw_bytes() -> anyhow::Result<()> {
    init_logger();
    let config = Config { codec: Codec::Eight, ..Config::default() };
    let trie = build(config, &[(42, "a-b.example.org")])?;
    let encoded = trie.codec().encode_reversed("a-b.example.org")?;
    let hits = trie.lookup(&encoded)?;
    assert_eq!(hits.get("a-b.example.org"), Some(&vec![42]));
    Ok(())
}

#[test]
fn select_as_rank_layout_agrees_with_popcount_layout() -> anyhow::Result<()> {
    init_logger();
    let hosts = [(1, "com"), (2, "example.com"), (3, "www.example.com"), (4, "bbc.co.uk")];

    let popcount_trie = build(Config { selectsearch: false, ..Config::default() }, &hosts)?;
    let select_trie = build(Config { selectsearch: true, ..Config::default() }, &hosts)?;

    for (_, host) in hosts {
        let encoded = popcount_trie.codec().encode_reversed(host)?;
        assert_eq!(popcount_trie.lookup(&encoded)?, select_trie.lookup(&encoded)?);
    }
    Ok(())
}
