//! Earlier versions never observe later edits

use std::sync::Arc;
use strand_rope::*;

fn env() -> Env {
    Env::new(RopeConfig::with_max_leaf_bytes(8)).unwrap()
}

fn sample(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i.wrapping_mul(97) + 13) as u8).collect()
}

#[test]
fn test_concat_versions() {
    let env = env();
    let bs = sample(1024);
    let mut rope = env.empty();
    let mut versions = Vec::new();
    for &b in &bs {
        rope = rope.concat(&env.from_bytes([b]));
        versions.push(rope.clone());
    }
    for (i, version) in versions.iter().enumerate() {
        assert_eq!(version.to_bytes(), &bs[..=i]);
    }
}

#[test]
fn test_split_versions() {
    let env = env();
    let bs = sample(1024);
    let rope = env.from_bytes(&bs);
    let halves: Vec<(Rope, Rope)> = (0..bs.len()).map(|i| rope.split(i).unwrap()).collect();
    for (i, (left, right)) in halves.iter().enumerate() {
        assert_eq!(left.to_bytes(), &bs[..i]);
        assert_eq!(right.to_bytes(), &bs[i..]);
    }
    assert_eq!(rope.to_bytes(), bs);
}

#[test]
fn test_insert_versions() {
    let env = env();
    let bs = sample(1024);
    let mut rope = env.empty();
    let mut versions = Vec::new();
    for &b in &bs {
        rope = rope.insert(rope.len(), [b]).unwrap();
        versions.push(rope.clone());
    }
    for (i, version) in versions.iter().enumerate() {
        assert_eq!(version.to_bytes(), &bs[..=i]);
    }
}

#[test]
fn test_delete_versions() {
    let env = env();
    let bs = b"foobarbaz";
    let mut rope = env.from_bytes(bs);
    let mut versions = Vec::new();
    for _ in 0..bs.len() {
        rope = rope.delete(0, 1).unwrap();
        versions.push(rope.clone());
    }
    for (i, version) in versions.iter().enumerate() {
        assert_eq!(version.to_bytes(), &bs[i + 1..]);
    }
}

#[test]
fn test_edits_share_untouched_subtrees() {
    let env = env();
    let rope = env.from_bytes(sample(4096));
    let edited = rope.insert(4000, "tail edit").unwrap();

    // The left half of the tree is far from the edit and must be reused
    let (old_left, _) = rope.root().unwrap().children().unwrap();
    let mut node = edited.root().unwrap();
    let mut found = false;
    while let Some((left, _)) = node.children() {
        if Arc::ptr_eq(left, old_left) {
            found = true;
            break;
        }
        node = left;
    }
    assert!(found, "left subtree was copied instead of shared");
}

#[test]
fn test_versions_readable_across_threads() {
    let env = env();
    let base = env.from_bytes(sample(10_000));
    let versions: Vec<Rope> = (0..8)
        .map(|i| base.insert(i * 1000, format!("<{}>", i)).unwrap())
        .collect();

    std::thread::scope(|s| {
        for (i, version) in versions.iter().enumerate() {
            let base = &base;
            s.spawn(move || {
                let marker = format!("<{}>", i);
                assert_eq!(version.sub(i * 1000, marker.len()).unwrap(), marker.as_bytes());
                assert_eq!(version.len(), base.len() + marker.len());
            });
        }
    });
    assert_eq!(base.to_bytes(), sample(10_000));
}

#[test]
fn test_parallel_builds_share_nodes() {
    let env = env();
    let bs = sample(20_000);
    let ropes: Vec<Rope> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..4).map(|_| s.spawn(|| env.from_bytes(&bs))).collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    for rope in &ropes[1..] {
        assert!(rope.ptr_eq(&ropes[0]));
    }
}
