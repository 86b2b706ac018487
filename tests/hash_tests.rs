// Tests for the hashing core: algorithms, accumulator sets, per-file tasks

use filehasher::hash::{hash_file, AlgorithmId, AlgorithmSet, CancelToken, FileStatus, HashError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CHUNK: usize = 4 * 1024 * 1024;

fn all_algorithms() -> AlgorithmSet {
    AlgorithmSet::new(&AlgorithmId::all()).unwrap()
}

fn hash_one(path: &Path, algorithms: &AlgorithmSet) -> Vec<(AlgorithmId, String)> {
    let outcome = hash_file(0, path, algorithms, &CancelToken::new(), CHUNK);
    assert_eq!(outcome.status, FileStatus::Done);
    outcome.digests
}

#[test]
fn test_empty_file_known_vectors() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.bin");
    fs::write(&path, b"").unwrap();

    let digests = hash_one(&path, &all_algorithms());

    assert_eq!(digests[0].1, "d41d8cd98f00b204e9800998ecf8427e");
    assert_eq!(digests[1].1, "da39a3ee5e6b4b0d3255bfef95601890afd80709");
    assert_eq!(
        digests[2].1,
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
    assert_eq!(
        digests[3].1,
        "cf83e1357eefb8bdf1542850d66d8007d620e4050b5715dc83f4a921d36ce9ce\
         47d0d13c5d85f2b0ff8318d2877eec2f63b931bd47417a81a538327af927da3e"
    );
}

#[test]
fn test_abc_known_vectors() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("abc.txt");
    fs::write(&path, b"abc").unwrap();

    let digests = hash_one(&path, &all_algorithms());

    assert_eq!(digests[0].1, "900150983cd24fb0d6963f7d28e17f72");
    assert_eq!(digests[1].1, "a9993e364706816aba3e25717850c26c9cd0d89d");
    assert_eq!(
        digests[2].1,
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
    assert_eq!(
        digests[3].1,
        "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
         2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f"
    );
}

#[test]
fn test_chunk_size_invariance() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.bin");
    let content: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
    fs::write(&path, &content).unwrap();

    let algorithms = all_algorithms();
    let cancel = CancelToken::new();

    let chunk_sizes = [1usize, 1024, 4 * 1024 * 1024, content.len() + 1];
    let reference = hash_file(0, &path, &algorithms, &cancel, chunk_sizes[0]);
    assert_eq!(reference.status, FileStatus::Done);

    for chunk_size in &chunk_sizes[1..] {
        let outcome = hash_file(0, &path, &algorithms, &cancel, *chunk_size);
        assert_eq!(outcome.status, FileStatus::Done);
        assert_eq!(outcome.digests, reference.digests);
        assert_eq!(outcome.bytes_read, content.len() as u64);
    }
}

#[test]
fn test_hashing_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stable.txt");
    fs::write(&path, b"same bytes every time").unwrap();

    let algorithms = all_algorithms();
    let first = hash_one(&path, &algorithms);
    let second = hash_one(&path, &algorithms);

    assert_eq!(first, second);
}

#[test]
fn test_streaming_large_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("large.bin");
    fs::write(&path, vec![b'a'; 100 * 1024]).unwrap();

    // Chunk size far below file size forces many read iterations
    let algorithms = AlgorithmSet::new(&[AlgorithmId::Sha256]).unwrap();
    let outcome = hash_file(0, &path, &algorithms, &CancelToken::new(), 1024);

    assert_eq!(outcome.status, FileStatus::Done);
    assert_eq!(outcome.bytes_read, 100 * 1024);
    let hex = &outcome.digests[0].1;
    assert_eq!(hex.len(), 64);
    assert!(hex.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[test]
fn test_unknown_algorithm_rejected() {
    let result = "sha3-256".parse::<AlgorithmId>();
    match result {
        Err(HashError::UnsupportedAlgorithm { algorithm }) => {
            assert_eq!(algorithm, "sha3-256");
        }
        _ => panic!("Expected UnsupportedAlgorithm error"),
    }
}

#[test]
fn test_algorithm_name_aliases() {
    assert_eq!("SHA-256".parse::<AlgorithmId>().unwrap(), AlgorithmId::Sha256);
    assert_eq!("Md5".parse::<AlgorithmId>().unwrap(), AlgorithmId::Md5);
    assert_eq!("sha-512".parse::<AlgorithmId>().unwrap(), AlgorithmId::Sha512);
}

#[test]
fn test_empty_algorithm_set_rejected() {
    match AlgorithmSet::new(&[]) {
        Err(HashError::EmptyAlgorithmSet) => {}
        _ => panic!("Expected EmptyAlgorithmSet error"),
    }
}

#[test]
fn test_selection_order_preserved() {
    let names = vec![
        "sha512".to_string(),
        "md5".to_string(),
        "sha512".to_string(),
    ];
    let set = AlgorithmSet::parse(&names).unwrap();

    // Duplicates collapse; first-seen order defines output order
    assert_eq!(set.as_slice(), &[AlgorithmId::Sha512, AlgorithmId::Md5]);

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("order.txt");
    fs::write(&path, b"abc").unwrap();

    let digests = hash_one(&path, &set);
    assert_eq!(digests.len(), 2);
    assert_eq!(digests[0].0, AlgorithmId::Sha512);
    assert_eq!(digests[1].0, AlgorithmId::Md5);
}

#[test]
fn test_missing_file_is_error_outcome() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("does_not_exist.bin");

    let outcome = hash_file(0, &path, &all_algorithms(), &CancelToken::new(), CHUNK);

    assert_eq!(outcome.status, FileStatus::Error);
    assert!(outcome.digests.is_empty());
    let message = outcome.error.expect("error message expected");
    assert!(!message.is_empty());
}

#[test]
fn test_pre_cancelled_token_yields_cancelled() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("victim.txt");
    fs::write(&path, b"never hashed").unwrap();

    let cancel = CancelToken::new();
    cancel.cancel();
    cancel.cancel(); // idempotent

    let outcome = hash_file(0, &path, &all_algorithms(), &cancel, CHUNK);

    assert_eq!(outcome.status, FileStatus::Cancelled);
    assert!(outcome.digests.is_empty());
    assert!(outcome.error.is_none());
    assert!(cancel.is_cancelled());
}
