// Hash algorithm module
// Closed algorithm registry and the per-file accumulator set

use super::error::HashError;
use std::fmt;
use std::str::FromStr;

use md5::{Digest as Md5Digest, Md5};
use sha1::{Digest as Sha1Digest, Sha1};
use sha2::{Digest as Sha2Digest, Sha256, Sha512};

/// The supported hash algorithms
///
/// A closed set resolved at compile time. Unknown names are rejected when
/// parsing, before any job is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum AlgorithmId {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

impl AlgorithmId {
    /// All supported algorithms, in canonical order
    pub fn all() -> [AlgorithmId; 4] {
        [
            AlgorithmId::Md5,
            AlgorithmId::Sha1,
            AlgorithmId::Sha256,
            AlgorithmId::Sha512,
        ]
    }

    /// Display / column name
    pub fn name(&self) -> &'static str {
        match self {
            AlgorithmId::Md5 => "MD5",
            AlgorithmId::Sha1 => "SHA1",
            AlgorithmId::Sha256 => "SHA256",
            AlgorithmId::Sha512 => "SHA512",
        }
    }

    /// Digest length in bytes
    pub fn output_size(&self) -> usize {
        match self {
            AlgorithmId::Md5 => 16,
            AlgorithmId::Sha1 => 20,
            AlgorithmId::Sha256 => 32,
            AlgorithmId::Sha512 => 64,
        }
    }

    /// Create a fresh accumulator for this algorithm
    pub fn hasher(&self) -> Box<dyn Hasher> {
        match self {
            AlgorithmId::Md5 => Box::new(Md5Wrapper(Md5Digest::new())),
            AlgorithmId::Sha1 => Box::new(Sha1Wrapper(Sha1Digest::new())),
            AlgorithmId::Sha256 => Box::new(Sha256Wrapper(Sha2Digest::new())),
            AlgorithmId::Sha512 => Box::new(Sha512Wrapper(Sha2Digest::new())),
        }
    }
}

impl FromStr for AlgorithmId {
    type Err = HashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "md5" => Ok(AlgorithmId::Md5),
            "sha1" | "sha-1" => Ok(AlgorithmId::Sha1),
            "sha256" | "sha-256" => Ok(AlgorithmId::Sha256),
            "sha512" | "sha-512" => Ok(AlgorithmId::Sha512),
            _ => Err(HashError::UnsupportedAlgorithm {
                algorithm: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for AlgorithmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Trait for hash accumulator implementations
pub trait Hasher: Send {
    /// Update the accumulator with new data
    fn update(&mut self, data: &[u8]);

    /// Finalize the hash and return the raw digest
    fn finalize(self: Box<Self>) -> Vec<u8>;
}

// Wrapper types for the RustCrypto implementations

pub struct Md5Wrapper(Md5);

impl Hasher for Md5Wrapper {
    fn update(&mut self, data: &[u8]) {
        Md5Digest::update(&mut self.0, data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        Md5Digest::finalize(self.0).to_vec()
    }
}

pub struct Sha1Wrapper(Sha1);

impl Hasher for Sha1Wrapper {
    fn update(&mut self, data: &[u8]) {
        Sha1Digest::update(&mut self.0, data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        Sha1Digest::finalize(self.0).to_vec()
    }
}

pub struct Sha256Wrapper(Sha256);

impl Hasher for Sha256Wrapper {
    fn update(&mut self, data: &[u8]) {
        Sha2Digest::update(&mut self.0, data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        Sha2Digest::finalize(self.0).to_vec()
    }
}

pub struct Sha512Wrapper(Sha512);

impl Hasher for Sha512Wrapper {
    fn update(&mut self, data: &[u8]) {
        Sha2Digest::update(&mut self.0, data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        Sha2Digest::finalize(self.0).to_vec()
    }
}

/// Non-empty, duplicate-free algorithm selection
///
/// Iteration order is the user's selection order and defines the order of
/// digest output everywhere (result maps, tables, CSV columns).
#[derive(Debug, Clone, serde::Serialize)]
pub struct AlgorithmSet {
    ids: Vec<AlgorithmId>,
}

impl AlgorithmSet {
    /// Build a set from a selection, preserving first-seen order
    ///
    /// Duplicates are collapsed; an empty selection is a configuration error.
    pub fn new(selection: &[AlgorithmId]) -> Result<Self, HashError> {
        let mut ids = Vec::with_capacity(selection.len());
        for id in selection {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        if ids.is_empty() {
            return Err(HashError::EmptyAlgorithmSet);
        }
        Ok(Self { ids })
    }

    /// Parse a set from user-supplied names, preserving selection order
    pub fn parse(names: &[String]) -> Result<Self, HashError> {
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            ids.push(name.parse::<AlgorithmId>()?);
        }
        Self::new(&ids)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AlgorithmId> {
        self.ids.iter()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn as_slice(&self) -> &[AlgorithmId] {
        &self.ids
    }
}

/// One file's set of live accumulators, one per selected algorithm
///
/// Every chunk is fed to every accumulator before the next chunk is read, so
/// all accumulators observe the identical ordered byte stream. Finalized
/// exactly once; dropped without finalization on cancellation or error.
pub struct DigestSet {
    accumulators: Vec<(AlgorithmId, Box<dyn Hasher>)>,
}

impl DigestSet {
    /// Construct fresh accumulators for every algorithm in the set
    pub fn new(algorithms: &AlgorithmSet) -> Self {
        let accumulators = algorithms
            .iter()
            .map(|id| (*id, id.hasher()))
            .collect();
        Self { accumulators }
    }

    /// Update every accumulator with the same chunk
    pub fn update(&mut self, chunk: &[u8]) {
        for (_, hasher) in &mut self.accumulators {
            hasher.update(chunk);
        }
    }

    /// Finalize all accumulators into lowercase hex digests, in set order
    pub fn finalize(self) -> Vec<(AlgorithmId, String)> {
        self.accumulators
            .into_iter()
            .map(|(id, hasher)| (id, bytes_to_hex(&hasher.finalize())))
            .collect()
    }
}

/// Convert bytes to a lowercase hexadecimal string
fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
