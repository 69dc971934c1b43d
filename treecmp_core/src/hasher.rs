use sha1::{Digest, Sha1};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;
use treecmp_common::{Fingerprint, HashAlgorithm, TreeCmpError};

/// Read size per digest update; bounds memory regardless of file size
pub const CHUNK_SIZE: usize = 0x100000;

enum Accumulator {
    Sha1(Sha1),
    Blake3(Box<blake3::Hasher>),
}

impl Accumulator {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Sha1 => Accumulator::Sha1(Sha1::new()),
            HashAlgorithm::Blake3 => Accumulator::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Accumulator::Sha1(hasher) => hasher.update(data),
            Accumulator::Blake3(hasher) => {
                hasher.update(data);
            }
        }
    }

    fn finalize_hex(self) -> String {
        match self {
            Accumulator::Sha1(hasher) => hex::encode(hasher.finalize()),
            Accumulator::Blake3(hasher) => hasher.finalize().to_hex().to_string(),
        }
    }
}

/// Streams file content through a cryptographic digest
#[derive(Debug, Clone, Copy, Default)]
pub struct Hasher {
    algorithm: HashAlgorithm,
}

impl Hasher {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Fingerprint the file at `path`
    pub fn hash(&self, path: &Path) -> Result<Fingerprint, TreeCmpError> {
        let file = File::open(path).map_err(|source| TreeCmpError::Hash {
            path: path.to_path_buf(),
            source,
        })?;

        let fingerprint = self.hash_reader(file).map_err(|source| TreeCmpError::Hash {
            path: path.to_path_buf(),
            source,
        })?;

        debug!("{} {} {}", self.algorithm, fingerprint, path.display());
        Ok(fingerprint)
    }

    /// Fingerprint everything readable from `reader`
    pub fn hash_reader<R: Read>(&self, mut reader: R) -> io::Result<Fingerprint> {
        let mut accumulator = Accumulator::new(self.algorithm);
        let mut buffer = vec![0u8; CHUNK_SIZE];

        loop {
            let n = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            accumulator.update(&buffer[..n]);
        }

        Ok(Fingerprint {
            algorithm: self.algorithm,
            hex: accumulator.finalize_hex(),
        })
    }
}
