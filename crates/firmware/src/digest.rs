//! Whole-file SHA-256 digests.
//!
//! Integrity is defined purely by digest equality: firmware images are
//! treated as opaque bytes and never parsed.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::Result;

const READ_CHUNK: usize = 64 * 1024;

/// A 256-bit digest rendered as lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest256([u8; 32]);

impl Digest256 {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Digest256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Digest256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest256({})", &self.to_hex()[..12])
    }
}

pub fn hash_bytes(data: &[u8]) -> Digest256 {
    Digest256(Sha256::digest(data).into())
}

/// Hashes a file in fixed-size chunks so large images never sit in memory.
pub fn hash_file(path: &Path) -> Result<Digest256> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; READ_CHUNK];
    loop {
        let read = reader.read(&mut buf)?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(Digest256(hasher.finalize().into()))
}
