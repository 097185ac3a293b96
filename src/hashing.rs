use crate::error::AppError;
use crate::metadata::HashDigest;
use blake2::{Blake2b512, Blake2s256};
use md5::Md5;
use sha1::Sha1;
use sha2::digest::DynDigest;
use sha2::{Digest, Sha256, Sha512};
use std::io::Read;

/// Hash algorithms accepted in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Md5,
    Sha1,
    Sha256,
    Sha512,
    Blake2b,
    Blake2s,
}

impl HashAlgorithm {
    pub fn parse(name: &str) -> Result<Self, AppError> {
        match name.to_ascii_lowercase().as_str() {
            "md5" => Ok(HashAlgorithm::Md5),
            "sha1" | "sha-1" => Ok(HashAlgorithm::Sha1),
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            "sha512" | "sha-512" => Ok(HashAlgorithm::Sha512),
            "blake2b" => Ok(HashAlgorithm::Blake2b),
            "blake2s" => Ok(HashAlgorithm::Blake2s),
            other => Err(AppError::UnknownHashAlgorithm(other.to_string())),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HashAlgorithm::Md5 => "MD5",
            HashAlgorithm::Sha1 => "SHA1",
            HashAlgorithm::Sha256 => "SHA256",
            HashAlgorithm::Sha512 => "SHA512",
            HashAlgorithm::Blake2b => "BLAKE2b",
            HashAlgorithm::Blake2s => "BLAKE2s",
        }
    }

    fn hasher(self) -> Box<dyn DynDigest> {
        match self {
            HashAlgorithm::Md5 => Box::new(Md5::new()),
            HashAlgorithm::Sha1 => Box::new(Sha1::new()),
            HashAlgorithm::Sha256 => Box::new(Sha256::new()),
            HashAlgorithm::Sha512 => Box::new(Sha512::new()),
            HashAlgorithm::Blake2b => Box::new(Blake2b512::new()),
            HashAlgorithm::Blake2s => Box::new(Blake2s256::new()),
        }
    }
}

pub fn parse_algorithms(names: &[String]) -> Result<Vec<HashAlgorithm>, AppError> {
    names.iter().map(|n| HashAlgorithm::parse(n)).collect()
}

fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

/// Feed the reader through every requested digest in one pass, 8 KiB chunks.
pub fn hash_reader<R: Read>(
    mut reader: R,
    algorithms: &[HashAlgorithm],
) -> Result<Vec<HashDigest>, AppError> {
    let mut hashers: Vec<(HashAlgorithm, Box<dyn DynDigest>)> =
        algorithms.iter().map(|a| (*a, a.hasher())).collect();

    let mut buffer = [0u8; 8192];
    loop {
        let n = reader.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        for (_, hasher) in hashers.iter_mut() {
            hasher.update(&buffer[..n]);
        }
    }

    Ok(hashers
        .into_iter()
        .map(|(algo, hasher)| HashDigest {
            algorithm: algo.label().to_string(),
            digest: to_hex(&hasher.finalize()),
        })
        .collect())
}

pub fn hash_bytes(bytes: &[u8], algorithms: &[HashAlgorithm]) -> Vec<HashDigest> {
    algorithms
        .iter()
        .map(|algo| {
            let mut hasher = algo.hasher();
            hasher.update(bytes);
            HashDigest {
                algorithm: algo.label().to_string(),
                digest: to_hex(&hasher.finalize()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [HashAlgorithm; 6] = [
        HashAlgorithm::Md5,
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha512,
        HashAlgorithm::Blake2b,
        HashAlgorithm::Blake2s,
    ];

    fn digest_for(input: &[u8], algo: HashAlgorithm) -> String {
        hash_bytes(input, &[algo]).remove(0).digest
    }

    #[test]
    fn known_vectors_empty_input() {
        assert_eq!(
            digest_for(b"", HashAlgorithm::Md5),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
        assert_eq!(
            digest_for(b"", HashAlgorithm::Sha1),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
        assert_eq!(
            digest_for(b"", HashAlgorithm::Sha256),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn known_vectors_abc() {
        assert_eq!(
            digest_for(b"abc", HashAlgorithm::Md5),
            "900150983cd24fb0d6963f7d28e17f72"
        );
        assert_eq!(
            digest_for(b"abc", HashAlgorithm::Sha1),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
        assert_eq!(
            digest_for(b"abc", HashAlgorithm::Sha256),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(
            digest_for(b"abc", HashAlgorithm::Sha512),
            "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
             2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f"
        );
    }

    #[test]
    fn digest_lengths_and_stability() {
        let digests = hash_bytes(b"image bytes", &ALL);
        let again = hash_bytes(b"image bytes", &ALL);
        for (d, e) in digests.iter().zip(again.iter()) {
            assert_eq!(d.digest, e.digest);
            assert!(d.digest.chars().all(|c| c.is_ascii_hexdigit()));
        }
        let by_name: std::collections::HashMap<_, _> = digests
            .iter()
            .map(|d| (d.algorithm.as_str(), d.digest.len()))
            .collect();
        assert_eq!(by_name["MD5"], 32);
        assert_eq!(by_name["SHA1"], 40);
        assert_eq!(by_name["SHA256"], 64);
        assert_eq!(by_name["SHA512"], 128);
        assert_eq!(by_name["BLAKE2b"], 128);
        assert_eq!(by_name["BLAKE2s"], 64);
    }

    #[test]
    fn chunked_matches_single_pass() {
        // Cross the 8 KiB chunk boundary.
        let data = vec![0xABu8; 20_000];
        let whole = hash_bytes(&data, &[HashAlgorithm::Sha256]);
        let streamed = hash_reader(&data[..], &[HashAlgorithm::Sha256]).unwrap();
        assert_eq!(whole[0].digest, streamed[0].digest);
    }

    #[test]
    fn unknown_algorithm_rejected() {
        assert!(HashAlgorithm::parse("crc32").is_err());
        assert!(parse_algorithms(&["sha256".into(), "bogus".into()]).is_err());
    }
}
