//! Digest helpers and hash-bucket path construction.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::MAIN_SEPARATOR;
use std::sync::OnceLock;

use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

use crate::random::{sample_symbols, RandomError};

type DigestFn = fn(&[u8]) -> Vec<u8>;

const HEX_ALPHABET: &[u8] = b"0123456789abcdef";

/// Immutable process-wide registry of available digest algorithms,
/// built once on first use.
fn registry() -> &'static HashMap<&'static str, DigestFn> {
    static REGISTRY: OnceLock<HashMap<&'static str, DigestFn>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut algos: HashMap<&'static str, DigestFn> = HashMap::new();
        algos.insert("sha224", |data| Sha224::digest(data).to_vec());
        algos.insert("sha256", |data| Sha256::digest(data).to_vec());
        algos.insert("sha384", |data| Sha384::digest(data).to_vec());
        algos.insert("sha512", |data| Sha512::digest(data).to_vec());
        algos.insert("blake3", |data| blake3::hash(data).as_bytes().to_vec());
        algos
    })
}

/// Names of the registered digest algorithms, sorted.
pub fn algorithm_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = registry().keys().copied().collect();
    names.sort_unstable();
    names
}

/// Hash `data` with the named algorithm and return lowercase hex.
///
/// The name is matched case-insensitively; unknown names fall back to
/// sha256.
pub fn hash_hex(data: &[u8], algo: &str) -> String {
    let algo = algo.to_ascii_lowercase();
    let digest = registry()
        .get(algo.as_str())
        .copied()
        .unwrap_or_else(|| registry()["sha256"]);
    to_hex(&digest(data))
}

fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        // writing to a String cannot fail
        let _ = write!(out, "{b:02x}");
    }
    out
}

/// Build a 3-level hash-bucket path like `"c0/ff/ee/"` from a hex id
/// (dashes are ignored, so UUIDs work directly). Returns `None` when
/// fewer than 6 hex digits remain.
pub fn hash_path(id: &str) -> Option<String> {
    let hex: Vec<char> = id
        .chars()
        .filter(|c| *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect();
    if hex.len() < 6 || !hex[..6].iter().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let mut out = String::with_capacity(9);
    for pair in hex[..6].chunks(2) {
        out.push(pair[0]);
        out.push(pair[1]);
        out.push(MAIN_SEPARATOR);
    }
    Some(out)
}

/// Build a fresh random 3-level hash-bucket path.
pub fn random_hash_path<R>(rng: &mut R) -> Result<String, RandomError>
where
    R: RngCore + CryptoRng,
{
    let hex = sample_symbols(rng, HEX_ALPHABET, 6)?;
    let mut out = String::with_capacity(9);
    for pair in hex.chunks(2) {
        out.push(char::from(pair[0]));
        out.push(char::from(pair[1]));
        out.push(MAIN_SEPARATOR);
    }
    Ok(out)
}
