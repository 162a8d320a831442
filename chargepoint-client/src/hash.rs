use std::fmt::Write;

/// Digest width for de-identified ids. Ten hex characters is wide enough to
/// keep accidental collisions negligible at fleet scale while staying short
/// enough to eyeball in the ledgers.
const DIGEST_BYTES: usize = 5;

/// One-way digest of a raw identifier (station, org, user, credential).
///
/// Deterministic: the same input always yields the same output, so hashed
/// ids remain usable as dedup and correlation keys. This is the only
/// de-identification applied to the ledgers.
pub fn hash_id(raw: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(raw.as_bytes());

    let mut digest = [0u8; DIGEST_BYTES];
    hasher.finalize_xof().fill(&mut digest);

    let mut out = String::with_capacity(DIGEST_BYTES * 2);
    for byte in digest {
        // writing to a String cannot fail
        let _ = write!(out, "{byte:02x}");
    }
    out
}
