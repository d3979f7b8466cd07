use sha2::{Digest, Sha256};

/// Hashes a sequence of named byte buffers in the order given.
///
/// Each part contributes its label, its length and its bytes, so moving bytes
/// from one buffer into the next changes the digest.
pub fn digest_parts<'a, I>(parts: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let mut hasher = Sha256::new();
    for (label, bytes) in parts {
        hasher.update(label.as_bytes());
        hasher.update([0u8]);
        hasher.update((bytes.len() as u64).to_le_bytes());
        hasher.update(bytes);
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_between_parts_matter() {
        let joined = digest_parts([("a", b"xy".as_slice()), ("b", b"z".as_slice())]);
        let shifted = digest_parts([("a", b"x".as_slice()), ("b", b"yz".as_slice())]);
        assert_ne!(joined, shifted);
        assert_eq!(joined.len(), 64);
        assert_eq!(joined, digest_parts([("a", b"xy".as_slice()), ("b", b"z".as_slice())]));
    }
}
