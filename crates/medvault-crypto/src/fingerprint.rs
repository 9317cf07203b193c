//! SHA-256 content fingerprints over plaintext bytes

use medvault_core::ContentFingerprint;
use sha2::{Digest, Sha256};

/// Fingerprint the exact plaintext bytes (no normalization).
pub fn fingerprint(plaintext: &[u8]) -> ContentFingerprint {
    let digest: [u8; 32] = Sha256::digest(plaintext).into();
    ContentFingerprint::from_digest(&digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn empty_input_is_well_known_digest() {
        assert_eq!(
            fingerprint(b"").as_str(),
            "0xe3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn known_answer_abc() {
        assert_eq!(
            fingerprint(b"abc").as_str(),
            "0xba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn format_is_prefixed_lowercase_hex() {
        let fp = fingerprint(b"Hemoglobin 14.2 g/dL");
        assert_eq!(fp.as_str().len(), ContentFingerprint::ENCODED_LEN);
        assert!(fp.as_str().starts_with("0x"));
        assert_eq!(ContentFingerprint::parse(fp.as_str()).unwrap(), fp);
    }

    #[test]
    fn no_normalization() {
        assert_ne!(fingerprint(b"result: ok"), fingerprint(b"result: ok "));
        assert_ne!(fingerprint(b"Result"), fingerprint(b"result"));
        assert_ne!(fingerprint(b"a\r\n"), fingerprint(b"a\n"));
    }

    #[test]
    fn no_collisions_in_corpus() {
        let corpus: Vec<Vec<u8>> = (0u32..2000)
            .map(|i| format!("report #{i}").into_bytes())
            .chain(std::iter::once(Vec::new()))
            .collect();
        let fps: HashSet<_> = corpus.iter().map(|p| fingerprint(p)).collect();
        assert_eq!(fps.len(), corpus.len());
    }

    proptest! {
        #[test]
        fn fingerprint_is_deterministic(data in proptest::collection::vec(any::<u8>(), 0..=4096)) {
            prop_assert_eq!(fingerprint(&data), fingerprint(&data));
        }

        #[test]
        fn distinct_inputs_distinct_fingerprints(
            a in proptest::collection::vec(any::<u8>(), 0..=256),
            b in proptest::collection::vec(any::<u8>(), 0..=256),
        ) {
            prop_assume!(a != b);
            prop_assert_ne!(fingerprint(&a), fingerprint(&b));
        }
    }
}
