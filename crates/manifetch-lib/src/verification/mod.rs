mod content_digest_hasher;

pub use content_digest_hasher::{ContentDigestVerifier, VerificationError, verify_sha256};
