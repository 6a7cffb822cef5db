//! Shared RSA fixtures for unit tests.

use rsa::RsaPrivateKey;
use std::sync::OnceLock;

const TEST_KEY_BITS: usize = 1024;

fn generate() -> RsaPrivateKey {
    RsaPrivateKey::new(&mut rand::rngs::OsRng, TEST_KEY_BITS).expect("test key generation")
}

pub(crate) fn alice() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(generate)
}

pub(crate) fn bob() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(generate)
}
