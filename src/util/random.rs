use crate::core::types::{Nonce, SessionId};

use super::hash::Salt;

pub trait FromRandom {
    fn from_random() -> Self;
}

impl FromRandom for SessionId {
    fn from_random() -> Self {
        SessionId(random_string(32))
    }
}

impl FromRandom for Nonce {
    fn from_random() -> Self {
        Nonce(random_string(32))
    }
}

impl FromRandom for Salt {
    fn from_random() -> Self {
        Salt(random_string(16))
    }
}

/// `size` bytes from the thread-local CSPRNG, base64url without padding.
fn random_string(size: usize) -> String {
    use rand::RngCore;

    let mut bytes = vec![0u8; size];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::encode_config(bytes, base64::URL_SAFE_NO_PAD)
}
