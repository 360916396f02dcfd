use std::fmt;

use rand::{CryptoRng, RngCore};
use zeroize::Zeroize;

/// Length of a generated share secret in bytes.
pub const GENERATED_SECRET_LEN: usize = 32;

/// Key material for share token signatures.
///
/// 敏感密钥：
/// - 不可 Clone
/// - 不可 Serialize / Deserialize
/// - 不可 Debug / Display 输出真实内容
/// - Drop 时清零内存
pub struct ShareSecret {
    inner: Vec<u8>,
}

impl ShareSecret {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { inner: bytes }
    }

    /// Use a configured passphrase as the key, byte for byte.
    pub fn from_passphrase(passphrase: &str) -> Self {
        Self {
            inner: passphrase.as_bytes().to_vec(),
        }
    }

    /// Fresh random key, for processes started without a configured secret.
    /// Tokens signed with it stop verifying after a restart.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut inner = vec![0u8; GENERATED_SECRET_LEN];
        rng.fill_bytes(&mut inner);
        Self { inner }
    }

    pub fn expose(&self) -> &[u8] {
        &self.inner
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl fmt::Debug for ShareSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for ShareSecret {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn debug_output_is_redacted() {
        let secret = ShareSecret::from_passphrase("hunter2");
        assert_eq!(format!("{:?}", secret), "[REDACTED]");
    }

    #[test]
    fn generated_secret_has_expected_length() {
        let mut rng = StdRng::seed_from_u64(1);
        let a = ShareSecret::generate(&mut rng);
        let b = ShareSecret::generate(&mut rng);

        assert_eq!(a.expose().len(), GENERATED_SECRET_LEN);
        assert_ne!(a.expose(), b.expose());
    }
}
