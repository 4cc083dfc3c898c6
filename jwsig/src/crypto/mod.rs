mod asymmetric;
mod symmetric;

use crate::error::{JwsError, JwsResult};

pub use asymmetric::{PublicKey, SecretKey};
pub use symmetric::SharedKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// JOSE algorithm names, as registered in RFC 7518
pub enum JwsAlgorithm {
  Hs256,
  Es256,
  Es384,
  EdDsa,
}

impl JwsAlgorithm {
  pub fn as_str(&self) -> &'static str {
    match self {
      JwsAlgorithm::Hs256 => "HS256",
      JwsAlgorithm::Es256 => "ES256",
      JwsAlgorithm::Es384 => "ES384",
      JwsAlgorithm::EdDsa => "EdDSA",
    }
  }
}

impl std::fmt::Display for JwsAlgorithm {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl core::str::FromStr for JwsAlgorithm {
  type Err = JwsError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "HS256" => Ok(Self::Hs256),
      "ES256" => Ok(Self::Es256),
      "ES384" => Ok(Self::Es384),
      "EdDSA" => Ok(Self::EdDsa),
      _ => Err(JwsError::InvalidAlgorithmName(s.to_string())),
    }
  }
}

/// Incremental signer over a byte stream.
/// `update` feeds signing-input bytes as they become available, `finish` emits the signature.
/// ECDSA and HMAC digest incrementally; Ed25519 buffers since the algorithm is not prehashed.
pub trait StreamSigner {
  fn update(&mut self, data: &[u8]);
  fn finish(&mut self) -> JwsResult<Vec<u8>>;
}

/// SigningKey trait
pub trait SigningKey {
  fn sign(&self, data: &[u8]) -> JwsResult<Vec<u8>>;
  /// Build an incremental signer for a byte stream observed piecewise
  fn stream_signer(&self) -> Box<dyn StreamSigner + Send>;
  fn key_id(&self) -> String;
  fn alg(&self) -> JwsAlgorithm;
}

/// VerifyingKey trait
pub trait VerifyingKey {
  fn verify(&self, data: &[u8], signature: &[u8]) -> JwsResult<()>;
  fn key_id(&self) -> String;
  fn alg(&self) -> JwsAlgorithm;
}

#[cfg(test)]
mod tests {
  use super::*;
  use core::str::FromStr;

  #[test]
  fn test_algorithm_names_round_trip() {
    for alg in [
      JwsAlgorithm::Hs256,
      JwsAlgorithm::Es256,
      JwsAlgorithm::Es384,
      JwsAlgorithm::EdDsa,
    ] {
      assert_eq!(JwsAlgorithm::from_str(alg.as_str()).unwrap(), alg);
    }
    assert!(JwsAlgorithm::from_str("RS256").is_err());
  }
}
