use super::{JwsAlgorithm, StreamSigner};
use crate::error::{JwsError, JwsResult};
use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<sha2::Sha256>;

/* -------------------------------- */
/// Shared key for jws signing
/// Variant names follow the JOSE registry (RFC 7518)
pub enum SharedKey {
  /// HS256
  Hs256(Vec<u8>),
}

impl SharedKey {
  /// Create a new shared key from base64 encoded string
  pub fn from_base64(key: &str) -> JwsResult<Self> {
    let key = general_purpose::STANDARD.decode(key)?;
    Ok(SharedKey::Hs256(key))
  }

  fn mac(&self) -> JwsResult<HmacSha256> {
    match self {
      SharedKey::Hs256(key) => HmacSha256::new_from_slice(key).map_err(|e| JwsError::InvalidKeyMaterial(e.to_string())),
    }
  }
}

impl super::SigningKey for SharedKey {
  /// Compute the mac
  fn sign(&self, data: &[u8]) -> JwsResult<Vec<u8>> {
    let mut mac = self.mac()?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
  }

  fn stream_signer(&self) -> Box<dyn StreamSigner + Send> {
    Box::new(Hs256StreamSigner { mac: self.mac() })
  }

  /// Get the key id
  fn key_id(&self) -> String {
    use super::VerifyingKey;
    <Self as VerifyingKey>::key_id(self)
  }
  /// Get the algorithm name
  fn alg(&self) -> JwsAlgorithm {
    use super::VerifyingKey;
    <Self as VerifyingKey>::alg(self)
  }
}

impl super::VerifyingKey for SharedKey {
  /// Verify the mac
  fn verify(&self, data: &[u8], expected_mac: &[u8]) -> JwsResult<()> {
    use super::SigningKey;
    let calculated_mac = self.sign(data)?;
    if calculated_mac == expected_mac {
      Ok(())
    } else {
      Err(JwsError::InvalidSignature("Invalid mac".to_string()))
    }
  }

  /// Get the key id
  fn key_id(&self) -> String {
    match self {
      SharedKey::Hs256(key) => {
        let mut hasher = <Sha256 as Digest>::new();
        hasher.update(key);
        let hash = hasher.finalize();
        general_purpose::URL_SAFE_NO_PAD.encode(hash)
      }
    }
  }
  /// Get the algorithm name
  fn alg(&self) -> JwsAlgorithm {
    match self {
      SharedKey::Hs256(_) => JwsAlgorithm::Hs256,
    }
  }
}

/// Incremental HS256 signer
struct Hs256StreamSigner {
  mac: JwsResult<HmacSha256>,
}

impl StreamSigner for Hs256StreamSigner {
  fn update(&mut self, data: &[u8]) {
    if let Ok(mac) = self.mac.as_mut() {
      mac.update(data);
    }
  }
  fn finish(&mut self) -> JwsResult<Vec<u8>> {
    let mac = std::mem::replace(&mut self.mac, Err(JwsError::SignatureAlreadyFinalized))?;
    Ok(mac.finalize().into_bytes().to_vec())
  }
}
