use crate::{
  crypto::{SigningKey, StreamSigner},
  error::{JwsError, JwsResult},
  headers::JwsHeaders,
  trace::*,
};
use base64::{engine::general_purpose, Engine as _};

/* ---------------------------------------- */
/// A jws signing operation bound to a protected header set, fed the detached payload
/// bytes in two phases: `update` while the payload is being written out, then a single
/// `finish` once the whole payload has been observed.
///
/// The signing input is `BASE64URL(header) || "." || BASE64URL(payload)` (RFC 7515
/// section 5.1). Payload bytes are base64url-encoded incrementally in 3-byte groups, so
/// no second copy of the payload is held while signing.
pub struct JwsSignature {
  signer: Box<dyn StreamSigner + Send>,
  encoded_header: String,
  /// raw payload bytes not yet forming a full base64 group
  carry: Vec<u8>,
  finished: bool,
}

impl JwsSignature {
  /// Bind a signing operation to the given headers and key. The header `alg` must have
  /// been set and must match the key's algorithm.
  pub fn try_new(headers: &JwsHeaders, key: &impl SigningKey) -> JwsResult<Self> {
    let header_alg = headers.alg().ok_or(JwsError::NoAlgorithmConfigured)?;
    if header_alg != key.alg() {
      return Err(JwsError::AlgorithmMismatch {
        header: header_alg.to_string(),
        key: key.alg().to_string(),
      });
    }

    let encoded_header = headers.encoded()?;
    let mut signer = key.stream_signer();
    signer.update(encoded_header.as_bytes());
    signer.update(b".");
    debug!(alg = %header_alg, "jws signing operation bound");

    Ok(Self {
      signer,
      encoded_header,
      carry: Vec::with_capacity(3),
      finished: false,
    })
  }

  /// Feed payload bytes as they are written out. Only whole 3-byte groups are encoded
  /// immediately; the remainder is carried into the next call.
  pub fn update(&mut self, data: &[u8]) {
    if self.finished || data.is_empty() {
      return;
    }
    self.carry.extend_from_slice(data);
    let whole = self.carry.len() - self.carry.len() % 3;
    if whole == 0 {
      return;
    }
    let encoded = general_purpose::URL_SAFE_NO_PAD.encode(&self.carry[..whole]);
    self.signer.update(encoded.as_bytes());
    self.carry.drain(..whole);
  }

  /// Flush the encoder remainder and sign the accumulated signing input.
  /// A second call fails with `SignatureAlreadyFinalized`.
  pub fn finish(&mut self) -> JwsResult<Vec<u8>> {
    if self.finished {
      return Err(JwsError::SignatureAlreadyFinalized);
    }
    self.finished = true;
    if !self.carry.is_empty() {
      let encoded = general_purpose::URL_SAFE_NO_PAD.encode(&self.carry);
      self.signer.update(encoded.as_bytes());
      self.carry.clear();
    }
    self.signer.finish()
  }

  pub fn is_finished(&self) -> bool {
    self.finished
  }

  /// The base64url-encoded protected header this operation was bound to
  pub fn encoded_header(&self) -> &str {
    &self.encoded_header
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::crypto::{JwsAlgorithm, SharedKey, VerifyingKey};

  fn shared_key() -> SharedKey {
    SharedKey::Hs256(b"01234567890123456789012345678901".to_vec())
  }

  fn signature_for(chunks: &[&[u8]]) -> (String, Vec<u8>) {
    let key = shared_key();
    let mut headers = JwsHeaders::new();
    headers.set_alg(&JwsAlgorithm::Hs256);
    let mut op = JwsSignature::try_new(&headers, &key).unwrap();
    for chunk in chunks {
      op.update(chunk);
    }
    let header = op.encoded_header().to_string();
    (header, op.finish().unwrap())
  }

  #[test]
  fn test_chunking_is_invisible() {
    // same payload split at awkward (non 3-byte) offsets must sign identically
    let (_, whole) = signature_for(&[b"{\"hello\": \"world\"}"]);
    let (_, split) = signature_for(&[b"{\"h", b"e", b"llo\": \"wor", b"ld\"}"]);
    assert_eq!(whole, split);
  }

  #[test]
  fn test_signing_input_is_standard_jws_input() {
    let key = shared_key();
    let (encoded_header, signature) = signature_for(&[b"payload bytes"]);
    let expected_input = format!(
      "{}.{}",
      encoded_header,
      base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(b"payload bytes")
    );
    key.verify(expected_input.as_bytes(), &signature).unwrap();
  }

  #[test]
  fn test_finish_is_one_shot() {
    let key = shared_key();
    let mut headers = JwsHeaders::new();
    headers.set_alg(&JwsAlgorithm::Hs256);
    let mut op = JwsSignature::try_new(&headers, &key).unwrap();
    op.update(b"data");
    op.finish().unwrap();
    assert!(matches!(op.finish(), Err(JwsError::SignatureAlreadyFinalized)));
  }

  #[test]
  fn test_alg_must_match_key() {
    let key = shared_key();
    let mut headers = JwsHeaders::new();
    headers.set_alg(&JwsAlgorithm::Es256);
    assert!(matches!(
      JwsSignature::try_new(&headers, &key),
      Err(JwsError::AlgorithmMismatch { .. })
    ));

    let headers = JwsHeaders::new();
    assert!(matches!(
      JwsSignature::try_new(&headers, &key),
      Err(JwsError::NoAlgorithmConfigured)
    ));
  }
}
