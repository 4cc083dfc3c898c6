use crate::{
  crypto::VerifyingKey,
  error::{JwsError, JwsResult},
  headers::JwsHeaders,
  signature::JwsSignature,
  trace::*,
};
use base64::{engine::general_purpose, Engine as _};
use std::sync::{Arc, Mutex};

/* ---------------------------------------- */
/// A lazily evaluated detached jws value. It shares the signing operation with whatever
/// collaborator streams the payload bytes into it; `serialize` forces the deferred
/// signature and yields the detached compact form `BASE64URL(header)..BASE64URL(sig)`
/// (RFC 7515 appendix F, payload omitted).
///
/// The serialization subsystem must have finished feeding the payload before calling
/// `serialize`; the operation cannot be fed afterwards.
#[derive(Clone)]
pub struct DetachedJws {
  headers: JwsHeaders,
  signature: Arc<Mutex<JwsSignature>>,
}

impl DetachedJws {
  pub fn new(headers: JwsHeaders, signature: Arc<Mutex<JwsSignature>>) -> Self {
    Self { headers, signature }
  }

  /// The header set this signature reflects
  pub fn headers(&self) -> &JwsHeaders {
    &self.headers
  }

  /// Force the signature and emit the detached compact serialization
  pub fn serialize(&self) -> JwsResult<String> {
    let mut op = self.signature.lock().map_err(|_| JwsError::SharedSignatureLock)?;
    let signature_bytes = op.finish()?;
    debug!("detached jws forced");
    Ok(format!(
      "{}..{}",
      op.encoded_header(),
      general_purpose::URL_SAFE_NO_PAD.encode(signature_bytes)
    ))
  }
}

/* ---------------------------------------- */
/// Verify a detached compact serialization against externally supplied payload bytes.
/// Returns the decoded protected headers on success.
pub fn verify_detached(compact: &str, payload: &[u8], key: &impl VerifyingKey) -> JwsResult<JwsHeaders> {
  let mut segments = compact.split('.');
  let (Some(encoded_header), Some(embedded_payload), Some(encoded_signature), None) =
    (segments.next(), segments.next(), segments.next(), segments.next())
  else {
    return Err(JwsError::NotDetachedCompact("expected three dot-separated segments".to_string()));
  };
  if !embedded_payload.is_empty() {
    return Err(JwsError::NotDetachedCompact("payload segment must be empty".to_string()));
  }

  let headers = JwsHeaders::from_encoded(encoded_header)?;
  let header_alg = headers
    .alg()
    .ok_or(JwsError::InvalidAlgorithmName("no alg in header".to_string()))?;
  if header_alg != key.alg() {
    return Err(JwsError::AlgorithmMismatch {
      header: header_alg.to_string(),
      key: key.alg().to_string(),
    });
  }

  let signature_bytes = general_purpose::URL_SAFE_NO_PAD.decode(encoded_signature)?;
  let signing_input = format!("{}.{}", encoded_header, general_purpose::URL_SAFE_NO_PAD.encode(payload));
  key.verify(signing_input.as_bytes(), &signature_bytes)?;
  Ok(headers)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::crypto::{JwsAlgorithm, SharedKey};

  fn shared_key() -> SharedKey {
    SharedKey::Hs256(b"01234567890123456789012345678901".to_vec())
  }

  fn detached_over(payload: &[u8]) -> (DetachedJws, Arc<Mutex<JwsSignature>>) {
    let key = shared_key();
    let mut headers = JwsHeaders::new();
    headers.set_alg(&JwsAlgorithm::Hs256);
    let op = JwsSignature::try_new(&headers, &key).unwrap();
    let shared = Arc::new(Mutex::new(op));
    shared.lock().unwrap().update(payload);
    (DetachedJws::new(headers, shared.clone()), shared)
  }

  #[test]
  fn test_serialize_and_verify_round_trip() {
    let payload = b"{\"hello\": \"world\"}";
    let (jws, _) = detached_over(payload);
    let compact = jws.serialize().unwrap();

    let segments = compact.split('.').collect::<Vec<_>>();
    assert_eq!(segments.len(), 3);
    assert!(segments[1].is_empty());

    let headers = verify_detached(&compact, payload, &shared_key()).unwrap();
    assert_eq!(headers.alg(), Some(JwsAlgorithm::Hs256));
  }

  #[test]
  fn test_verify_rejects_altered_payload() {
    let (jws, _) = detached_over(b"original bytes");
    let compact = jws.serialize().unwrap();
    assert!(verify_detached(&compact, b"tampered bytes", &shared_key()).is_err());
  }

  #[test]
  fn test_verify_rejects_embedded_payload() {
    let err = verify_detached("eyJhbGciOiJIUzI1NiJ9.cGF5bG9hZA.c2ln", b"payload", &shared_key());
    assert!(matches!(err, Err(JwsError::NotDetachedCompact(_))));
  }

  #[test]
  fn test_serialize_twice_fails() {
    let (jws, _) = detached_over(b"bytes");
    jws.serialize().unwrap();
    assert!(matches!(jws.serialize(), Err(JwsError::SignatureAlreadyFinalized)));
  }
}
