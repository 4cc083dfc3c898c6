use crate::{
  entity::{MultipartBody, Part, PartBody},
  error::{MultipartSigError, MultipartSigResult},
  trace::*,
  MEDIA_TYPE_JOSE, SIGNATURE_PART_NAME,
};
use jwsig::prelude::{verify_detached, JwsHeaders, VerifyingKey};

/* --------------------------------------- */
/// Receiving-side counterpart of the client filter: requires the final part of an
/// inbound multipart payload to be the detached jws part, verifies it over the content
/// parts' bytes in part order, and hands the content parts back on success.
pub struct JwsMultipartContainerFilter<K> {
  verifying_key: K,
  support_single_part_only: bool,
}

impl<K: VerifyingKey> JwsMultipartContainerFilter<K> {
  pub fn new(verifying_key: K) -> Self {
    Self {
      verifying_key,
      support_single_part_only: true,
    }
  }

  /// Restrict payloads to a single protected part (the default)
  pub fn set_support_single_part_only(&mut self, support_single_part_only: bool) -> &mut Self {
    self.support_single_part_only = support_single_part_only;
    self
  }

  /// Verify the payload, returning the content parts and the verified jws headers
  pub fn filter(&self, body: MultipartBody) -> MultipartSigResult<(Vec<Part>, JwsHeaders)> {
    let mut parts = body.into_parts();
    let Some(signature_part) = parts.pop() else {
      return Err(MultipartSigError::MissingSignaturePart("empty multipart payload".to_string()));
    };
    if signature_part.name != SIGNATURE_PART_NAME || signature_part.content_type != MEDIA_TYPE_JOSE {
      return Err(MultipartSigError::MissingSignaturePart(format!(
        "final part is '{}' with media type '{}'",
        signature_part.name, signature_part.content_type
      )));
    }
    if parts.is_empty() {
      return Err(MultipartSigError::MissingSignaturePart("no content part to verify".to_string()));
    }
    if self.support_single_part_only && parts.len() > 1 {
      return Err(MultipartSigError::TooManyParts);
    }

    let compact = match &signature_part.body {
      PartBody::Bytes(bytes) => std::str::from_utf8(bytes)
        .map_err(|e| MultipartSigError::InvalidSignaturePart(e.to_string()))?
        .to_string(),
      PartBody::DetachedSignature(_) => {
        return Err(MultipartSigError::InvalidSignaturePart(
          "signature part was never serialized".to_string(),
        ))
      }
    };

    // reconstruct the byte stream the signer observed: content parts in part order
    let mut payload = Vec::new();
    for part in &parts {
      let Some(bytes) = part.bytes() else {
        return Err(MultipartSigError::InvalidSignaturePart(format!(
          "content part '{}' has no byte body",
          part.name
        )));
      };
      payload.extend_from_slice(bytes);
    }

    let headers = verify_detached(&compact, &payload, &self.verifying_key)?;
    debug!(parts = parts.len(), "multipart detached jws verified");
    Ok((parts, headers))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    entity::{OutboundRequest, RequestEntity},
    filter::JwsMultipartClientFilter,
    writer::MultipartWriter,
  };
  use jwsig::prelude::{JwsAlgorithm, SharedKey, SharedKeyJwsSignatureProvider};
  use std::sync::Arc;

  const SHARED_KEY: &[u8] = b"01234567890123456789012345678901";

  fn signed_parts(contents: &[&[u8]], single_only: bool) -> Vec<Part> {
    let mut filter = JwsMultipartClientFilter::new();
    filter
      .set_signature_provider(Arc::new(SharedKeyJwsSignatureProvider::new(SharedKey::Hs256(
        SHARED_KEY.to_vec(),
      ))))
      .set_support_single_part_only(single_only);

    let parts = contents
      .iter()
      .enumerate()
      .map(|(i, c)| Part::new(&format!("part{i}"), "application/json", c.to_vec()))
      .collect::<Vec<_>>();
    let mut request = OutboundRequest::new();
    request
      .set_media_type("multipart/mixed")
      .set_entity(RequestEntity::Sequence(parts));

    let mut writer = MultipartWriter::with_boundary("b");
    filter.filter(&mut request, &mut writer).unwrap();

    // drive serialization so the out-filter observes the content and the signature is forced
    let parts = request.take_entity().unwrap().into_parts();
    let mut buf = Vec::new();
    writer.write_parts(&parts, &mut buf).unwrap();

    // the receiver sees byte bodies only: keep the content parts, lift the serialized
    // signature off the wire
    let wire = String::from_utf8(buf).unwrap();
    let compact = wire
      .split("Content-ID: <signature>\r\n\r\n")
      .nth(1)
      .unwrap()
      .split("\r\n")
      .next()
      .unwrap();
    let mut received = parts.into_iter().filter(|p| p.bytes().is_some()).collect::<Vec<_>>();
    received.push(Part::new(SIGNATURE_PART_NAME, MEDIA_TYPE_JOSE, compact.as_bytes().to_vec()));
    received
  }

  #[test]
  fn test_round_trip_single_part() {
    let parts = signed_parts(&[b"{\"id\": 1}"], true);
    let container = JwsMultipartContainerFilter::new(SharedKey::Hs256(SHARED_KEY.to_vec()));
    let (content, headers) = container.filter(MultipartBody::new(parts)).unwrap();
    assert_eq!(content.len(), 1);
    assert_eq!(content[0].bytes().unwrap().as_ref(), b"{\"id\": 1}");
    assert_eq!(headers.alg(), Some(JwsAlgorithm::Hs256));
  }

  #[test]
  fn test_round_trip_multiple_parts() {
    let parts = signed_parts(&[b"one", b"two", b"three"], false);
    let mut container = JwsMultipartContainerFilter::new(SharedKey::Hs256(SHARED_KEY.to_vec()));
    container.set_support_single_part_only(false);
    let (content, _) = container.filter(MultipartBody::new(parts)).unwrap();
    assert_eq!(content.len(), 3);
  }

  #[test]
  fn test_tampered_content_rejected() {
    let mut parts = signed_parts(&[b"{\"id\": 1}"], true);
    parts[0] = Part::new("part0", "application/json", &b"{\"id\": 2}"[..]);
    let container = JwsMultipartContainerFilter::new(SharedKey::Hs256(SHARED_KEY.to_vec()));
    assert!(container.filter(MultipartBody::new(parts)).is_err());
  }

  #[test]
  fn test_missing_signature_part_rejected() {
    let container = JwsMultipartContainerFilter::new(SharedKey::Hs256(SHARED_KEY.to_vec()));
    let body = MultipartBody::new(vec![Part::new("book", "application/json", &b"{}"[..])]);
    assert!(matches!(
      container.filter(body),
      Err(MultipartSigError::MissingSignaturePart(_))
    ));
  }
}
