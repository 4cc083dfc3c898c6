use crate::{MEDIA_TYPE_JOSE, SIGNATURE_PART_NAME};
use bytes::Bytes;
use jwsig::prelude::DetachedJws;

/* --------------------------------------- */
/// Body of one part: eager bytes, or a detached signature evaluated only when the part
/// is written out
#[derive(Clone)]
pub enum PartBody {
  Bytes(Bytes),
  DetachedSignature(DetachedJws),
}

/// One named, typed part of a multipart payload
#[derive(Clone)]
pub struct Part {
  pub name: String,
  pub content_type: String,
  pub body: PartBody,
}

impl Part {
  pub fn new(name: &str, content_type: &str, body: impl Into<Bytes>) -> Self {
    Self {
      name: name.to_string(),
      content_type: content_type.to_string(),
      body: PartBody::Bytes(body.into()),
    }
  }

  /// The appended signature part: fixed name, jose media type, lazily evaluated body
  pub fn signature(jws: DetachedJws) -> Self {
    Self {
      name: SIGNATURE_PART_NAME.to_string(),
      content_type: MEDIA_TYPE_JOSE.to_string(),
      body: PartBody::DetachedSignature(jws),
    }
  }

  /// Eager body bytes, if this part has them
  pub fn bytes(&self) -> Option<&Bytes> {
    match &self.body {
      PartBody::Bytes(b) => Some(b),
      PartBody::DetachedSignature(_) => None,
    }
  }
}

/* --------------------------------------- */
/// A pre-structured multipart container: an ordered sequence of parts
#[derive(Clone, Default)]
pub struct MultipartBody {
  parts: Vec<Part>,
}

impl MultipartBody {
  pub fn new(parts: Vec<Part>) -> Self {
    Self { parts }
  }

  pub fn push(&mut self, part: Part) -> &mut Self {
    self.parts.push(part);
    self
  }

  pub fn parts(&self) -> &[Part] {
    &self.parts
  }

  pub fn into_parts(self) -> Vec<Part> {
    self.parts
  }

  pub fn len(&self) -> usize {
    self.parts.len()
  }

  pub fn is_empty(&self) -> bool {
    self.parts.is_empty()
  }
}

/* --------------------------------------- */
/// The outbound payload in whichever shape the caller produced it. After filtering it
/// is always a `Sequence`: the original parts in original order plus the signature part.
#[derive(Clone)]
pub enum RequestEntity {
  Single(Part),
  Sequence(Vec<Part>),
  Multipart(MultipartBody),
}

impl RequestEntity {
  /// Number of protectable parts without normalizing
  pub fn part_count(&self) -> usize {
    match self {
      RequestEntity::Single(_) => 1,
      RequestEntity::Sequence(parts) => parts.len(),
      RequestEntity::Multipart(body) => body.len(),
    }
  }

  /// Normalize into an ordered part list
  pub fn into_parts(self) -> Vec<Part> {
    match self {
      RequestEntity::Single(part) => vec![part],
      RequestEntity::Sequence(parts) => parts,
      RequestEntity::Multipart(body) => body.into_parts(),
    }
  }

  pub fn parts(&self) -> Vec<&Part> {
    match self {
      RequestEntity::Single(part) => vec![part],
      RequestEntity::Sequence(parts) => parts.iter().collect(),
      RequestEntity::Multipart(body) => body.parts().iter().collect(),
    }
  }
}

/* --------------------------------------- */
/// Outbound request as seen by the filter: a declared media type and a mutable entity
#[derive(Clone, Default)]
pub struct OutboundRequest {
  media_type: Option<String>,
  entity: Option<RequestEntity>,
}

impl OutboundRequest {
  pub fn new() -> Self {
    Self::default()
  }

  /// Set the declared media type
  pub fn set_media_type(&mut self, media_type: &str) -> &mut Self {
    self.media_type = Some(media_type.to_string());
    self
  }

  /// Replace the entity
  pub fn set_entity(&mut self, entity: RequestEntity) -> &mut Self {
    self.entity = Some(entity);
    self
  }

  pub fn media_type(&self) -> Option<&str> {
    self.media_type.as_deref()
  }

  pub fn entity(&self) -> Option<&RequestEntity> {
    self.entity.as_ref()
  }

  pub fn take_entity(&mut self) -> Option<RequestEntity> {
    self.entity.take()
  }

  /// Whether the declared media type's top-level type is `multipart`
  pub fn has_multipart_media_type(&self) -> bool {
    self
      .media_type
      .as_deref()
      .and_then(|mt| mt.split('/').next())
      .map(|top| top.trim().eq_ignore_ascii_case("multipart"))
      .unwrap_or(false)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_multipart_media_type_guard() {
    let mut req = OutboundRequest::new();
    assert!(!req.has_multipart_media_type());

    req.set_media_type("application/json");
    assert!(!req.has_multipart_media_type());

    req.set_media_type("multipart/mixed");
    assert!(req.has_multipart_media_type());

    req.set_media_type("Multipart/Related; type=application/json");
    assert!(req.has_multipart_media_type());
  }

  #[test]
  fn test_entity_normalization() {
    let part = Part::new("book", "application/json", &b"{}"[..]);
    assert_eq!(RequestEntity::Single(part.clone()).part_count(), 1);
    assert_eq!(RequestEntity::Single(part.clone()).into_parts().len(), 1);

    let seq = RequestEntity::Sequence(vec![part.clone(), part.clone()]);
    assert_eq!(seq.part_count(), 2);

    let mut body = MultipartBody::default();
    body.push(part.clone()).push(part.clone()).push(part);
    let multi = RequestEntity::Multipart(body);
    assert_eq!(multi.part_count(), 3);
    assert_eq!(multi.into_parts().len(), 3);
  }
}
