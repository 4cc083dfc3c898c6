use crate::{
  entity::{OutboundRequest, Part, RequestEntity},
  error::{MultipartSigError, MultipartSigResult},
  out_filter::JwsMultipartSignatureOutFilter,
  trace::*,
  writer::MultipartWriter,
};
use jwsig::prelude::{DetachedJws, JwsHeaders, JwsSignatureProvider, JwsSignatureProviderResolver};
use std::sync::{Arc, Mutex};

/* --------------------------------------- */
/// Client request filter appending a detached jws part to an outbound multipart request.
///
/// Invoked once per outbound request before transmission. When the declared media type
/// is `multipart`, the entity is normalized into an ordered part list, a signing
/// operation is obtained from the injected provider (or resolved from the explicit
/// resolver), an out-filter digesting the content bytes is registered with the writer,
/// and a lazily evaluated `signature` part is appended. Non-multipart requests pass
/// through untouched.
///
/// Configuration is set once before use and read-only at request time; each request
/// gets its own header set and signing operation.
pub struct JwsMultipartClientFilter {
  signature_provider: Option<Arc<dyn JwsSignatureProvider + Send + Sync>>,
  provider_resolver: Option<Arc<dyn JwsSignatureProviderResolver + Send + Sync>>,
  support_single_part_only: bool,
}

impl Default for JwsMultipartClientFilter {
  fn default() -> Self {
    Self::new()
  }
}

impl JwsMultipartClientFilter {
  pub fn new() -> Self {
    Self {
      signature_provider: None,
      provider_resolver: None,
      support_single_part_only: true,
    }
  }

  /// Filter with an explicit resolver for default provider lookup
  pub fn with_resolver(resolver: Arc<dyn JwsSignatureProviderResolver + Send + Sync>) -> Self {
    let mut filter = Self::new();
    filter.set_provider_resolver(resolver);
    filter
  }

  /// Inject the signature provider to use for every request
  pub fn set_signature_provider(&mut self, provider: Arc<dyn JwsSignatureProvider + Send + Sync>) -> &mut Self {
    self.signature_provider = Some(provider);
    self
  }

  /// Set the resolver consulted when no provider was injected
  pub fn set_provider_resolver(&mut self, resolver: Arc<dyn JwsSignatureProviderResolver + Send + Sync>) -> &mut Self {
    self.provider_resolver = Some(resolver);
    self
  }

  /// Restrict requests to a single protectable part (the default)
  pub fn set_support_single_part_only(&mut self, support_single_part_only: bool) -> &mut Self {
    self.support_single_part_only = support_single_part_only;
    self
  }

  /// Process one outbound request. On success the entity is replaced with the full
  /// part list plus the appended signature part, and one out-filter is registered with
  /// `writer`. On failure the entity is left untouched.
  pub fn filter(&self, request: &mut OutboundRequest, writer: &mut MultipartWriter) -> MultipartSigResult<()> {
    if !request.has_multipart_media_type() {
      debug!(media_type = ?request.media_type(), "not a multipart request, skipping");
      return Ok(());
    }
    let Some(entity) = request.entity() else {
      return Ok(());
    };

    if self.support_single_part_only && entity.part_count() > 1 {
      return Err(MultipartSigError::TooManyParts);
    }

    let mut headers = JwsHeaders::new();
    let provider = match (&self.signature_provider, &self.provider_resolver) {
      (Some(provider), _) => provider.clone(),
      (None, Some(resolver)) => resolver.resolve(&mut headers, true)?,
      (None, None) => return Err(MultipartSigError::NoSignatureProvider),
    };

    let signature = provider.create_signature(&mut headers)?;
    let shared = Arc::new(Mutex::new(signature));
    writer.add_out_filter(Box::new(JwsMultipartSignatureOutFilter::new(shared.clone())));

    let jws = DetachedJws::new(headers, shared);
    let mut parts = request
      .take_entity()
      .map(RequestEntity::into_parts)
      .unwrap_or_default();
    parts.push(Part::signature(jws));
    request.set_entity(RequestEntity::Sequence(parts));
    Ok(())
  }
}
