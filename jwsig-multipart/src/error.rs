use jwsig::prelude::JwsError;
use thiserror::Error;

/// Result type for multipart jws filtering
pub type MultipartSigResult<T> = std::result::Result<T, MultipartSigError>;

/// Error type for multipart jws filtering
#[derive(Error, Debug)]
pub enum MultipartSigError {
  /// More than one protectable part while single-part mode is enabled.
  /// Raised before any entity mutation.
  #[error("Single part only is supported")]
  TooManyParts,

  /// No signature provider injected and no resolver to fall back on
  #[error("No signature provider configured")]
  NoSignatureProvider,

  /// Inbound multipart payload carries no trailing signature part
  #[error("No signature part found: {0}")]
  MissingSignaturePart(String),

  /// Signature part present but unusable
  #[error("Invalid signature part: {0}")]
  InvalidSignaturePart(String),

  /// I/O failure raised while serializing parts, propagated unchanged
  #[error("Part serialization failed: {0}")]
  SerializationIo(#[from] std::io::Error),

  /// Failed to assemble the outgoing http request
  #[error("Failed to build http request: {0}")]
  HttpRequestBuild(#[from] http::Error),

  /// Inherited from JwsError
  #[error("JwsError: {0}")]
  JwsError(#[from] JwsError),
}
