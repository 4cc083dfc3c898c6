use thiserror::Error;

/// Result type for jws signing
pub type JwsResult<T> = std::result::Result<T, JwsError>;

/// Error type for jws signing
#[derive(Error, Debug)]
pub enum JwsError {
  #[error("Base64 decode error: {0}")]
  Base64DecodeError(#[from] base64::DecodeError),

  /// Protected header (de)serialization failure
  #[error("Failed to serialize jws headers: {0}")]
  SerializeHeadersError(#[from] serde_json::Error),

  /* ----- Crypto errors ----- */
  /// Invalid private key for asymmetric algorithm
  #[error("Failed to parse private key: {0}")]
  ParsePrivateKeyError(String),
  /// Invalid public key for asymmetric algorithm
  #[error("Failed to parse public key: {0}")]
  ParsePublicKeyError(String),

  /// Signature parse error
  #[error("Failed to parse signature: {0}")]
  ParseSignatureError(String),

  /// Invalid Signature
  #[error("Invalid Signature: {0}")]
  InvalidSignature(String),

  /// Unknown JOSE algorithm name
  #[error("Invalid algorithm name: {0}")]
  InvalidAlgorithmName(String),

  /// Header `alg` does not match the key's algorithm
  #[error("Algorithm mismatch: header says {header}, key is {key}")]
  AlgorithmMismatch { header: String, key: String },

  /* ----- Provider resolution errors ----- */
  /// No algorithm configured for the default signature provider
  #[error("No signature algorithm configured")]
  NoAlgorithmConfigured,

  /// Key material required by the configured algorithm is absent
  #[error("Missing key material: {0}")]
  MissingKeyMaterial(String),

  /// Key material present but unusable for the configured algorithm
  #[error("Invalid key material: {0}")]
  InvalidKeyMaterial(String),

  /* ----- Detached signing state errors ----- */
  /// The signing operation was already finalized
  #[error("Signing operation already finalized")]
  SignatureAlreadyFinalized,

  /// Shared signing operation lock was poisoned
  #[error("Shared signing operation is poisoned")]
  SharedSignatureLock,

  /// Input is not a detached compact jws serialization
  #[error("Not a detached compact serialization: {0}")]
  NotDetachedCompact(String),
}
