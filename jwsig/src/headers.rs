use crate::{
  crypto::{JwsAlgorithm, SigningKey},
  error::JwsResult,
};
use base64::{engine::general_purpose, Engine as _};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/* ---------------------------------------- */
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// JWS protected header set (RFC 7515 section 4), created fresh per signing operation.
/// The same instance is observed by the signature provider and the detached-signature
/// wrapper, so metadata written by either is reflected in both.
pub struct JwsHeaders {
  /// algorithm name, REQUIRED before signing
  #[serde(skip_serializing_if = "Option::is_none")]
  pub alg: Option<String>,
  /// key id
  #[serde(skip_serializing_if = "Option::is_none")]
  pub kid: Option<String>,
  /// content type hint of the signed payload
  #[serde(skip_serializing_if = "Option::is_none")]
  pub cty: Option<String>,
  /// critical header names
  #[serde(skip_serializing_if = "Option::is_none")]
  pub crit: Option<Vec<String>>,
  /// additional header params, serialized in insertion order
  #[serde(flatten)]
  pub extra: IndexMap<String, serde_json::Value>,
}

impl JwsHeaders {
  pub fn new() -> Self {
    Self::default()
  }

  /// Set `alg`
  pub fn set_alg(&mut self, alg: &JwsAlgorithm) -> &mut Self {
    self.alg = Some(alg.to_string());
    self
  }

  /// Set `kid`
  pub fn set_kid(&mut self, kid: &str) -> &mut Self {
    self.kid = Some(kid.to_string());
    self
  }

  /// Set `cty`
  pub fn set_cty(&mut self, cty: &str) -> &mut Self {
    self.cty = Some(cty.to_string());
    self
  }

  /// Set `alg` and `kid` from the signing key
  pub fn set_key_info(&mut self, key: &impl SigningKey) -> &mut Self {
    self.alg = Some(key.alg().to_string());
    self.kid = Some(key.key_id());
    self
  }

  /// Set an additional header param
  pub fn set_param(&mut self, name: &str, value: serde_json::Value) -> &mut Self {
    self.extra.insert(name.to_string(), value);
    self
  }

  /// Parsed `alg` field if present and known
  pub fn alg(&self) -> Option<JwsAlgorithm> {
    self.alg.as_deref().and_then(|v| v.parse().ok())
  }

  /// Serialize to the JSON form used as the protected header
  pub fn to_json(&self) -> JwsResult<String> {
    Ok(serde_json::to_string(self)?)
  }

  /// BASE64URL(UTF8(header json)), the first half of the jws signing input
  pub fn encoded(&self) -> JwsResult<String> {
    Ok(general_purpose::URL_SAFE_NO_PAD.encode(self.to_json()?))
  }

  /// Decode from the base64url-encoded protected header of a received jws
  pub fn from_encoded(encoded: &str) -> JwsResult<Self> {
    let json = general_purpose::URL_SAFE_NO_PAD.decode(encoded)?;
    Ok(serde_json::from_slice(&json)?)
  }
}
