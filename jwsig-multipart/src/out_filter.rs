use crate::{error::MultipartSigResult, SIGNATURE_PART_NAME};
use jwsig::prelude::{JwsError, JwsSignature};
use std::sync::{Arc, Mutex};

/* --------------------------------------- */
/// Output-stage collaborator: observes the raw bytes of each part while the multipart
/// body is being serialized. Implementations must not alter the transmitted bytes.
pub trait MultipartOutFilter {
  fn on_part_bytes(&mut self, part_name: &str, chunk: &[u8]) -> MultipartSigResult<()>;
}

/* --------------------------------------- */
/// Feeds content-part bytes into a shared jws signing operation as they are written.
/// The signature part itself is never fed back into the operation.
pub struct JwsMultipartSignatureOutFilter {
  signature: Arc<Mutex<JwsSignature>>,
}

impl JwsMultipartSignatureOutFilter {
  pub fn new(signature: Arc<Mutex<JwsSignature>>) -> Self {
    Self { signature }
  }
}

impl MultipartOutFilter for JwsMultipartSignatureOutFilter {
  fn on_part_bytes(&mut self, part_name: &str, chunk: &[u8]) -> MultipartSigResult<()> {
    if part_name == SIGNATURE_PART_NAME {
      return Ok(());
    }
    let mut op = self.signature.lock().map_err(|_| JwsError::SharedSignatureLock)?;
    op.update(chunk);
    Ok(())
  }
}
