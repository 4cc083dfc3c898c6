use crate::{
  entity::{Part, PartBody},
  error::MultipartSigResult,
  out_filter::MultipartOutFilter,
  trace::*,
};
use rand::{distr::Alphanumeric, Rng};
use std::io::Write;

const BOUNDARY_LEN: usize = 24;

/* --------------------------------------- */
/// Serializes an ordered part list into a standard multipart body. Registered
/// out-filters observe each content part's bytes as they are written; deferred part
/// bodies (the signature part) are forced only when reached in part order, which is
/// what guarantees the digesting collaborator has run to completion first.
pub struct MultipartWriter {
  boundary: String,
  out_filters: Vec<Box<dyn MultipartOutFilter + Send>>,
}

impl Default for MultipartWriter {
  fn default() -> Self {
    Self::new()
  }
}

impl MultipartWriter {
  /// Create a writer with a random boundary
  pub fn new() -> Self {
    let boundary: String = rand::rng().sample_iter(Alphanumeric).take(BOUNDARY_LEN).map(char::from).collect();
    Self::with_boundary(&boundary)
  }

  /// Create a writer with a caller-chosen boundary
  pub fn with_boundary(boundary: &str) -> Self {
    Self {
      boundary: boundary.to_string(),
      out_filters: Vec::new(),
    }
  }

  pub fn boundary(&self) -> &str {
    &self.boundary
  }

  /// Register an output-stage collaborator invoked on every content part's bytes
  pub fn add_out_filter(&mut self, filter: Box<dyn MultipartOutFilter + Send>) -> &mut Self {
    self.out_filters.push(filter);
    self
  }

  /// Header value for the serialized body, carrying the declared media type (defaults
  /// to `multipart/mixed`) with this writer's boundary param
  pub fn content_type_for(&self, declared: Option<&str>) -> String {
    let base = declared
      .map(|mt| mt.split(';').next().unwrap_or(mt).trim())
      .filter(|mt| !mt.is_empty())
      .unwrap_or("multipart/mixed");
    format!("{}; boundary=\"{}\"", base, self.boundary)
  }

  /// Write the parts in order. Content bytes pass through every registered out-filter
  /// unmodified before transmission; any I/O error propagates unchanged.
  pub fn write_parts(&mut self, parts: &[Part], out: &mut impl Write) -> MultipartSigResult<()> {
    for part in parts {
      out.write_all(format!("--{}\r\n", self.boundary).as_bytes())?;
      out.write_all(format!("Content-Type: {}\r\n", part.content_type).as_bytes())?;
      out.write_all(format!("Content-ID: <{}>\r\n\r\n", part.name).as_bytes())?;

      match &part.body {
        PartBody::Bytes(bytes) => {
          for filter in self.out_filters.iter_mut() {
            filter.on_part_bytes(&part.name, bytes)?;
          }
          out.write_all(bytes)?;
        }
        PartBody::DetachedSignature(jws) => {
          // all preceding content parts have been observed at this point
          let compact = jws.serialize()?;
          debug!(part = %part.name, "deferred signature part forced");
          out.write_all(compact.as_bytes())?;
        }
      }
      out.write_all(b"\r\n")?;
    }
    out.write_all(format!("--{}--\r\n", self.boundary).as_bytes())?;
    Ok(())
  }
}
