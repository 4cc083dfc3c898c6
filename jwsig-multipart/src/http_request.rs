use crate::{
  entity::{OutboundRequest, RequestEntity},
  error::MultipartSigResult,
  writer::MultipartWriter,
};
use bytes::Bytes;
use http::{header::CONTENT_TYPE, Method, Request, Uri};
use http_body_util::Full;

/* --------------------------------------- */
/// Adapter turning a filtered request into an `http` request with the serialized
/// multipart body and a content-type header carrying the writer's boundary
pub trait IntoHttpRequest {
  fn into_http_request(self, method: Method, uri: Uri, writer: &mut MultipartWriter)
    -> MultipartSigResult<Request<Full<Bytes>>>;
}

impl IntoHttpRequest for OutboundRequest {
  fn into_http_request(
    mut self,
    method: Method,
    uri: Uri,
    writer: &mut MultipartWriter,
  ) -> MultipartSigResult<Request<Full<Bytes>>> {
    let parts = self.take_entity().map(RequestEntity::into_parts).unwrap_or_default();
    let mut body = Vec::new();
    writer.write_parts(&parts, &mut body)?;

    let request = Request::builder()
      .method(method)
      .uri(uri)
      .header(CONTENT_TYPE, writer.content_type_for(self.media_type()))
      .body(Full::new(Bytes::from(body)))?;
    Ok(request)
  }
}
