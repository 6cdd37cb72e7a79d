use crate::surface::window::RgbaImage;

/// URI scheme answered by the pixel transfer service. Hosts must register
/// it with the document engine as CORS-enabled so document-side code can
/// fetch child pixels.
pub const SCHEME: &str = "embeddedimagedata";

/// Content type of pixel payloads.
pub const CONTENT_TYPE: &str = "application/octet-stream";

/// Temporary copy of the most recently captured surface pixels.
///
/// A single slot per view, not per child: it only keeps the buffer alive
/// for the duration of one asynchronous resource transfer. Released when
/// the document acknowledges consumption (`update_canvas_done`) or
/// replaced by the next capture, last writer wins.
pub struct PixelSnapshot {
    image: RgbaImage,
}

impl PixelSnapshot {
    pub(crate) fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.image.pixels[..self.byte_len()]
    }

    pub fn byte_len(&self) -> usize {
        self.image.byte_len()
    }

    pub(crate) fn image(&self) -> &RgbaImage {
        &self.image
    }
}

/// Reply to a pixel data request. Borrows the snapshot slot, which keeps
/// the buffer alive until the document acknowledges consumption or the
/// next capture supersedes it.
#[derive(Debug)]
pub struct ResourceResponse<'a> {
    pub body: &'a [u8],
    pub content_type: &'static str,
}

/// First path segment of a resource request, the child id.
pub(crate) fn child_id_from_path(path: &str) -> Option<&str> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    let id = trimmed.split('/').next().unwrap_or("");
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}
