use std::any::Any;
use uuid::Uuid;

/// Handle the host window system uses to route input and coordinate
/// queries to one offscreen surface.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SurfaceId(Uuid);

impl SurfaceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SurfaceId {
    fn default() -> Self {
        Self::new()
    }
}

/// Size of a surface in pixels. It's a simple struct to hold width and height.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    /// 8-bit RGB with straight alpha. The only layout the pixel transfer
    /// path hands to the document without conversion.
    Rgba8,
    /// Premultiplied ARGB in native endianness (cairo image surfaces).
    PreMulArgb32,
}

/// CPU pixel copy of a surface at one point in time.
#[derive(Clone)]
pub struct RgbaImage {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub format: PixelFormat,
}

impl RgbaImage {
    pub fn from_raw(
        pixels: Vec<u8>,
        width: u32,
        height: u32,
        stride: u32,
        format: PixelFormat,
    ) -> Self {
        assert!(
            pixels.len() >= (height as usize) * (stride as usize),
            "pixel buffer too small for image dimensions"
        );

        Self {
            pixels,
            width,
            height,
            stride,
            format,
        }
    }

    /// Transferable byte length of the buffer.
    pub fn byte_len(&self) -> usize {
        (self.height as usize) * (self.stride as usize)
    }
}

impl std::fmt::Debug for RgbaImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RgbaImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("len", &self.pixels.len())
            .finish()
    }
}

/// One child's offscreen render target, type-erased so the container can
/// hold any backend's surface.
pub trait OffscreenSurface: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn id(&self) -> SurfaceId;
    fn size(&self) -> SurfaceSize;

    fn resize(&mut self, size: SurfaceSize);

    /// Make the surface visible to the window system.
    fn show(&mut self);

    /// Finish pending rendering before the pixels are read back.
    fn flush(&mut self);

    /// Capture the current pixel buffer. `None` when the surface has no
    /// renderable content yet.
    fn snapshot(&mut self) -> Option<RgbaImage>;
}

/// Host window-system seam. Calls occur on the UI thread that owns the
/// container.
pub trait WindowSystem {
    /// Create a new offscreen surface with the given size.
    fn create_offscreen(&mut self, size: SurfaceSize) -> anyhow::Result<Box<dyn OffscreenSurface>>;

    /// Register `surface` so window-system routing (hit-testing, coordinate
    /// transforms) can reach it.
    fn register(&mut self, surface: SurfaceId);

    /// Undo a previous [`WindowSystem::register`].
    fn unregister(&mut self, surface: SurfaceId);
}
