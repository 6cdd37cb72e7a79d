use crate::surface::window::{
    OffscreenSurface, PixelFormat, RgbaImage, SurfaceId, SurfaceSize, WindowSystem,
};
use anyhow::Result;
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

/// Window system that performs no real windowing. Used for headless hosts
/// and as the test double.
pub struct NullWindowSystem {
    registered: Rc<RefCell<Vec<SurfaceId>>>,
}

impl NullWindowSystem {
    /// Creates a new instance of the null window system.
    pub fn new() -> Result<Self> {
        Ok(Self {
            registered: Rc::new(RefCell::new(Vec::new())),
        })
    }

    /// Shared view of the currently registered surface ids.
    pub fn registered(&self) -> Rc<RefCell<Vec<SurfaceId>>> {
        Rc::clone(&self.registered)
    }
}

impl WindowSystem for NullWindowSystem {
    fn create_offscreen(&mut self, size: SurfaceSize) -> Result<Box<dyn OffscreenSurface>> {
        Ok(Box::new(NullSurface::new(size)))
    }

    fn register(&mut self, surface: SurfaceId) {
        self.registered.borrow_mut().push(surface);
    }

    fn unregister(&mut self, surface: SurfaceId) {
        self.registered.borrow_mut().retain(|s| *s != surface);
    }
}

/// In-memory offscreen surface. Snapshots return a solid fill so hosts and
/// tests can tell captures apart.
pub struct NullSurface {
    id: SurfaceId,
    size: SurfaceSize,
    visible: bool,
    /// Solid RGBA fill returned by snapshots.
    pub fill: [u8; 4],
    /// When false the surface reports no renderable content.
    pub renderable: bool,
    captures: u64,
}

impl NullSurface {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            id: SurfaceId::new(),
            size,
            visible: false,
            fill: [0, 0, 0, 255],
            renderable: true,
            captures: 0,
        }
    }

    /// Number of snapshots taken from this surface.
    pub fn captures(&self) -> u64 {
        self.captures
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl OffscreenSurface for NullSurface {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn id(&self) -> SurfaceId {
        self.id
    }

    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn resize(&mut self, size: SurfaceSize) {
        self.size = size;
    }

    fn show(&mut self) {
        self.visible = true;
    }

    fn flush(&mut self) {}

    fn snapshot(&mut self) -> Option<RgbaImage> {
        if !self.renderable {
            return None;
        }

        self.captures += 1;

        let mut pixels = vec![0u8; (self.size.width * self.size.height * 4) as usize];
        for px in pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&self.fill);
        }

        Some(RgbaImage::from_raw(
            pixels,
            self.size.width,
            self.size.height,
            self.size.width * 4,
            PixelFormat::Rgba8,
        ))
    }
}
