use crate::surface::window::{
    OffscreenSurface, PixelFormat, RgbaImage, SurfaceId, SurfaceSize, WindowSystem,
};
use anyhow::Result;
use std::any::Any;

/// Window system backed by cairo image surfaces, for hosts that composite
/// children in software.
pub struct CairoWindowSystem {
    registered: Vec<SurfaceId>,
}

impl CairoWindowSystem {
    pub fn new() -> Self {
        Self {
            registered: Vec::new(),
        }
    }

    pub fn is_registered(&self, surface: SurfaceId) -> bool {
        self.registered.contains(&surface)
    }
}

impl Default for CairoWindowSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowSystem for CairoWindowSystem {
    fn create_offscreen(&mut self, size: SurfaceSize) -> Result<Box<dyn OffscreenSurface>> {
        Ok(Box::new(CairoOffscreen::new(size)?))
    }

    fn register(&mut self, surface: SurfaceId) {
        self.registered.push(surface);
    }

    fn unregister(&mut self, surface: SurfaceId) {
        self.registered.retain(|s| *s != surface);
    }
}

pub struct CairoOffscreen {
    id: SurfaceId,
    surface: cairo::ImageSurface, // This image surface sits on top of the buf below
    buf: Box<[u8]>,               // Pixels are written here (through surface), but we ultimately own them
    size: SurfaceSize,
    stride: i32,
    visible: bool,
}

impl CairoOffscreen {
    fn new(size: SurfaceSize) -> Result<Self> {
        let (surface, buf, stride) = Self::alloc(size)?;

        Ok(Self {
            id: SurfaceId::new(),
            surface,
            buf,
            size,
            stride,
            visible: false,
        })
    }

    fn alloc(size: SurfaceSize) -> Result<(cairo::ImageSurface, Box<[u8]>, i32)> {
        let stride = cairo::Format::ARgb32
            .stride_for_width(size.width)
            .unwrap_or((size.width * 4) as i32);

        // Allocate a buffer large enough for the surface to be mapped on top.
        let mut buf: Box<[u8]> =
            vec![0u8; (size.height as usize) * (stride as usize)].into_boxed_slice();

        // SAFETY: `buf` is stored next to `surface` and outlives it
        let slice_static: &'static mut [u8] =
            unsafe { std::mem::transmute::<&mut [u8], &'static mut [u8]>(&mut *buf) };

        let surface = cairo::ImageSurface::create_for_data(
            slice_static,
            cairo::Format::ARgb32,
            size.width as i32,
            size.height as i32,
            stride,
        )?;

        Ok((surface, buf, stride))
    }

    /// Cairo drawing context for widget paint code.
    #[inline]
    pub fn context(&self) -> Result<cairo::Context> {
        Ok(cairo::Context::new(&self.surface)?)
    }

    #[inline]
    pub fn stride(&self) -> i32 {
        self.stride
    }
}

// Cairo stores ARGB32 premultiplied; the transfer path wants straight alpha.
fn unpremultiply(channel: u8, alpha: u8) -> u8 {
    if alpha == 0 {
        0
    } else {
        ((channel as u32 * 255) / alpha as u32).min(255) as u8
    }
}

impl OffscreenSurface for CairoOffscreen {
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
        if size == self.size {
            return;
        }

        match Self::alloc(size) {
            Ok((surface, buf, stride)) => {
                // Replace the surface before the buffer it maps.
                self.surface = surface;
                self.buf = buf;
                self.stride = stride;
                self.size = size;
            }
            Err(e) => log::warn!("Could not resize cairo offscreen surface: {}", e),
        }
    }

    fn show(&mut self) {
        self.visible = true;
    }

    fn flush(&mut self) {
        self.surface.flush();
    }

    fn snapshot(&mut self) -> Option<RgbaImage> {
        if self.size.width == 0 || self.size.height == 0 {
            return None;
        }

        self.surface.flush();

        let width = self.size.width as usize;
        let height = self.size.height as usize;
        let src_stride = self.stride as usize;
        let mut pixels = vec![0u8; width * height * 4];

        for y in 0..height {
            let row = &self.buf[y * src_stride..y * src_stride + width * 4];
            for x in 0..width {
                let px = u32::from_ne_bytes([
                    row[x * 4],
                    row[x * 4 + 1],
                    row[x * 4 + 2],
                    row[x * 4 + 3],
                ]);
                let a = ((px >> 24) & 0xff) as u8;
                let r = ((px >> 16) & 0xff) as u8;
                let g = ((px >> 8) & 0xff) as u8;
                let b = (px & 0xff) as u8;

                let out = (y * width + x) * 4;
                pixels[out] = unpremultiply(r, a);
                pixels[out + 1] = unpremultiply(g, a);
                pixels[out + 2] = unpremultiply(b, a);
                pixels[out + 3] = a;
            }
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
