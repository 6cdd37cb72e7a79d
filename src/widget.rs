use crate::surface::window::{OffscreenSurface, SurfaceId, SurfaceSize};

/// Rectangle in a child's local surface space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Toolkit seam for an embeddable native widget.
///
/// Methods take `&self`; toolkit handles are shared objects and
/// implementations keep their mutable state behind interior mutability,
/// the way toolkit bindings expose widgets.
pub trait NativeWidget {
    /// Preferred size in pixels, queried on every layout pass.
    fn preferred_size(&self) -> SurfaceSize;

    fn is_visible(&self) -> bool;

    /// Whether the widget currently belongs to a parent container.
    fn has_parent(&self) -> bool;

    /// Called when the embedding container takes or releases the widget.
    fn set_parented(&self, parented: bool);

    /// Called when the widget's native window is parented under (or removed
    /// from) an offscreen surface.
    fn set_parent_surface(&self, surface: Option<SurfaceId>);

    /// Native size allocation, in local surface space.
    fn size_allocate(&self, rect: Rect);

    /// Paint the widget into its offscreen surface.
    fn draw(&self, surface: &mut dyn OffscreenSurface);
}

// Identity compares the data pointers only; vtable pointers are not stable
// across codegen units.
pub(crate) fn same_widget(a: &dyn NativeWidget, b: &dyn NativeWidget) -> bool {
    std::ptr::eq(
        a as *const dyn NativeWidget as *const (),
        b as *const dyn NativeWidget as *const (),
    )
}
