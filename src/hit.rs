use crate::registry::ChildRegistry;
use crate::surface::window::{OffscreenSurface, SurfaceId};

/// Returns the surface of the first child in registry order whose rectangle
/// contains the document-space point, bounds inclusive. `None` means the
/// point falls through to the container's own surface.
///
/// Ties go to the first match in registry order (most recently attached
/// first). This is a deliberate simplification, not a layering system.
pub fn pick(registry: &ChildRegistry, doc_x: f64, doc_y: f64) -> Option<SurfaceId> {
    for child in registry.iter() {
        let Some(surface) = child.surface.as_ref() else {
            continue;
        };

        let size = surface.size();
        let x = child.offset.x as f64;
        let y = child.offset.y as f64;
        let w = size.width as f64;
        let h = size.height as f64;

        if doc_x >= x && doc_x <= x + w && doc_y >= y && doc_y <= y + h {
            return Some(surface.id());
        }
    }

    None
}
