use std::fmt::Debug;

// Document-space origin of a child's render surface. Written only by
// position reports coming over the document bridge.
#[derive(Clone, Copy, Default, Eq, PartialEq)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Debug for Offset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Offset {{ x: {}, y: {} }}", self.x, self.y)
    }
}

impl Offset {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Maps a point in a child's local surface space into document space.
pub fn to_document(offset: Offset, local_x: f64, local_y: f64) -> (f64, f64) {
    (local_x + offset.x as f64, local_y + offset.y as f64)
}

/// Maps a document-space point into a child's local surface space.
pub fn to_local(offset: Offset, doc_x: f64, doc_y: f64) -> (f64, f64) {
    (doc_x - offset.x as f64, doc_y - offset.y as f64)
}
