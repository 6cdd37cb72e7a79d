pub mod window;

/// Offscreen surface backends for the embedding container.
pub mod backends {
    /// Cairo image-surface backend
    #[cfg(feature = "backend_cairo")]
    pub mod cairo;
    pub mod null;
}

pub use window::*;
