use crate::snapshot;
use crate::surface::window::SurfaceSize;

#[derive(Debug, Clone)]
pub struct EmbedConfig {
    pub scheme: String,                 // URI scheme served by the pixel transfer path
    pub script_object: String,          // Document-side global owning the placeholder canvases
    pub placeholder_size: SurfaceSize,  // Surface size while a child is not yet visible
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            scheme: snapshot::SCHEME.to_string(),
            script_object: "embed_view".to_string(),
            placeholder_size: SurfaceSize::new(1, 1),
        }
    }
}
