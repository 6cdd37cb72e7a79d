use std::rc::Rc;
use std::sync::Arc;

use tokio::runtime::Runtime;

use crate::bridge::{self, PendingScript, PositionReport, ScriptChannel, ScriptHost};
use crate::config::EmbedConfig;
use crate::coords::{self, Offset};
use crate::errors::EmbedError;
use crate::event::{InputEvent, RoutedInput};
use crate::hit;
use crate::registry::ChildRegistry;
use crate::snapshot::{self, PixelSnapshot, ResourceResponse};
use crate::surface::window::{OffscreenSurface, PixelFormat, SurfaceId, WindowSystem};
use crate::widget::{NativeWidget, Rect};

/// Container hooks the host toolkit drives. An explicit interface instead
/// of base-class overrides, so the embedding container stays decoupled
/// from any concrete widget toolkit.
pub trait ContainerOps {
    /// Take `widget` as a new embedded child. The widget must not be
    /// parented elsewhere.
    fn add(&mut self, widget: Rc<dyn NativeWidget>);

    /// Release `widget`. A no-op for widgets that are not children.
    fn remove(&mut self, widget: &dyn NativeWidget);

    /// The host window now exists; create deferred child surfaces.
    fn realize(&mut self);

    /// The host window is going away; release every child surface.
    fn unrealize(&mut self);

    /// A layout pass settled; reallocate every child.
    fn size_allocate(&mut self);

    /// Redraw pass for `target`. When it is a child's surface the widget
    /// repaints into it and the document is told to refresh the canvas.
    fn draw(&mut self, target: SurfaceId);

    /// `widget` toggled visibility; mirror it onto the placeholder.
    fn child_visibility_changed(&mut self, widget: &dyn NativeWidget);
}

/// Result of [`EmbedView::tick`].
#[derive(Default, Debug)]
pub struct TickResult {
    pub scripts_completed: usize,
    pub scripts_failed: usize,
}

/// Embedding container: keeps native widgets visually and positionally in
/// sync with placeholder elements of a document rendered elsewhere.
///
/// Everything runs on the single UI thread that owns the view. The only
/// asynchrony is outbound script evaluation, whose results re-enter
/// through [`EmbedView::tick`] as log-or-discard.
pub struct EmbedView {
    config: EmbedConfig,
    registry: ChildRegistry,
    window: Box<dyn WindowSystem>,
    script: Arc<dyn ScriptHost>,
    runtime: Arc<Runtime>, // Tokio runtime driving outbound script evaluation
    snapshot: Option<PixelSnapshot>,
    pending_scripts: Vec<PendingScript>,
    realized: bool,
}

impl EmbedView {
    /// Create a new view.
    ///
    /// If `config` is `None`, [`EmbedConfig::default`] is used.
    pub fn new(
        config: Option<EmbedConfig>,
        window: Box<dyn WindowSystem>,
        script: Arc<dyn ScriptHost>,
    ) -> Self {
        let runtime = Arc::new(
            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .expect("Failed to create Tokio runtime"),
        );

        Self {
            config: config.unwrap_or_default(),
            registry: ChildRegistry::new(),
            window,
            script,
            runtime,
            snapshot: None,
            pending_scripts: Vec::new(),
            realized: false,
        }
    }

    /// Attaches `widget` and tags it with `id` in one step. `id` must be
    /// non-empty; it names the placeholder canvas in the document.
    pub fn pack_child(&mut self, widget: Rc<dyn NativeWidget>, id: &str) {
        assert!(!id.is_empty(), "canvas id must not be empty");

        self.add(Rc::clone(&widget));
        self.set_canvas_id(widget.as_ref(), id);
    }

    /// Rewrites the canvas-id tag on an attached child.
    pub fn set_canvas_id(&mut self, widget: &dyn NativeWidget, id: &str) {
        self.registry.set_id(widget, Some(id));
    }

    /// The canvas-id tag of an attached child, `None` when unset or empty.
    pub fn canvas_id(&self, widget: &dyn NativeWidget) -> Option<String> {
        self.registry.get_id(widget).map(str::to_string)
    }

    pub fn registry(&self) -> &ChildRegistry {
        &self.registry
    }

    /// Mutable registry access for tests poking at surface internals.
    #[cfg(test)]
    pub(crate) fn registry_mut(&mut self) -> &mut ChildRegistry {
        &mut self.registry
    }

    pub fn children_len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_realized(&self) -> bool {
        self.realized
    }

    pub fn has_snapshot(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Entry point for document to host script messages.
    pub fn handle_script_message(&mut self, channel: &str, payload: &serde_json::Value) {
        let Some(channel) = ScriptChannel::from_name(channel) else {
            log::warn!("Ignoring message on unknown channel: {}", channel);
            return;
        };

        match channel {
            ScriptChannel::Position => self.handle_position(payload),

            ScriptChannel::Allocate => {
                if payload.is_object() {
                    self.resize_all();
                } else {
                    log::warn!("Error running javascript: unexpected return value");
                }
            }

            // Free the snapshot immediately after the canvas consumed it.
            ScriptChannel::UpdateCanvasDone => self.snapshot = None,
        }
    }

    fn handle_position(&mut self, payload: &serde_json::Value) {
        if !payload.is_object() {
            log::warn!("Error running javascript: unexpected return value");
            return;
        }

        let report: PositionReport = match serde_json::from_value(payload.clone()) {
            Ok(report) => report,
            Err(e) => {
                log::warn!("Discarding malformed position payload: {}", e);
                return;
            }
        };

        if let Some(child) = self.registry.find_by_id_mut(&report.id) {
            child.offset = Offset::new(report.x as i32, report.y as i32);
        }
    }

    /// Per child: query its preferred size, resize its surface to match and
    /// allocate the widget at the local origin. Document-space placement is
    /// carried entirely by the child's offset, never by widget layout.
    pub fn resize_all(&mut self) {
        for child in self.registry.iter_mut() {
            let size = child.widget.preferred_size();

            if let Some(surface) = child.surface.as_mut() {
                surface.resize(size);
            }

            child.widget.size_allocate(Rect::new(0, 0, size.width, size.height));
        }
    }

    // Idempotent; a no-op until the host window exists. Retried for every
    // registered child at realization.
    fn ensure_surface(&mut self, widget: &dyn NativeWidget) {
        if !self.realized {
            return;
        }

        let placeholder = self.config.placeholder_size;
        let Some(child) = self.registry.find_by_widget_mut(widget) else {
            return;
        };
        if child.surface.is_some() {
            return;
        }

        let size = if child.widget.is_visible() {
            child.widget.preferred_size()
        } else {
            placeholder
        };

        let mut surface = match self.window.create_offscreen(size) {
            Ok(surface) => surface,
            Err(e) => {
                log::warn!("Could not create offscreen surface: {}", e);
                return;
            }
        };

        self.window.register(surface.id());
        child.widget.set_parent_surface(Some(surface.id()));
        surface.show();
        child.surface = Some(surface);
    }

    /// Serves a pixel data request given the request path; the first path
    /// segment is the child id.
    pub fn handle_request(&mut self, path: &str) -> Result<ResourceResponse<'_>, EmbedError> {
        let id = snapshot::child_id_from_path(path).ok_or(EmbedError::NotFound)?;
        self.serve_pixels(id)
    }

    /// Serves a pixel data request given the full request URI, e.g.
    /// `embeddedimagedata://some-child-id`.
    pub fn handle_request_uri(&mut self, uri: &str) -> Result<ResourceResponse<'_>, EmbedError> {
        let parsed = url::Url::parse(uri).map_err(|e| EmbedError::InvalidRequest(e.to_string()))?;

        if parsed.scheme() != self.config.scheme {
            return Err(EmbedError::InvalidRequest(format!(
                "unexpected scheme '{}'",
                parsed.scheme()
            )));
        }

        let id = match parsed.host_str() {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => snapshot::child_id_from_path(parsed.path())
                .unwrap_or_default()
                .to_string(),
        };
        if id.is_empty() {
            return Err(EmbedError::NotFound);
        }

        self.serve_pixels(&id)
    }

    fn serve_pixels(&mut self, id: &str) -> Result<ResourceResponse<'_>, EmbedError> {
        let child = self.registry.find_by_id_mut(id).ok_or(EmbedError::NotFound)?;
        let surface = child.surface.as_mut().ok_or(EmbedError::NotFound)?;

        surface.flush();
        let image = surface.snapshot().ok_or(EmbedError::NotFound)?;

        // The capture replaces any snapshot still in the slot, last writer
        // wins, and the slot keeps the bytes alive until the document acks.
        let snap = self.snapshot.insert(PixelSnapshot::new(image));

        // No conversion path: anything but straight RGBA8 reads as no data.
        if snap.image().format != PixelFormat::Rgba8 {
            return Err(EmbedError::NotFound);
        }

        Ok(ResourceResponse {
            body: snap.bytes(),
            content_type: snapshot::CONTENT_TYPE,
        })
    }

    /// First child whose surface contains the document-space point.
    pub fn pick_embedded_child(&self, doc_x: f64, doc_y: f64) -> Option<SurfaceId> {
        hit::pick(&self.registry, doc_x, doc_y)
    }

    /// Routes a document-space pointer event to the embedded child under
    /// it, rewriting coordinates into the child's local surface space.
    /// Non-positional events and misses return `None` and stay with the
    /// container.
    pub fn route_input(&self, event: InputEvent) -> Option<RoutedInput> {
        let (x, y) = event.position()?;
        let surface = hit::pick(&self.registry, x, y)?;
        let child = self.registry.find_by_surface(surface)?;
        let (local_x, local_y) = coords::to_local(child.offset, x, y);

        Some(RoutedInput {
            surface,
            event: event.with_position(local_x, local_y),
        })
    }

    /// Document-space position of a point on `surface`. Identity for any
    /// surface that is not a child's, the container's own surface included.
    pub fn surface_to_document(&self, surface: SurfaceId, x: f64, y: f64) -> (f64, f64) {
        match self.registry.find_by_surface(surface) {
            Some(child) => coords::to_document(child.offset, x, y),
            None => (x, y),
        }
    }

    /// Local position on `surface` of a document-space point. Identity for
    /// any surface that is not a child's.
    pub fn document_to_surface(&self, surface: SurfaceId, x: f64, y: f64) -> (f64, f64) {
        match self.registry.find_by_surface(surface) {
            Some(child) => coords::to_local(child.offset, x, y),
            None => (x, y),
        }
    }

    fn run_script(&mut self, script: String) {
        let handle = self.runtime.spawn(self.script.evaluate(script.clone()));
        self.pending_scripts.push(PendingScript { script, handle });
    }

    /// Reaps finished script evaluations. Failures are logged with the
    /// offending script text and never propagate.
    pub fn tick(&mut self) -> TickResult {
        let mut result = TickResult::default();

        self.pending_scripts.retain_mut(|pending| match pending.poll() {
            Some(Ok(())) => {
                result.scripts_completed += 1;
                false
            }
            Some(Err(e)) => {
                log::warn!("Error running javascript: {}\n{}", e, pending.script);
                result.scripts_failed += 1;
                false
            }
            None => true,
        });

        result
    }
}

impl ContainerOps for EmbedView {
    fn add(&mut self, widget: Rc<dyn NativeWidget>) {
        self.registry.attach(Rc::clone(&widget), None);
        widget.set_parented(true);

        if self.realized {
            self.ensure_surface(widget.as_ref());
        }
    }

    fn remove(&mut self, widget: &dyn NativeWidget) {
        let Some(mut child) = self.registry.detach(widget) else {
            return;
        };

        if let Some(surface) = child.surface.take() {
            self.window.unregister(surface.id());
        }
        child.widget.set_parent_surface(None);
        child.widget.set_parented(false);
        // The entry and its widget reference drop here.
    }

    fn realize(&mut self) {
        self.realized = true;

        let widgets: Vec<Rc<dyn NativeWidget>> =
            self.registry.iter().map(|c| Rc::clone(&c.widget)).collect();
        for widget in widgets {
            self.ensure_surface(widget.as_ref());
        }
    }

    fn unrealize(&mut self) {
        self.realized = false;

        for child in self.registry.iter_mut() {
            if let Some(surface) = child.surface.take() {
                self.window.unregister(surface.id());
            }
            child.widget.set_parent_surface(None);
        }
    }

    fn size_allocate(&mut self) {
        self.resize_all();
    }

    fn draw(&mut self, target: SurfaceId) {
        let mut script = None;

        if let Some(child) = self.registry.find_by_surface_mut(target) {
            let Some(surface) = child.surface.as_mut() else {
                return;
            };
            child.widget.draw(surface.as_mut());
            let size = surface.size();

            if child.widget.is_visible() {
                if let Some(id) = child.id() {
                    script = Some(bridge::update_canvas_script(
                        &self.config.script_object,
                        id,
                        size.width,
                        size.height,
                    ));
                }
            }
        }

        if let Some(script) = script {
            self.run_script(script);
        }
    }

    fn child_visibility_changed(&mut self, widget: &dyn NativeWidget) {
        let script = {
            let Some(child) = self.registry.find_by_widget(widget) else {
                return;
            };
            let Some(id) = child.id() else {
                return;
            };
            bridge::visibility_script(&self.config.script_object, id, child.widget.is_visible())
        };

        self.run_script(script);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Modifiers, MouseButton};
    use crate::surface::backends::null::{NullSurface, NullWindowSystem};
    use crate::surface::window::{OffscreenSurface, SurfaceSize};
    use crate::testing::{RecordingHost, TestWidget};
    use serde_json::json;
    use std::cell::RefCell;

    fn test_view(host: Arc<RecordingHost>) -> (EmbedView, Rc<RefCell<Vec<SurfaceId>>>) {
        let window = NullWindowSystem::new().unwrap();
        let registered = window.registered();
        (EmbedView::new(None, Box::new(window), host), registered)
    }

    fn surface_of(view: &EmbedView, id: &str) -> SurfaceId {
        view.registry()
            .find_by_id(id)
            .unwrap()
            .surface_id()
            .unwrap()
    }

    fn set_fill(view: &mut EmbedView, id: &str, fill: [u8; 4]) {
        let child = view.registry_mut().find_by_id_mut(id).unwrap();
        child
            .surface
            .as_mut()
            .unwrap()
            .as_any_mut()
            .downcast_mut::<NullSurface>()
            .unwrap()
            .fill = fill;
    }

    fn captures_of(view: &EmbedView, id: &str) -> u64 {
        view.registry()
            .find_by_id(id)
            .unwrap()
            .surface
            .as_ref()
            .unwrap()
            .as_any()
            .downcast_ref::<NullSurface>()
            .unwrap()
            .captures()
    }

    fn report_position(view: &mut EmbedView, id: &str, x: i32, y: i32) {
        view.handle_script_message("position", &json!({"id": id, "x": x, "y": y}));
    }

    #[test]
    fn surface_creation_is_deferred_until_realize() {
        let (mut view, registered) = test_view(RecordingHost::new());
        let widget = TestWidget::new(24, 16);

        view.pack_child(widget.clone(), "alpha");
        assert!(view.registry().find_by_id("alpha").unwrap().surface.is_none());
        assert!(widget.parent_surface().is_none());

        view.realize();
        let surface = surface_of(&view, "alpha");
        assert_eq!(widget.parent_surface(), Some(surface));
        assert!(registered.borrow().contains(&surface));
    }

    #[test]
    fn realized_surface_takes_preferred_size_when_visible() {
        let (mut view, _) = test_view(RecordingHost::new());
        let widget = TestWidget::new(24, 16);

        view.pack_child(widget, "alpha");
        view.realize();

        let child = view.registry().find_by_id("alpha").unwrap();
        assert_eq!(
            child.surface.as_ref().unwrap().size(),
            SurfaceSize::new(24, 16)
        );
    }

    #[test]
    fn hidden_child_gets_placeholder_surface() {
        let (mut view, _) = test_view(RecordingHost::new());
        let widget = TestWidget::new(24, 16);
        widget.set_visible(false);

        view.pack_child(widget, "alpha");
        view.realize();

        let child = view.registry().find_by_id("alpha").unwrap();
        assert_eq!(
            child.surface.as_ref().unwrap().size(),
            SurfaceSize::new(1, 1)
        );
    }

    #[test]
    fn add_after_realize_allocates_immediately() {
        let (mut view, registered) = test_view(RecordingHost::new());
        view.realize();

        let widget = TestWidget::new(8, 8);
        view.pack_child(widget.clone(), "late");

        let surface = surface_of(&view, "late");
        assert_eq!(widget.parent_surface(), Some(surface));
        assert_eq!(registered.borrow().len(), 1);
    }

    #[test]
    fn unrealize_releases_every_child_surface() {
        let (mut view, registered) = test_view(RecordingHost::new());
        let first = TestWidget::new(10, 10);
        let second = TestWidget::new(10, 10);

        view.pack_child(first.clone(), "first");
        view.pack_child(second.clone(), "second");
        view.realize();
        assert_eq!(registered.borrow().len(), 2);

        view.unrealize();
        assert!(registered.borrow().is_empty());
        assert!(first.parent_surface().is_none());
        assert!(second.parent_surface().is_none());
        view.registry().for_each(|c| assert!(c.surface.is_none()));
    }

    #[test]
    fn allocate_message_reallocates_children_at_local_origin() {
        let (mut view, _) = test_view(RecordingHost::new());
        let widget = TestWidget::new(10, 10);

        view.pack_child(widget.clone(), "alpha");
        view.realize();

        widget.set_preferred(40, 30);
        view.handle_script_message("allocate", &json!({}));

        let child = view.registry().find_by_id("alpha").unwrap();
        assert_eq!(
            child.surface.as_ref().unwrap().size(),
            SurfaceSize::new(40, 30)
        );
        assert_eq!(widget.last_allocation(), Some(Rect::new(0, 0, 40, 30)));
    }

    #[test]
    fn malformed_allocate_payload_changes_nothing() {
        let (mut view, _) = test_view(RecordingHost::new());
        let widget = TestWidget::new(10, 10);

        view.pack_child(widget.clone(), "alpha");
        view.realize();

        widget.set_preferred(40, 30);
        view.handle_script_message("allocate", &json!(true));

        let child = view.registry().find_by_id("alpha").unwrap();
        assert_eq!(
            child.surface.as_ref().unwrap().size(),
            SurfaceSize::new(10, 10)
        );
    }

    #[test]
    fn position_report_is_idempotent() {
        let (mut view, _) = test_view(RecordingHost::new());
        view.pack_child(TestWidget::new(10, 10), "alpha");

        report_position(&mut view, "alpha", 5, 5);
        report_position(&mut view, "alpha", 5, 5);
        assert_eq!(
            view.registry().find_by_id("alpha").unwrap().offset,
            Offset::new(5, 5)
        );

        report_position(&mut view, "missing", 1, 1);
        assert_eq!(
            view.registry().find_by_id("alpha").unwrap().offset,
            Offset::new(5, 5)
        );
    }

    #[test]
    fn malformed_position_payload_is_discarded() {
        let (mut view, _) = test_view(RecordingHost::new());
        view.pack_child(TestWidget::new(10, 10), "alpha");

        view.handle_script_message("position", &json!(42));
        view.handle_script_message("position", &json!({"id": "alpha"}));
        view.handle_script_message("unknown_channel", &json!({}));

        assert_eq!(
            view.registry().find_by_id("alpha").unwrap().offset,
            Offset::default()
        );
    }

    #[test]
    fn remove_clears_every_lookup_and_the_surface() {
        let (mut view, registered) = test_view(RecordingHost::new());
        let widget = TestWidget::new(10, 10);

        view.pack_child(widget.clone(), "alpha");
        view.realize();
        let surface = surface_of(&view, "alpha");

        view.remove(widget.as_ref() as &dyn NativeWidget);

        assert!(view.registry().find_by_id("alpha").is_none());
        assert!(view
            .registry()
            .find_by_widget(widget.as_ref() as &dyn NativeWidget)
            .is_none());
        assert!(view.registry().find_by_surface(surface).is_none());
        assert!(registered.borrow().is_empty());
        assert!(!widget.has_parent());
        assert!(widget.parent_surface().is_none());
    }

    #[test]
    fn pixel_request_for_unknown_id_fails_without_side_effects() {
        let (mut view, _) = test_view(RecordingHost::new());
        view.pack_child(TestWidget::new(10, 10), "alpha");
        view.realize();

        assert!(matches!(
            view.handle_request("/ghost"),
            Err(EmbedError::NotFound)
        ));
        assert!(!view.has_snapshot());
    }

    #[test]
    fn pixel_request_before_realize_fails() {
        let (mut view, _) = test_view(RecordingHost::new());
        view.pack_child(TestWidget::new(10, 10), "alpha");

        assert!(matches!(
            view.handle_request("/alpha"),
            Err(EmbedError::NotFound)
        ));
        assert!(!view.has_snapshot());
    }

    #[test]
    fn pixel_request_without_renderable_content_fails() {
        let (mut view, _) = test_view(RecordingHost::new());
        view.pack_child(TestWidget::new(10, 10), "alpha");
        view.realize();

        view.registry_mut()
            .find_by_id_mut("alpha")
            .unwrap()
            .surface
            .as_mut()
            .unwrap()
            .as_any_mut()
            .downcast_mut::<NullSurface>()
            .unwrap()
            .renderable = false;

        assert!(matches!(
            view.handle_request("/alpha"),
            Err(EmbedError::NotFound)
        ));
        assert!(!view.has_snapshot());
    }

    #[test]
    fn snapshot_slot_holds_only_the_latest_capture() {
        let (mut view, _) = test_view(RecordingHost::new());
        view.pack_child(TestWidget::new(2, 2), "a");
        view.pack_child(TestWidget::new(2, 2), "b");
        view.realize();

        set_fill(&mut view, "a", [10, 0, 0, 255]);
        set_fill(&mut view, "b", [0, 20, 0, 255]);

        {
            let response = view.handle_request("/a").unwrap();
            assert_eq!(response.content_type, "application/octet-stream");
            assert_eq!(&response.body[..4], &[10, 0, 0, 255]);
        }
        assert_eq!(captures_of(&view, "a"), 1);

        // No done ack in between: the second capture supersedes the first.
        {
            let response = view.handle_request("/b").unwrap();
            assert_eq!(&response.body[..4], &[0, 20, 0, 255]);
        }
        assert!(view.has_snapshot());

        // Asking for the first child again recaptures instead of reusing
        // stale state.
        {
            let response = view.handle_request("/a").unwrap();
            assert_eq!(&response.body[..4], &[10, 0, 0, 255]);
        }
        assert_eq!(captures_of(&view, "a"), 2);
    }

    #[test]
    fn done_ack_releases_the_snapshot() {
        let (mut view, _) = test_view(RecordingHost::new());
        view.pack_child(TestWidget::new(2, 2), "a");
        view.realize();

        let _ = view.handle_request("/a").unwrap();
        assert!(view.has_snapshot());

        view.handle_script_message("update_canvas_done", &json!({}));
        assert!(!view.has_snapshot());
    }

    #[test]
    fn uri_requests_accept_host_and_path_forms() {
        let (mut view, _) = test_view(RecordingHost::new());
        view.pack_child(TestWidget::new(2, 2), "alpha");
        view.realize();

        assert!(view.handle_request_uri("embeddedimagedata://alpha").is_ok());
        assert!(view.handle_request_uri("embeddedimagedata:///alpha").is_ok());
        assert!(matches!(
            view.handle_request_uri("http://alpha"),
            Err(EmbedError::InvalidRequest(_))
        ));
    }

    #[test]
    fn draw_repaints_and_requests_a_canvas_update() {
        let host = RecordingHost::new();
        let (mut view, _) = test_view(Arc::clone(&host));
        let widget = TestWidget::new(12, 9);

        view.pack_child(widget.clone(), "alpha");
        view.realize();

        view.draw(surface_of(&view, "alpha"));

        assert_eq!(widget.draws(), 1);
        let scripts = host.scripts();
        assert_eq!(scripts.len(), 1);
        assert!(scripts[0].contains("update_canvas('alpha', 12, 9)"));
    }

    #[test]
    fn draw_skips_the_canvas_update_for_untagged_or_hidden_children() {
        let host = RecordingHost::new();
        let (mut view, _) = test_view(Arc::clone(&host));

        let untagged = TestWidget::new(10, 10);
        view.add(untagged.clone());

        let hidden = TestWidget::new(10, 10);
        view.pack_child(hidden.clone(), "hidden");

        view.realize();
        hidden.set_visible(false);

        let untagged_surface = view
            .registry()
            .find_by_widget(untagged.as_ref() as &dyn NativeWidget)
            .unwrap()
            .surface_id()
            .unwrap();
        view.draw(untagged_surface);
        view.draw(surface_of(&view, "hidden"));

        assert_eq!(untagged.draws(), 1);
        assert_eq!(hidden.draws(), 1);
        assert!(host.scripts().is_empty());
    }

    #[test]
    fn visibility_change_is_mirrored_onto_the_placeholder() {
        let host = RecordingHost::new();
        let (mut view, _) = test_view(Arc::clone(&host));
        let widget = TestWidget::new(10, 10);

        view.pack_child(widget.clone(), "alpha");
        widget.set_visible(false);
        view.child_visibility_changed(widget.as_ref() as &dyn NativeWidget);

        let scripts = host.scripts();
        assert_eq!(scripts.len(), 1);
        assert!(scripts[0].contains("children['alpha'].style.visibility = 'hidden'"));
    }

    #[test]
    fn failed_script_evaluation_is_reaped_not_fatal() {
        let host = RecordingHost::failing();
        let (mut view, _) = test_view(Arc::clone(&host));
        let widget = TestWidget::new(10, 10);

        view.pack_child(widget, "alpha");
        view.realize();
        view.draw(surface_of(&view, "alpha"));

        let mut failed = 0;
        for _ in 0..500 {
            failed += view.tick().scripts_failed;
            if failed > 0 {
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(2));
        }
        assert_eq!(failed, 1);
    }

    #[test]
    fn pointer_events_route_to_the_child_in_local_coordinates() {
        let (mut view, _) = test_view(RecordingHost::new());
        view.pack_child(TestWidget::new(10, 10), "alpha");
        view.realize();
        report_position(&mut view, "alpha", 5, 5);

        let routed = view
            .route_input(InputEvent::MouseDown {
                button: MouseButton::Left,
                x: 7.0,
                y: 8.0,
                modifiers: Modifiers::empty(),
            })
            .unwrap();

        assert_eq!(routed.surface, surface_of(&view, "alpha"));
        assert_eq!(routed.event.position(), Some((2.0, 3.0)));

        // Outside every child: stays with the container.
        assert!(view
            .route_input(InputEvent::MouseMove {
                x: 40.0,
                y: 40.0,
                modifiers: Modifiers::empty(),
            })
            .is_none());

        // Non-positional events are never hit-routed.
        assert!(view
            .route_input(InputEvent::Scroll { dx: 0.0, dy: 3.0 })
            .is_none());
    }

    #[test]
    fn coordinate_queries_fall_back_to_identity() {
        let (mut view, _) = test_view(RecordingHost::new());
        view.pack_child(TestWidget::new(10, 10), "alpha");
        view.realize();
        report_position(&mut view, "alpha", 30, 40);

        let surface = surface_of(&view, "alpha");
        assert_eq!(view.surface_to_document(surface, 1.0, 2.0), (31.0, 42.0));
        assert_eq!(view.document_to_surface(surface, 31.0, 42.0), (1.0, 2.0));

        // Not a child's surface: identity pass-through.
        let foreign = SurfaceId::new();
        assert_eq!(view.surface_to_document(foreign, 1.0, 2.0), (1.0, 2.0));
        assert_eq!(view.document_to_surface(foreign, 1.0, 2.0), (1.0, 2.0));
    }

    #[test]
    #[should_panic(expected = "canvas id must not be empty")]
    fn pack_child_rejects_empty_ids() {
        let (mut view, _) = test_view(RecordingHost::new());
        view.pack_child(TestWidget::new(10, 10), "");
    }
}
