use std::rc::Rc;

use crate::coords::Offset;
use crate::surface::window::{OffscreenSurface, SurfaceId};
use crate::widget::{same_widget, NativeWidget};

/// One embedded native widget and its bridge state.
pub struct EmbeddedChild {
    id: Option<String>, // canvas-id tag; empty or absent disables id lookups
    /// Owning reference to the native widget. Released on detach.
    pub widget: Rc<dyn NativeWidget>,
    /// Offscreen render surface. Exists only while the container is realized.
    pub surface: Option<Box<dyn OffscreenSurface>>,
    /// Document-space origin of the surface.
    pub offset: Offset,
}

impl EmbeddedChild {
    fn new(widget: Rc<dyn NativeWidget>, id: Option<&str>) -> Self {
        Self {
            id: id.map(str::to_string),
            widget,
            surface: None,
            offset: Offset::default(),
        }
    }

    /// The canvas-id tag, `None` when unset or empty.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn set_id(&mut self, id: Option<&str>) {
        self.id = id.map(str::to_string);
    }

    pub fn surface_id(&self) -> Option<SurfaceId> {
        self.surface.as_ref().map(|s| s.id())
    }
}

/// Insertion-ordered set of embedded children, newest first. Iteration
/// order is the hit-test tie-break order.
#[derive(Default)]
pub struct ChildRegistry {
    children: Vec<EmbeddedChild>,
}

impl ChildRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `widget` as a new child, prepended so the newest child wins
    /// hit-test ties. The widget must not be parented elsewhere.
    pub fn attach(&mut self, widget: Rc<dyn NativeWidget>, id: Option<&str>) -> &mut EmbeddedChild {
        assert!(!widget.has_parent(), "widget is already parented");

        self.children.insert(0, EmbeddedChild::new(widget, id));
        &mut self.children[0]
    }

    /// Removes and returns the entry for `widget`. A no-op for widgets that
    /// are not current children.
    pub fn detach(&mut self, widget: &dyn NativeWidget) -> Option<EmbeddedChild> {
        match self.position_of(widget) {
            Some(index) => Some(self.children.remove(index)),
            None => {
                log::debug!("Ignoring detach of a widget that is not a child");
                None
            }
        }
    }

    /// First child with this id, in registry order. Empty ids never match.
    pub fn find_by_id(&self, id: &str) -> Option<&EmbeddedChild> {
        if id.is_empty() {
            return None;
        }
        self.children.iter().find(|c| c.id() == Some(id))
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut EmbeddedChild> {
        if id.is_empty() {
            return None;
        }
        self.children.iter_mut().find(|c| c.id() == Some(id))
    }

    pub fn find_by_widget(&self, widget: &dyn NativeWidget) -> Option<&EmbeddedChild> {
        self.children
            .iter()
            .find(|c| same_widget(c.widget.as_ref(), widget))
    }

    pub fn find_by_widget_mut(&mut self, widget: &dyn NativeWidget) -> Option<&mut EmbeddedChild> {
        self.children
            .iter_mut()
            .find(|c| same_widget(c.widget.as_ref(), widget))
    }

    pub fn find_by_surface(&self, surface: SurfaceId) -> Option<&EmbeddedChild> {
        self.children
            .iter()
            .find(|c| c.surface_id() == Some(surface))
    }

    pub fn find_by_surface_mut(&mut self, surface: SurfaceId) -> Option<&mut EmbeddedChild> {
        self.children
            .iter_mut()
            .find(|c| c.surface_id() == Some(surface))
    }

    /// Rewrites the id tag on an attached child. A no-op for widgets that
    /// are not current children.
    pub fn set_id(&mut self, widget: &dyn NativeWidget, id: Option<&str>) {
        match self.find_by_widget_mut(widget) {
            Some(child) => child.set_id(id),
            None => log::debug!("Ignoring id tag for a widget that is not a child"),
        }
    }

    pub fn get_id(&self, widget: &dyn NativeWidget) -> Option<&str> {
        self.find_by_widget(widget).and_then(EmbeddedChild::id)
    }

    /// Visits every child in registry order (newest first).
    pub fn for_each(&self, mut f: impl FnMut(&EmbeddedChild)) {
        for child in &self.children {
            f(child);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &EmbeddedChild> {
        self.children.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut EmbeddedChild> {
        self.children.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    fn position_of(&self, widget: &dyn NativeWidget) -> Option<usize> {
        self.children
            .iter()
            .position(|c| same_widget(c.widget.as_ref(), widget))
    }
}
