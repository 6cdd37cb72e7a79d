//! Test doubles shared by the unit tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;

use crate::bridge::{ScriptError, ScriptHost};
use crate::surface::backends::null::NullSurface;
use crate::surface::window::{OffscreenSurface, SurfaceId, SurfaceSize};
use crate::widget::{NativeWidget, Rect};

/// Native widget stand-in with inspectable state.
pub(crate) struct TestWidget {
    preferred: Cell<SurfaceSize>,
    visible: Cell<bool>,
    parented: Cell<bool>,
    parent_surface: Cell<Option<SurfaceId>>,
    allocations: RefCell<Vec<Rect>>,
    draws: Cell<u32>,
    /// Color the widget paints its surface with.
    pub fill: Cell<[u8; 4]>,
}

impl TestWidget {
    pub fn new(width: u32, height: u32) -> Rc<Self> {
        Rc::new(Self {
            preferred: Cell::new(SurfaceSize::new(width, height)),
            visible: Cell::new(true),
            parented: Cell::new(false),
            parent_surface: Cell::new(None),
            allocations: RefCell::new(Vec::new()),
            draws: Cell::new(0),
            fill: Cell::new([0, 0, 0, 255]),
        })
    }

    pub fn set_preferred(&self, width: u32, height: u32) {
        self.preferred.set(SurfaceSize::new(width, height));
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }

    pub fn parent_surface(&self) -> Option<SurfaceId> {
        self.parent_surface.get()
    }

    pub fn last_allocation(&self) -> Option<Rect> {
        self.allocations.borrow().last().copied()
    }

    pub fn draws(&self) -> u32 {
        self.draws.get()
    }
}

impl NativeWidget for TestWidget {
    fn preferred_size(&self) -> SurfaceSize {
        self.preferred.get()
    }

    fn is_visible(&self) -> bool {
        self.visible.get()
    }

    fn has_parent(&self) -> bool {
        self.parented.get()
    }

    fn set_parented(&self, parented: bool) {
        self.parented.set(parented);
    }

    fn set_parent_surface(&self, surface: Option<SurfaceId>) {
        self.parent_surface.set(surface);
    }

    fn size_allocate(&self, rect: Rect) {
        self.allocations.borrow_mut().push(rect);
    }

    fn draw(&self, surface: &mut dyn OffscreenSurface) {
        self.draws.set(self.draws.get() + 1);

        if let Some(null) = surface.as_any_mut().downcast_mut::<NullSurface>() {
            null.fill = self.fill.get();
        }
    }
}

/// Script host that records scripts synchronously and completes their
/// evaluation on the runtime.
pub(crate) struct RecordingHost {
    scripts: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl RecordingHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            scripts: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        })
    }

    /// Host whose evaluations all fail, as a document throwing on every
    /// script would.
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            scripts: Arc::new(Mutex::new(Vec::new())),
            fail: true,
        })
    }

    pub fn scripts(&self) -> Vec<String> {
        self.scripts.lock().unwrap().clone()
    }
}

impl ScriptHost for RecordingHost {
    fn evaluate(&self, script: String) -> BoxFuture<'static, Result<(), ScriptError>> {
        self.scripts.lock().unwrap().push(script.clone());
        let fail = self.fail;

        Box::pin(async move {
            if fail {
                Err(ScriptError(format!("ReferenceError: {}", script)))
            } else {
                Ok(())
            }
        })
    }
}
