//! The surface side of the render-context contract.
//!
//! Every panel that wants the shared high-detail render context follows the
//! same protocol: register with a priority while visible, draw the real
//! raster only when granted, fall back to a placeholder when denied, and
//! unregister the moment it leaves the viewport. Promotions announced by
//! the arbiter land in a queue and are applied between event handlers —
//! never from inside the arbiter's own callback.

use arbiter::RenderArbiter;
use std::cell::RefCell;
use std::rc::Rc;

/// What a panel draws once it holds the context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PanelKind {
    Spectrogram,
    FeatureMap(String),
    Waveform,
}

/// One visualization surface competing for the shared render context.
#[derive(Debug, Clone)]
pub(crate) struct Panel {
    /// Also the id of the panel's canvas element.
    pub id: String,
    pub kind: PanelKind,
    pub priority: i32,
    pub visible: bool,
    pub granted: bool,
}

impl Panel {
    pub fn new(id: &str, kind: PanelKind, priority: i32) -> Self {
        Self {
            id: id.to_string(),
            kind,
            priority,
            visible: false,
            granted: false,
        }
    }
}

/// Re-run the ownership half of the contract for one panel after a
/// visibility change. Visible panels (re-)register; hidden panels release
/// unconditionally, which may promote a waiting panel.
pub(crate) fn sync_panel(arbiter: &mut RenderArbiter, panel: &mut Panel) -> bool {
    if panel.visible {
        panel.granted = arbiter.register(&panel.id, panel.priority);
    } else {
        arbiter.unregister(&panel.id);
        panel.granted = false;
    }
    panel.granted
}

/// Apply queued restoration notifications.
///
/// Each promoted id re-attempts registration (idempotent — the arbiter
/// already made it owner, this confirms the grant and refreshes the
/// panel's flag). Ids naming panels that no longer exist or are hidden are
/// dropped. Returns the panels that newly hold the context and need a
/// re-render.
pub(crate) fn drain_promotions(
    arbiter: &mut RenderArbiter,
    panels: &mut [Panel],
    queue: &Rc<RefCell<Vec<String>>>,
) -> Vec<String> {
    let promoted: Vec<String> = queue.borrow_mut().drain(..).collect();
    let mut granted = Vec::new();

    for id in promoted {
        if let Some(panel) = panels.iter_mut().find(|p| p.id == id) {
            if panel.visible && arbiter.register(&panel.id, panel.priority) {
                panel.granted = true;
                granted.push(id);
            }
        }
    }

    granted
}
