use strum_macros::{Display, EnumIter};

use crate::config::DF;
use crate::overlay::annotation::{Anchor, Annotation, AnnotationKind};
use crate::overlay::coords::ChartTransform;
use crate::overlay::hit_test::{guide_hit_test, hit_test};
use crate::overlay::store::DrawingStore;

/// Toolbar tools. `Select` is the default pan/select mode; the rest arm a
/// drawing kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum DrawTool {
    #[strum(serialize = "Select")]
    Select,
    #[strum(serialize = "Trend Line")]
    TrendLine,
    #[strum(serialize = "Horizontal")]
    HorizontalLine,
    #[strum(serialize = "Fibonacci")]
    Fibonacci,
}

impl DrawTool {
    pub fn kind(&self) -> Option<AnnotationKind> {
        match self {
            DrawTool::Select => None,
            DrawTool::TrendLine => Some(AnnotationKind::TrendLine),
            DrawTool::HorizontalLine => Some(AnnotationKind::HorizontalLine),
            DrawTool::Fibonacci => Some(AnnotationKind::Fibonacci),
        }
    }
}

/// Click-sequencing state.
///
/// `Idle` is select/pan. Arming a tool moves to `Armed`; two-anchor kinds
/// pass through `AwaitingSecondAnchor` and re-arm on commit so several
/// shapes can be placed without revisiting the toolbar.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolState {
    Idle,
    Armed(AnnotationKind),
    AwaitingSecondAnchor { kind: AnnotationKind, first: Anchor },
}

/// The single authoritative interaction state machine. Owns the draft (the
/// partial anchor inside `AwaitingSecondAnchor`), the ghost preview and the
/// crosshair cursor; commits completed drafts into the store it is handed.
pub struct Interaction {
    state: ToolState,
    /// Pointer position in pixels while it is over the chart. Drives the
    /// crosshair only.
    cursor_px: Option<(f32, f32)>,
    /// Live preview of the draft's second anchor, recomputed per
    /// pointer-move while one anchor is placed.
    ghost: Option<Anchor>,
}

impl Default for Interaction {
    fn default() -> Self {
        Self {
            state: ToolState::Idle,
            cursor_px: None,
            ghost: None,
        }
    }
}

impl Interaction {
    pub fn state(&self) -> &ToolState {
        &self.state
    }

    pub fn active_tool(&self) -> DrawTool {
        match &self.state {
            ToolState::Idle => DrawTool::Select,
            ToolState::Armed(kind) | ToolState::AwaitingSecondAnchor { kind, .. } => match kind {
                AnnotationKind::TrendLine => DrawTool::TrendLine,
                AnnotationKind::HorizontalLine => DrawTool::HorizontalLine,
                AnnotationKind::Fibonacci => DrawTool::Fibonacci,
            },
        }
    }

    /// True while any drawing tool is armed (the overlay crosshair replaces
    /// the chart's native one for the duration).
    pub fn tool_armed(&self) -> bool {
        !matches!(self.state, ToolState::Idle)
    }

    pub fn cursor_px(&self) -> Option<(f32, f32)> {
        self.cursor_px
    }

    pub fn ghost(&self) -> Option<&Anchor> {
        self.ghost.as_ref()
    }

    /// The draft's first anchor, if one is placed.
    pub fn draft_anchor(&self) -> Option<&Anchor> {
        match &self.state {
            ToolState::AwaitingSecondAnchor { first, .. } => Some(first),
            _ => None,
        }
    }

    /// Selecting any tool (even the already-active one) resets to a fresh
    /// armed state, discards a partial draft and drops the selection.
    pub fn select_tool(&mut self, store: &mut DrawingStore, tool: DrawTool) {
        if DF.log_interaction {
            log::info!("Tool -> {} (was {:?})", tool, self.state);
        }
        self.ghost = None;
        store.select(None);
        self.state = match tool.kind() {
            Some(kind) => ToolState::Armed(kind),
            None => ToolState::Idle,
        };
    }

    /// A primary click inside the chart viewport at pixel (x, y).
    pub fn click(
        &mut self,
        store: &mut DrawingStore,
        tf: &dyn ChartTransform,
        x: f32,
        y: f32,
    ) {
        match self.state.clone() {
            ToolState::Idle => {
                // Select/pan mode: hit-test trend lines first, then the
                // price guides of the other kinds.
                let hit = hit_test(store.annotations(), tf, x, y)
                    .or_else(|| guide_hit_test(store.annotations(), tf, y));
                store.select(hit);
            }
            ToolState::Armed(AnnotationKind::HorizontalLine) => {
                // One degree of freedom: commit straight off the click and
                // stay armed so the next click places another level.
                let Some(price) = tf.y_to_price(y) else {
                    return;
                };
                let time = tf.x_to_time(x).or_else(|| tf.nearest_time_for_x(x));
                let anchor = Anchor::new(time.unwrap_or_default(), price);
                store.add(Annotation::new(AnnotationKind::HorizontalLine, vec![anchor]));
            }
            ToolState::Armed(kind) => {
                let Some(first) = self.resolve_anchor(tf, x, y) else {
                    return;
                };
                self.state = ToolState::AwaitingSecondAnchor { kind, first };
            }
            ToolState::AwaitingSecondAnchor { kind, first } => {
                let Some(second) = self.resolve_anchor(tf, x, y) else {
                    return;
                };
                store.add(Annotation::new(kind, vec![first, second]));
                self.ghost = None;
                // Tool stays armed for rapid successive placement.
                self.state = ToolState::Armed(kind);
            }
        }
    }

    /// Pointer moved to pixel (x, y) over the chart.
    pub fn pointer_moved(&mut self, tf: &dyn ChartTransform, x: f32, y: f32) {
        if self.tool_armed() {
            self.cursor_px = Some((x, y));
        }
        if matches!(self.state, ToolState::AwaitingSecondAnchor { .. }) {
            self.ghost = self.resolve_anchor(tf, x, y);
        }
    }

    /// Pointer left the chart area. The draft anchor itself survives a
    /// transient exit; only the ephemeral cursor/ghost go away.
    pub fn pointer_exited(&mut self) {
        self.cursor_px = None;
        self.ghost = None;
    }

    /// Escape: abandon the draft, drop the selection and fall back to
    /// select/pan.
    pub fn escape(&mut self, store: &mut DrawingStore) {
        if self.tool_armed() && DF.log_interaction {
            log::info!("Draft cancelled from {:?}", self.state);
        }
        self.state = ToolState::Idle;
        self.ghost = None;
        self.cursor_px = None;
        store.select(None);
    }

    /// Delete/Backspace: removes the selection, but only in select mode so a
    /// keystroke mid-draft cannot eat a committed shape.
    pub fn delete_selected(&mut self, store: &mut DrawingStore) {
        if !matches!(self.state, ToolState::Idle) {
            return;
        }
        if let Some(id) = store.selected() {
            store.remove(id);
            store.select(None);
        }
    }

    /// (time, price) at a click point. Falls back to the nearest loaded
    /// bar's time when the pixel column has no exact mapping (clicks in the
    /// padding left/right of the data still register); a pixel whose price
    /// cannot be resolved aborts the step.
    fn resolve_anchor(&self, tf: &dyn ChartTransform, x: f32, y: f32) -> Option<Anchor> {
        let price = tf.y_to_price(y)?;
        let time = tf.x_to_time(x).or_else(|| tf.nearest_time_for_x(x))?;
        Some(Anchor::new(time, price))
    }
}
