use crate::geometry::{Point, Rect};

/// Boxes narrower or shorter than this many display pixels are dropped on commit.
pub const MIN_RECT_SIZE: i32 = 2;

// ── Draw State ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DrawState {
    #[default]
    Idle,
    Dragging { start: Point, preview_end: Point },
}

/// Pointer events as delivered by whatever view hosts the annotator, in
/// display-surface coordinates.
pub trait PointerHandler {
    fn on_pointer_down(&mut self, pos: Point);
    fn on_pointer_move(&mut self, pos: Point);
    fn on_pointer_up(&mut self, pos: Point);
}

// ── RectManager ─────────────────────────────────────────────────────────────

/// Committed rectangles for one loaded image plus the box currently being
/// dragged out. Holds no reference to any widget.
#[derive(Clone, Debug, Default)]
pub struct RectManager {
    rects: Vec<Rect>,
    draw: DrawState,
    active: bool,
}

impl RectManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every committed box and any half-drawn one. Draw mode is kept.
    pub fn reset(&mut self) {
        self.rects.clear();
        self.draw = DrawState::Idle;
    }

    /// Turning draw mode off cancels the box in progress but keeps committed ones.
    pub fn toggle(&mut self, active: bool) {
        self.active = active;
        if !active {
            self.draw = DrawState::Idle;
        }
    }

    pub fn start_rect(&mut self, x: i32, y: i32) {
        if !self.active {
            return;
        }
        if let DrawState::Idle = self.draw {
            let p = Point::new(x, y);
            self.draw = DrawState::Dragging {
                start: p,
                preview_end: p,
            };
        }
    }

    pub fn update_preview(&mut self, x: i32, y: i32) {
        if !self.active {
            return;
        }
        if let DrawState::Dragging { preview_end, .. } = &mut self.draw {
            *preview_end = Point::new(x, y);
        }
    }

    /// Finishes the box in progress at `(x, y)`. Returns the committed box, or
    /// None when nothing was in progress or the box was too small to keep.
    pub fn commit(&mut self, x: i32, y: i32) -> Option<Rect> {
        if !self.active {
            return None;
        }
        let DrawState::Dragging { start, .. } = self.draw else {
            return None;
        };
        self.draw = DrawState::Idle;

        let rect = Rect::from_corners(start, Point::new(x, y));
        if rect.width() < MIN_RECT_SIZE || rect.height() < MIN_RECT_SIZE {
            log::debug!("dropping {}x{} box below minimum size", rect.width(), rect.height());
            return None;
        }
        self.rects.push(rect);
        Some(rect)
    }

    pub fn delete_last(&mut self) -> Option<Rect> {
        self.rects.pop()
    }

    /// Rewrites every committed box; `f` gets the box index and its current
    /// value. Results are re-normalized.
    pub fn relayout(&mut self, mut f: impl FnMut(usize, Rect) -> Rect) {
        for (i, r) in self.rects.iter_mut().enumerate() {
            let moved = f(i, *r);
            *r = Rect::from_corners(moved.min(), moved.max());
        }
    }

    /// Moves the corners of the box in progress, if any.
    pub fn remap_draft(&mut self, mut f: impl FnMut(Point) -> Point) {
        if let DrawState::Dragging { start, preview_end } = &mut self.draw {
            *start = f(*start);
            *preview_end = f(*preview_end);
        }
    }

    /// Drops the box in progress without leaving draw mode.
    pub fn cancel_draft(&mut self) {
        self.draw = DrawState::Idle;
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn len(&self) -> usize {
        self.rects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.draw, DrawState::Dragging { .. })
    }

    pub fn draw_state(&self) -> DrawState {
        self.draw
    }

    /// The box being dragged, normalized, for live feedback.
    pub fn preview(&self) -> Option<Rect> {
        match self.draw {
            DrawState::Dragging { start, preview_end } => {
                Some(Rect::from_corners(start, preview_end))
            }
            DrawState::Idle => None,
        }
    }
}

impl PointerHandler for RectManager {
    fn on_pointer_down(&mut self, pos: Point) {
        self.start_rect(pos.x, pos.y);
    }

    fn on_pointer_move(&mut self, pos: Point) {
        self.update_preview(pos.x, pos.y);
    }

    fn on_pointer_up(&mut self, pos: Point) {
        if let Some(rect) = self.commit(pos.x, pos.y) {
            log::debug!("committed box #{} {:?}", self.rects.len(), rect);
        }
    }
}
