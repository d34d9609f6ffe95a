//! Region editor session
//!
//! Pointer-driven rectangle drawing over a rendered newspaper page, modeled
//! as an explicit three-state machine instead of mutable flags scattered
//! across event callbacks:
//!
//! ```text
//! Idle --pointer down--> Drawing --pointer up--> Active --save/cancel--> Idle
//! ```
//!
//! The session owns the only in-progress shape. Pointer-move handling is
//! pure geometry and safe to call at event-loop frequency. Saving captures
//! the target page number up front, so a store response that lands after a
//! page switch can never attach the area to the wrong page.

use crate::geometry::{self, ContainerSize, PercentRect, PixelRect};

use super::types::{Category, MappedArea};

/// Editor session errors. All are caller errors resolved locally; none of
/// them reach the store.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("drawing canvas must have positive dimensions")]
    InvalidCanvas,

    #[error("no active shape to save")]
    NoActiveShape,

    #[error("shape has zero width or height")]
    ZeroArea,

    #[error("an unsaved shape is already active")]
    ShapeAlreadyActive,

    #[error("a save is already in flight")]
    SaveInFlight,
}

/// Drawing state of a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawPhase {
    /// No shape; pointer-down starts a new rectangle.
    Idle,
    /// Pointer is down; the rectangle follows the pointer.
    Drawing {
        origin_x: f64,
        origin_y: f64,
        current_x: f64,
        current_y: f64,
    },
    /// A committed but unsaved rectangle exists.
    Active { rect: PixelRect },
}

impl DrawPhase {
    pub fn name(&self) -> &'static str {
        match self {
            DrawPhase::Idle => "idle",
            DrawPhase::Drawing { .. } => "drawing",
            DrawPhase::Active { .. } => "active",
        }
    }
}

/// Everything needed to persist a mapped area, captured at save time.
#[derive(Debug, Clone)]
pub struct SavePayload {
    pub issue_id: String,
    /// Page number at the moment save was requested.
    pub page_number: u32,
    /// Normalized, clamped region the shape covers on the page.
    pub coordinates: PercentRect,
    pub headline: String,
    pub category: Category,
}

impl SavePayload {
    /// Finish the payload into a persistable record.
    pub fn into_area(self, extracted_image_url: Option<String>) -> MappedArea {
        MappedArea {
            page_number: self.page_number,
            coordinates: self.coordinates,
            headline: self.headline,
            category: self.category,
            extracted_image_url,
        }
    }
}

/// A page-scoped drawing session for one administrator editing one issue.
#[derive(Debug)]
pub struct EditorSession {
    issue_id: String,
    page: u32,
    canvas: ContainerSize,
    phase: DrawPhase,
    save_in_flight: bool,
}

impl EditorSession {
    pub fn new(
        issue_id: impl Into<String>,
        page: u32,
        canvas: ContainerSize,
    ) -> Result<Self, SessionError> {
        if !canvas.is_valid() {
            return Err(SessionError::InvalidCanvas);
        }
        Ok(Self {
            issue_id: issue_id.into(),
            page,
            canvas,
            phase: DrawPhase::Idle,
            save_in_flight: false,
        })
    }

    pub fn issue_id(&self) -> &str {
        &self.issue_id
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn canvas(&self) -> ContainerSize {
        self.canvas
    }

    pub fn phase(&self) -> &DrawPhase {
        &self.phase
    }

    pub fn save_in_flight(&self) -> bool {
        self.save_in_flight
    }

    /// The shape currently on screen: the live drawing rectangle or the
    /// committed active one.
    pub fn current_rect(&self) -> Option<PixelRect> {
        match self.phase {
            DrawPhase::Idle => None,
            DrawPhase::Drawing {
                origin_x,
                origin_y,
                current_x,
                current_y,
            } => Some(PixelRect::from_corners(
                origin_x, origin_y, current_x, current_y,
            )),
            DrawPhase::Active { rect } => Some(rect),
        }
    }

    /// Pointer pressed on the canvas. Starts a new rectangle unless one is
    /// already active; finishing or cancelling the active shape comes first.
    pub fn pointer_down(&mut self, x: f64, y: f64) -> Result<(), SessionError> {
        match self.phase {
            DrawPhase::Idle => {
                self.phase = DrawPhase::Drawing {
                    origin_x: x,
                    origin_y: y,
                    current_x: x,
                    current_y: y,
                };
                Ok(())
            }
            // Duplicate down events while drawing are noise from the input
            // layer; the origin stays where the drag started.
            DrawPhase::Drawing { .. } => Ok(()),
            DrawPhase::Active { .. } => Err(SessionError::ShapeAlreadyActive),
        }
    }

    /// Pointer moved. Only meaningful mid-drag; the rectangle keeps
    /// non-negative extent whichever direction the drag goes.
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        if let DrawPhase::Drawing {
            ref mut current_x,
            ref mut current_y,
            ..
        } = self.phase
        {
            *current_x = x;
            *current_y = y;
        }
    }

    /// Pointer released. Commits the drawn rectangle as the active shape
    /// and returns it. A zero-extent rect still becomes active; it is
    /// rejected at save time, matching the drawn-but-unsavable state the
    /// admin sees on screen.
    pub fn pointer_up(&mut self) -> Option<PixelRect> {
        if let DrawPhase::Drawing {
            origin_x,
            origin_y,
            current_x,
            current_y,
        } = self.phase
        {
            let rect = PixelRect::from_corners(origin_x, origin_y, current_x, current_y);
            self.phase = DrawPhase::Active { rect };
            Some(rect)
        } else {
            None
        }
    }

    /// Discard the in-progress or active shape. Also clears a stale
    /// in-flight marker left by a save request that was abandoned before
    /// reporting its outcome.
    pub fn cancel(&mut self) {
        self.phase = DrawPhase::Idle;
        self.save_in_flight = false;
    }

    /// Switch to another page. Any uncommitted shape is discarded, along
    /// with any stale in-flight save marker; there is no implicit save.
    pub fn set_page(&mut self, page: u32) {
        self.page = page;
        self.phase = DrawPhase::Idle;
        self.save_in_flight = false;
    }

    /// The displayed canvas changed size (zoom change or window resize).
    /// An active shape is re-projected through percent space so it stays
    /// anchored to the same page region.
    pub fn set_canvas(&mut self, canvas: ContainerSize) -> Result<(), SessionError> {
        if !canvas.is_valid() {
            return Err(SessionError::InvalidCanvas);
        }
        let sx = canvas.width / self.canvas.width;
        let sy = canvas.height / self.canvas.height;
        match self.phase {
            DrawPhase::Idle => {}
            DrawPhase::Drawing {
                ref mut origin_x,
                ref mut origin_y,
                ref mut current_x,
                ref mut current_y,
            } => {
                *origin_x *= sx;
                *origin_y *= sy;
                *current_x *= sx;
                *current_y *= sy;
            }
            DrawPhase::Active { ref mut rect } => {
                *rect = geometry::rescale(*rect, self.canvas, canvas);
            }
        }
        self.canvas = canvas;
        Ok(())
    }

    /// Validate the active shape and capture a save payload.
    ///
    /// Rejects locally (no store call) when there is no active shape, the
    /// shape has zero extent, or another save is still in flight. The
    /// active shape is kept until [`complete_save`](Self::complete_save)
    /// confirms persistence, so a failed store call leaves it available
    /// for retry without redrawing.
    pub fn begin_save(
        &mut self,
        headline: impl Into<String>,
        category: Category,
    ) -> Result<SavePayload, SessionError> {
        if self.save_in_flight {
            return Err(SessionError::SaveInFlight);
        }
        let rect = match self.phase {
            DrawPhase::Active { rect } => rect,
            _ => return Err(SessionError::NoActiveShape),
        };
        if !rect.has_area() {
            return Err(SessionError::ZeroArea);
        }

        self.save_in_flight = true;
        Ok(SavePayload {
            issue_id: self.issue_id.clone(),
            page_number: self.page,
            coordinates: geometry::to_percentage(rect, self.canvas).clamped(),
            headline: headline.into(),
            category,
        })
    }

    /// The store confirmed the save. Clears the shape, unless the admin
    /// already moved to another page while the request was in flight, in
    /// which case there is nothing to clear and nothing is resurrected.
    pub fn complete_save(&mut self, saved_page: u32) {
        self.save_in_flight = false;
        if self.page == saved_page {
            self.phase = DrawPhase::Idle;
        }
    }

    /// The store call failed. The active shape stays put for retry.
    pub fn fail_save(&mut self) {
        self.save_in_flight = false;
    }
}
