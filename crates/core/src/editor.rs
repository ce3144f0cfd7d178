//! Editor host: wires the view, the drawing session and the lot map
//! together and hands persistence off to a [`LotStore`].
//!
//! Pointer handling is synchronous. Anything that must be persisted comes
//! back as an [`EditorCommand`]; the caller passes it to [`dispatch`], which
//! runs it on the tokio runtime and reports a [`PersistOutcome`] over a
//! channel. The editor folds outcomes back in with
//! [`Editor::apply_persisted`]. A failed write becomes a [`Notice`]; local
//! state is never rolled back.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::drawing::{DrawEvent, DrawingConfig, DrawingSession, Preview, Tool};
use crate::error::CoreError;
use crate::geometry::{Geometry, GeometryFields, Point};
use crate::lot::{CreateLot, Lot, UpdateLot};
use crate::lot_map::LotMap;
use crate::render::{render_scene, Scene, StrokeMode};
use crate::store::LotStore;
use crate::types::DbId;
use crate::view::ViewState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    pub drawing: DrawingConfig,
    pub stroke_mode: StrokeMode,
}

/// Pointer input in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up(Point),
}

/// A write the host has to send to the store.
#[derive(Debug, Clone)]
pub enum EditorCommand {
    CreateLot(CreateLot),
    UpdateLot { id: DbId, changes: UpdateLot },
    DeleteLot(DbId),
}

impl EditorCommand {
    fn label(&self) -> &'static str {
        match self {
            EditorCommand::CreateLot(_) => "create",
            EditorCommand::UpdateLot { .. } => "update",
            EditorCommand::DeleteLot(_) => "delete",
        }
    }
}

/// Result of a dispatched command.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistOutcome {
    Created(Lot),
    Updated(Lot),
    Deleted(DbId),
    Failed { action: &'static str, message: String },
}

/// Non-blocking message for the user (rendered as a toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
}

// ---------------------------------------------------------------------------
// Editor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Editor {
    view: ViewState,
    session: DrawingSession,
    map: LotMap,
    config: EditorConfig,
    notices: Vec<Notice>,
}

impl Editor {
    pub fn new(map: LotMap, config: EditorConfig) -> Self {
        Self {
            view: ViewState::default(),
            session: DrawingSession::new(config.drawing),
            map,
            config,
            notices: Vec::new(),
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut ViewState {
        &mut self.view
    }

    pub fn session(&self) -> &DrawingSession {
        &self.session
    }

    pub fn map(&self) -> &LotMap {
        &self.map
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.session.set_tool(tool);
    }

    /// Escape: drop the shape in progress.
    pub fn cancel(&mut self) {
        self.session.cancel();
    }

    /// Double-click / Enter while drawing a path.
    pub fn finish_path(&mut self) -> Option<EditorCommand> {
        let event = self.session.finish_path()?;
        self.handle_event(event)
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) -> Option<EditorCommand> {
        let event = match event {
            PointerEvent::Down(p) => self.session.pointer_down(p, &self.view, &self.map),
            PointerEvent::Move(p) => self.session.pointer_move(p, &self.view),
            PointerEvent::Up(p) => self.session.pointer_up(p, &self.view),
        }?;
        self.handle_event(event)
    }

    fn handle_event(&mut self, event: DrawEvent) -> Option<EditorCommand> {
        match event {
            DrawEvent::ShapeCommitted(geometry) => {
                Some(EditorCommand::CreateLot(self.draft_lot(geometry)))
            }
            DrawEvent::DeleteRequested(id) => Some(EditorCommand::DeleteLot(id)),
            DrawEvent::Panned { dx, dy } => {
                self.view.pan_by(dx, dy);
                None
            }
            DrawEvent::Selected(_) | DrawEvent::SelectionCleared => None,
        }
    }

    /// New lot payload for a freshly drawn shape, numbered after the
    /// highest existing lot.
    fn draft_lot(&self, geometry: Geometry) -> CreateLot {
        CreateLot {
            map_id: self.map.id(),
            number: self.map.next_lot_number(),
            status: None,
            price: None,
            square_feet: None,
            bedrooms: None,
            bathrooms: None,
            description: None,
            amenities: None,
            geometry: GeometryFields::from(geometry),
        }
    }

    /// Edit the attributes of the selected lot.
    pub fn update_selected(&self, changes: UpdateLot) -> Option<EditorCommand> {
        self.session
            .selected()
            .map(|id| EditorCommand::UpdateLot { id, changes })
    }

    /// Fold a store result back into the local map.
    pub fn apply_persisted(&mut self, outcome: PersistOutcome) {
        let result = match outcome {
            PersistOutcome::Created(lot) => self.map.insert_lot(lot),
            PersistOutcome::Updated(lot) => self.map.replace_lot(lot),
            PersistOutcome::Deleted(id) => {
                self.map.remove_lot(id);
                self.session.forget(id);
                Ok(())
            }
            PersistOutcome::Failed { action, message } => {
                self.notify(format!("Could not {action} lot: {message}"));
                Ok(())
            }
        };
        if let Err(e) = result {
            self.notify(e.to_string());
        }
    }

    fn notify(&mut self, message: String) {
        tracing::warn!(%message, "Editor notice");
        self.notices.push(Notice { message });
    }

    /// Pending notices, oldest first. Clears the queue.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn preview(&self) -> Option<Preview> {
        self.session.preview()
    }

    pub fn render(&self) -> Scene {
        render_scene(
            &self.map,
            &self.view,
            self.session.selected(),
            self.config.stroke_mode,
        )
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Run `command` against `store` in the background and send the outcome on
/// `tx`. The caller does not wait.
pub fn dispatch(
    store: Arc<dyn LotStore>,
    command: EditorCommand,
    tx: mpsc::UnboundedSender<PersistOutcome>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let action = command.label();
        let outcome = match execute(store.as_ref(), command).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(action, error = %e, "Lot persistence failed");
                PersistOutcome::Failed {
                    action,
                    message: e.to_string(),
                }
            }
        };
        if tx.send(outcome).is_err() {
            tracing::debug!(action, "Editor closed before persistence finished");
        }
    })
}

async fn execute(store: &dyn LotStore, command: EditorCommand) -> Result<PersistOutcome, CoreError> {
    match command {
        EditorCommand::CreateLot(dto) => {
            let lot = store.create_lot(dto.into_new_lot()?).await?;
            Ok(PersistOutcome::Created(lot))
        }
        EditorCommand::UpdateLot { id, changes } => {
            let lot = store.update_lot(id, changes.into_changes()?).await?;
            Ok(PersistOutcome::Updated(lot))
        }
        EditorCommand::DeleteLot(id) => {
            if store.delete_lot(id).await? {
                Ok(PersistOutcome::Deleted(id))
            } else {
                Err(CoreError::NotFound { entity: "Lot", id })
            }
        }
    }
}
