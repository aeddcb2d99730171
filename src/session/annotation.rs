//! Annotation session
//!
//! Owns the canvas and the marker store and keeps them in sync: every
//! committed canvas item has exactly one stored marker and vice versa. The
//! session also tracks the list selection and the note editor buffer.

use chrono::Local;
use image::RgbaImage;

use super::prompt::Prompt;
use super::shortcuts::{self, ShortcutAction};
use crate::annotations::store::{MarkerStore, StoreError};
use crate::config::{Palette, SnapmarkConfig};
use crate::domain::{CursorIcon, Key, Marker, MarkerId, Point, ScreenshotMetadata, ToolMode};
use crate::render::image::flatten;
use crate::widget::canvas::{Canvas, CanvasEvent};
use crate::widget::items::ItemId;

/// Result of a delete request
#[derive(Clone, Debug, PartialEq)]
pub enum DeleteOutcome {
    /// Nothing was selected; the user was told so
    NoSelection,
    /// The user declined the confirmation
    Declined,
    Deleted {
        removed: MarkerId,
        /// Marker selected in its place, if any remain
        selected: Option<MarkerId>,
    },
}

/// Outputs of a finished session, handed to the storage layer
#[derive(Clone, Debug)]
pub struct Finalized {
    pub image: RgbaImage,
    pub metadata: ScreenshotMetadata,
}

pub struct AnnotationSession {
    canvas: Canvas,
    store: MarkerStore,
    palette: Palette,
    /// Marker selected in the list; the note editor is bound to it
    current: Option<MarkerId>,
    note: String,
    marker_counter: u64,
}

impl AnnotationSession {
    pub fn new(base: RgbaImage, config: &SnapmarkConfig) -> Self {
        log::debug!(
            "Annotation session on {}x{} image",
            base.width(),
            base.height()
        );
        let mut canvas = Canvas::new(base);
        canvas.set_mode(config.initial_mode);
        Self {
            canvas,
            store: MarkerStore::new(),
            palette: config.palette,
            current: None,
            note: String::new(),
            marker_counter: 0,
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn store(&self) -> &MarkerStore {
        &self.store
    }

    pub fn mode(&self) -> ToolMode {
        self.canvas.mode()
    }

    pub fn set_mode(&mut self, mode: ToolMode) {
        log::debug!("Tool mode {:?} -> {:?}", self.canvas.mode(), mode);
        self.canvas.set_mode(mode);
    }

    pub fn cursor(&self) -> CursorIcon {
        self.canvas.cursor()
    }

    pub fn pointer_down(&mut self, view: Point) -> Result<(), StoreError> {
        let events = self.canvas.pointer_down(view);
        self.handle_events(events)
    }

    pub fn pointer_move(&mut self, view: Point) -> Result<(), StoreError> {
        let events = self.canvas.pointer_move(view);
        self.handle_events(events)
    }

    pub fn pointer_up(&mut self, view: Point) -> Result<(), StoreError> {
        let events = self.canvas.pointer_up(view);
        self.handle_events(events)
    }

    /// Returns true if the key triggered a shortcut
    pub fn key_press(&mut self, key: Key) -> bool {
        match shortcuts::handle_key_event(self.mode(), key) {
            Some(ShortcutAction::FinishRedacting) => {
                self.canvas.set_selected(None);
                self.apply_selection(None);
                self.set_mode(ToolMode::Pan);
                true
            }
            None => false,
        }
    }

    fn handle_events(&mut self, events: Vec<CanvasEvent>) -> Result<(), StoreError> {
        for event in events {
            match event {
                CanvasEvent::Created { item, kind } => {
                    let Some(visual) = self.canvas.item(item) else {
                        continue;
                    };
                    self.marker_counter += 1;
                    let id = MarkerId::generate(self.marker_counter, Local::now());
                    let (position, rotation, _) = visual.geometry();
                    let marker = Marker::new(id.clone(), visual.shape(), position, rotation);
                    log::debug!("Created {} marker {}", kind.as_str(), id);
                    self.store.add(marker, item)?;
                    self.apply_selection(Some(id));
                }
                CanvasEvent::Discarded => {}
                CanvasEvent::SelectionChanged(item) => {
                    let id = item
                        .and_then(|i| self.store.get_by_item(i))
                        .map(|m| m.id.clone());
                    self.apply_selection(id);
                }
                CanvasEvent::GeometryChanged(item) => self.sync_item(item)?,
            }
        }
        Ok(())
    }

    /// Point the note editor at a new marker
    ///
    /// Notes are written through on every edit, so the previous marker's
    /// text is already stored.
    fn apply_selection(&mut self, id: Option<MarkerId>) {
        self.note = id
            .as_ref()
            .and_then(|id| self.store.get(id))
            .map(|m| m.note_text.clone())
            .unwrap_or_default();
        self.current = id;
    }

    /// Select a marker from the list side; returns false for unknown ids
    pub fn select_marker(&mut self, id: &MarkerId) -> bool {
        let Some(item) = self.store.item_for(id) else {
            return false;
        };
        self.canvas.set_selected(Some(item));
        self.apply_selection(Some(id.clone()));
        true
    }

    /// Select the marker at a list row
    pub fn select_row(&mut self, row: usize) -> bool {
        match self.store.id_at(row).cloned() {
            Some(id) => self.select_marker(&id),
            None => false,
        }
    }

    pub fn selected(&self) -> Option<&MarkerId> {
        self.current.as_ref()
    }

    pub fn selected_row(&self) -> Option<usize> {
        self.current
            .as_ref()
            .and_then(|id| self.store.position_of(id))
    }

    pub fn note_text(&self) -> &str {
        &self.note
    }

    /// Note editor changed; written straight to the selected marker
    pub fn set_note_text(&mut self, text: &str) -> Result<(), StoreError> {
        self.note = text.to_string();
        if let Some(id) = &self.current {
            self.store.set_note(id, text)?;
        }
        Ok(())
    }

    /// Labels of the marker list, in list order
    pub fn list_labels(&self) -> Vec<String> {
        self.store.iter().map(Marker::label).collect()
    }

    /// Delete the selected marker after asking for confirmation
    pub fn delete_selected(&mut self, prompt: &mut dyn Prompt) -> Result<DeleteOutcome, StoreError> {
        let Some(id) = self.current.clone() else {
            prompt.inform(
                "No Selection",
                "Please select an annotation from the list to delete.",
            );
            return Ok(DeleteOutcome::NoSelection);
        };
        let label = self
            .store
            .get(&id)
            .map(Marker::label)
            .ok_or_else(|| StoreError::UnknownMarker(id.clone()))?;

        if !prompt.confirm(
            "Delete Annotation",
            &format!("Are you sure you want to delete this {label}?"),
        ) {
            return Ok(DeleteOutcome::Declined);
        }

        let row = self.store.position_of(&id).unwrap_or(0);
        let (_, item) = self
            .store
            .remove(&id)
            .ok_or_else(|| StoreError::UnknownMarker(id.clone()))?;
        self.canvas.remove_item(item);
        log::debug!("Deleted {label} ({id})");

        let next = match self.store.len() {
            0 => None,
            len => self.store.id_at(row.min(len - 1)).cloned(),
        };
        match &next {
            Some(next_id) => {
                self.select_marker(next_id);
            }
            None => {
                self.canvas.set_selected(None);
                self.apply_selection(None);
            }
        }
        Ok(DeleteOutcome::Deleted {
            removed: id,
            selected: next,
        })
    }

    fn sync_item(&mut self, item: ItemId) -> Result<(), StoreError> {
        let Some(visual) = self.canvas.item(item) else {
            return Ok(());
        };
        let Some(id) = self.store.get_by_item(item).map(|m| m.id.clone()) else {
            return Ok(());
        };
        let (position, rotation, size) = visual.geometry();
        self.store.update_geometry(&id, position, rotation, size)
    }

    /// Copy every item's live geometry into the store
    pub fn sync_geometry(&mut self) -> Result<(), StoreError> {
        for (item, visual) in self.canvas.items() {
            let Some(id) = self.store.get_by_item(item).map(|m| m.id.clone()) else {
                continue;
            };
            let (position, rotation, size) = visual.geometry();
            self.store.update_geometry(&id, position, rotation, size)?;
        }
        Ok(())
    }

    /// Live view of the canvas, with selection decorations
    pub fn render_canvas(&self) -> RgbaImage {
        self.canvas.render(&self.palette)
    }

    /// Sync geometry, then build the flattened image and its metadata
    pub fn finalize(&mut self, title: &str, description: &str) -> Result<Finalized, StoreError> {
        self.sync_geometry()?;
        let metadata = ScreenshotMetadata::new(title, description, self.store.to_notes());
        let image = flatten(self.canvas.base(), self.store.iter(), &self.palette);
        log::info!(
            "Finalized screenshot {}x{} with {} markers",
            image.width(),
            image.height(),
            metadata.markers.len()
        );
        Ok(Finalized { image, metadata })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MarkerKind, MarkerShape};
    use crate::session::prompt::ScriptedPrompt;
    use crate::widget::items::VisualItem;

    fn session() -> AnnotationSession {
        AnnotationSession::new(RgbaImage::new(400, 300), &SnapmarkConfig::default())
    }

    fn p(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    fn drag(s: &mut AnnotationSession, from: Point, to: Point) {
        s.pointer_down(from).unwrap();
        s.pointer_move(to).unwrap();
        s.pointer_up(to).unwrap();
    }

    fn click(s: &mut AnnotationSession, at: Point) {
        drag(s, at, at);
    }

    /// Scene position of a local point on the first (redaction) item
    fn redaction_point(s: &AnnotationSession, local: impl Fn(f32, f32) -> Point) -> Point {
        let (_, item) = s.canvas().items().next().unwrap();
        let VisualItem::Redact(r) = item else {
            panic!("not a redaction");
        };
        r.transform.map_to_scene(local(r.width, r.height))
    }

    fn pins(s: &AnnotationSession) -> Vec<u32> {
        s.store().iter().filter_map(Marker::pin_number).collect()
    }

    #[test]
    fn test_example_scenario() {
        let mut s = session();
        s.set_mode(ToolMode::Arrow);
        drag(&mut s, p(100.0, 100.0), p(150.0, 100.0));
        let arrow = s.store().iter().next().unwrap();
        assert_eq!(arrow.shape, MarkerShape::Arrow { length: 50.0 });
        assert_eq!(arrow.rotation_degrees, 0.0);

        s.set_mode(ToolMode::Pin);
        click(&mut s, p(200.0, 200.0));
        assert_eq!(pins(&s), vec![1]);

        assert!(s.select_row(0));
        let outcome = s
            .delete_selected(&mut ScriptedPrompt::answering(true))
            .unwrap();
        assert!(matches!(outcome, DeleteOutcome::Deleted { .. }));
        assert_eq!(pins(&s), vec![1]);
        assert_eq!(s.canvas().len(), 1);

        click(&mut s, p(300.0, 250.0));
        assert_eq!(pins(&s), vec![1, 2]);
        assert_eq!(s.list_labels(), vec!["Pin 1", "Pin 2"]);
    }

    #[test]
    fn test_tiny_redaction_creates_nothing() {
        let mut s = session();
        s.set_mode(ToolMode::Redact);
        drag(&mut s, p(10.0, 10.0), p(15.0, 60.0));
        drag(&mut s, p(10.0, 10.0), p(60.0, 14.0));
        assert!(s.store().is_empty());
        assert!(s.canvas().is_empty());
        assert!(s.selected().is_none());
    }

    #[test]
    fn test_note_edits_stay_with_their_marker() {
        let mut s = session();
        s.set_mode(ToolMode::Pin);
        click(&mut s, p(50.0, 50.0));
        click(&mut s, p(150.0, 50.0));
        let x = s.store().id_at(0).cloned().unwrap();
        let y = s.store().id_at(1).cloned().unwrap();

        assert!(s.select_marker(&x));
        s.set_note_text("login button").unwrap();

        // Switch by clicking the other pin on the canvas
        click(&mut s, p(150.0, 50.0));
        assert_eq!(s.selected(), Some(&y));
        assert_eq!(s.note_text(), "");
        s.set_note_text("error banner").unwrap();

        assert_eq!(s.store().get(&x).unwrap().note_text, "login button");
        assert_eq!(s.store().get(&y).unwrap().note_text, "error banner");

        s.select_row(0);
        assert_eq!(s.note_text(), "login button");
    }

    #[test]
    fn test_delete_without_selection_informs() {
        let mut s = session();
        let mut prompt = ScriptedPrompt::answering(true);
        assert_eq!(
            s.delete_selected(&mut prompt).unwrap(),
            DeleteOutcome::NoSelection
        );
        assert_eq!(prompt.shown[0].0, "No Selection");
    }

    #[test]
    fn test_declined_delete_keeps_marker() {
        let mut s = session();
        s.set_mode(ToolMode::Pin);
        click(&mut s, p(50.0, 50.0));
        let mut prompt = ScriptedPrompt::answering(false);
        assert_eq!(
            s.delete_selected(&mut prompt).unwrap(),
            DeleteOutcome::Declined
        );
        assert_eq!(
            prompt.shown[0].1,
            "Are you sure you want to delete this Pin 1?"
        );
        assert_eq!(s.store().len(), 1);
    }

    #[test]
    fn test_delete_moves_selection_to_neighbour() {
        let mut s = session();
        s.set_mode(ToolMode::Pin);
        for x in [50.0, 100.0, 150.0] {
            click(&mut s, p(x, 50.0));
        }
        let ids: Vec<MarkerId> = s.store().iter().map(|m| m.id.clone()).collect();
        let mut prompt = ScriptedPrompt::answering(true);

        // Middle row: the next marker slides into the same row
        s.select_row(1);
        s.delete_selected(&mut prompt).unwrap();
        assert_eq!(s.selected(), Some(&ids[2]));
        assert_eq!(s.selected_row(), Some(1));

        // Last row: the new last marker is selected
        s.delete_selected(&mut prompt).unwrap();
        assert_eq!(s.selected(), Some(&ids[0]));
        assert_eq!(s.canvas().selected(), s.store().item_for(&ids[0]));

        s.set_note_text("stale").unwrap();
        s.delete_selected(&mut prompt).unwrap();
        assert!(s.selected().is_none());
        assert_eq!(s.note_text(), "");
        assert!(s.canvas().is_empty());
    }

    #[test]
    fn test_enter_in_redact_mode_returns_to_pan() {
        let mut s = session();
        s.set_mode(ToolMode::Redact);
        drag(&mut s, p(20.0, 50.0), p(80.0, 100.0));
        assert!(s.selected().is_some());
        // Rotation knob is shown while selected
        assert_eq!(s.render_canvas().get_pixel(50, 20).0, [0, 255, 0, 255]);

        assert!(s.key_press(Key::Enter));
        assert_eq!(s.mode(), ToolMode::Pan);
        assert!(s.selected().is_none());
        assert!(s.canvas().selected().is_none());
        assert_eq!(s.render_canvas().get_pixel(50, 20).0, [0, 0, 0, 0]);
        assert_eq!(s.cursor(), CursorIcon::OpenHand);

        assert!(!s.key_press(Key::Enter));
    }

    #[test]
    fn test_background_click_in_pan_clears_selection() {
        let mut s = session();
        s.set_mode(ToolMode::Pin);
        click(&mut s, p(50.0, 50.0));
        s.set_note_text("kept").unwrap();
        s.set_mode(ToolMode::Pan);
        click(&mut s, p(300.0, 200.0));
        assert!(s.selected().is_none());
        assert_eq!(s.note_text(), "");
        assert_eq!(s.store().iter().next().unwrap().note_text, "kept");
    }

    #[test]
    fn test_finalize_matches_live_geometry() {
        let mut s = session();
        s.set_mode(ToolMode::Redact);
        drag(&mut s, p(100.0, 100.0), p(160.0, 140.0));
        s.set_mode(ToolMode::Pan);

        // Move the body
        drag(&mut s, p(130.0, 120.0), p(137.0, 126.0));

        // Resize from the bottom-right corner, then rotate
        let corner = redaction_point(&s, |w, h| p(w, h));
        drag(&mut s, corner, corner + p(13.0, 9.0));
        let knob = redaction_point(&s, |w, _| p(w / 2.0, -30.0));
        drag(&mut s, knob, knob + p(25.0, 10.0));

        let finalized = s.finalize("  Login page  ", "broken\n").unwrap();
        let (_, item) = s.canvas().items().next().unwrap();
        let (pos, rotation, _) = item.geometry();
        let VisualItem::Redact(live) = item else {
            panic!("not a redaction");
        };

        let note = &finalized.metadata.markers[0];
        assert_eq!(note.kind, MarkerKind::Redaction);
        assert_eq!((note.pos_x, note.pos_y), (pos.x, pos.y));
        assert_eq!(note.rotation_deg, rotation);
        assert_eq!((note.width, note.height), (live.width, live.height));
        assert_eq!((live.width, live.height), (73.0, 49.0));
        assert_ne!(rotation, 0.0);

        assert_eq!(finalized.metadata.title, "Login page");
        assert_eq!(finalized.metadata.description, "broken");
        assert_eq!(finalized.image.dimensions(), (400, 300));
    }
}
