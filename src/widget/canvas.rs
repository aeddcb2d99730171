//! Interactive annotation canvas
//!
//! This widget handles:
//! - Pointer gestures that create arrows, pins and redactions per tool mode
//! - Moving any marker, resizing and rotating redactions through handles
//! - Panning the view and single-item selection
//! - Rendering the live scene (base image, items, selection decorations)
//!
//! Pointer positions are given in view coordinates and mapped to the scene
//! through the current pan offset. The canvas reports what happened through
//! [`CanvasEvent`]s; it knows nothing about marker ids or notes.

use image::RgbaImage;

use super::items::{
    ArrowItem, Corner, Drawable, ItemId, PinItem, RedactHandle, RedactItem, VisualItem,
};
use crate::config::Palette;
use crate::domain::{Bounds, CursorIcon, MarkerKind, Point, ToolMode};
use crate::render::geometry::{self, redaction};
use crate::render::image::with_pixmap;

/// Notifications emitted by the canvas
#[derive(Clone, Debug, PartialEq)]
pub enum CanvasEvent {
    /// A new item was committed and selected
    Created { item: ItemId, kind: MarkerKind },
    /// A redaction drag was too small and has been thrown away
    Discarded,
    /// The user changed the selection by clicking
    SelectionChanged(Option<ItemId>),
    /// An existing item's geometry changed
    GeometryChanged(ItemId),
}

/// Mapping between view (widget) and scene coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Viewport {
    /// Scene point shown at the view's top-left corner
    pub scroll: Point,
}

impl Viewport {
    pub fn to_scene(&self, view: Point) -> Point {
        view + self.scroll
    }

    pub fn to_view(&self, scene: Point) -> Point {
        scene - self.scroll
    }
}

/// Pointer gesture between a press and its release
#[derive(Clone, Debug, Default, PartialEq)]
enum Gesture {
    #[default]
    Idle,
    Pan {
        last_view: Point,
    },
    DrawArrow {
        tail: Point,
    },
    DropPin {
        item: ItemId,
    },
    DrawRedact {
        anchor: Point,
    },
    Move {
        item: ItemId,
        last: Point,
    },
    Resize {
        item: ItemId,
        corner: Corner,
        last_local: Point,
    },
    Rotate {
        item: ItemId,
        initial_rotation: f32,
        initial_angle: Option<f32>,
    },
}

/// Scene holding the base image and one visual item per marker
pub struct Canvas {
    base: RgbaImage,
    /// Committed items in z-order (insertion order, last on top)
    items: Vec<(ItemId, VisualItem)>,
    /// Arrow or redaction being drawn; not yet a marker
    pending: Option<(ItemId, VisualItem)>,
    next_item: u64,
    next_pin_number: u32,
    mode: ToolMode,
    selected: Option<ItemId>,
    gesture: Gesture,
    viewport: Viewport,
    hovering_rotation_handle: bool,
}

impl Canvas {
    pub fn new(base: RgbaImage) -> Self {
        Self {
            base,
            items: Vec::new(),
            pending: None,
            next_item: 1,
            next_pin_number: 1,
            mode: ToolMode::Pan,
            selected: None,
            gesture: Gesture::Idle,
            viewport: Viewport::default(),
            hovering_rotation_handle: false,
        }
    }

    pub fn base(&self) -> &RgbaImage {
        &self.base
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    /// Switch tools; a gesture in progress finishes with the tool it began with
    pub fn set_mode(&mut self, mode: ToolMode) {
        self.mode = mode;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn selected(&self) -> Option<ItemId> {
        self.selected
    }

    /// Select an item without emitting events; returns false for unknown items
    pub fn set_selected(&mut self, item: Option<ItemId>) -> bool {
        match item {
            Some(id) if self.item(id).is_none() => false,
            _ => {
                self.selected = item;
                true
            }
        }
    }

    /// Whether a pointer gesture is in progress
    pub fn is_busy(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    pub fn item(&self, id: ItemId) -> Option<&VisualItem> {
        self.items.iter().find(|(i, _)| *i == id).map(|(_, v)| v)
    }

    fn item_mut(&mut self, id: ItemId) -> Option<&mut VisualItem> {
        self.items.iter_mut().find(|(i, _)| *i == id).map(|(_, v)| v)
    }

    /// Committed items in z-order
    pub fn items(&self) -> impl Iterator<Item = (ItemId, &VisualItem)> {
        self.items.iter().map(|(id, item)| (*id, item))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Remove an item, dropping its selection and any gesture on it
    pub fn remove_item(&mut self, id: ItemId) -> Option<VisualItem> {
        let index = self.items.iter().position(|(i, _)| *i == id)?;
        let (_, item) = self.items.remove(index);
        if self.selected == Some(id) {
            self.selected = None;
        }
        if self.gesture_item() == Some(id) {
            self.gesture = Gesture::Idle;
        }
        Some(item)
    }

    /// Topmost committed item under a scene point
    pub fn item_at(&self, scene: Point) -> Option<ItemId> {
        self.items
            .iter()
            .rev()
            .find(|(_, item)| item.hit_test(scene))
            .map(|(id, _)| *id)
    }

    fn gesture_item(&self) -> Option<ItemId> {
        match self.gesture {
            Gesture::DropPin { item }
            | Gesture::Move { item, .. }
            | Gesture::Resize { item, .. }
            | Gesture::Rotate { item, .. } => Some(item),
            _ => None,
        }
    }

    fn alloc_item(&mut self) -> ItemId {
        let id = ItemId(self.next_item);
        self.next_item += 1;
        id
    }

    fn selected_redaction(&self) -> Option<(ItemId, &RedactItem)> {
        let id = self.selected?;
        match self.item(id)? {
            VisualItem::Redact(r) => Some((id, r)),
            _ => None,
        }
    }

    /// Primary button pressed
    pub fn pointer_down(&mut self, view: Point) -> Vec<CanvasEvent> {
        if self.is_busy() {
            return Vec::new();
        }
        let scene = self.viewport.to_scene(view);
        let mut events = Vec::new();

        // Handles of the selected redaction sit outside its body, check them first
        if let Some((id, redact)) = self.selected_redaction() {
            match redact.handle_at(scene) {
                Some(RedactHandle::Rotate) => {
                    self.gesture = Gesture::Rotate {
                        item: id,
                        initial_rotation: redact.transform.rotation,
                        initial_angle: (scene - redact.center_scene()).angle_degrees(),
                    };
                    return events;
                }
                Some(RedactHandle::Resize(corner)) => {
                    self.gesture = Gesture::Resize {
                        item: id,
                        corner,
                        last_local: redact.transform.map_from_scene(scene),
                    };
                    return events;
                }
                None => {}
            }
        }

        if let Some(id) = self.item_at(scene) {
            if self.selected != Some(id) {
                self.selected = Some(id);
                events.push(CanvasEvent::SelectionChanged(Some(id)));
            }
            self.gesture = Gesture::Move {
                item: id,
                last: scene,
            };
            return events;
        }

        match self.mode {
            ToolMode::Pan => {
                if self.selected.take().is_some() {
                    events.push(CanvasEvent::SelectionChanged(None));
                }
                self.gesture = Gesture::Pan { last_view: view };
            }
            ToolMode::Arrow => {
                let id = self.alloc_item();
                self.pending = Some((id, VisualItem::Arrow(ArrowItem::new(scene))));
                self.gesture = Gesture::DrawArrow { tail: scene };
            }
            ToolMode::Pin => {
                let id = self.alloc_item();
                let number = self.next_pin_number;
                self.next_pin_number += 1;
                self.items
                    .push((id, VisualItem::Pin(PinItem::new(scene, number))));
                self.selected = Some(id);
                self.gesture = Gesture::DropPin { item: id };
                log::debug!("Pin {} dropped at ({}, {})", number, scene.x, scene.y);
                events.push(CanvasEvent::Created {
                    item: id,
                    kind: MarkerKind::Pin,
                });
            }
            ToolMode::Redact => {
                let id = self.alloc_item();
                self.pending = Some((id, VisualItem::Redact(RedactItem::new(scene))));
                self.gesture = Gesture::DrawRedact { anchor: scene };
            }
        }
        events
    }

    /// Pointer moved, with or without the button held
    pub fn pointer_move(&mut self, view: Point) -> Vec<CanvasEvent> {
        let scene = self.viewport.to_scene(view);
        self.hovering_rotation_handle = self
            .selected_redaction()
            .is_some_and(|(_, r)| r.handle_at(scene) == Some(RedactHandle::Rotate));

        let mut events = Vec::new();
        match self.gesture.clone() {
            Gesture::Idle => {}
            Gesture::Pan { last_view } => {
                self.viewport.scroll = self.viewport.scroll - (view - last_view);
                self.gesture = Gesture::Pan { last_view: view };
            }
            Gesture::DrawArrow { tail } => {
                if let Some((_, VisualItem::Arrow(arrow))) = self.pending.as_mut() {
                    let v = scene - tail;
                    arrow.set_length(v.length());
                    if let Some(angle) = v.angle_degrees() {
                        arrow.transform.rotation = angle;
                    }
                }
            }
            Gesture::DropPin { item } => {
                if let Some(pin) = self.item_mut(item) {
                    pin.transform_mut().pos = scene;
                    events.push(CanvasEvent::GeometryChanged(item));
                }
            }
            Gesture::DrawRedact { anchor } => {
                if let Some((_, VisualItem::Redact(redact))) = self.pending.as_mut() {
                    let rect = Bounds::from_corners(anchor, scene);
                    redact.transform.pos = rect.top_left();
                    redact.set_size(rect.width(), rect.height());
                }
            }
            Gesture::Move { item, last } => {
                if let Some(target) = self.item_mut(item) {
                    target.move_by(scene - last);
                    events.push(CanvasEvent::GeometryChanged(item));
                }
                self.gesture = Gesture::Move { item, last: scene };
            }
            Gesture::Resize {
                item,
                corner,
                last_local,
            } => {
                if let Some(VisualItem::Redact(redact)) = self.item_mut(item) {
                    let local = redact.transform.map_from_scene(scene);
                    redact.resize_from(corner, local - last_local);
                    let last_local = redact.transform.map_from_scene(scene);
                    self.gesture = Gesture::Resize {
                        item,
                        corner,
                        last_local,
                    };
                    events.push(CanvasEvent::GeometryChanged(item));
                }
            }
            Gesture::Rotate {
                item,
                initial_rotation,
                initial_angle,
            } => {
                if let Some(VisualItem::Redact(redact)) = self.item_mut(item) {
                    redact.transform.rotation = geometry::drag_rotation(
                        initial_rotation,
                        initial_angle,
                        redact.center_scene(),
                        scene,
                        redact.transform.rotation,
                    );
                    events.push(CanvasEvent::GeometryChanged(item));
                }
            }
        }
        events
    }

    /// Primary button released; the release point counts as a final move
    pub fn pointer_up(&mut self, view: Point) -> Vec<CanvasEvent> {
        let mut events = self.pointer_move(view);
        match std::mem::take(&mut self.gesture) {
            Gesture::DrawArrow { .. } => {
                if let Some((id, item)) = self.pending.take() {
                    self.items.push((id, item));
                    self.selected = Some(id);
                    events.push(CanvasEvent::Created {
                        item: id,
                        kind: MarkerKind::Arrow,
                    });
                }
            }
            Gesture::DrawRedact { .. } => {
                if let Some((id, item)) = self.pending.take() {
                    let big_enough = matches!(
                        &item,
                        VisualItem::Redact(r)
                            if r.width > redaction::MIN_CREATE_SIZE
                                && r.height > redaction::MIN_CREATE_SIZE
                    );
                    if big_enough {
                        self.items.push((id, item));
                        self.selected = Some(id);
                        events.push(CanvasEvent::Created {
                            item: id,
                            kind: MarkerKind::Redaction,
                        });
                    } else {
                        log::debug!("Redaction below minimum size discarded");
                        events.push(CanvasEvent::Discarded);
                    }
                }
            }
            _ => {}
        }
        events
    }

    /// Cursor matching the current tool, gesture and hover state
    pub fn cursor(&self) -> CursorIcon {
        match self.gesture {
            Gesture::Pan { .. } | Gesture::Rotate { .. } => return CursorIcon::ClosedHand,
            _ => {}
        }
        if self.hovering_rotation_handle {
            return CursorIcon::OpenHand;
        }
        match self.mode {
            ToolMode::Pan => CursorIcon::OpenHand,
            ToolMode::Redact => CursorIcon::Crosshair,
            ToolMode::Arrow | ToolMode::Pin => CursorIcon::Arrow,
        }
    }

    /// Render the scene as shown while editing
    pub fn render(&self, palette: &Palette) -> RgbaImage {
        let mut img = self.base.clone();
        with_pixmap(&mut img, |pixmap| {
            for (id, item) in &self.items {
                item.render(pixmap, palette, self.selected == Some(*id));
            }
            if let Some((_, item)) = &self.pending {
                item.render(pixmap, palette, false);
            }
        });
        img
    }
}
