//! Ordered marker store
//!
//! Holds every marker of a session in insertion order together with the
//! id → item and item → id maps used to keep canvas and list selection in
//! sync. The store performs no I/O.

use std::collections::HashMap;

use crate::domain::{Marker, MarkerId, MarkerNote, MarkerSize, Point};
use crate::widget::items::ItemId;

/// Store misuse; these indicate a bug in the caller, not a user error
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// A marker with this id is already stored
    #[error("duplicate marker id: {0}")]
    DuplicateId(MarkerId),

    /// The canvas item is already bound to another marker
    #[error("canvas item {0:?} is already bound to a marker")]
    ItemAlreadyBound(ItemId),

    /// No marker with this id is stored
    #[error("unknown marker id: {0}")]
    UnknownMarker(MarkerId),
}

#[derive(Debug, Default)]
pub struct MarkerStore {
    order: Vec<MarkerId>,
    markers: HashMap<MarkerId, Marker>,
    id_to_item: HashMap<MarkerId, ItemId>,
    item_to_id: HashMap<ItemId, MarkerId>,
}

impl MarkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a marker bound to its canvas item
    pub fn add(&mut self, marker: Marker, item: ItemId) -> Result<(), StoreError> {
        if self.markers.contains_key(&marker.id) {
            return Err(StoreError::DuplicateId(marker.id));
        }
        if self.item_to_id.contains_key(&item) {
            return Err(StoreError::ItemAlreadyBound(item));
        }
        let id = marker.id.clone();
        self.order.push(id.clone());
        self.id_to_item.insert(id.clone(), item);
        self.item_to_id.insert(item, id.clone());
        self.markers.insert(id, marker);
        Ok(())
    }

    /// Remove a marker and both of its map entries; `None` if it is not stored
    pub fn remove(&mut self, id: &MarkerId) -> Option<(Marker, ItemId)> {
        let marker = self.markers.remove(id)?;
        self.order.retain(|m| m != id);
        let item = self.id_to_item.remove(id)?;
        self.item_to_id.remove(&item);
        Some((marker, item))
    }

    pub fn get(&self, id: &MarkerId) -> Option<&Marker> {
        self.markers.get(id)
    }

    pub fn get_by_item(&self, item: ItemId) -> Option<&Marker> {
        self.item_to_id.get(&item).and_then(|id| self.markers.get(id))
    }

    pub fn item_for(&self, id: &MarkerId) -> Option<ItemId> {
        self.id_to_item.get(id).copied()
    }

    /// Refresh stored geometry from the live canvas item
    pub fn update_geometry(
        &mut self,
        id: &MarkerId,
        position: Point,
        rotation_degrees: f32,
        size: MarkerSize,
    ) -> Result<(), StoreError> {
        let marker = self
            .markers
            .get_mut(id)
            .ok_or_else(|| StoreError::UnknownMarker(id.clone()))?;
        marker.set_geometry(position, rotation_degrees, size);
        Ok(())
    }

    pub fn set_note(&mut self, id: &MarkerId, text: &str) -> Result<(), StoreError> {
        let marker = self
            .markers
            .get_mut(id)
            .ok_or_else(|| StoreError::UnknownMarker(id.clone()))?;
        marker.note_text = text.to_string();
        Ok(())
    }

    /// Markers in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.order.iter().filter_map(|id| self.markers.get(id))
    }

    /// List row of a marker
    pub fn position_of(&self, id: &MarkerId) -> Option<usize> {
        self.order.iter().position(|m| m == id)
    }

    /// Marker id at a list row
    pub fn id_at(&self, row: usize) -> Option<&MarkerId> {
        self.order.get(row)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Serializable records of every marker, in insertion order
    pub fn to_notes(&self) -> Vec<MarkerNote> {
        self.iter().map(MarkerNote::from).collect()
    }
}
