use uuid::Uuid;

use crate::config::DF;
use crate::overlay::annotation::Annotation;

/// In-memory committed annotations for the active symbol, plus the current
/// selection. Insertion order is preserved: later shapes draw on top and win
/// hit-test ties.
///
/// The store never talks to persistence itself; it bumps `revision` on every
/// mutation and the persistence bridge watches that counter.
pub struct DrawingStore {
    symbol: String,
    annotations: Vec<Annotation>,
    selected: Option<Uuid>,
    revision: u64,
    hydrated: bool,
}

impl DrawingStore {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            annotations: Vec::new(),
            selected: None,
            revision: 0,
            hydrated: false,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn selected(&self) -> Option<Uuid> {
        self.selected
    }

    pub fn selected_annotation(&self) -> Option<&Annotation> {
        let id = self.selected?;
        self.annotations.iter().find(|a| a.id == id)
    }

    /// Counter incremented by every user mutation. The persistence bridge
    /// debounces on changes to this value.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn add(&mut self, annotation: Annotation) {
        if !annotation.is_well_formed() {
            // A draft must never leak into the committed collection.
            log::warn!(
                "Rejected malformed {} with {} anchor(s)",
                annotation.kind,
                annotation.anchors.len()
            );
            return;
        }
        self.annotations.push(annotation);
        self.revision += 1;
    }

    /// Removing an id that is not present is a no-op, not an error: the
    /// selection can go stale when hydration replaces the collection.
    pub fn remove(&mut self, id: Uuid) -> bool {
        let before = self.annotations.len();
        self.annotations.retain(|a| a.id != id);
        let removed = self.annotations.len() != before;
        if removed {
            self.revision += 1;
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
        removed
    }

    pub fn clear(&mut self) {
        if self.annotations.is_empty() && self.selected.is_none() {
            return;
        }
        self.annotations.clear();
        self.selected = None;
        self.revision += 1;
    }

    pub fn select(&mut self, id: Option<Uuid>) {
        if DF.log_selection && id != self.selected {
            log::info!("Overlay selection -> {:?}", id);
        }
        self.selected = id;
    }

    /// Replace the whole collection (hydration path). Malformed persisted
    /// entries are filtered out rather than crashing the render pass; a
    /// selection that no longer resolves is dropped.
    pub fn replace_all(&mut self, annotations: Vec<Annotation>) {
        let before = annotations.len();
        self.annotations = annotations
            .into_iter()
            .filter(Annotation::is_well_formed)
            .collect();
        if before != self.annotations.len() {
            log::warn!(
                "Filtered {} malformed annotation(s) for {}",
                before - self.annotations.len(),
                self.symbol
            );
        }
        if let Some(id) = self.selected {
            if !self.annotations.iter().any(|a| a.id == id) {
                self.selected = None;
            }
        }
    }

    /// One-shot hydration on load. Applies only while the store is still at
    /// its initial empty state, so a late-arriving load never clobbers edits
    /// the user made in the meantime. Returns whether it applied.
    pub fn hydrate(&mut self, annotations: Vec<Annotation>) -> bool {
        if self.hydrated || self.revision != 0 || !self.annotations.is_empty() {
            return false;
        }
        self.replace_all(annotations);
        self.hydrated = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::annotation::{Anchor, AnnotationKind};

    fn trend(t0: i64, p0: f64, t1: i64, p1: f64) -> Annotation {
        Annotation::new(
            AnnotationKind::TrendLine,
            vec![Anchor::new(t0, p0), Anchor::new(t1, p1)],
        )
    }

    #[test]
    fn add_preserves_insertion_order_and_bumps_revision() {
        let mut store = DrawingStore::new("BTCUSDT");
        let a = trend(0, 1.0, 10, 2.0);
        let b = trend(5, 3.0, 15, 4.0);
        store.add(a.clone());
        store.add(b.clone());
        assert_eq!(store.revision(), 2);
        assert_eq!(store.annotations()[0].id, a.id);
        assert_eq!(store.annotations()[1].id, b.id);
    }

    #[test]
    fn add_rejects_partial_shapes() {
        let mut store = DrawingStore::new("BTCUSDT");
        store.add(Annotation::new(
            AnnotationKind::TrendLine,
            vec![Anchor::new(0, 1.0)],
        ));
        assert!(store.is_empty());
        assert_eq!(store.revision(), 0);
    }

    #[test]
    fn remove_missing_id_is_a_no_op() {
        let mut store = DrawingStore::new("BTCUSDT");
        store.add(trend(0, 1.0, 10, 2.0));
        let rev = store.revision();
        assert!(!store.remove(Uuid::new_v4()));
        assert_eq!(store.revision(), rev);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_clears_matching_selection() {
        let mut store = DrawingStore::new("BTCUSDT");
        let a = trend(0, 1.0, 10, 2.0);
        let id = a.id;
        store.add(a);
        store.select(Some(id));
        assert!(store.remove(id));
        assert_eq!(store.selected(), None);
    }

    #[test]
    fn replace_all_filters_malformed_and_round_trips() {
        let mut store = DrawingStore::new("BTCUSDT");
        let good = trend(0, 1.0, 10, 2.0);
        let mut bad = trend(0, 1.0, 10, 2.0);
        bad.anchors.pop();
        store.replace_all(vec![good.clone(), bad]);
        // Serialize-for-save view equals the hydrated (valid) set.
        assert_eq!(store.annotations(), &[good]);
    }

    #[test]
    fn hydration_applies_only_to_a_pristine_store() {
        let mut store = DrawingStore::new("BTCUSDT");
        assert!(store.hydrate(vec![trend(0, 1.0, 10, 2.0)]));
        assert_eq!(store.len(), 1);

        // Second hydration (or one racing user edits) is discarded.
        let mut busy = DrawingStore::new("ETHUSDT");
        busy.add(trend(0, 5.0, 10, 6.0));
        assert!(!busy.hydrate(vec![trend(0, 1.0, 10, 2.0), trend(1, 1.0, 9, 2.0)]));
        assert_eq!(busy.len(), 1);
    }

    #[test]
    fn stale_selection_is_dropped_on_replace() {
        let mut store = DrawingStore::new("BTCUSDT");
        let a = trend(0, 1.0, 10, 2.0);
        store.add(a.clone());
        store.select(Some(a.id));
        store.replace_all(vec![trend(2, 1.0, 12, 2.0)]);
        assert_eq!(store.selected(), None);
    }
}
