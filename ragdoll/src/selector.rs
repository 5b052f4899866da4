//! Model selection over a [`Catalog`].
//!
//! Observers register on the selector they care about and are told about
//! every change of the current checkpoint.

use tracing::info;

use crate::catalog::{Catalog, CatalogEntry};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(usize, &CatalogEntry)>;

pub struct ModelSelector {
    catalog: Catalog,
    current: usize,
    observers: Vec<(SubscriptionId, Observer)>,
    next_id: u64,
}

impl ModelSelector {
    /// Starts on the first checkpoint.
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            current: 0,
            observers: Vec::new(),
            next_id: 0,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current(&self) -> Option<&CatalogEntry> {
        self.catalog.get(self.current)
    }

    pub fn subscribe(&mut self, observer: impl FnMut(usize, &CatalogEntry) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns whether `id` was subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(observer_id, _)| *observer_id != id);
        self.observers.len() != before
    }

    /// Maps a slider position in `[0, 1]` onto the catalogue.
    ///
    /// Returns the new index if the selection changed.
    pub fn select_by_slider(&mut self, value: f32) -> Option<usize> {
        if self.catalog.is_empty() || value.is_nan() {
            return None;
        }
        let last = self.catalog.len() - 1;
        #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let index = (value.clamp(0.0, 1.0) * last as f32).round() as usize;
        self.select(index.min(last))
    }

    /// Returns the new index if the selection changed. Out-of-range indices
    /// are ignored.
    pub fn select(&mut self, index: usize) -> Option<usize> {
        if index == self.current {
            return None;
        }
        let entry = self.catalog.get(index)?;
        self.current = index;
        info!(index, checkpoint = %entry.name, "model changed");
        for (_, observer) in &mut self.observers {
            observer(index, entry);
        }
        Some(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn selector(n: u64) -> ModelSelector {
        let entries = (1..=n)
            .map(|i| CatalogEntry::from_path(format!("DuckRabbit-{}.onnx", i * 1000)).unwrap())
            .collect();
        ModelSelector::new(Catalog::new(entries))
    }

    #[test]
    fn slider_rounds_to_nearest_checkpoint() {
        let mut selector = selector(5);
        assert_eq!(selector.select_by_slider(0.0), None);
        assert_eq!(selector.select_by_slider(0.6), Some(2));
        assert_eq!(selector.select_by_slider(0.55), None);
        assert_eq!(selector.select_by_slider(1.0), Some(4));
        assert_eq!(selector.select_by_slider(7.0), None);
        assert_eq!(selector.select_by_slider(-1.0), Some(0));
    }

    #[test]
    fn observers_hear_only_changes() {
        let mut selector = selector(3);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let id = selector.subscribe(move |index, entry| sink.borrow_mut().push((index, entry.number)));

        selector.select(2);
        selector.select(2);
        selector.select(9);
        assert_eq!(*seen.borrow(), [(2, 3000)]);

        assert!(selector.unsubscribe(id));
        assert!(!selector.unsubscribe(id));
        selector.select(0);
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(selector.current_index(), 0);
    }

    #[test]
    fn empty_catalogue_selects_nothing() {
        let mut selector = ModelSelector::new(Catalog::default());
        assert_eq!(selector.select_by_slider(0.5), None);
        assert!(selector.current().is_none());
    }
}
