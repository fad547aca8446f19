//! Cursor over a table view
//!
//! Positions are tracked by key, so every step is an O(log n) range lookup
//! in the underlying BTreeMap.

use std::ops::Bound::{Excluded, Included, Unbounded};

use crate::error::Result;
use crate::store::KvCursor;

use super::TableView;

/// Cursor over an immutable table view
pub struct TableCursor {
    view: TableView,
    /// Key under the cursor; `None` means invalid
    position: Option<Vec<u8>>,
}

impl TableCursor {
    pub fn new(view: TableView) -> Self {
        Self {
            view,
            position: None,
        }
    }
}

impl KvCursor for TableCursor {
    fn seek_to_first(&mut self) -> Result<()> {
        self.position = self.view.keys().next().cloned();
        Ok(())
    }

    fn seek_to_last(&mut self) -> Result<()> {
        self.position = self.view.keys().next_back().cloned();
        Ok(())
    }

    fn seek(&mut self, target: &[u8]) -> Result<()> {
        self.position = self
            .view
            .range::<[u8], _>((Included(target), Unbounded))
            .next()
            .map(|(k, _)| k.clone());
        Ok(())
    }

    fn next(&mut self) -> Result<()> {
        if let Some(current) = self.position.take() {
            self.position = self
                .view
                .range::<[u8], _>((Excluded(current.as_slice()), Unbounded))
                .next()
                .map(|(k, _)| k.clone());
        }
        Ok(())
    }

    fn prev(&mut self) -> Result<()> {
        if let Some(current) = self.position.take() {
            self.position = self
                .view
                .range::<[u8], _>((Unbounded, Excluded(current.as_slice())))
                .next_back()
                .map(|(k, _)| k.clone());
        }
        Ok(())
    }

    fn current(&self) -> Option<(&[u8], &[u8])> {
        let key = self.position.as_ref()?;
        self.view
            .get_key_value(key.as_slice())
            .map(|(k, v)| (k.as_slice(), v.as_slice()))
    }
}
