//! Keyboard selection over the type-grouped result list.
//!
//! Rows are grouped in [`TypeTag::ORDER`]; a row's flattened index is its
//! position across all groups in that order. [`GroupedResults::rows`] is the
//! only place that assigns those indices, and both the selection logic and
//! the renderers walk it, so a highlighted row always matches the index the
//! controller holds.

use crate::proto::SearchResult;
use crate::proto::TypeTag;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavKey {
    Up,
    Down,
    Enter,
    Escape,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupedResults {
    groups: Vec<(TypeTag, Vec<SearchResult>)>,
    len: usize,
}

impl GroupedResults {
    /// Groups `results` by type, keeping server rank order inside each
    /// group. With a filter, results of other types are left out.
    pub fn build(results: &[SearchResult], type_filter: Option<TypeTag>) -> Self {
        let mut groups = Vec::new();
        let mut len = 0;
        for kind in TypeTag::ORDER {
            if type_filter.is_some_and(|filter| filter != kind) {
                continue;
            }
            let rows: Vec<SearchResult> = results
                .iter()
                .filter(|result| result.kind == kind)
                .cloned()
                .collect();
            if rows.is_empty() {
                continue;
            }
            len += rows.len();
            groups.push((kind, rows));
        }
        Self { groups, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn groups(&self) -> impl Iterator<Item = (TypeTag, &[SearchResult])> {
        self.groups
            .iter()
            .map(|(kind, rows)| (*kind, rows.as_slice()))
    }

    /// `(flattened_index, type, result)` for every row, in display order.
    pub fn rows(&self) -> impl Iterator<Item = (usize, TypeTag, &SearchResult)> {
        self.groups
            .iter()
            .flat_map(|(kind, rows)| rows.iter().map(move |row| (*kind, row)))
            .enumerate()
            .map(|(index, (kind, row))| (index, kind, row))
    }

    pub fn get(&self, index: usize) -> Option<&SearchResult> {
        self.rows()
            .find(|(row_index, _, _)| *row_index == index)
            .map(|(_, _, row)| row)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    Idle,
    Selected(usize),
}

impl Selection {
    /// `None` means nothing is selected.
    pub fn flattened_index(self) -> Option<usize> {
        match self {
            Selection::Idle => None,
            Selection::Selected(index) => Some(index),
        }
    }
}

/// Roving selection index over a list of `len` rows.
///
/// Invariant: the selection is `Idle` or `Selected(i)` with `i < len`.
/// Every change of the list goes through [`SelectionController::reshape`],
/// which drops the selection and bumps `version`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionController {
    selection: Selection,
    len: usize,
    version: u64,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn flattened_index(&self) -> Option<usize> {
        self.selection.flattened_index()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn move_down(&mut self) -> Selection {
        if self.len == 0 {
            return self.selection;
        }
        let next = match self.selection {
            Selection::Idle => 0,
            Selection::Selected(index) => (index + 1) % self.len,
        };
        self.selection = Selection::Selected(next);
        self.selection
    }

    pub fn move_up(&mut self) -> Selection {
        if self.len == 0 {
            return self.selection;
        }
        let next = match self.selection {
            Selection::Idle => self.len - 1,
            Selection::Selected(index) => (index + self.len - 1) % self.len,
        };
        self.selection = Selection::Selected(next);
        self.selection
    }

    /// Index to navigate to, if a row is selected. The selection returns to
    /// `Idle` once the activation is taken.
    pub fn activate(&mut self) -> Option<usize> {
        let index = self.selection.flattened_index()?;
        self.selection = Selection::Idle;
        Some(index)
    }

    /// The visible list changed. Always drops the selection, even when the
    /// new list happens to have the same length.
    pub fn reshape(&mut self, len: usize) {
        self.len = len;
        self.selection = Selection::Idle;
        self.version += 1;
    }

    pub fn reset(&mut self) {
        self.reshape(0);
    }
}
