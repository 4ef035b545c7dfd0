use crate::FieldValues;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX: usize = 10;
pub const DEFAULT_SORT_FIELD: &str = "id";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Paging parameters as sent by the sync engine.
///
/// Absent or non-positive values fall back to `max = 10`, `offset = 0`,
/// `sort_field = "id"`, ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListParams {
    pub max: Option<i64>,
    pub offset: Option<i64>,
    pub sort_field: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl ListParams {
    pub fn max(&self) -> usize {
        self.max
            .filter(|m| *m > 0)
            .and_then(|m| usize::try_from(m).ok())
            .unwrap_or(DEFAULT_MAX)
    }

    pub fn offset(&self) -> usize {
        self.offset
            .filter(|o| *o > 0)
            .and_then(|o| usize::try_from(o).ok())
            .unwrap_or(0)
    }

    pub fn sort_field(&self) -> &str {
        self.sort_field
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .unwrap_or(DEFAULT_SORT_FIELD)
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order.unwrap_or_default()
    }
}

/// One listed object: its identifier plus the schema's listed fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectListItem {
    pub id: String,
    pub fields: FieldValues,
}

/// A page of listed objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectPage {
    pub items: Vec<ObjectListItem>,
    /// Matching objects across all pages.
    pub total: usize,
    /// Items on this page.
    pub current: usize,
}

/// Maps a page of logical objects onto the backing records behind it.
///
/// With `views` objects per record, logical position `p` lives in record
/// `p / views`, view `p % views`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageWindow {
    /// First backing record to fetch.
    pub record_offset: usize,
    /// Backing records to fetch.
    pub record_limit: usize,
    /// Leading objects of the first record that fall before the page.
    pub skip: usize,
    pub max: usize,
}

impl PageWindow {
    pub fn new(offset: usize, max: usize, views: usize) -> Self {
        let views = views.max(1);
        let skip = offset % views;
        Self {
            record_offset: offset / views,
            record_limit: skip.saturating_add(max).div_ceil(views),
            skip,
            max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_view_window_is_identity() {
        let w = PageWindow::new(20, 10, 1);
        assert_eq!((w.record_offset, w.record_limit, w.skip), (20, 10, 0));
    }

    #[test]
    fn two_view_window_spans_partial_records() {
        // objects 3..8 = record 1 view 1, then records 2 and 3
        let w = PageWindow::new(3, 5, 2);
        assert_eq!((w.record_offset, w.record_limit, w.skip), (1, 3, 1));
    }

    #[test]
    fn oversized_window_saturates() {
        let w = PageWindow::new(usize::MAX, usize::MAX, 2);
        assert_eq!(w.skip, 1);
        assert_eq!(w.record_limit, usize::MAX.div_ceil(2));
    }
}
