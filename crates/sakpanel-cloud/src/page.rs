//! Bounded list results

use serde::Serialize;

/// Page-size bounds an upstream enforces on a list call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBound {
    pub min: u32,
    pub max: u32,
}

impl PageBound {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Requested size clamped into bounds; the maximum when none is requested.
    pub fn clamp(&self, requested: Option<u32>) -> u32 {
        requested.unwrap_or(self.max).clamp(self.min, self.max)
    }
}

/// One page of a bounded list
///
/// `truncated` is set when the upstream returned a continuation cursor or
/// filled the requested page, so callers can always tell a short list from a
/// cut-off one.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page_size: u32, next_cursor: Option<String>) -> Self {
        let next_cursor = next_cursor.filter(|c| !c.is_empty());
        let truncated = next_cursor.is_some() || items.len() >= page_size as usize;
        Self {
            items,
            truncated,
            next_cursor,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            truncated: self.truncated,
            next_cursor: self.next_cursor,
        }
    }
}
