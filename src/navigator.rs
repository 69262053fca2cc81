//! Cursor over a fixed list of articles.
//!
//! The list is taken once at construction and never changes. Stepping past
//! either end is a no-op: the cursor clamps instead of wrapping.

use crate::error::SourceError;
use crate::models::ArticleRef;
use crate::sources::RecordSource;
use tracing::info;

/// Clamped cursor over an immutable list, starting on the first item.
///
/// # Examples
///
/// ```ignore
/// let mut nav = Navigator::new(vec!["a", "b"]);
/// assert_eq!(nav.prev(), Some(&"a"));
/// assert_eq!(nav.next(), Some(&"b"));
/// assert_eq!(nav.next(), Some(&"b"));
/// ```
#[derive(Debug, Clone)]
pub struct Navigator<T = ArticleRef> {
    items: Vec<T>,
    cursor: usize,
}

impl<T> Navigator<T> {
    /// Navigator over `items` with the cursor on the first one.
    pub fn new(items: Vec<T>) -> Self {
        Self { items, cursor: 0 }
    }

    /// Item under the cursor, `None` for an empty list.
    pub fn current(&self) -> Option<&T> {
        self.items.get(self.cursor)
    }

    /// Advance unless already on the last item.
    pub fn next(&mut self) -> Option<&T> {
        if self.cursor + 1 < self.items.len() {
            self.cursor += 1;
        }
        self.current()
    }

    /// Step back unless already on the first item.
    pub fn prev(&mut self) -> Option<&T> {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
        self.current()
    }

    /// Cursor position, `None` for an empty list.
    pub fn cursor(&self) -> Option<usize> {
        (!self.items.is_empty()).then_some(self.cursor)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }
}

impl Navigator<ArticleRef> {
    /// Load the article list once from `source`.
    pub async fn load<S: RecordSource>(source: &S) -> Result<Self, SourceError> {
        let records = source.load_records().await?;
        info!(count = records.len(), "Loaded article list");
        Ok(Self::new(records))
    }
}
