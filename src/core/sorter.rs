//! Sorting chronicle item lists by path.

use std::cmp::Ordering;
use std::path::Path;

use serde_json::Value;

use crate::domain::items::{item_path, ItemsFile, ItemsFileError};

/// Result of sorting one items file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOutcome {
    /// Items sorted and file rewritten; holds the item count
    Sorted(usize),

    /// The document has no `items` array; file left untouched
    NoItems,
}

/// Stable ascending sort by raw `path`; items without a string path sort
/// as the empty string
pub fn sort_items(items: &mut [Value]) {
    items.sort_by(compare_by_path);
}

fn compare_by_path(a: &Value, b: &Value) -> Ordering {
    item_path(a).unwrap_or("").cmp(item_path(b).unwrap_or(""))
}

/// Sort one items file in place
pub fn sort_items_file(path: &Path) -> Result<SortOutcome, ItemsFileError> {
    let mut document = ItemsFile::load(path)?;

    let Some(items) = document.items_mut() else {
        return Ok(SortOutcome::NoItems);
    };
    sort_items(items);
    let count = items.len();

    document.save()?;
    Ok(SortOutcome::Sorted(count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sorts_by_raw_path() {
        let mut items = vec![
            json!({"path": "files/b.jpg"}),
            json!({"path": "files/B.jpg"}),
            json!({"path": "files/a.jpg"}),
            json!({"path": "files/č.jpg"}),
        ];
        sort_items(&mut items);

        let paths: Vec<_> = items.iter().filter_map(item_path).collect();
        // byte order: uppercase before lowercase, non-ASCII last
        assert_eq!(paths, vec!["files/B.jpg", "files/a.jpg", "files/b.jpg", "files/č.jpg"]);
    }

    #[test]
    fn test_missing_path_sorts_first_and_stable() {
        let mut items = vec![
            json!({"path": "files/a.jpg"}),
            json!({"title": "first"}),
            json!({"path": 7, "title": "second"}),
        ];
        sort_items(&mut items);

        assert_eq!(items[0]["title"], "first");
        assert_eq!(items[1]["title"], "second");
        assert_eq!(items[2]["path"], "files/a.jpg");
    }
}
