//! Sort order value object.

use serde::{Deserialize, Serialize};

/// Display order for append-only lists.
///
/// Storage order is always insertion order; this only affects projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[serde(alias = "desc")]
    NewestFirst,
    #[serde(alias = "asc")]
    OldestFirst,
}

impl SortOrder {
    /// Arrange items stored oldest-first into this order.
    pub fn arrange<T>(&self, mut items: Vec<T>) -> Vec<T> {
        if *self == SortOrder::NewestFirst {
            items.reverse();
        }
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrange() {
        assert_eq!(SortOrder::OldestFirst.arrange(vec![1, 2, 3]), vec![1, 2, 3]);
        assert_eq!(SortOrder::NewestFirst.arrange(vec![1, 2, 3]), vec![3, 2, 1]);
    }

    #[test]
    fn test_deserialize_aliases() {
        let desc: SortOrder = serde_json::from_str("\"desc\"").unwrap();
        let oldest: SortOrder = serde_json::from_str("\"oldest_first\"").unwrap();
        assert_eq!(desc, SortOrder::NewestFirst);
        assert_eq!(oldest, SortOrder::OldestFirst);
    }
}
