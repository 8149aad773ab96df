//! Order-preserving deduplication.

use std::collections::HashSet;
use std::hash::Hash;

/// Remove duplicates while keeping the first occurrence of each item
///
/// # Examples
/// ```
/// use tinet::utils::unique_in_order;
///
/// assert_eq!(unique_in_order(["a", "b", "a", "c"]), vec!["a", "b", "c"]);
/// ```
pub fn unique_in_order<T, I>(items: I) -> Vec<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_in_order() {
        let images = vec!["x".to_string(), "y".to_string(), "x".to_string()];
        assert_eq!(unique_in_order(images), vec!["x".to_string(), "y".to_string()]);

        let empty: Vec<&str> = Vec::new();
        assert!(unique_in_order(empty).is_empty());
    }
}
