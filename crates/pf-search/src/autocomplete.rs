//! Longest common prefix over matched candidates.
//!
//! Only the lexicographically smallest and largest strings need comparing:
//! every string sorted between them shares at least their common prefix.
//! Case-insensitive mode orders by lowercased text and emits the lowercased
//! character wherever the two ends differ only by case.

use pf_core::PathModel;

fn folded(text: &str) -> String {
    text.to_lowercase()
}

/// The longest prefix shared by every path in `matches`.
///
/// Returns `None` when there is nothing to extend from. A single match is
/// returned verbatim. The result shares the first match's base directory.
///
/// # Examples
///
/// ```
/// use pf_core::PathModel;
/// use pf_search::common_prefix;
///
/// let matches = [PathModel::new("abc/foo.txt"), PathModel::new("abc/bar.txt")];
/// let prefix = common_prefix(&matches, true).unwrap();
/// assert_eq!(prefix.full(), "abc/");
/// ```
pub fn common_prefix(matches: &[PathModel], case_sensitive: bool) -> Option<PathModel> {
    let (first, rest) = matches.split_first()?;
    if rest.is_empty() {
        return Some(first.clone());
    }

    let (low, high) = if case_sensitive {
        let low = matches.iter().map(PathModel::full).min()?;
        let high = matches.iter().map(PathModel::full).max()?;
        (low, high)
    } else {
        let low = matches.iter().min_by_key(|p| folded(p.full()))?.full();
        let high = matches.iter().max_by_key(|p| folded(p.full()))?.full();
        (low, high)
    };

    let mut prefix = String::new();
    for (a, b) in low.chars().zip(high.chars()) {
        if a == b {
            prefix.push(a);
        } else if !case_sensitive && a.to_lowercase().eq(b.to_lowercase()) {
            prefix.extend(a.to_lowercase());
        } else {
            break;
        }
    }
    Some(first.derive(prefix))
}
