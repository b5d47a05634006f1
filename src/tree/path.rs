//! Virtual path helpers
//!
//! Virtual paths are `/`-delimited. Comparisons are case-insensitive and
//! Unicode-normalized; stored values keep their original casing.

use unicode_normalization::UnicodeNormalization;

/// Case-folding key used for every name and path comparison
pub fn fold_case(value: &str) -> String {
    value.nfc().collect::<String>().to_lowercase()
}

/// Non-empty segments of a virtual path
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Canonical form: leading slash, no empty or trailing segments
pub fn normalize(path: &str) -> String {
    format!("/{}", segments(path).join("/"))
}

pub fn paths_equal(a: &str, b: &str) -> bool {
    fold_case(&normalize(a)) == fold_case(&normalize(b))
}

/// Whether `path` equals `root` or lies below it
pub fn is_within(path: &str, root: &str) -> bool {
    let path = segments(path);
    let root = segments(root);
    path.len() >= root.len()
        && path
            .iter()
            .zip(root.iter())
            .all(|(a, b)| fold_case(a) == fold_case(b))
}

/// Parent virtual path, or `None` for a single-segment path
pub fn parent(path: &str) -> Option<String> {
    let segments = segments(path);
    if segments.len() < 2 {
        return None;
    }
    Some(format!("/{}", segments[..segments.len() - 1].join("/")))
}

/// Re-root `path` (which lies within `old_root`) under `new_root`
pub fn rebase(path: &str, old_root: &str, new_root: &str) -> String {
    let depth = segments(old_root).len();
    let tail = segments(path);
    let mut rebased = segments(new_root);
    rebased.extend(tail.iter().skip(depth));
    format!("/{}", rebased.join("/"))
}
