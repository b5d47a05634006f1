//! Item name to file name segment mapping

/// Characters that never appear in a physical segment
pub const ILLEGAL_CHARACTERS: &[char] = &['%', '$', '\\', '/', ':', '*', '?', '<', '>', '|', '"'];

/// Replacement for each run of illegal characters
pub const PLACEHOLDER: char = '_';

/// Maps arbitrary item names onto filesystem-legal segments
///
/// Runs of illegal characters collapse into one placeholder. When
/// `max_item_name_length` is non-zero the result is cut to that many
/// characters; the cut is a plain prefix so lookups can keep matching by
/// prefix. A result made only of dots would name the current or parent
/// directory, so it becomes a single placeholder as well.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NameSanitizer {
    max_item_name_length: usize,
}

impl NameSanitizer {
    pub fn new(max_item_name_length: usize) -> Self {
        Self {
            max_item_name_length,
        }
    }

    pub fn max_item_name_length(&self) -> usize {
        self.max_item_name_length
    }

    pub fn sanitize(&self, name: &str) -> String {
        let mut out = String::with_capacity(name.len());
        let mut in_run = false;
        for ch in name.chars() {
            if is_illegal(ch) {
                if !in_run {
                    out.push(PLACEHOLDER);
                    in_run = true;
                }
            } else {
                out.push(ch);
                in_run = false;
            }
        }

        if self.max_item_name_length > 0 {
            if let Some((cut, _)) = out.char_indices().nth(self.max_item_name_length) {
                out.truncate(cut);
            }
        }

        if out.chars().all(|ch| ch == '.') {
            out.clear();
            out.push(PLACEHOLDER);
        }
        out
    }
}

fn is_illegal(ch: char) -> bool {
    ILLEGAL_CHARACTERS.contains(&ch) || ch.is_control()
}
