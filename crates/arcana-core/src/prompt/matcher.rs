//! Ordered keyword tables

/// An ordered `keyword -> id` table; earlier entries win
///
/// Keywords are stored lower-case. Several keywords may map to one id.
#[derive(Debug, Clone, Copy)]
pub struct KeywordTable {
    entries: &'static [(&'static str, &'static str)],
}

impl KeywordTable {
    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    /// Ids in first-appearance order, without repeats
    pub fn ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<&'static str> = Vec::new();
        for (_, id) in self.entries {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        ids
    }

    /// First id whose keyword occurs in `text`
    pub fn find_contained(&self, text: &str) -> Option<&'static str> {
        let text = text.to_lowercase();
        self.entries
            .iter()
            .find(|(keyword, _)| text.contains(keyword))
            .map(|(_, id)| *id)
    }

    /// First id whose keyword occurs in `text` or contains it
    pub fn find_either_way(&self, text: &str) -> Option<&'static str> {
        let text = text.trim().to_lowercase();
        if text.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|(keyword, _)| text.contains(keyword) || keyword.contains(text.as_str()))
            .map(|(_, id)| *id)
    }
}
