//! Lowercased search text with boundary-aware keyword lookup.

/// Terms this short only match as whole words (optionally pluralised with a
/// trailing `s`), so `"app"` matches `"apps"` but not `"application"` and
/// `"plan"` does not match `"planner"`.
const WHOLE_WORD_MAX_CHARS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Haystack {
    text: String,
}

impl Haystack {
    /// Joins the parts with single spaces and lowercases the result.
    pub(crate) fn new<'a>(parts: impl IntoIterator<Item = &'a str>) -> Self {
        let text = parts
            .into_iter()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        Self { text }
    }

    /// `true` if `term` starts at a word boundary somewhere in the text.
    ///
    /// `term` must already be lowercase.
    pub(crate) fn contains(&self, term: &str) -> bool {
        if term.is_empty() {
            return false;
        }
        let whole_word = term.chars().count() <= WHOLE_WORD_MAX_CHARS;
        self.text.match_indices(term).any(|(start, _)| {
            let before = self.text[..start].chars().next_back();
            if before.is_some_and(char::is_alphanumeric) {
                return false;
            }
            if !whole_word {
                return true;
            }
            let mut after = self.text[start + term.len()..].chars();
            match after.next() {
                None => true,
                Some('s') => !after.next().is_some_and(char::is_alphanumeric),
                Some(c) => !c.is_alphanumeric(),
            }
        })
    }

    pub(crate) fn contains_any<S: AsRef<str>>(&self, terms: &[S]) -> bool {
        terms.iter().any(|t| self.contains(t.as_ref()))
    }
}
