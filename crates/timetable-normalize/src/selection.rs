use std::collections::BTreeSet;

/// Subject tokens chosen by a user. Order carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    tokens: BTreeSet<String>,
}

impl Selection {
    /// Parses a free-text list such as `"ES-1, MA-2 FIN-3"`.
    #[must_use]
    pub fn parse_list(input: &str) -> Self {
        input
            .split(|ch: char| ch == ',' || ch.is_whitespace())
            .filter(|token| !token.is_empty())
            .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    /// True when some whitespace token of `text` equals a selected token.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        text.split_whitespace()
            .any(|token| self.tokens.contains(token))
    }
}

impl<S> FromIterator<S> for Selection
where
    S: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().map(Into::into).collect(),
        }
    }
}
