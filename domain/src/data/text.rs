//! Text container

use serde::{Deserialize, Serialize};

/// A batch of raw text instances
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text {
    texts: Vec<String>,
}

impl Text {
    pub fn new<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            texts: texts.into_iter().map(Into::into).collect(),
        }
    }

    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Whitespace tokens of instance `index`.
    pub fn tokens(&self, index: usize) -> Vec<&str> {
        self.texts
            .get(index)
            .map(|t| t.split_whitespace().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens() {
        let text = Text::new(["the  quick fox", ""]);
        assert_eq!(text.tokens(0), vec!["the", "quick", "fox"]);
        assert!(text.tokens(1).is_empty());
        assert!(text.tokens(7).is_empty());
    }
}
