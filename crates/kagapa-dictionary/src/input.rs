use kagapa_core::{Error, Result};

/// Words for a create/add/delete/approve request: one word or a list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordInput {
    Single(String),
    Batch(Vec<String>),
}

impl WordInput {
    /// Flatten to the list the batch algorithms work on.
    ///
    /// A blank single word or an empty list is rejected; blank entries inside
    /// a non-empty list are left for the caller to tally.
    pub fn into_words(self) -> Result<Vec<String>> {
        match self {
            WordInput::Single(w) if w.trim().is_empty() => Err(Error::InvalidInput("word is required".into())),
            WordInput::Single(w) => Ok(vec![w]),
            WordInput::Batch(ws) if ws.is_empty() => Err(Error::InvalidInput("at least one word is required".into())),
            WordInput::Batch(ws) => Ok(ws),
        }
    }
}

impl From<&str> for WordInput {
    fn from(w: &str) -> Self {
        WordInput::Single(w.to_string())
    }
}

impl From<String> for WordInput {
    fn from(w: String) -> Self {
        WordInput::Single(w)
    }
}

impl From<Vec<String>> for WordInput {
    fn from(ws: Vec<String>) -> Self {
        WordInput::Batch(ws)
    }
}

impl From<&[&str]> for WordInput {
    fn from(ws: &[&str]) -> Self {
        WordInput::Batch(ws.iter().map(|w| (*w).to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for WordInput {
    fn from(ws: [&str; N]) -> Self {
        WordInput::Batch(ws.iter().map(|w| (*w).to_string()).collect())
    }
}
