use crate::domain::SnippetCode;
use crate::domain::SnippetLanguage;
use crate::domain::SnippetTitle;
use crate::domain::TagName;

/// A fully parsed snippet submission. Construction goes through the `parse`
/// constructors of each field, so a `NewSnippet` that exists is a valid one;
/// handlers and the seed binary can insert it without re-checking anything.
#[derive(Debug)]
pub struct NewSnippet {
    pub title: SnippetTitle,
    pub code: SnippetCode,
    pub language: SnippetLanguage,
    pub description: Option<String>,
    pub tags: Vec<TagName>,
}

impl NewSnippet {
    /// `description` is trimmed, with empty collapsing to `None`; tag names
    /// that fail to parse (empty after trimming) are skipped rather than
    /// rejected, and duplicates are dropped while preserving first-seen
    /// order.
    pub fn parse(
        title: String,
        code: String,
        language: Option<String>,
        description: Option<String>,
        tags: Vec<String>,
    ) -> Result<Self, String> {
        let title = SnippetTitle::parse(title)?;
        let code = SnippetCode::parse(code)?;
        let language = SnippetLanguage::parse(language)?;
        let description = description
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty());

        Ok(Self {
            title,
            code,
            language,
            description,
            tags: TagName::parse_list(tags),
        })
    }
}
