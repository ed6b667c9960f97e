/// A tag name, normalised to lowercase/trimmed like `SnippetLanguage` so the
/// get-or-create lookup in the store cannot produce near-duplicate tags.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct TagName(String);

impl TagName {
    pub const MAX_LENGTH: usize = 50;

    pub fn parse(name: String) -> Result<Self, String> {
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return Err("Tag name must not be empty".to_string());
        }
        if name.chars().count() > Self::MAX_LENGTH {
            return Err(format!(
                "Tag name exceeds maximum length of {} characters",
                Self::MAX_LENGTH
            ));
        }
        Ok(Self(name))
    }

    /// Parse a submitted tag list: names that fail to parse are skipped
    /// rather than rejected, and duplicates (post-normalisation) are dropped
    /// while preserving first-seen order.
    pub fn parse_list(tags: Vec<String>) -> Vec<Self> {
        let mut parsed: Vec<Self> = Vec::new();
        for tag in tags {
            if let Ok(tag) = Self::parse(tag) {
                if !parsed.contains(&tag) {
                    parsed.push(tag);
                }
            }
        }
        parsed
    }
}

impl AsRef<str> for TagName {
    fn as_ref(&self) -> &str { &self.0 }
}
