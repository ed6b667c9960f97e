/// A programming-language label, normalised to lowercase so that filtering
/// and the `/api/languages` listing don't fragment on case ("Python" vs
/// "python"). An absent or empty label falls back to "plaintext".
#[derive(Debug)]
pub struct SnippetLanguage(String);

impl SnippetLanguage {
    pub const MAX_LENGTH: usize = 50;
    pub const DEFAULT: &'static str = "plaintext";

    pub fn parse(language: Option<String>) -> Result<Self, String> {
        let language = language
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| Self::DEFAULT.to_string());
        if language.chars().count() > Self::MAX_LENGTH {
            return Err(format!(
                "Language exceeds maximum length of {} characters",
                Self::MAX_LENGTH
            ));
        }
        Ok(Self(language))
    }
}

impl AsRef<str> for SnippetLanguage {
    fn as_ref(&self) -> &str { &self.0 }
}
