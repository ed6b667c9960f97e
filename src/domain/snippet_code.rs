/// Maximum code length in characters, matching the documented API limit.
pub const MAX_CODE_LENGTH: usize = 50_000;

/// The code body of a snippet: non-empty, at most `MAX_CODE_LENGTH` chars.
/// Unlike the title, the content is stored verbatim -- leading whitespace is
/// significant in code.
#[derive(Debug)]
pub struct SnippetCode(String);

impl SnippetCode {
    pub fn parse(code: String) -> Result<Self, String> {
        if code.is_empty() {
            return Err("Code is required".to_string());
        }
        if code.chars().count() > MAX_CODE_LENGTH {
            return Err(format!(
                "Code exceeds maximum size of {MAX_CODE_LENGTH} characters"
            ));
        }
        Ok(Self(code))
    }
}

impl AsRef<str> for SnippetCode {
    fn as_ref(&self) -> &str { &self.0 }
}
