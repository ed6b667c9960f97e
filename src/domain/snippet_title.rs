use unicode_segmentation::UnicodeSegmentation;

/// A snippet title as accepted by the API: non-empty after trimming, at most
/// 200 graphemes. The field is left private, to prevent bypassing of `parse`,
/// and mutation of the value.
///
/// Must be instantiated with `SnippetTitle::parse`. The error strings double
/// as client-facing messages, so they are phrased for the API user.
#[derive(Debug)]
pub struct SnippetTitle(String);

impl SnippetTitle {
    pub const MAX_GRAPHEMES: usize = 200;

    pub fn parse(title: String) -> Result<Self, String> {
        let title = title.trim().to_owned();
        if title.is_empty() {
            return Err("Title is required".to_string());
        }
        // count graphemes, not bytes; "noe\u{0308}l" is 4 characters to a user
        if title.graphemes(true).count() > Self::MAX_GRAPHEMES {
            return Err(format!(
                "Title exceeds maximum length of {} characters",
                Self::MAX_GRAPHEMES
            ));
        }
        Ok(Self(title))
    }
}

impl AsRef<str> for SnippetTitle {
    fn as_ref(&self) -> &str { &self.0 }
}
