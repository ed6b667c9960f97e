mod new_snippet;
mod snippet_code;
mod snippet_language;
mod snippet_title;
mod tag_name;

pub use new_snippet::NewSnippet;
pub use snippet_code::SnippetCode;
pub use snippet_code::MAX_CODE_LENGTH;
pub use snippet_language::SnippetLanguage;
pub use snippet_title::SnippetTitle;
pub use tag_name::TagName;
