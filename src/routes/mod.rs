mod health_check;
mod index;
mod languages;
mod snippets;
mod tags;

pub use health_check::*;
pub use index::*;
pub use languages::*;
pub use snippets::*;
pub use tags::*;

/// Write out an error and its full chain of causes, most recent first. Used
/// by the `Debug` impls of the route error enums, so the log shows the whole
/// story rather than just the outermost message.
pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{e}\n")?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{cause}")?;
        current = cause.source();
    }
    Ok(())
}
