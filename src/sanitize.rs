use ammonia::Builder;
use std::collections::HashSet;

/// strip_markup
///
/// Removes every tag and attribute from untrusted text, keeping only the text
/// nodes. `script` and `style` elements are dropped together with their contents.
/// Text is re-serialized HTML-escaped, so a bare `<` or `&` survives as an entity.
pub fn strip_markup(input: &str) -> String {
    Builder::empty()
        .clean_content_tags(HashSet::from(["script", "style"]))
        .clean(input)
        .to_string()
}
