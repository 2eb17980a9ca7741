use pulldown_cmark::{Options, Parser, html};

/// Renders post content (CommonMark plus tables and strikethrough) to HTML.
///
/// Content has already been through `sanitize::strip_markup` at write time, so
/// there is no raw HTML left for the parser to pass through. Markdown itself can
/// still produce dangerous URLs (`[x](javascript:…)`), so the output goes through
/// ammonia's default policy before it reaches a page.
pub fn render(content: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(content, options);
    let mut out = String::with_capacity(content.len() * 3 / 2);
    html::push_html(&mut out, parser);
    ammonia::clean(&out)
}
