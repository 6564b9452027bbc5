use regex::Regex;
use scraper::Html;
use std::sync::OnceLock;

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("static tag pattern"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static whitespace pattern"))
}

/// Decode HTML character references and nothing else.
///
/// `<` is escaped before parsing so the HTML parser sees the whole input as
/// one text run: markup (well-formed or not) survives verbatim and only
/// entities such as `&amp;` or `&#39;` are resolved.
pub fn decode_entities(html: &str) -> String {
    let escaped = html.replace('<', "&lt;");
    let fragment = Html::parse_fragment(&escaped);
    fragment.root_element().text().collect::<String>()
}

/// Flatten an API body to plain text.
///
/// Entities are decoded first, then anything tag-shaped is dropped (this also
/// removes markup that was only present in escaped form), then whitespace
/// runs collapse to one space. Structure such as lists and line breaks is
/// not preserved.
pub fn clean_html(html: &str) -> String {
    if html.is_empty() {
        return String::new();
    }

    let text = decode_entities(html);
    let text = tag_re().replace_all(&text, "");
    let text = whitespace_re().replace_all(&text, " ");
    text.trim().to_string()
}
