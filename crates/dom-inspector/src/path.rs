use scraper::ElementRef;

pub const DEFAULT_PATH_SEGMENTS: usize = 10;

/// `tag[#id][.class...]` for a single element.
pub fn segment(element: ElementRef<'_>) -> String {
    let value = element.value();
    let mut out = value.name().to_ascii_lowercase();
    if let Some(id) = value.id() {
        out.push('#');
        out.push_str(id);
    }
    for class in value.classes() {
        out.push('.');
        out.push_str(class);
    }
    out
}

/// Ancestor chain ending at `element`, outermost first, at most `max_segments` long.
pub fn structural_path(element: ElementRef<'_>, max_segments: usize) -> String {
    let limit = max_segments.max(1);
    let mut segments = vec![segment(element)];
    for ancestor in element.ancestors().filter_map(ElementRef::wrap) {
        if segments.len() >= limit {
            break;
        }
        segments.push(segment(ancestor));
    }
    segments.reverse();
    segments.join(" > ")
}

/// Cuts `text` to at most `max_bytes` bytes without splitting a char.
pub fn truncate_bytes(text: &str, max_bytes: usize) -> (&str, bool) {
    if text.len() <= max_bytes {
        return (text, false);
    }
    let mut end = max_bytes;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    (&text[..end], true)
}

/// Cuts `text` to at most `max_chars` chars.
pub fn truncate_chars(text: &str, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => (text[..idx].to_string(), true),
        None => (text.to_string(), false),
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use super::*;

    #[test]
    fn path_lists_ancestors_outermost_first() {
        let html = Html::parse_document(
            r#"<html><body><main id="app"><div class="card big"><button class="btn">Go</button></div></main></body></html>"#,
        );
        let selector = Selector::parse("button").unwrap();
        let button = html.select(&selector).next().unwrap();
        assert_eq!(
            structural_path(button, 10),
            "html > body > main#app > div.card.big > button.btn"
        );
        assert_eq!(structural_path(button, 2), "div.card.big > button.btn");
    }

    #[test]
    fn byte_truncation_respects_char_boundaries() {
        let (cut, truncated) = truncate_bytes("héllo", 2);
        assert_eq!(cut, "h");
        assert!(truncated);
        assert_eq!(truncate_bytes("abc", 10), ("abc", false));
    }

    #[test]
    fn char_truncation_counts_chars() {
        assert_eq!(truncate_chars("ééé", 2), ("éé".to_string(), true));
        assert_eq!(truncate_chars("ab", 2), ("ab".to_string(), false));
    }
}
