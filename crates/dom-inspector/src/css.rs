//! Minimal CSS rule scanner.
//!
//! Enough to enumerate rules the way a CSSOM walk would: style rules, `@media`
//! and `@layer` blocks with their nested rules, `@layer` statements. Any other
//! at-rule is reported as [`CssRule::Other`] so callers can count it, and so
//! is a grouping block nested deeper than the depth limit. Stray `}` are
//! skipped.

/// Grouping blocks nested deeper than this are not descended into.
pub const DEFAULT_MAX_RULE_DEPTH: usize = 32;

#[derive(Clone, Debug, PartialEq)]
pub enum CssRule {
    Style {
        selector_text: String,
        declarations: String,
    },
    Media {
        condition: String,
        rules: Vec<CssRule>,
    },
    Layer {
        names: Vec<String>,
        rules: Vec<CssRule>,
        statement: bool,
    },
    Other {
        keyword: String,
    },
}

impl CssRule {
    pub fn nested(&self) -> &[CssRule] {
        match self {
            CssRule::Media { rules, .. } | CssRule::Layer { rules, .. } => rules,
            _ => &[],
        }
    }
}

pub fn parse_stylesheet(text: &str) -> Vec<CssRule> {
    parse_stylesheet_with_depth(text, DEFAULT_MAX_RULE_DEPTH)
}

/// `max_depth` counts `@media`/`@layer` blocks; the top level is depth 0.
pub fn parse_stylesheet_with_depth(text: &str, max_depth: usize) -> Vec<CssRule> {
    let cleaned = strip_comments(text);
    parse_rules(&cleaned, max_depth)
}

/// `prop: value` pairs of a declaration block, property names lowercased.
pub fn parse_declarations(block: &str) -> Vec<(String, String)> {
    split_top_level(block, ';')
        .into_iter()
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim().to_ascii_lowercase();
            if name.is_empty() {
                return None;
            }
            Some((name, value.trim().to_string()))
        })
        .collect()
}

/// Splits selector lists on top-level commas.
pub fn split_selector_list(selector_text: &str) -> Vec<String> {
    split_top_level(selector_text, ',')
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_rules(src: &str, depth_left: usize) -> Vec<CssRule> {
    let bytes = src.as_bytes();
    let mut rules = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        let Some((stop, terminator)) = find_prelude_end(src, pos) else {
            break;
        };
        let prelude = src[pos..stop].trim();
        match terminator {
            b'}' => pos = stop + 1,
            b';' => {
                if let Some(rule) = statement_rule(prelude) {
                    rules.push(rule);
                }
                pos = stop + 1;
            }
            _ => {
                let end = find_block_end(src, stop + 1);
                let body = &src[stop + 1..end];
                if let Some(rule) = block_rule(prelude, body, depth_left) {
                    rules.push(rule);
                }
                pos = end + 1;
            }
        }
    }
    rules
}

fn statement_rule(prelude: &str) -> Option<CssRule> {
    let (keyword, rest) = at_keyword(prelude)?;
    if keyword == "layer" {
        return Some(CssRule::Layer {
            names: layer_names(rest),
            rules: Vec::new(),
            statement: true,
        });
    }
    Some(CssRule::Other { keyword })
}

fn block_rule(prelude: &str, body: &str, depth_left: usize) -> Option<CssRule> {
    match at_keyword(prelude) {
        Some((keyword, _)) if depth_left == 0 => Some(CssRule::Other { keyword }),
        Some((keyword, rest)) => Some(match keyword.as_str() {
            "media" => CssRule::Media {
                condition: rest.trim().to_string(),
                rules: parse_rules(body, depth_left - 1),
            },
            "layer" => CssRule::Layer {
                names: layer_names(rest),
                rules: parse_rules(body, depth_left - 1),
                statement: false,
            },
            _ => CssRule::Other { keyword },
        }),
        None if prelude.is_empty() => None,
        None => Some(CssRule::Style {
            selector_text: prelude.to_string(),
            declarations: body.trim().to_string(),
        }),
    }
}

fn at_keyword(prelude: &str) -> Option<(String, &str)> {
    let rest = prelude.strip_prefix('@')?;
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
        .unwrap_or(rest.len());
    Some((rest[..end].to_ascii_lowercase(), &rest[end..]))
}

fn layer_names(rest: &str) -> Vec<String> {
    rest.split(',')
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect()
}

/// Index and byte of the first top-level `{`, `;` or stray `}` at or after `from`.
fn find_prelude_end(src: &str, from: usize) -> Option<(usize, u8)> {
    let bytes = src.as_bytes();
    let mut quote: Option<u8> = None;
    let mut paren = 0usize;
    let mut i = from;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' {
                    i += 1;
                } else if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'(' => paren += 1,
                b')' => paren = paren.saturating_sub(1),
                b'{' | b';' | b'}' if paren == 0 => return Some((i, b)),
                _ => {}
            },
        }
        i += 1;
    }
    None
}

/// Index of the `}` closing a block opened just before `from`, or the end of input.
fn find_block_end(src: &str, from: usize) -> usize {
    let bytes = src.as_bytes();
    let mut depth = 1usize;
    let mut quote: Option<u8> = None;
    let mut i = from;
    while i < bytes.len() {
        let b = bytes[i];
        match quote {
            Some(q) => {
                if b == b'\\' {
                    i += 1;
                } else if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'"' | b'\'' => quote = Some(b),
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return i;
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }
    bytes.len()
}

fn strip_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut quote: Option<char> = None;
    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            out.push(c);
            if c == '\\' {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            } else if c == q {
                quote = None;
            }
            continue;
        }
        if c == '/' && chars.peek() == Some(&'*') {
            chars.next();
            let mut prev = '\0';
            for inner in chars.by_ref() {
                if prev == '*' && inner == '/' {
                    break;
                }
                prev = inner;
            }
            out.push(' ');
            continue;
        }
        if c == '"' || c == '\'' {
            quote = Some(c);
        }
        out.push(c);
    }
    out
}

fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;
    for (idx, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            _ if c == separator && depth == 0 => {
                parts.push(&text[start..idx]);
                start = idx + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts.into_iter().filter(|p| !p.trim().is_empty()).collect()
}
