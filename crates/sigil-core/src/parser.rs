//! Command grammar: `#KEYWORD[PARAM:VALUE]` directives embedded in free text.
//!
//! Parsing never fails. Fragments that do not match the grammar are plain
//! text and are ignored, since free text may contain `#` on its own.

use crate::directive::{self, Directive, BARE_PARAM};
use crate::types::{ParamValue, Params};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static DIRECTIVE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#([A-Z]+)\[([^\]]*)\]").expect("directive pattern is valid"));

/// Cheap pre-check: does the text contain any directive syntax?
pub fn has_directives(text: &str) -> bool {
    DIRECTIVE_RE.is_match(text)
}

/// Raw matched directive substrings, in scan order.
pub fn raw_directives(text: &str) -> Vec<&str> {
    DIRECTIVE_RE.find_iter(text).map(|m| m.as_str()).collect()
}

/// Extract every directive, left to right. Priority is not applied here.
pub fn parse(text: &str) -> Vec<Directive> {
    let directives: Vec<Directive> = DIRECTIVE_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let keyword = caps.get(1)?.as_str();
            let body = caps.get(2).map_or("", |m| m.as_str());
            let mut directive = Directive::new(keyword, parse_body(body));
            directive.raw = whole.as_str().to_string();
            directive.position = whole.start();
            Some(directive)
        })
        .collect();

    debug!("parsed {} directive(s)", directives.len());
    directives
}

/// Split the body on the first `:` or `=`; a body without either becomes
/// the single bare `value` parameter. An empty body carries no parameters.
fn parse_body(body: &str) -> Params {
    let mut params = Params::new();
    if body.trim().is_empty() {
        return params;
    }
    match body.find([':', '=']) {
        Some(idx) => {
            let name = body[..idx].trim();
            let name = if name.is_empty() { BARE_PARAM } else { name };
            params.insert(name, coerce(&body[idx + 1..]));
        }
        None => params.insert(BARE_PARAM, coerce(body)),
    }
    params
}

/// `true`/`false` become booleans, finite numbers become numbers, anything
/// else is text with one layer of surrounding quotes removed.
pub fn coerce(raw: &str) -> ParamValue {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        return ParamValue::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return ParamValue::Bool(false);
    }
    if let Ok(n) = trimmed.parse::<f64>() {
        if n.is_finite() {
            return ParamValue::Number(n);
        }
    }
    ParamValue::Text(strip_quotes(trimmed).to_string())
}

fn strip_quotes(s: &str) -> &str {
    for quote in ['"', '\''] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// Every keyword in the static catalog.
pub fn known_keywords() -> Vec<&'static str> {
    directive::catalog().iter().map(|s| s.keyword).collect()
}

/// One-line help for a keyword (case-insensitive), if it is known.
pub fn keyword_help(keyword: &str) -> Option<String> {
    let upper = keyword.trim().trim_start_matches('#').to_ascii_uppercase();
    directive::lookup(&upper).map(|s| s.help())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_prefers_bool_then_number() {
        assert_eq!(coerce("TRUE"), ParamValue::Bool(true));
        assert_eq!(coerce(" 3.5 "), ParamValue::Number(3.5));
        assert_eq!(coerce("NaN"), ParamValue::Text("NaN".into()));
        assert_eq!(coerce("inf"), ParamValue::Text("inf".into()));
    }

    #[test]
    fn strip_quotes_only_matching_pairs() {
        assert_eq!(strip_quotes("\"t1\""), "t1");
        assert_eq!(strip_quotes("'t1'"), "t1");
        assert_eq!(strip_quotes("\"t1'"), "\"t1'");
        assert_eq!(strip_quotes("\""), "\"");
    }

    #[test]
    fn body_splits_on_first_separator_only() {
        let params = parse_body("URL:a=b:c");
        assert_eq!(params.get("URL"), Some(&ParamValue::Text("a=b:c".into())));
    }
}
