//! Highlight fragments: matched terms wrapped in `<em>`.

use opsgate_core::models::{HighlightRequest, SearchHit};

use super::tokens::token_spans;

/// Most fragments returned per field.
pub const MAX_FRAGMENTS: usize = 5;

/// Attach highlights for `terms` to every hit.
pub fn apply(hits: &mut [SearchHit], request: &HighlightRequest, terms: &[String]) {
    if terms.is_empty() {
        return;
    }
    for hit in hits.iter_mut() {
        let mut highlights = Vec::new();
        for field in &request.fields {
            let Some(text) = hit.source.get(field).and_then(|v| v.as_str()) else {
                continue;
            };
            let fragments = fragments(text, terms, request.fragment_size);
            if !fragments.is_empty() {
                highlights.push((field.clone(), fragments));
            }
        }
        hit.highlights = highlights;
    }
}

/// Split `text` into word-aligned windows of about `fragment_size` bytes and
/// return the windows that contain a term, in text order.
pub fn fragments(text: &str, terms: &[String], fragment_size: usize) -> Vec<String> {
    let spans = token_spans(text);
    let mut windows: Vec<Vec<(usize, usize)>> = Vec::new();
    let mut current: Vec<(usize, usize)> = Vec::new();
    for span in spans {
        if let Some(first) = current.first() {
            if span.1 - first.0 > fragment_size.max(1) {
                windows.push(std::mem::take(&mut current));
            }
        }
        current.push(span);
    }
    if !current.is_empty() {
        windows.push(current);
    }

    let is_match = |(s, e): (usize, usize)| {
        let word = text[s..e].to_lowercase();
        terms.iter().any(|t| *t == word)
    };

    let mut out = Vec::new();
    for window in windows {
        if !window.iter().any(|span| is_match(*span)) {
            continue;
        }
        let start = window[0].0;
        let end = window[window.len() - 1].1;
        let mut fragment = String::with_capacity(end - start + 16);
        let mut cursor = start;
        for &(s, e) in &window {
            if is_match((s, e)) {
                fragment.push_str(&text[cursor..s]);
                fragment.push_str("<em>");
                fragment.push_str(&text[s..e]);
                fragment.push_str("</em>");
                cursor = e;
            }
        }
        fragment.push_str(&text[cursor..end]);
        out.push(fragment);
        if out.len() == MAX_FRAGMENTS {
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn wraps_matches_case_insensitively() {
        let f = fragments("Login fails after Password reset", &terms(&["login", "password"]), 150);
        assert_eq!(f, vec!["<em>Login</em> fails after <em>Password</em> reset"]);
    }

    #[test]
    fn non_matching_windows_are_skipped() {
        let text = "alpha beta gamma delta epsilon zeta timeout eta theta";
        let f = fragments(text, &terms(&["timeout"]), 12);
        assert_eq!(f.len(), 1);
        assert!(f[0].contains("<em>timeout</em>"));
        assert!(!f[0].contains("alpha"));
    }

    #[test]
    fn no_match_no_fragment() {
        assert!(fragments("nothing here", &terms(&["absent"]), 150).is_empty());
    }
}
