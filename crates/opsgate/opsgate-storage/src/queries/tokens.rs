//! Word tokenization matching the FTS5 `unicode61` tokenizer closely enough
//! for query parsing and highlighting.

/// Byte spans of alphanumeric runs in `text`.
pub fn token_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start: Option<usize> = None;
    for (i, c) in text.char_indices() {
        match (c.is_alphanumeric(), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                spans.push((s, i));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push((s, text.len()));
    }
    spans
}

/// Lower-cased tokens of `text`, in order, duplicates removed.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for (s, e) in token_spans(text) {
        let token = text[s..e].to_lowercase();
        if !out.contains(&token) {
            out.push(token);
        }
    }
    out
}
