//! Fuzzy term expansion against the FTS vocabulary.

use rusqlite::Connection;

use opsgate_core::errors::OpsgateResult;
use opsgate_core::models::Fuzziness;

use crate::sqlite_err;

/// Per-term cap on vocabulary expansions.
pub const MAX_EXPANSIONS: usize = 50;

/// Query terms plus every indexed term within the allowed edit distance.
/// Original terms come first; expansions are ordered by distance then text.
pub fn expand_terms(
    conn: &Connection,
    terms: &[String],
    fuzziness: Fuzziness,
) -> OpsgateResult<Vec<String>> {
    let mut out: Vec<String> = terms.to_vec();
    if terms.iter().all(|t| fuzziness.max_edits(t) == 0) {
        return Ok(out);
    }

    let vocab = load_vocab(conn)?;
    for term in terms {
        let edits = fuzziness.max_edits(term);
        if edits == 0 {
            continue;
        }
        let term_len = term.chars().count();
        let mut candidates: Vec<(usize, &String)> = vocab
            .iter()
            .filter(|v| v.chars().count().abs_diff(term_len) <= edits)
            .filter_map(|v| {
                let d = levenshtein(term, v);
                (d > 0 && d <= edits).then_some((d, v))
            })
            .collect();
        candidates.sort();
        for (_, v) in candidates.into_iter().take(MAX_EXPANSIONS) {
            if !out.contains(v) {
                out.push(v.clone());
            }
        }
    }
    Ok(out)
}

fn load_vocab(conn: &Connection) -> OpsgateResult<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT term FROM document_fts_vocab")
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(0))
        .map_err(sqlite_err)?;
    rows.map(|r| r.map_err(sqlite_err)).collect()
}

/// Edit distance over chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];
    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != *cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_chars.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levenshtein_basics() {
        assert_eq!(levenshtein("login", "login"), 0);
        assert_eq!(levenshtein("logn", "login"), 1);
        assert_eq!(levenshtein("pasword", "password"), 1);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
    }
}
