//! Suggest a known name close to a misspelled one, for errors such as an unknown operation
//! during dispatch, an unexpected operation in an instance registration or an unknown capability
//! in a constraint.
//!
//! Similarity is the normalized Damerau-Levenshtein distance.

use strsim::normalized_damerau_levenshtein;

/// Minimal similarity for a known name to be offered as a suggestion. Operation names are short
/// (`ap`, `bind`, `fmap`), so the threshold stays rather permissive.
pub const MIN_SIMILARITY: f64 = 0.60;

/// Find the known name closest to `input`. An exact match modulo casing wins immediately;
/// otherwise the most similar candidate above [MIN_SIMILARITY] is returned.
pub fn find_best_match<'syms, S, I>(symbols: &'syms [S], input: &I) -> Option<&'syms str>
where
    S: AsRef<str>,
    I: AsRef<str> + ?Sized,
{
    let input = input.as_ref();
    let mut best: Option<(&'syms str, f64)> = None;

    for sym in symbols {
        let sym = sym.as_ref();

        if sym.eq_ignore_ascii_case(input) {
            return Some(sym);
        }

        let similarity = normalized_damerau_levenshtein(sym, input);
        let improves = best.map_or(true, |(_, max)| similarity > max);

        if similarity >= MIN_SIMILARITY && improves {
            best = Some((sym, similarity));
        }
    }

    best.map(|(sym, _)| sym)
}

/// Push a "did you mean" note onto a diagnostic's notes when a close match exists.
pub fn add_suggestion<S, I>(notes: &mut Vec<String>, symbols: &[S], input: &I)
where
    S: AsRef<str>,
    I: AsRef<str> + ?Sized,
{
    if let Some(best_match) = find_best_match(symbols, input) {
        notes.push(format!("Did you mean `{best_match}`?"));
    }
}
