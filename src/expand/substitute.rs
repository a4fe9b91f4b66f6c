use std::collections::TryReserveError;

/// Replaces every non-overlapping occurrence of `needle` in `haystack`,
/// scanning left to right, and hands back the rewritten buffer.
///
/// Replacement text is never rescanned, so a `sub` containing `needle`
/// cannot cause a second match. An empty `needle` matches nothing.
pub fn substitute(haystack: String, needle: &str, sub: &str) -> Result<String, TryReserveError> {
    if needle.is_empty() {
        return Ok(haystack);
    }

    let mut matches = haystack.match_indices(needle).peekable();
    if matches.peek().is_none() {
        return Ok(haystack);
    }

    let mut out = String::new();
    let mut last = 0;
    for (start, _) in matches {
        out.try_reserve(start - last + sub.len())?;
        out.push_str(&haystack[last..start]);
        out.push_str(sub);
        last = start + needle.len();
    }
    out.try_reserve(haystack.len() - last)?;
    out.push_str(&haystack[last..]);

    Ok(out)
}
