/// Storage-time text cleaning for free-text fields
///
/// Every free-text field (log title, description, body, notes, user profile
/// fields) passes through [`clean`] before being written. Cleaning strips
/// HTML tags and trims surrounding whitespace; it does NOT escape anything.
/// HTML escaping is a presentation concern and happens in the API crate's
/// render helpers at response time.
///
/// Search terms are passed through [`strip_tags`] as well. All queries bind
/// values as parameters, so this is not an injection defense; it only keeps
/// the set of matchable terms identical to what can be stored.

/// Removes HTML/XML tags from a string
///
/// A tag is a `<` up to the next `>`. An unterminated `<...` sequence is
/// dropped entirely, matching the usual strip-tags behavior.
///
/// # Example
///
/// ```
/// use worklog_shared::sanitize::strip_tags;
///
/// assert_eq!(strip_tags("a <b>bold</b> claim"), "a bold claim");
/// assert_eq!(strip_tags("no tags here"), "no tags here");
/// ```
pub fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;

    for ch in input.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }

    out
}

/// Cleans a free-text value for storage: strips tags, then trims
///
/// # Example
///
/// ```
/// use worklog_shared::sanitize::clean;
///
/// assert_eq!(clean("  <script>x</script> hello  "), "x hello");
/// ```
pub fn clean(input: &str) -> String {
    strip_tags(input).trim().to_string()
}

/// Cleans an optional field, mapping absent or blank input to None
///
/// Profile updates write SQL NULL for optional fields the caller did not
/// supply; this helper produces the `Option` those binds use.
pub fn clean_opt(input: Option<&str>) -> Option<String> {
    match input {
        Some(s) => {
            let cleaned = clean(s);
            if cleaned.is_empty() {
                None
            } else {
                Some(cleaned)
            }
        }
        None => None,
    }
}
