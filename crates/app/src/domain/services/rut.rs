//! Chilean tax id (RUT) formatting.

/// Canonical `12.345.678-9` form of a RUT typed in any layout.
///
/// Everything except digits and `K` is dropped, as are leading zeros. A
/// single remaining character is returned as is. `None` when nothing is left.
#[must_use]
pub fn format_rut(value: &str) -> Option<String> {
    let cleaned: Vec<char> = value
        .chars()
        .filter(|c| c.is_ascii_digit() || c.eq_ignore_ascii_case(&'k'))
        .map(|c| c.to_ascii_uppercase())
        .skip_while(|c| *c == '0')
        .collect();

    let (check_digit, body) = cleaned.split_last()?;

    if body.is_empty() {
        return Some(check_digit.to_string());
    }

    let mut formatted = String::with_capacity(cleaned.len() + cleaned.len() / 3 + 1);

    for (i, c) in body.iter().enumerate() {
        if i > 0 && (body.len() - i) % 3 == 0 {
            formatted.push('.');
        }

        formatted.push(*c);
    }

    formatted.push('-');
    formatted.push(*check_digit);

    Some(formatted)
}
