//! Literal value predicates.

/// Decimal digits with an optional leading minus.
pub fn is_int_literal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// Number with a decimal point, an `f`/`F` suffix, or both.
pub fn is_float_literal(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    let (body, suffixed) = match s.strip_suffix(|c: char| c == 'f' || c == 'F') {
        Some(body) => (body, true),
        None => (s, false),
    };

    let mut parts = body.splitn(2, '.');
    let whole = parts.next().unwrap_or_default();
    let fraction = parts.next();

    let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    let has_digits = !whole.is_empty() || fraction.map_or(false, |f| !f.is_empty());

    has_digits && digits(whole) && fraction.map_or(true, digits) && (suffixed || fraction.is_some())
}
