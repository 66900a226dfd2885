//! Balanced delimiter scanning.
//!
//! Shared by the structural scanner, which works on source bytes,
//! and the expression parser, which works on tokens.

/// Role of an item in a nesting structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delim {
    Open,
    Close,
    Other,
}

/// Location of the first delimiter without a partner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Imbalance {
    /// Closer without an opener before it.
    UnmatchedClose(usize),
    /// Opener never closed.
    Unclosed(usize),
}

impl Imbalance {
    pub fn position(&self) -> usize {
        match *self {
            Self::UnmatchedClose(index) | Self::Unclosed(index) => index,
        }
    }
}

/// Classify a byte as parenthesis.
#[inline]
pub fn parens(b: &u8) -> Delim {
    match b {
        b'(' => Delim::Open,
        b')' => Delim::Close,
        _ => Delim::Other,
    }
}

/// Classify a byte as curly brace.
#[inline]
pub fn braces(b: &u8) -> Delim {
    match b {
        b'{' => Delim::Open,
        b'}' => Delim::Close,
        _ => Delim::Other,
    }
}

/// Check that every opener has a matching closer.
pub fn check<T>(items: &[T], classify: impl Fn(&T) -> Delim) -> Result<(), Imbalance> {
    let mut open = Vec::new();

    for (index, item) in items.iter().enumerate() {
        match classify(item) {
            Delim::Open => open.push(index),
            Delim::Close => {
                if open.pop().is_none() {
                    return Err(Imbalance::UnmatchedClose(index));
                }
            }
            Delim::Other => {}
        }
    }

    match open.first() {
        Some(&index) => Err(Imbalance::Unclosed(index)),
        None => Ok(()),
    }
}

/// Index of the closer matching the opener at `open`.
pub fn find_pair<T>(items: &[T], open: usize, classify: impl Fn(&T) -> Delim) -> Option<usize> {
    if classify(items.get(open)?) != Delim::Open {
        return None;
    }

    find_close(&items[open + 1..], classify).map(|index| open + 1 + index)
}

/// Index of the closer that ends a group whose opener was just before `items`.
pub fn find_close<T>(items: &[T], classify: impl Fn(&T) -> Delim) -> Option<usize> {
    let mut depth = 1_usize;

    for (index, item) in items.iter().enumerate() {
        match classify(item) {
            Delim::Open => depth += 1,
            Delim::Close => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            Delim::Other => {}
        }
    }

    None
}

/// Whether the first and last items are a matched pair enclosing everything else.
///
/// `(a) + (b)` starts and ends with delimiters but is not wrapped.
pub fn is_wrapped<T>(items: &[T], classify: impl Fn(&T) -> Delim) -> bool {
    items.len() >= 2 && find_pair(items, 0, classify) == Some(items.len() - 1)
}

/// Iterate items with the nesting depth each one sits at.
///
/// Delimiters report the depth of the group that contains them,
/// so an opener and its closer share the same depth.
pub fn depths<'a, T, F>(items: &'a [T], classify: F) -> impl Iterator<Item = (usize, usize, &'a T)> + 'a
where
    F: Fn(&T) -> Delim + 'a,
{
    let mut depth = 0_usize;

    items.iter().enumerate().map(move |(index, item)| match classify(item) {
        Delim::Open => {
            depth += 1;
            (index, depth - 1, item)
        }
        Delim::Close => {
            depth = depth.saturating_sub(1);
            (index, depth, item)
        }
        Delim::Other => (index, depth, item),
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_check() {
        assert_eq!(check(b"(a(b)c)", parens), Ok(()));
        assert_eq!(check(b"", parens), Ok(()));
        assert_eq!(check(b"(a))", parens), Err(Imbalance::UnmatchedClose(3)));
        assert_eq!(check(b")(", parens), Err(Imbalance::UnmatchedClose(0)));
        assert_eq!(check(b"x((a)", parens), Err(Imbalance::Unclosed(1)));
        // Braces and parentheses are independent.
        assert_eq!(check(b"{(})", braces), Ok(()));
    }

    #[test]
    fn test_find_pair() {
        let text = b"f { a { b } c } d";
        assert_eq!(find_pair(text, 2, braces), Some(14));
        assert_eq!(find_pair(text, 6, braces), Some(10));
        assert_eq!(find_pair(text, 0, braces), None);
        assert_eq!(find_pair(b"{ {", 0, braces), None);
        assert_eq!(find_pair(text, 100, braces), None);
    }

    #[test]
    fn test_is_wrapped() {
        assert!(is_wrapped(b"(x + 5)", parens));
        assert!(is_wrapped(b"((x))", parens));
        assert!(!is_wrapped(b"(x + 5) / (y * 3)", parens));
        assert!(!is_wrapped(b"x", parens));
        assert!(!is_wrapped(b"(", parens));
    }

    #[test]
    fn test_depths() {
        let depths: Vec<usize> = depths(b"a(b(c))d", parens).map(|(_, d, _)| d).collect();
        assert_eq!(depths, vec![0, 0, 1, 1, 2, 1, 0, 0]);
    }
}
