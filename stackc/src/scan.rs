//! Delimiter scanning over raw source text.
//!
//! These are the string primitives the function extractor is built on:
//! find the first occurrence of a needle, or the span between a pair of
//! delimiters. All searches are ordinal and case-sensitive, with no
//! escaping awareness. Absence is reported as `None`, never as an empty
//! match.
use crate::tokens::Span;

/// A search pattern; either a single character or a substring.
pub trait Needle {
    /// Find the first occurrence at or after `origin`, returning its span.
    fn find_in(&self, haystack: &str, origin: usize) -> Option<Span>;
}

impl Needle for char {
    fn find_in(&self, haystack: &str, origin: usize) -> Option<Span> {
        let tail = haystack.get(origin..)?;
        tail.find(*self)
            .map(|index| Span::new((origin + index) as u32, self.len_utf8() as u32))
    }
}

impl Needle for &str {
    fn find_in(&self, haystack: &str, origin: usize) -> Option<Span> {
        let tail = haystack.get(origin..)?;
        tail.find(*self)
            .map(|index| Span::new((origin + index) as u32, self.len() as u32))
    }
}

/// Successful result of a between-delimiters scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanMatch {
    /// Span of the text strictly between the delimiters.
    pub inner: Span,
    /// Span of the whole match, both delimiters inclusive.
    pub outer: Span,
}

impl ScanMatch {
    /// Slice the inner text out of the scanned source.
    #[inline]
    pub fn fragment<'a>(&self, source: &'a str) -> &'a str {
        self.inner.fragment(source)
    }

    /// Total length of the matched span, delimiters inclusive.
    #[inline]
    pub fn len(&self) -> usize {
        self.outer.size as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.outer.size == 0
    }

    /// Ending index of the whole match, exclusive.
    #[inline]
    pub fn end(&self) -> u32 {
        self.outer.end()
    }
}

/// Find the first occurrence of `needle` at or after `origin`.
pub fn find<N: Needle>(source: &str, needle: N, origin: usize) -> Option<Span> {
    needle.find_in(source, origin)
}

/// Return the span strictly between the first `start`/`end` delimiter
/// pair found at or after `origin`.
///
/// The first `end` after `start` terminates the match; nested delimiter
/// pairs are not recognized. Use [`enclosed`] where nesting matters.
pub fn between<S, E>(source: &str, start: S, end: E, origin: usize) -> Option<ScanMatch>
where
    S: Needle,
    E: Needle,
{
    let open = start.find_in(source, origin)?;
    let close = end.find_in(source, open.end() as usize)?;

    Some(ScanMatch {
        inner: Span::new(open.end(), close.index - open.end()),
        outer: Span::new(open.index, close.end() - open.index),
    })
}

/// Return the span between the first `open` character at or after
/// `origin` and its matching `close`, counting nesting depth.
///
/// Delimiters inside string literals are not skipped; a stray `close`
/// in quoted text will terminate the match early.
pub fn enclosed(source: &str, open: char, close: char, origin: usize) -> Option<ScanMatch> {
    let first = open.find_in(source, origin)?;

    let mut depth = 1usize;
    let tail = source.get(first.end() as usize..)?;
    for (index, c) in tail.char_indices() {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                let close_index = first.end() + index as u32;
                return Some(ScanMatch {
                    inner: Span::new(first.end(), close_index - first.end()),
                    outer: Span::new(
                        first.index,
                        close_index + close.len_utf8() as u32 - first.index,
                    ),
                });
            }
        }
    }

    None
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_between_simple() {
        let found = between("a{bc}d", '{', '}', 0).unwrap();
        assert_eq!(found.fragment("a{bc}d"), "bc");
        assert_eq!(found.outer.index, 1);
        assert_eq!(found.len(), 4);
    }

    #[test]
    fn test_between_not_found_is_sentinel() {
        // End delimiter before any start delimiter is absence, not an
        // empty match.
        assert!(between("}abc{", '{', '}', 0).is_none());
        assert!(between("abc", '{', '}', 0).is_none());
        assert!(between("a{bc", '{', '}', 0).is_none());
    }

    #[test]
    fn test_between_origin_offset() {
        let source = "(a)(b)";
        let found = between(source, '(', ')', 3).unwrap();
        assert_eq!(found.fragment(source), "b");
    }

    #[test]
    fn test_between_str_needles() {
        let source = "function add(x) returns qword";
        let found = between(source, "function", '(', 0).unwrap();
        assert_eq!(found.fragment(source), " add");
    }

    #[test]
    fn test_between_empty_span_is_found() {
        let found = between("x{}y", '{', '}', 0).unwrap();
        assert_eq!(found.fragment("x{}y"), "");
        assert!(!found.is_empty()); // delimiters themselves were matched
    }

    #[test]
    fn test_find_absent() {
        assert!(find("abc", "returns", 0).is_none());
        assert!(find("returns", "returns", 1).is_none());
    }

    #[test]
    fn test_enclosed_nesting() {
        let source = "{ if (x == 1) { y = 2; } }";
        let found = enclosed(source, '{', '}', 0).unwrap();
        assert_eq!(found.fragment(source), " if (x == 1) { y = 2; } ");
    }

    #[test]
    fn test_enclosed_unbalanced() {
        assert!(enclosed("{ { }", '{', '}', 0).is_none());
    }
}
