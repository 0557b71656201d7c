//! Brace-depth block locator.
//!
//! Finds `{ ... }` groups by scanning lines with a depth counter rather than
//! parsing nginx grammar, so arbitrary syntax outside the located blocks is
//! tolerated. Braces inside `#` comments and quoted strings are ignored.

use regex::Regex;

use crate::error::{CoreError, Result};

/// Inclusive, 0-based line span of one block: the opening line through the
/// line where the brace balance returns to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub start: usize,
    pub end: usize,
}

impl Block {
    /// Lines strictly between the opening and closing lines.
    pub fn inner_len(&self) -> usize {
        self.end.saturating_sub(self.start).saturating_sub(1)
    }
}

/// Find every block in `lines` whose opening line matches `start`.
pub fn find_blocks<S: AsRef<str>>(lines: &[S], start: &Regex) -> Result<Vec<Block>> {
    match lines.len() {
        0 => Ok(Vec::new()),
        n => find_blocks_in_range(lines, start, 0, n - 1),
    }
}

/// Find blocks whose opening line matches `start` within `from..=to`.
///
/// Blocks are non-overlapping: scanning resumes after each block's end, so
/// nested blocks are only found by a second scan scoped to the outer block.
/// The range is clamped to the available lines.
pub fn find_blocks_in_range<S: AsRef<str>>(
    lines: &[S],
    start: &Regex,
    from: usize,
    to: usize,
) -> Result<Vec<Block>> {
    let Some(last) = lines.len().checked_sub(1) else {
        return Ok(Vec::new());
    };
    let to = to.min(last);

    let mut blocks = Vec::new();
    let mut i = from;
    while i <= to {
        if !start.is_match(lines[i].as_ref()) {
            i += 1;
            continue;
        }

        let end = closing_line(lines, i, to)?;
        tracing::trace!(start = i + 1, end = end + 1, "located block");
        blocks.push(Block { start: i, end });
        i = end + 1;
    }

    Ok(blocks)
}

/// Line index where the block opened at `open` balances, searching no
/// further than `to`.
fn closing_line<S: AsRef<str>>(lines: &[S], open: usize, to: usize) -> Result<usize> {
    let mut depth = brace_delta(lines[open].as_ref());
    if depth <= 0 {
        // Opened and closed on the same line, e.g. `location /x { return 404; }`.
        return Ok(open);
    }
    for (j, line) in lines.iter().enumerate().take(to + 1).skip(open + 1) {
        depth += brace_delta(line.as_ref());
        if depth <= 0 {
            return Ok(j);
        }
    }
    Err(CoreError::UnclosedBlock { line: open + 1 })
}

/// Net `{` minus `}` on one line, skipping comments and quoted strings.
pub fn brace_delta(line: &str) -> i64 {
    let mut delta = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in line.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match (quote, c) {
            (_, '\\') => escaped = true,
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '#') => break,
            (None, '{') => delta += 1,
            (None, '}') => delta -= 1,
            (None, _) => {}
        }
    }
    delta
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn server() -> Regex {
        Regex::new(r"^\s*server\s*\{").unwrap()
    }

    fn location_root() -> Regex {
        Regex::new(r"^\s*location\s+/\s*\{").unwrap()
    }

    const CONF: &str = "\
# top comment { not a block
server {
    listen 80;
    location / {
        return 301 https://$host$request_uri;
    }
}

server {
    listen 443 ssl;
    location /api { proxy_pass http://api; }
    location / {
        try_files $uri =404;
    }
}";

    fn lines() -> Vec<&'static str> {
        CONF.lines().collect()
    }

    #[test]
    fn brace_delta_ignores_comments_and_quotes() {
        assert_eq!(brace_delta("server {"), 1);
        assert_eq!(brace_delta("}"), -1);
        assert_eq!(brace_delta("location / { return 200; }"), 0);
        assert_eq!(brace_delta("    # {{{"), 0);
        assert_eq!(brace_delta("server { # }"), 1);
        assert_eq!(brace_delta(r#"return 200 "{";"#), 0);
        assert_eq!(brace_delta(r#"add_header X "a#b" always; {"#), 1);
        assert_eq!(brace_delta(r"rewrite ^/\{x ;"), 0);
    }

    #[test]
    fn finds_sibling_blocks_left_to_right() {
        let blocks = find_blocks(&lines(), &server()).unwrap();
        assert_eq!(
            blocks,
            vec![Block { start: 1, end: 6 }, Block { start: 8, end: 14 }]
        );
    }

    #[test]
    fn nested_blocks_need_a_scoped_scan() {
        let lines = lines();
        // An unscoped scan still finds nested matches, one per outer region.
        let all = find_blocks(&lines, &location_root()).unwrap();
        assert_eq!(all.len(), 2);

        let outer = find_blocks(&lines, &server()).unwrap()[1];
        let scoped = find_blocks_in_range(&lines, &location_root(), outer.start, outer.end).unwrap();
        assert_eq!(scoped, vec![Block { start: 11, end: 13 }]);
    }

    #[test]
    fn single_line_block_closes_on_its_own_line() {
        let re = Regex::new(r"^\s*location\s+/api\s*\{").unwrap();
        let blocks = find_blocks(&lines(), &re).unwrap();
        assert_eq!(blocks, vec![Block { start: 10, end: 10 }]);
        assert_eq!(blocks[0].inner_len(), 0);
    }

    #[test]
    fn unclosed_block_reports_one_based_line() {
        let text = ["events {}", "", "server {", "    listen 80;"];
        let err = find_blocks(&text, &server()).unwrap_err();
        assert!(matches!(err, CoreError::UnclosedBlock { line: 3 }));
    }

    #[test]
    fn block_must_close_inside_the_range() {
        let lines = lines();
        let err = find_blocks_in_range(&lines, &server(), 8, 12).unwrap_err();
        assert!(matches!(err, CoreError::UnclosedBlock { line: 9 }));
    }

    #[test]
    fn empty_and_inverted_ranges_yield_nothing() {
        let empty: [&str; 0] = [];
        assert!(find_blocks(&empty, &server()).unwrap().is_empty());
        assert!(find_blocks_in_range(&lines(), &server(), 10, 2).unwrap().is_empty());
    }
}
