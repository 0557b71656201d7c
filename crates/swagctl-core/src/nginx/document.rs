//! Line-level view of an nginx config file that can be reassembled with the
//! original line-ending and trailing-newline conventions.

/// A config file split into lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub lines: Vec<String>,
    trailing_newline: bool,
    crlf: bool,
}

impl Document {
    /// Split `text`, remembering whether it used CRLF and whether it ended in
    /// a newline. An empty input yields a single empty line.
    ///
    /// CRLF is stripped only when every terminated line uses it. In a file with
    /// mixed endings each line keeps its own `\r`, so untouched lines render
    /// back byte for byte.
    pub fn parse(text: &str) -> Self {
        let trailing_newline = text.ends_with('\n');
        let body = text.strip_suffix('\n').unwrap_or(text);
        let mut lines: Vec<String> = body.split('\n').map(str::to_owned).collect();

        let terminated = if trailing_newline {
            lines.len()
        } else {
            lines.len().saturating_sub(1)
        };
        let crlf = terminated > 0 && lines[..terminated].iter().all(|l| l.ends_with('\r'));
        if crlf {
            for line in &mut lines[..terminated] {
                line.pop();
            }
        }

        Self {
            lines,
            trailing_newline,
            crlf,
        }
    }

    pub fn render(&self) -> String {
        let eol = if self.crlf { "\r\n" } else { "\n" };
        let mut out = self.lines.join(eol);
        if self.trailing_newline {
            out.push_str(eol);
        }
        out
    }
}

/// Blank lines and `#` comments carry no directives.
pub fn is_comment_or_blank(line: &str) -> bool {
    let s = line.trim();
    s.is_empty() || s.starts_with('#')
}

/// Leading spaces and tabs of `line`.
pub fn leading_whitespace(line: &str) -> &str {
    let end = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    &line[..end]
}

/// Whether any non-comment line in `lines` contains `needle`.
pub fn contains_directive<S: AsRef<str>>(lines: &[S], needle: &str) -> bool {
    lines.iter().any(|line| {
        let line = line.as_ref();
        !is_comment_or_blank(line) && line.trim().contains(needle)
    })
}
