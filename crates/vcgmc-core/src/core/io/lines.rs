use std::io::{self, BufRead};

const COMMENT_CHAR: char = '#';

/// Strips a trailing `#` comment and surrounding whitespace.
pub fn strip_comment(line: &str) -> &str {
    match line.find(COMMENT_CHAR) {
        Some(pos) => line[..pos].trim(),
        None => line.trim(),
    }
}

/// Iterates over the meaningful lines of a text source, skipping blank and
/// comment-only lines. Yields `(line_number, content)` with 1-based numbers
/// counted over the raw input.
pub struct ContentLines<R> {
    inner: io::Lines<R>,
    line_number: usize,
}

impl<R: BufRead> ContentLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            inner: reader.lines(),
            line_number: 0,
        }
    }

    /// Line number of the last line pulled from the source.
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

impl<R: BufRead> Iterator for ContentLines<R> {
    type Item = io::Result<(usize, String)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.inner.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e)),
            };
            self.line_number += 1;
            let content = strip_comment(&line);
            if !content.is_empty() {
                return Some(Ok((self.line_number, content.to_string())));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn strip_comment_removes_trailing_comment_and_whitespace() {
        assert_eq!(strip_comment("  10.0 20.0   # box size"), "10.0 20.0");
        assert_eq!(strip_comment("# only a comment"), "");
        assert_eq!(strip_comment("plain"), "plain");
    }

    #[test]
    fn content_lines_skips_blank_and_comment_lines_keeping_numbers() {
        let text = "# header\n\n1 2\n   \n  # indented comment\n3 4 # trailing\n";
        let lines: Vec<_> = ContentLines::new(Cursor::new(text))
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(
            lines,
            vec![(3, "1 2".to_string()), (6, "3 4".to_string())]
        );
    }
}
