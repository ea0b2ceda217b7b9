//! Source excerpts around the line that raised an error.

use std::{fs, path::Path};

use crate::util::escape_html;

/// A single line of a source excerpt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExcerptLine {
    /// 1-based line number.
    pub number: usize,
    /// The line's text, without its line terminator.
    pub text: String,
    /// Whether this is the line that was asked for.
    pub highlighted: bool,
}

/// Reads the window of `2 * context + 1` lines centered on `line` (1-based).
///
/// Lines outside the file are skipped. A file that cannot be read yields an
/// empty excerpt; invalid UTF-8 is replaced with `U+FFFD`.
pub fn read_excerpt(file: impl AsRef<Path>, line: usize, context: usize) -> Vec<ExcerptLine> {
    let file = file.as_ref();
    let bytes = match fs::read(file) {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::trace!(file = %file.display(), %error, "source excerpt unavailable");
            return Vec::new();
        }
    };
    if line == 0 {
        return Vec::new();
    }
    let source = String::from_utf8_lossy(&bytes);

    let first = line.saturating_sub(context).max(1);
    let last = line.saturating_add(context);
    source
        .lines()
        .enumerate()
        .map(|(index, text)| (index + 1, text))
        .skip_while(|&(number, _)| number < first)
        .take_while(|&(number, _)| number <= last)
        .map(|(number, text)| ExcerptLine {
            number,
            text: text.to_string(),
            highlighted: number == line,
        })
        .collect()
}

/// Like [`read_excerpt`], but renders each line as HTML: text is escaped and
/// the requested line is wrapped in `<span class="code-highlight">`.
pub fn excerpt(file: impl AsRef<Path>, line: usize, context: usize) -> Vec<String> {
    read_excerpt(file, line, context)
        .into_iter()
        .map(|line| {
            let text = escape_html(&line.text);
            if line.highlighted {
                format!("<span class=\"code-highlight\">{text}</span>")
            } else {
                text.into_owned()
            }
        })
        .collect()
}
