//! Rendering of raw publishing logs as a GitHub comment.
//!
//! A publishing run can produce megabytes of output, while a GitHub comment
//! body is limited to 65 536 characters. [`format_log_for_github`] keeps the
//! end of the log (where the failure is) and wraps it in a fenced code block:
//!
//! 1. keep only the tail of the input so the whole comment fits
//!    [`MAX_COMMENT_BYTES`];
//! 2. trim leading and trailing newlines;
//! 3. split into lines;
//! 4. walking back from the last line, count lines starting with `+` and drop
//!    everything before the line that brings the count to `max_lines`;
//! 5. render headings, an opening fence, the remaining lines, and a closing
//!    fence, one per line.
//!
//! `+`-prefixed lines are what `git` and shell tracing (`set -x`) print for
//! each executed step, so `max_lines` bounds the number of steps shown rather
//! than the number of output lines.
//!
//! The steps are exposed individually on [`LogBuilder`] for callers that need
//! a different composition.

/// Upper bound, in bytes, for a rendered comment.
pub const MAX_COMMENT_BYTES: usize = 65_000;

/// Prefix marking one traced step in a publishing log.
pub const STEP_MARKER: char = '+';

const CODE_FENCE: &str = "```";

// ---------------------------------------------------------------------------
// Composed routine
// ---------------------------------------------------------------------------

/// Formats `original` as a Markdown comment body.
///
/// The result is the `headings`, a code fence, the tail of the log holding at
/// most `max_lines` step lines (plus the output lines between them), and a
/// closing fence. It never exceeds [`MAX_COMMENT_BYTES`] unless the headings
/// alone do.
///
/// ```
/// use reporting::format_log_for_github;
///
/// let body = format_log_for_github("a\n+b\n+c\n+d\n", 2, ["Run failed"]);
/// assert_eq!(body, "Run failed\n```\n+c\n+d\n```");
/// ```
pub fn format_log_for_github<I, S>(original: &str, max_lines: usize, headings: I) -> String
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    LogBuilder::with_max_bytes(MAX_COMMENT_BYTES, original)
        .add_heading(headings)
        .add_heading([CODE_FENCE])
        .add_trailing([CODE_FENCE])
        .truncate()
        .trim('\n')
        .split('\n')
        .keep_last_marked(STEP_MARKER, max_lines)
        .build()
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Content {
    Text(String),
    Lines(Vec<String>),
}

/// Step-by-step log transformation.
///
/// Every step consumes the builder and returns the transformed one, so a
/// pipeline reads top to bottom in the order it runs. Text steps
/// ([`truncate`](Self::truncate), [`trim`](Self::trim)) apply before
/// [`split`](Self::split); line steps ([`keep_last_marked`](Self::keep_last_marked))
/// apply after it. A step used in the wrong stage leaves the content unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogBuilder {
    original: String,
    max_bytes: usize,
    headings: Vec<String>,
    trailing: Vec<String>,
    content: Content,
}

impl LogBuilder {
    /// Starts a pipeline over `original` whose rendered output is bounded by
    /// `max_bytes`.
    pub fn with_max_bytes(max_bytes: usize, original: impl Into<String>) -> Self {
        let original = original.into();
        Self {
            content: Content::Text(original.clone()),
            original,
            max_bytes,
            headings: Vec::new(),
            trailing: Vec::new(),
        }
    }

    /// Returns the text the builder was created with.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Appends lines rendered before the content.
    pub fn add_heading<I, S>(mut self, headings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headings.extend(headings.into_iter().map(Into::into));
        self
    }

    /// Appends lines rendered after the content.
    pub fn add_trailing<I, S>(mut self, trailing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.trailing.extend(trailing.into_iter().map(Into::into));
        self
    }

    /// Keeps the tail of the text that fits next to the headings and trailing
    /// lines added so far.
    ///
    /// The cut is moved forward to the next UTF-8 character boundary, so the
    /// kept text may be a few bytes shorter than the budget.
    pub fn truncate(mut self) -> Self {
        let budget = self.max_bytes.saturating_sub(self.frame_bytes());
        if let Content::Text(text) = &mut self.content {
            let start = tail_start(text, budget);
            if start > 0 {
                tracing::debug!(
                    original_bytes = text.len(),
                    kept_bytes = text.len() - start,
                    "Truncating log to fit comment"
                );
                text.drain(..start);
            }
        }
        self
    }

    /// Removes every leading and trailing occurrence of `pat`.
    pub fn trim(mut self, pat: char) -> Self {
        if let Content::Text(text) = &self.content {
            let trimmed = text.trim_matches(pat);
            if trimmed.len() != text.len() {
                self.content = Content::Text(trimmed.to_string());
            }
        }
        self
    }

    /// Splits the text into lines on `sep`.
    ///
    /// Empty text yields a single empty line.
    pub fn split(mut self, sep: char) -> Self {
        if let Content::Text(text) = &self.content {
            let lines = text.split(sep).map(str::to_string).collect();
            self.content = Content::Lines(lines);
        }
        self
    }

    /// Keeps the last lines of the log holding `max` lines that start with
    /// `marker`.
    ///
    /// Lines are walked from the end. Each line is kept while fewer than `max`
    /// marked lines have been seen; the marked line that reaches `max` is the
    /// first one kept and everything before it is dropped. With fewer than
    /// `max` marked lines nothing is dropped; with `max == 0` nothing is kept.
    pub fn keep_last_marked(mut self, marker: char, max: usize) -> Self {
        if let Content::Lines(lines) = &mut self.content {
            let mut seen = 0;
            let mut start = lines.len();
            for (idx, line) in lines.iter().enumerate().rev() {
                if seen >= max {
                    break;
                }
                if line.starts_with(marker) {
                    seen += 1;
                }
                start = idx;
            }
            lines.drain(..start);
        }
        self
    }

    /// Returns the content lines, or `None` before [`split`](Self::split).
    pub fn lines(&self) -> Option<&[String]> {
        match &self.content {
            Content::Lines(lines) => Some(lines.as_slice()),
            Content::Text(_) => None,
        }
    }

    /// Renders headings, content, and trailing lines joined by newlines.
    pub fn build(self) -> String {
        let content = match self.content {
            Content::Text(text) => vec![text],
            Content::Lines(lines) => lines,
        };
        self.headings
            .into_iter()
            .chain(content)
            .chain(self.trailing)
            .collect::<Vec<_>>()
            .join("\n")
    }

    // Bytes used by headings, trailing lines, and the newline after or before
    // each of them.
    fn frame_bytes(&self) -> usize {
        self.headings
            .iter()
            .chain(&self.trailing)
            .map(|line| line.len() + 1)
            .sum()
    }
}

// Byte offset where the last `budget` bytes of `text` begin, rounded up to a
// character boundary.
fn tail_start(text: &str, budget: usize) -> usize {
    if text.len() <= budget {
        return 0;
    }
    let mut start = text.len() - budget;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    start
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content_lines(body: &str) -> Vec<&str> {
        let lines: Vec<&str> = body.split('\n').collect();
        let open = lines.iter().position(|l| *l == CODE_FENCE).unwrap();
        assert_eq!(lines.last(), Some(&CODE_FENCE));
        lines[open + 1..lines.len() - 1].to_vec()
    }

    #[test]
    fn test_keeps_lines_from_nth_marker_from_the_end() {
        let body = format_log_for_github("a\n+b\n+c\n+d\n", 2, ["heading"]);
        assert_eq!(body, "heading\n```\n+c\n+d\n```");
    }

    #[test]
    fn test_keeps_interleaved_output_lines() {
        let log = "x\ny\n+one\nout1\n+two\nout2\nout3\n+three\nout4";
        let body = format_log_for_github(log, 3, ["h"]);
        assert_eq!(
            content_lines(&body),
            vec!["+one", "out1", "+two", "out2", "out3", "+three", "out4"]
        );
    }

    #[test]
    fn test_fewer_markers_than_limit_keeps_everything() {
        let log = "first\n+step\nlast";
        let body = format_log_for_github(log, 5, ["h"]);
        assert_eq!(body, "h\n```\nfirst\n+step\nlast\n```");
    }

    #[test]
    fn test_without_markers_output_is_fenced_trimmed_input() {
        let log = "\n\nline one\nline two\n\n";
        for max in [1, 2, 50, 1000] {
            let body = format_log_for_github(log, max, ["heading"]);
            assert_eq!(body, "heading\n```\nline one\nline two\n```");
        }
    }

    #[test]
    fn test_zero_limit_keeps_no_lines() {
        let body = format_log_for_github("+a\nb", 0, ["h"]);
        assert_eq!(body, "h\n```\n```");
    }

    #[test]
    fn test_empty_input_renders_empty_block() {
        let body = format_log_for_github("", 50, ["h"]);
        assert_eq!(body, "h\n```\n\n```");
    }

    #[test]
    fn test_multiple_headings_in_order() {
        let body = format_log_for_github("log", 1, ["first", "second\n\nthird"]);
        assert_eq!(body, "first\nsecond\n\nthird\n```\nlog\n```");
    }

    #[test]
    fn test_trim_only_removes_newlines() {
        let builder = LogBuilder::with_max_bytes(100, "\n  indented \n\n").trim('\n');
        assert_eq!(builder.build(), "  indented ");
    }

    #[test]
    fn test_trim_is_idempotent() {
        let once = LogBuilder::with_max_bytes(100, "\n\na\n\nb\n").trim('\n');
        let twice = once.clone().trim('\n');
        assert_eq!(once, twice);
    }

    #[test]
    fn test_oversized_log_keeps_only_the_tail() {
        let mut log = String::from("+HEAD-MARKER\n");
        while log.len() < MAX_COMMENT_BYTES * 2 {
            log.push_str("filler output line\n");
        }
        log.push_str("final line");

        let body = format_log_for_github(&log, 1_000_000, ["heading"]);

        assert!(body.len() <= MAX_COMMENT_BYTES);
        assert!(!body.contains("HEAD-MARKER"));
        let tail = &log[log.len() - MAX_COMMENT_BYTES..];
        for line in content_lines(&body) {
            assert!(tail.contains(line));
        }
        assert!(body.ends_with("final line\n```"));
    }

    #[test]
    fn test_log_at_budget_is_not_truncated() {
        let builder = LogBuilder::with_max_bytes(10, "0123456789").truncate();
        assert_eq!(builder.build(), "0123456789");
    }

    #[test]
    fn test_truncate_accounts_for_frame() {
        let builder = LogBuilder::with_max_bytes(10, "0123456789")
            .add_heading(["ab"])
            .truncate();
        // "ab\n" takes 3 bytes of the 10.
        assert_eq!(builder.build(), "ab\n3456789");
    }

    #[test]
    fn test_heading_longer_than_budget_drops_log_and_keeps_heading() {
        let heading = "h".repeat(20);
        let body = LogBuilder::with_max_bytes(10, "+step\noutput")
            .add_heading([heading.clone()])
            .add_heading([CODE_FENCE])
            .add_trailing([CODE_FENCE])
            .truncate()
            .trim('\n')
            .split('\n')
            .keep_last_marked(STEP_MARKER, 50)
            .build();

        assert_eq!(body, format!("{heading}\n```\n\n```"));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        // Each 'é' is two bytes; a 5 byte budget cannot start mid-character.
        let builder = LogBuilder::with_max_bytes(5, "ééééé").truncate();
        assert_eq!(builder.build(), "éé");
    }

    #[test]
    fn test_split_then_text_steps_are_ignored() {
        let builder = LogBuilder::with_max_bytes(3, "\nabcdef\n")
            .split('\n')
            .trim('\n')
            .truncate();
        let expected = vec![String::new(), "abcdef".to_string(), String::new()];
        assert_eq!(builder.lines(), Some(expected.as_slice()));
    }

    #[test]
    fn test_lines_none_before_split() {
        let builder = LogBuilder::with_max_bytes(100, "a\nb");
        assert!(builder.lines().is_none());
        assert_eq!(builder.original(), "a\nb");
    }
}
