//! Markdown normalisation: collapse runs of blank lines.
//!
//! Renderers emit a blank line around every block element, so deeply nested
//! markup (a `<div>` inside a `<section>` inside a `<div>`...) produces long
//! stretches of empty lines. This pass caps every run at two blank lines and
//! trims the result. It never touches non-blank lines.

/// Longest run of blank lines kept in the output.
pub const MAX_CONSECUTIVE_BLANK_LINES: usize = 2;

/// Collapse 3+ consecutive blank lines to 2 and trim the whole string.
///
/// A line is blank when it holds only whitespace. Runs of one or two blank
/// lines are kept verbatim. Idempotent: `normalize(&normalize(x)) == normalize(x)`.
pub fn normalize(markdown: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut blank_run = 0usize;

    for line in markdown.split('\n') {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > MAX_CONSECUTIVE_BLANK_LINES {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push(line);
    }

    out.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn max_blank_run(s: &str) -> usize {
        let mut max = 0;
        let mut run = 0;
        for line in s.split('\n') {
            if line.trim().is_empty() {
                run += 1;
                max = max.max(run);
            } else {
                run = 0;
            }
        }
        max
    }

    #[test]
    fn five_blank_lines_become_two() {
        let input = "First paragraph.\n\n\n\n\n\nSecond paragraph.";
        assert_eq!(normalize(input), "First paragraph.\n\n\nSecond paragraph.");
    }

    #[test]
    fn short_runs_are_kept() {
        assert_eq!(normalize("a\nb"), "a\nb");
        assert_eq!(normalize("a\n\nb"), "a\n\nb");
        assert_eq!(normalize("a\n\n\nb"), "a\n\n\nb");
    }

    #[test]
    fn whitespace_only_lines_count_as_blank() {
        let input = "a\n  \n\t\n \n   \nb";
        let out = normalize(input);
        assert_eq!(out, "a\n  \n\t\nb");
        assert_eq!(max_blank_run(&out), 2);
    }

    #[test]
    fn trims_leading_and_trailing_whitespace() {
        assert_eq!(normalize("\n\n\n  # Title\n\nBody.\n\n\n\n"), "# Title\n\nBody.");
        assert_eq!(normalize("   \n\t"), "");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn crlf_blank_lines_are_blank() {
        let out = normalize("a\r\n\r\n\r\n\r\n\r\nb");
        assert_eq!(max_blank_run(&out), 2);
        assert!(out.starts_with('a') && out.ends_with('b'));
    }

    #[test]
    fn idempotent_on_assorted_inputs() {
        let inputs = [
            "",
            "plain",
            "\n\n\n\n",
            "a\n\n\n\n\nb\n\n\n\n\n\n\nc",
            "  indented\n\n\n\n    code\n",
            "# H\n \n \n \n \n- item\n\n\n\n",
            "x\r\n\r\n\r\n\r\ny",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "not idempotent for {input:?}");
            assert!(max_blank_run(&once) <= MAX_CONSECUTIVE_BLANK_LINES);
        }
    }

    #[test]
    fn separate_runs_are_collapsed_independently() {
        let out = normalize("a\n\n\n\nb\n\n\n\n\n\nc");
        assert_eq!(out, "a\n\n\nb\n\n\nc");
    }
}
