use once_cell::sync::Lazy;
use regex::Regex;

/// Inserted where a highlighted segment starts.
pub const MARK: &str = "\x1b[32m";
/// Inserted where a highlighted segment ends.
pub const RESET: &str = "\x1b[0m";

const OPEN_MARKER: &str = "<mark";
const CLOSE_MARKER: &str = "</mark>";

static OPEN_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<mark(?:\s[^>]*)?>").unwrap());
static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Extract the highlighted lines of a snippet as display lines.
///
/// Lines without an opening `<mark` are dropped. In the rest, highlight tags
/// become [`MARK`]/[`RESET`] sentinels, every other tag is stripped, and a
/// [`RESET`] is placed in front of each [`MARK`]. With `monochrome` set the
/// sentinels are removed again, leaving plain text.
pub fn highlighted_lines(snippet: &str, monochrome: bool) -> Vec<String> {
    snippet
        .split('\n')
        .filter(|line| line.contains(OPEN_MARKER))
        .map(|line| {
            let line = process_line(line);
            if monochrome {
                line.replace(MARK, "").replace(RESET, "")
            } else {
                line
            }
        })
        .collect()
}

fn process_line(line: &str) -> String {
    let line = OPEN_TAG.replace_all(line, MARK);
    let line = line.replace(CLOSE_MARKER, RESET);
    let line = ANY_TAG.replace_all(&line, "");
    line.replace(MARK, &format!("{RESET}{MARK}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_mark_is_wrapped_in_sentinels() {
        let lines = highlighted_lines("foo <mark>bar</mark> baz", false);

        assert_eq!(lines, vec![format!("foo {RESET}{MARK}bar{RESET} baz")]);
        assert!(lines[0].contains(&format!("{MARK}bar{RESET}")));
        assert!(!lines[0].contains("<mark>"));
        assert!(!lines[0].contains("</mark>"));
    }

    #[test]
    fn lines_without_marker_are_skipped() {
        assert!(highlighted_lines("plain line\n<span>also plain</span>", false).is_empty());
        assert!(highlighted_lines("", false).is_empty());
    }

    #[test]
    fn only_marked_lines_are_kept() {
        let lines = highlighted_lines("a\n<mark>b</mark>", false);

        assert_eq!(lines, vec![format!("{RESET}{MARK}b{RESET}")]);
    }

    #[test]
    fn other_markup_is_stripped() {
        let snippet = r#"<td class="line"><span class="k">let</span> <mark>x</mark> = <b>1</b>;</td>"#;
        let lines = highlighted_lines(snippet, false);

        assert_eq!(lines, vec![format!("let {RESET}{MARK}x{RESET} = 1;")]);
    }

    #[test]
    fn each_segment_gets_its_own_reset() {
        let lines = highlighted_lines("<mark>a</mark>-<mark>b</mark>", false);

        assert_eq!(
            lines,
            vec![format!("{RESET}{MARK}a{RESET}-{RESET}{MARK}b{RESET}")]
        );
    }

    #[test]
    fn mark_with_attributes_is_recognised() {
        let lines = highlighted_lines(r#"x <mark class="hl">y</mark>"#, false);

        assert_eq!(lines, vec![format!("x {RESET}{MARK}y{RESET}")]);
    }

    #[test]
    fn monochrome_drops_sentinels() {
        let lines = highlighted_lines("foo <mark>bar</mark> baz\nnope", true);

        assert_eq!(lines, vec!["foo bar baz".to_string()]);
    }

    #[test]
    fn carriage_returns_survive_split() {
        let lines = highlighted_lines("<mark>a</mark>\r\n<mark>b</mark>", true);

        assert_eq!(lines, vec!["a\r".to_string(), "b".to_string()]);
    }
}
