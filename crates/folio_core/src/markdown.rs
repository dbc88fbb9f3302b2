//! Markdown document engine.
//!
//! Pure text transformations over a markdown file: separating the frontmatter
//! block from the body, and reading or updating the two pieces of body
//! structure the content layer cares about, the H1 title and the description
//! line that follows it.
//!
//! This is deliberately not a CommonMark parser. A frontmatter block is opened
//! by a first line of three or more dashes and closed by the same exact line;
//! the title is the first `# ` heading of the body; the description is the
//! first non-blank line after the title, unless that line is itself a heading.

use std::sync::LazyLock;

use regex::Regex;

/// The delimiter written when a document did not come with its own.
pub const DEFAULT_DELIMITER: &str = "---";

static DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-{3,}$").expect("delimiter pattern is valid"));

static TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#\s+(.+)$").expect("title pattern is valid"));

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,6}(\s|$)").expect("heading pattern is valid"));

/// Location of a frontmatter block inside a document.
struct Split<'a> {
    delimiter: &'a str,
    front_matter: &'a str,
    body: &'a str,
}

fn strip_cr(line: &str) -> &str {
    line.strip_suffix('\r').unwrap_or(line)
}

fn split(text: &str) -> Option<Split<'_>> {
    let first_end = text.find('\n')?;
    let delimiter = strip_cr(&text[..first_end]);
    if !DELIMITER.is_match(delimiter) {
        return None;
    }

    let content_start = first_end + 1;
    let mut offset = content_start;
    for line in text[content_start..].split_inclusive('\n') {
        let bare = strip_cr(line.strip_suffix('\n').unwrap_or(line));
        if bare == delimiter {
            return Some(Split {
                delimiter,
                front_matter: &text[content_start..offset],
                body: &text[offset + line.len()..],
            });
        }
        offset += line.len();
    }

    // Opened but never closed: not a frontmatter block
    None
}

/// Returns the raw frontmatter text between the delimiter lines, if any.
pub fn extract_front_matter(text: &str) -> Option<&str> {
    split(text).map(|s| s.front_matter)
}

/// Returns the delimiter line used to open the frontmatter block, if any.
pub fn extract_delimiter(text: &str) -> Option<&str> {
    split(text).map(|s| s.delimiter)
}

/// Returns the body: everything after the frontmatter block with leading blank
/// lines removed, or the whole text when there is no frontmatter.
pub fn extract_body(text: &str) -> &str {
    match split(text) {
        Some(s) => s.body.trim_start_matches(['\n', '\r']),
        None => text,
    }
}

/// Regenerate full text from a raw frontmatter block, its delimiter and a body.
///
/// The body is separated from the closing delimiter by one blank line. An empty
/// block is not written at all.
pub fn join(front_matter: &str, delimiter: &str, body: &str) -> String {
    if front_matter.trim().is_empty() {
        return body.to_string();
    }

    let mut out = String::with_capacity(front_matter.len() + body.len() + 2 * delimiter.len() + 4);
    out.push_str(delimiter);
    out.push('\n');
    out.push_str(front_matter);
    if !front_matter.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(delimiter);
    out.push('\n');
    if !body.is_empty() {
        out.push('\n');
        out.push_str(body);
    }
    out
}

fn title_line(lines: &[&str]) -> Option<(usize, String)> {
    lines.iter().enumerate().find_map(|(i, line)| {
        TITLE
            .captures(strip_cr(line))
            .map(|caps| (i, caps[1].trim().to_string()))
    })
}

fn next_content_line(lines: &[&str], after: usize) -> Option<usize> {
    (after + 1..lines.len()).find(|&i| !lines[i].trim().is_empty())
}

fn is_heading(line: &str) -> bool {
    HEADING.is_match(strip_cr(line))
}

/// Titles and descriptions occupy exactly one line: line breaks and the
/// whitespace around them collapse to a single space.
fn single_line(text: &str) -> String {
    text.split(['\r', '\n'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A description that would read as a heading is written with its `#` escaped.
fn escape_heading(description: String) -> String {
    if is_heading(&description) {
        format!("\\{}", description)
    } else {
        description
    }
}

/// `"\r"` for bodies written with CRLF line endings.
fn carriage_return(body: &str) -> &'static str {
    if body.contains("\r\n") { "\r" } else { "" }
}

/// `line` with the carriage return of the line it replaces.
fn replacing(line: &str, original: &str) -> String {
    if original.ends_with('\r') {
        format!("{}\r", line)
    } else {
        line.to_string()
    }
}

/// The text of the first H1 heading in `body`.
pub fn extract_title(body: &str) -> Option<String> {
    let lines: Vec<&str> = body.split('\n').collect();
    title_line(&lines)
        .map(|(_, title)| title)
        .filter(|t| !t.is_empty())
}

/// The description line following the title. A body without a title has no description.
pub fn extract_description(body: &str) -> Option<String> {
    let lines: Vec<&str> = body.split('\n').collect();
    let (title_idx, _) = title_line(&lines)?;
    let idx = next_content_line(&lines, title_idx)?;
    if is_heading(lines[idx]) {
        return None;
    }
    let line = lines[idx].trim();
    let unescaped = line
        .strip_prefix('\\')
        .filter(|rest| rest.starts_with('#'))
        .unwrap_or(line);
    Some(unescaped.to_string())
}

/// Set the H1 title of `body`, synthesizing one at the top if it has none.
///
/// Line breaks in `title` become spaces. A blank title leaves the body unchanged.
pub fn update_title(body: &str, title: &str) -> String {
    let title = single_line(title);
    if title.is_empty() {
        log::debug!("Ignoring a blank title");
        return body.to_string();
    }
    let heading = format!("# {}", title);
    let lines: Vec<&str> = body.split('\n').collect();
    let cr = carriage_return(body);

    match title_line(&lines) {
        Some((idx, _)) => {
            let replaced = replacing(&heading, lines[idx]);
            let mut out = lines.clone();
            out[idx] = &replaced;
            out.join("\n")
        }
        None if body.trim().is_empty() => format!("{}{}\n", heading, cr),
        None => format!("{}{cr}\n{cr}\n{}", heading, body),
    }
}

/// Set the description line of `body`, inserting it right after the title if
/// there is none. A body without a title is returned unchanged.
///
/// Line breaks in `description` become spaces. A blank description leaves the
/// body unchanged.
pub fn update_description(body: &str, description: &str) -> String {
    let lines: Vec<&str> = body.split('\n').collect();
    let Some((title_idx, _)) = title_line(&lines) else {
        log::debug!("Cannot set a description on a body without a title");
        return body.to_string();
    };
    let description = escape_heading(single_line(description));
    if description.is_empty() {
        log::debug!("Ignoring a blank description");
        return body.to_string();
    }

    let cr = carriage_return(body);
    let inserted = format!("{}{}", description, cr);
    let next = next_content_line(&lines, title_idx);
    let replaced;
    let mut out: Vec<&str> = Vec::with_capacity(lines.len() + 3);
    match next {
        Some(idx) if !is_heading(lines[idx]) => {
            replaced = replacing(&description, lines[idx]);
            out.extend_from_slice(&lines[..idx]);
            out.push(&replaced);
            out.extend_from_slice(&lines[idx + 1..]);
        }
        Some(idx) => {
            out.extend_from_slice(&lines[..=title_idx]);
            out.extend_from_slice(&[cr, inserted.as_str(), cr]);
            out.extend_from_slice(&lines[idx..]);
        }
        None => {
            out.extend_from_slice(&lines[..=title_idx]);
            out.extend_from_slice(&[cr, inserted.as_str(), ""]);
        }
    }
    out.join("\n")
}

/// Build a body from a title, a description and the remaining content.
///
/// Empty descriptions and bodies are omitted, so `compose("Guide", "", "")`
/// is just `"# Guide\n"`. Line breaks in the title and description become spaces.
pub fn compose(title: &str, description: &str, body: &str) -> String {
    let mut out = format!("# {}\n", single_line(title));

    let description = escape_heading(single_line(description));
    if !description.is_empty() {
        out.push('\n');
        out.push_str(&description);
        out.push('\n');
    }

    let body = body.trim_start_matches(['\n', '\r']);
    if !body.trim().is_empty() {
        out.push('\n');
        out.push_str(body);
        if !body.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_front_matter_standard_delimiter() {
        let text = "---\ntitle: Test\n---\n\nBody content";
        assert_eq!(extract_front_matter(text), Some("title: Test\n"));
        assert_eq!(extract_body(text), "Body content");
    }

    #[test]
    fn test_front_matter_long_delimiter() {
        let text = "-----\na: 1\n---\nb: 2\n-----\n# Title\n";
        assert_eq!(extract_front_matter(text), Some("a: 1\n---\nb: 2\n"));
        assert_eq!(extract_delimiter(text), Some("-----"));
        assert_eq!(extract_body(text), "# Title\n");
    }

    #[test]
    fn test_front_matter_crlf() {
        let text = "---\r\nicon: x\r\n---\r\n\r\nHello";
        assert_eq!(extract_front_matter(text), Some("icon: x\r\n"));
        assert_eq!(extract_body(text), "Hello");
    }

    #[test]
    fn test_no_front_matter() {
        let text = "# Title\n---\nnot front matter\n---\n";
        assert_eq!(extract_front_matter(text), None);
        assert_eq!(extract_body(text), text);
    }

    #[test]
    fn test_unclosed_front_matter_is_body() {
        let text = "---\ntitle: Test\n# Heading\n";
        assert_eq!(extract_front_matter(text), None);
        assert_eq!(extract_body(text), text);
    }

    #[test]
    fn test_two_dashes_is_not_a_delimiter() {
        assert_eq!(extract_front_matter("--\na: 1\n--\n"), None);
    }

    #[test]
    fn test_join_then_split() {
        let text = join("a: 1", "-----", "# Title\n");
        assert_eq!(text, "-----\na: 1\n-----\n\n# Title\n");
        assert_eq!(extract_front_matter(&text), Some("a: 1\n"));
        assert_eq!(extract_delimiter(&text), Some("-----"));
        assert_eq!(extract_body(&text), "# Title\n");
    }

    #[test]
    fn test_join_without_front_matter_is_body() {
        assert_eq!(join("", DEFAULT_DELIMITER, "# T\n"), "# T\n");
        assert_eq!(join("a: 1\n", DEFAULT_DELIMITER, ""), "---\na: 1\n---\n");
    }

    #[test]
    fn test_extract_title_and_description() {
        let body = "Intro line\n\n# Getting Started\n\n\nFirst steps.\n\nMore text.";
        assert_eq!(extract_title(body), Some("Getting Started".to_string()));
        assert_eq!(extract_description(body), Some("First steps.".to_string()));
    }

    #[test]
    fn test_subheading_is_not_a_title() {
        assert_eq!(extract_title("## Section\ntext"), None);
        assert_eq!(extract_title("#NoSpace"), None);
    }

    #[test]
    fn test_no_title_means_no_description() {
        assert_eq!(extract_description("Just a paragraph.\n"), None);
    }

    #[test]
    fn test_heading_after_title_means_no_description() {
        let body = "# Title\n\n## Section\n\nParagraph.";
        assert_eq!(extract_description(body), None);
    }

    #[test]
    fn test_update_title_replaces_in_place() {
        let body = "# Old\n\nDescription\n";
        assert_eq!(update_title(body, "New"), "# New\n\nDescription\n");
    }

    #[test]
    fn test_update_title_synthesizes_when_missing() {
        assert_eq!(update_title("Some text\n", "Added"), "# Added\n\nSome text\n");
        assert_eq!(update_title("", "Added"), "# Added\n");
    }

    #[test]
    fn test_update_title_is_idempotent() {
        for body in ["", "text", "# T\n\nd", "## Sub\n\nbody\n"] {
            let once = update_title(body, "X");
            assert_eq!(update_title(&once, "X"), once);
        }
    }

    #[test]
    fn test_update_description_replaces_existing() {
        let body = "# Title\n\nOld description\n\nRest\n";
        assert_eq!(
            update_description(body, "New description"),
            "# Title\n\nNew description\n\nRest\n"
        );
    }

    #[test]
    fn test_update_description_inserts_before_heading() {
        let body = "# Title\n\n## Section\nText\n";
        let updated = update_description(body, "Summary");
        assert_eq!(updated, "# Title\n\nSummary\n\n## Section\nText\n");
        assert_eq!(extract_description(&updated), Some("Summary".to_string()));
    }

    #[test]
    fn test_update_description_inserts_after_bare_title() {
        assert_eq!(update_description("# Title", "Summary"), "# Title\n\nSummary\n");
        assert_eq!(update_description("# Title\n", "Summary"), "# Title\n\nSummary\n");
    }

    #[test]
    fn test_update_description_without_title_is_noop() {
        assert_eq!(update_description("plain\n", "Summary"), "plain\n");
    }

    #[test]
    fn test_compose_round_trip() {
        let body = compose("Guide", "How to use it", "## Install\n\nRun it.");
        assert_eq!(body, "# Guide\n\nHow to use it\n\n## Install\n\nRun it.\n");
        assert_eq!(extract_title(&body), Some("Guide".to_string()));
        assert_eq!(extract_description(&body), Some("How to use it".to_string()));
    }

    #[test]
    fn test_compose_omits_empty_parts() {
        assert_eq!(compose("Docs", "", ""), "# Docs\n");
    }

    /// Titles and descriptions as given, and the single line they are stored as.
    const ONE_LINERS: &[(&str, &str)] = &[
        ("Plain", "Plain"),
        ("A\nB", "A B"),
        ("A\r\nB", "A B"),
        ("A\rB", "A B"),
        ("  A \n\n  B  ", "A B"),
        ("\nA\n", "A"),
        ("# Looks like a title", "# Looks like a title"),
    ];

    const BODIES: &[&str] = &[
        "",
        "text",
        "text\r\n",
        "# T\n\nd\n",
        "# T\r\n\r\nd\r\n",
        "## Sub\n\nbody\n",
        "# T\n\n## Sub\nbody\n",
        "# T\r\n\r\n## Sub\r\nbody\r\n",
        "intro\n\n# Late title\n\nd\n",
    ];

    #[test]
    fn test_single_line_collapses_line_breaks() {
        for (text, expected) in ONE_LINERS {
            assert_eq!(single_line(text), *expected, "{:?}", text);
        }
    }

    #[test]
    fn test_compose_keeps_title_and_description_on_one_line() {
        assert_eq!(compose("A\nB", "d", "body"), "# A B\n\nd\n\nbody\n");

        for body in ["", "## Install\n\nRun it.", "## A\r\nB\r\n"] {
            for (title, expected_title) in ONE_LINERS {
                for (description, expected_description) in ONE_LINERS {
                    let composed = compose(title, description, body);
                    assert_eq!(
                        extract_title(&composed).as_deref(),
                        Some(*expected_title),
                        "{:?}",
                        composed
                    );
                    assert_eq!(
                        extract_description(&composed).as_deref(),
                        Some(*expected_description),
                        "{:?}",
                        composed
                    );
                }
            }
        }
    }

    #[test]
    fn test_update_title_with_line_breaks_is_idempotent() {
        let once = update_title("# T\n", "X\nY");
        assert_eq!(once, "# X Y\n");
        assert_eq!(update_title(&once, "X\nY"), once);

        for body in BODIES {
            for (title, expected) in ONE_LINERS {
                let once = update_title(body, title);
                assert_eq!(extract_title(&once).as_deref(), Some(*expected), "{:?}", once);
                assert_eq!(update_title(&once, title), once, "{:?} in {:?}", title, body);
            }
        }
    }

    #[test]
    fn test_update_description_with_line_breaks_is_idempotent() {
        for body in BODIES {
            for (description, expected) in ONE_LINERS {
                let once = update_description(body, description);
                if extract_title(body).is_none() {
                    assert_eq!(once, *body);
                    continue;
                }
                assert_eq!(
                    extract_description(&once).as_deref(),
                    Some(*expected),
                    "{:?}",
                    once
                );
                assert_eq!(
                    update_description(&once, description),
                    once,
                    "{:?} in {:?}",
                    description,
                    body
                );
            }
        }
    }

    #[test]
    fn test_crlf_bodies_keep_their_line_endings() {
        assert_eq!(
            update_title("# Old\r\n\r\nText\r\n", "New"),
            "# New\r\n\r\nText\r\n"
        );
        assert_eq!(update_title("Text\r\n", "New"), "# New\r\n\r\nText\r\n");
        assert_eq!(
            update_description("# T\r\n\r\n## Sub\r\n", "Sum"),
            "# T\r\n\r\nSum\r\n\r\n## Sub\r\n"
        );
        assert_eq!(
            update_description("# T\r\n\r\nOld\r\n", "New"),
            "# T\r\n\r\nNew\r\n"
        );
    }

    #[test]
    fn test_heading_like_description_is_escaped() {
        let updated = update_description("# T\n", "## Not a heading");
        assert_eq!(updated, "# T\n\n\\## Not a heading\n");
        assert_eq!(
            extract_description(&updated),
            Some("## Not a heading".to_string())
        );
        assert_eq!(update_description(&updated, "## Not a heading"), updated);
    }

    #[test]
    fn test_blank_title_or_description_leaves_body_unchanged() {
        assert_eq!(update_title("# T\n", " \n "), "# T\n");
        assert_eq!(update_description("# T\n\nd\n", "\r\n"), "# T\n\nd\n");
    }
}
