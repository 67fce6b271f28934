//! Line-based diff between original and proposed file content.

/// One annotated line of a diff, with line endings stripped for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine {
    /// Line present in both versions.
    Context(String),
    /// Line only in the proposed version.
    Added(String),
    /// Line only in the original version.
    Removed(String),
}

impl DiffLine {
    /// The line text without its annotation.
    pub fn text(&self) -> &str {
        match self {
            Self::Context(text) | Self::Added(text) | Self::Removed(text) => text,
        }
    }
}

/// Computes an annotated line diff from `original` to `proposed`.
///
/// Returns an empty sequence when the inputs are verbatim-equal. Otherwise
/// every line of both versions appears once, annotated as context, added,
/// or removed; inputs that differ always produce at least one added or
/// removed line because the comparison keeps line endings.
pub fn diff_lines(original: &str, proposed: &str) -> Vec<DiffLine> {
    if original == proposed {
        return Vec::new();
    }

    let old: Vec<&str> = original.split_inclusive('\n').collect();
    let new: Vec<&str> = proposed.split_inclusive('\n').collect();

    // Longest-common-subsequence lengths, table[i][j] holding the LCS of
    // old[i..] and new[j..].
    let mut table = vec![vec![0usize; new.len() + 1]; old.len() + 1];
    for i in (0..old.len()).rev() {
        for j in (0..new.len()).rev() {
            table[i][j] = if old[i] == new[j] {
                table[i + 1][j + 1] + 1
            } else {
                table[i + 1][j].max(table[i][j + 1])
            };
        }
    }

    let mut lines = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < old.len() && j < new.len() {
        if old[i] == new[j] {
            lines.push(DiffLine::Context(display_text(old[i])));
            i += 1;
            j += 1;
        } else if table[i + 1][j] >= table[i][j + 1] {
            lines.push(DiffLine::Removed(display_text(old[i])));
            i += 1;
        } else {
            lines.push(DiffLine::Added(display_text(new[j])));
            j += 1;
        }
    }
    for line in &old[i..] {
        lines.push(DiffLine::Removed(display_text(line)));
    }
    for line in &new[j..] {
        lines.push(DiffLine::Added(display_text(line)));
    }

    lines
}

fn display_text(line: &str) -> String {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_inputs_produce_empty_diff() {
        assert!(diff_lines("a\nb\n", "a\nb\n").is_empty());
        assert!(diff_lines("", "").is_empty());
    }

    #[test]
    fn added_line_is_annotated() {
        let diff = diff_lines("a\n", "a\nb\n");
        assert_eq!(
            diff,
            vec![
                DiffLine::Context("a".to_string()),
                DiffLine::Added("b".to_string()),
            ]
        );
    }

    #[test]
    fn removed_line_is_annotated() {
        let diff = diff_lines("a\nb\n", "a\n");
        assert_eq!(
            diff,
            vec![
                DiffLine::Context("a".to_string()),
                DiffLine::Removed("b".to_string()),
            ]
        );
    }

    #[test]
    fn changed_line_appears_as_removed_then_added() {
        let diff = diff_lines("x = 1\ny = 2\n", "x = 1\ny = 3\n");
        assert_eq!(
            diff,
            vec![
                DiffLine::Context("x = 1".to_string()),
                DiffLine::Removed("y = 2".to_string()),
                DiffLine::Added("y = 3".to_string()),
            ]
        );
    }

    #[test]
    fn context_survives_around_changes() {
        let diff = diff_lines("a\nb\nc\n", "a\nB\nc\n");
        let context: Vec<_> = diff
            .iter()
            .filter(|line| matches!(line, DiffLine::Context(_)))
            .map(DiffLine::text)
            .collect();
        assert_eq!(context, ["a", "c"]);
    }

    #[test]
    fn trailing_newline_difference_is_a_change() {
        let diff = diff_lines("a", "a\n");
        assert!(!diff.is_empty());
        assert!(
            diff.iter()
                .any(|line| !matches!(line, DiffLine::Context(_)))
        );
    }

    #[test]
    fn different_inputs_always_carry_a_change_line() {
        let diff = diff_lines("one\ntwo\n", "one\ntwo\nthree\n");
        assert!(
            diff.iter()
                .any(|line| matches!(line, DiffLine::Added(_) | DiffLine::Removed(_)))
        );
    }

    #[test]
    fn crlf_endings_are_stripped_for_display() {
        let diff = diff_lines("a\r\n", "b\r\n");
        assert_eq!(
            diff,
            vec![
                DiffLine::Removed("a".to_string()),
                DiffLine::Added("b".to_string()),
            ]
        );
    }
}
