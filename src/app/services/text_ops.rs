//! Editing commands bound to the editor's custom keys.
//!
//! Positions are byte offsets into the text and must sit on char
//! boundaries. Columns are counted in chars from the start of the line.

/// Result of an editing command: the new text and the new selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    pub text: String,
    pub anchor: usize,
    pub head: usize,
}

/// Byte offset of the start of the line containing `pos`.
pub fn line_start(text: &str, pos: usize) -> usize {
    text[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

/// Column (in chars) of `pos` within its line.
pub fn column_of(text: &str, pos: usize) -> usize {
    text[line_start(text, pos)..pos].chars().count()
}

/// Replace the selection with enough spaces to reach the next tab stop.
///
/// The column is measured at the start of the selection. A tab size of zero
/// is treated as one.
pub fn insert_tab(text: &str, from: usize, to: usize, tab_size: usize) -> EditOutcome {
    let (from, to) = ordered(from, to);
    let tab_size = tab_size.max(1);
    let col = column_of(text, from);
    let spaces = " ".repeat(tab_size - (col % tab_size));

    let mut out = String::with_capacity(text.len() + spaces.len());
    out.push_str(&text[..from]);
    out.push_str(&spaces);
    out.push_str(&text[to..]);

    let cursor = from + spaces.len();
    EditOutcome {
        text: out,
        anchor: cursor,
        head: cursor,
    }
}

/// Indent every line touched by the selection by one unit of `tab_size` spaces.
pub fn indent_more(text: &str, anchor: usize, head: usize, tab_size: usize) -> EditOutcome {
    let unit = " ".repeat(tab_size.max(1));
    let edits: Vec<LineEdit> = touched_lines(text, anchor, head)
        .into_iter()
        .map(|start| LineEdit::Insert {
            at: start,
            len: unit.len(),
        })
        .collect();

    let mut out = String::with_capacity(text.len() + edits.len() * unit.len());
    let mut last = 0;
    for edit in &edits {
        if let LineEdit::Insert { at, .. } = *edit {
            out.push_str(&text[last..at]);
            out.push_str(&unit);
            last = at;
        }
    }
    out.push_str(&text[last..]);

    EditOutcome {
        text: out,
        anchor: map_position(anchor, &edits),
        head: map_position(head, &edits),
    }
}

/// Remove up to one indent unit from every line touched by the selection.
///
/// A unit is either `tab_size` leading spaces (fewer if the line has fewer)
/// or a single leading tab character.
pub fn indent_less(text: &str, anchor: usize, head: usize, tab_size: usize) -> EditOutcome {
    let tab_size = tab_size.max(1);
    let edits: Vec<LineEdit> = touched_lines(text, anchor, head)
        .into_iter()
        .filter_map(|start| {
            let rest = &text[start..];
            let len = if rest.starts_with('\t') {
                1
            } else {
                rest.bytes().take(tab_size).take_while(|b| *b == b' ').count()
            };
            (len > 0).then_some(LineEdit::Remove { at: start, len })
        })
        .collect();

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for edit in &edits {
        if let LineEdit::Remove { at, len } = *edit {
            out.push_str(&text[last..at]);
            last = at + len;
        }
    }
    out.push_str(&text[last..]);

    EditOutcome {
        text: out,
        anchor: map_position(anchor, &edits),
        head: map_position(head, &edits),
    }
}

#[derive(Debug, Clone, Copy)]
enum LineEdit {
    Insert { at: usize, len: usize },
    Remove { at: usize, len: usize },
}

fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Start offsets of the lines covered by a selection, in ascending order.
///
/// A non-empty selection ending exactly at a line start does not touch that
/// line.
fn touched_lines(text: &str, anchor: usize, head: usize) -> Vec<usize> {
    let (from, mut to) = ordered(anchor, head);
    if to > from && line_start(text, to) == to {
        to -= 1;
    }

    let mut starts = vec![line_start(text, from)];
    for (i, b) in text[from..to].bytes().enumerate() {
        if b == b'\n' {
            starts.push(from + i + 1);
        }
    }
    starts
}

fn map_position(pos: usize, edits: &[LineEdit]) -> usize {
    let mut shift: isize = 0;
    for edit in edits {
        match *edit {
            LineEdit::Insert { at, len } if at <= pos => shift += len as isize,
            LineEdit::Remove { at, len } if at < pos => {
                let removed = len.min(pos - at);
                shift -= removed as isize;
            }
            _ => {}
        }
    }
    (pos as isize + shift).max(0) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_tab_reaches_next_stop() {
        let out = insert_tab("ab", 2, 2, 4);
        assert_eq!(out.text, "ab  ");
        assert_eq!(out.head, 4);
    }

    #[test]
    fn test_insert_tab_on_stop_inserts_full_unit() {
        let out = insert_tab("abcd", 4, 4, 4);
        assert_eq!(out.text, "abcd    ");
    }

    #[test]
    fn test_insert_tab_uses_column_in_current_line() {
        let text = "first line\nx";
        let out = insert_tab(text, text.len(), text.len(), 4);
        assert_eq!(out.text, "first line\nx   ");
    }

    #[test]
    fn test_insert_tab_replaces_selection() {
        let out = insert_tab("hello", 1, 4, 2);
        assert_eq!(out.text, "h o");
        assert_eq!(out.anchor, 2);
    }

    #[test]
    fn test_insert_tab_counts_chars_not_bytes() {
        let out = insert_tab("é", 2, 2, 4);
        assert_eq!(out.text, "é   ");
    }

    #[test]
    fn test_indent_more_single_line() {
        let out = indent_more("a\nb", 0, 0, 4);
        assert_eq!(out.text, "    a\nb");
        assert_eq!(out.head, 4);
    }

    #[test]
    fn test_indent_more_selection_spans_lines() {
        let text = "a\nb\nc";
        let out = indent_more(text, 0, 3, 2);
        assert_eq!(out.text, "  a\n  b\nc");
        assert_eq!(out.anchor, 2);
        assert_eq!(out.head, 7);
    }

    #[test]
    fn test_indent_more_ignores_line_at_selection_end() {
        let text = "a\nb\n";
        let out = indent_more(text, 0, 2, 2);
        assert_eq!(out.text, "  a\nb\n");
    }

    #[test]
    fn test_indent_less_removes_one_unit() {
        let text = "      a\n  b\nc";
        let out = indent_less(text, 0, text.len(), 4);
        assert_eq!(out.text, "  a\nb\nc");
    }

    #[test]
    fn test_indent_less_removes_leading_tab() {
        let out = indent_less("\t\tx", 3, 3, 4);
        assert_eq!(out.text, "\tx");
        assert_eq!(out.head, 2);
    }

    #[test]
    fn test_indent_less_clamps_cursor_inside_indent() {
        let out = indent_less("    x", 2, 2, 4);
        assert_eq!(out.text, "x");
        assert_eq!(out.head, 0);
    }

    #[test]
    fn test_column_of() {
        assert_eq!(column_of("ab\ncde", 5), 2);
        assert_eq!(column_of("ab", 0), 0);
    }
}
