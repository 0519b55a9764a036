//! Column arithmetic for the editor. Buffer positions count `char`s, the
//! terminal counts cells, and the cursor moves by grapheme cluster.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

const TAB_WIDTH: usize = 4;

/// Display width in terminal cells. Tabs count as 4 cells.
pub fn display_width(s: &str) -> usize {
    s.graphemes(true).map(cell_width).sum()
}

/// Cut `s` down to `max_cells`, ending in `…` when anything was dropped.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    if max_cells == 0 {
        return String::new();
    }
    let budget = max_cells - 1;
    let mut used = 0;
    let mut out = String::new();
    for g in s.graphemes(true) {
        used += cell_width(g);
        if used > budget {
            break;
        }
        out.push_str(g);
    }
    out.push('\u{2026}');
    out
}

/// Byte offset of char column `ch`, clamped to `s.len()`.
pub fn char_to_byte(s: &str, ch: usize) -> usize {
    s.char_indices().nth(ch).map_or(s.len(), |(i, _)| i)
}

/// Cells covered by the first `ch` chars.
pub fn char_to_display_col(s: &str, ch: usize) -> usize {
    display_width(&s[..char_to_byte(s, ch)])
}

/// Byte offset of the grapheme under display column `col`. A column inside
/// a wide grapheme snaps to its start; past the end gives `s.len()`.
pub fn display_col_to_byte(s: &str, col: usize) -> usize {
    let mut x = 0;
    for (i, g) in s.grapheme_indices(true) {
        x += cell_width(g);
        if x > col {
            return i;
        }
    }
    s.len()
}

/// Char column of the grapheme under display column `col`.
pub fn display_col_to_char(s: &str, col: usize) -> usize {
    s[..display_col_to_byte(s, col)].chars().count()
}

/// Char column where the grapheme before `ch` starts, or None at column 0.
pub fn prev_grapheme_col(s: &str, ch: usize) -> Option<usize> {
    if ch == 0 {
        return None;
    }
    grapheme_starts(s).take_while(|&start| start < ch).last()
}

/// Char column just past the grapheme at `ch`, or None at the line end.
pub fn next_grapheme_col(s: &str, ch: usize) -> Option<usize> {
    if ch >= s.chars().count() {
        return None;
    }
    let mut ends = grapheme_starts(s).skip(1).chain(std::iter::once(s.chars().count()));
    ends.find(|&end| end > ch)
}

/// Start of the word at or before `ch`, skipping whitespace first.
pub fn word_start_before(s: &str, ch: usize) -> usize {
    let graphemes: Vec<(usize, bool)> = grapheme_cols(s)
        .take_while(|(start, _)| *start < ch)
        .map(|(start, g)| (start, is_blank(g)))
        .collect();
    let mut idx = graphemes.len();
    while idx > 0 && graphemes[idx - 1].1 {
        idx -= 1;
    }
    while idx > 0 && !graphemes[idx - 1].1 {
        idx -= 1;
    }
    graphemes.get(idx).map_or(0, |(start, _)| *start)
}

/// Start of the next word after `ch`, or the line end.
pub fn word_start_after(s: &str, ch: usize) -> usize {
    let mut in_word = true;
    for (start, g) in grapheme_cols(s).skip_while(|(start, _)| *start < ch) {
        let blank = is_blank(g);
        if !blank && !in_word {
            return start;
        }
        in_word &= !blank;
    }
    s.chars().count()
}

/// Graphemes paired with the char column they start at.
fn grapheme_cols(s: &str) -> impl Iterator<Item = (usize, &str)> {
    s.graphemes(true).scan(0, |col, g| {
        let start = *col;
        *col += g.chars().count();
        Some((start, g))
    })
}

fn grapheme_starts(s: &str) -> impl Iterator<Item = usize> + '_ {
    grapheme_cols(s).map(|(start, _)| start)
}

fn is_blank(g: &str) -> bool {
    g.chars().all(char::is_whitespace)
}

fn cell_width(g: &str) -> usize {
    if g == "\t" {
        TAB_WIDTH
    } else {
        UnicodeWidthStr::width(g)
    }
}
