//! Cell text and header keyword helpers
//!
//! Document tables are typed by hand, so header text arrives with stray
//! spaces, line breaks inside cells, and full-width whitespace. All keyword
//! matching goes through [`compact`] first.

use crate::table::RawTable;

/// Remove every whitespace character (including full-width spaces)
pub fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Returns true if `text` contains any of the keywords
pub fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| text.contains(k))
}

/// Compacted text of every cell in the first `rows` rows
pub fn header_texts(table: &RawTable, rows: usize) -> Vec<String> {
    let rows = rows.min(table.row_count());
    (0..rows)
        .flat_map(|r| table.row(r).map(compact).collect::<Vec<_>>())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Find the first column whose header contains one of the keywords
///
/// Keywords are tried in order, so earlier keywords take priority over
/// later ones regardless of column position.
pub fn find_column(table: &RawTable, header_rows: usize, keywords: &[&str]) -> Option<usize> {
    find_column_excluding(table, header_rows, keywords, &[])
}

/// Like [`find_column`], skipping columns already claimed by another role
pub fn find_column_excluding(
    table: &RawTable,
    header_rows: usize,
    keywords: &[&str],
    claimed: &[usize],
) -> Option<usize> {
    let rows = header_rows.max(1).min(table.row_count());
    keywords.iter().find_map(|kw| {
        (0..table.col_count())
            .filter(|c| !claimed.contains(c))
            .find(|&c| (0..rows).any(|r| compact(table.value(r, c)).contains(kw)))
    })
}

/// Returns true if the text is a non-empty run of `0`/`1` digits
pub fn is_binary_token(text: &str) -> bool {
    let text = compact(text);
    !text.is_empty() && text.chars().all(|c| c == '0' || c == '1')
}

/// First run of ASCII digits in `text`, parsed
pub fn first_number(text: &str) -> Option<u32> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Channel letter (`'A'` or `'B'`) named by a cell, if unambiguous
///
/// `A通道`/`B通道` tokens decide first. Otherwise the bus name `CAN` is
/// dropped and the cell must mention exactly one of the letters.
pub fn channel_letter(text: &str) -> Option<char> {
    let text = compact(text).to_uppercase();
    if let Some(letter) = single_letter(|l| text.contains(&format!("{}通道", l))) {
        return Some(letter);
    }

    let stripped = text.replace("CAN", "");
    single_letter(|l| stripped.contains(l))
}

fn single_letter(mentions: impl Fn(char) -> bool) -> Option<char> {
    match (mentions('A'), mentions('B')) {
        (true, false) => Some('A'),
        (false, true) => Some('B'),
        _ => None,
    }
}
