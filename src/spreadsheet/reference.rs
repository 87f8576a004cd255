//! Conversion between A1-style cell references and 0-based indexes.
use regex::Regex;
use std::sync::LazyLock;

/// Rows in a worksheet.
pub(crate) const MAX_ROWS: usize = 1_048_576;
/// Columns in a worksheet, `A` to `XFD`.
pub(crate) const MAX_COLUMNS: usize = 16_384;

static REFERENCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$?([A-Za-z]{1,3})\$?(\d+)$").expect("Hardcode regex pattern"));

/// Converts column letters (`A`, `Z`, `AA`, ...) to a 0-based column index, up to `XFD`.
pub(crate) fn col_to_index(letters: &str) -> Option<usize> {
    if !(1..=3).contains(&letters.len()) || !letters.chars().all(|letter| letter.is_ascii_alphabetic()) {
        return None;
    }
    letters
        .to_ascii_uppercase()
        .bytes()
        .map(|letter| (letter - b'A') as usize + 1)
        .reduce(|index, digit| index * 26 + digit)
        .map(|column| column - 1)
        .filter(|col| *col < MAX_COLUMNS)
}

/// Converts a 1-based row number string to a 0-based row index.
pub(crate) fn row_to_index(number: &str) -> Option<usize> {
    number
        .parse::<usize>()
        .ok()
        .filter(|row| (1..=MAX_ROWS).contains(row))
        .map(|row| row - 1)
}

pub(crate) fn in_grid(row: usize, col: usize) -> bool {
    row < MAX_ROWS && col < MAX_COLUMNS
}

/// Parses a cell reference like `B12` (absolute markers allowed) into `(row, col)`.
pub(crate) fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let captures = REFERENCE_PATTERN.captures(reference)?;
    let col = col_to_index(captures.get(1)?.as_str())?;
    let row = row_to_index(captures.get(2)?.as_str())?;
    Some((row, col))
}

/// Converts a 0-based column index to column letters.
pub(crate) fn index_to_column(col: usize) -> String {
    let mut column = col + 1;
    let mut letters = Vec::<u8>::new();
    while column > 0 {
        column -= 1;
        letters.push(b'A' + (column % 26) as u8);
        column /= 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// Converts 0-based `(row, col)` to an A1-style reference.
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    format!("{}{}", index_to_column(col), row + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters() {
        assert_eq!(col_to_index("A"), Some(0));
        assert_eq!(col_to_index("z"), Some(25));
        assert_eq!(col_to_index("AA"), Some(26));
        assert_eq!(col_to_index("AZ"), Some(51));
        assert_eq!(col_to_index("BA"), Some(52));
        assert_eq!(col_to_index("XFD"), Some(16_383));
        assert_eq!(col_to_index("XFE"), None);
        assert_eq!(col_to_index("ZZZ"), None);
        assert_eq!(col_to_index("AAAAAAAAAAAAAAAAAAAA"), None);
        assert_eq!(col_to_index(""), None);
        assert_eq!(col_to_index("A1"), None);
    }

    #[test]
    fn row_numbers() {
        assert_eq!(row_to_index("1"), Some(0));
        assert_eq!(row_to_index("42"), Some(41));
        assert_eq!(row_to_index("0"), None);
        assert_eq!(row_to_index("x"), None);
        assert_eq!(row_to_index("1048576"), Some(1_048_575));
        assert_eq!(row_to_index("1048577"), None);
        assert_eq!(row_to_index("99999999999999999999999"), None);
    }

    #[test]
    fn references() {
        assert_eq!(reference_to_index("A1"), Some((0, 0)));
        assert_eq!(reference_to_index("C3"), Some((2, 2)));
        assert_eq!(reference_to_index("$AB$10"), Some((9, 27)));
        assert_eq!(reference_to_index("10"), None);
        assert_eq!(reference_to_index("A0"), None);
        assert_eq!(reference_to_index("XFD1048576"), Some((1_048_575, 16_383)));
        assert_eq!(reference_to_index("A1048577"), None);
        assert_eq!(reference_to_index("XFE1"), None);

        assert!(in_grid(1_048_575, 16_383));
        assert!(!in_grid(1_048_576, 0));
        assert!(!in_grid(0, 16_384));

        assert_eq!(index_to_reference(0, 0), "A1");
        assert_eq!(index_to_reference(9, 27), "AB10");
        assert_eq!(index_to_reference(2, 701), "ZZ3");
        assert_eq!(index_to_reference(2, 702), "AAA3");
        assert_eq!(index_to_column(25), "Z");
    }
}
