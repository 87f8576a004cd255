//! Metric choice over a loaded table.
use crate::normalize::TrendSource;

/// Metric names of the table in source order.
pub fn available_metrics<T: TrendSource + ?Sized>(table: &T) -> Vec<String> {
    table.metrics().to_vec()
}

/// Keeps the requested metrics the table actually has, in table order.
///
/// Unknown names are dropped without error.
pub fn validate_selection<T, S>(table: &T, requested: &[S]) -> Vec<String>
where
    T: TrendSource + ?Sized,
    S: AsRef<str>,
{
    table
        .metrics()
        .iter()
        .filter(|metric| requested.iter().any(|name| name.as_ref() == metric.as_str()))
        .cloned()
        .collect()
}

/// The first `count` metrics of the table.
pub fn default_selection<T: TrendSource + ?Sized>(table: &T, count: usize) -> Vec<String> {
    table.metrics().iter().take(count).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_sheet;
    use crate::normalize::NormalizedTable;
    use crate::spreadsheet::CellValue;
    use crate::spreadsheet::RawSheet;

    fn table() -> NormalizedTable {
        let text = |value: &str| CellValue::Text(value.to_owned());
        let sheet = RawSheet::from_rows("Profit & Loss", vec![
            vec![text("Narration"), text("Mar-22"), text("Mar-23")],
            vec![text("Sales"), CellValue::Number(1.0), CellValue::Number(2.0)],
            vec![text("Expenses"), CellValue::Number(3.0), CellValue::Number(4.0)],
            vec![text("Net profit"), CellValue::Number(5.0), CellValue::Number(6.0)],
        ]);
        normalize_sheet(&sheet, 0).unwrap()
    }

    #[test]
    fn metrics_in_source_order() {
        assert_eq!(available_metrics(&table()), ["Sales", "Expenses", "Net profit"]);
    }

    #[test]
    fn selection_follows_table_order() {
        let selected = validate_selection(&table(), &["Net profit", "Sales"]);

        assert_eq!(selected, ["Sales", "Net profit"]);
    }

    #[test]
    fn unknown_names_are_dropped() {
        let table = table();
        let selected = validate_selection(&table, &["EBITDA", "Expenses", "sales"]);

        assert_eq!(selected, ["Expenses"]);
        assert!(selected.iter().all(|name| available_metrics(&table).contains(name)));
    }

    #[test]
    fn empty_request_selects_nothing() {
        let requested: [&str; 0] = [];

        assert!(validate_selection(&table(), &requested).is_empty());
    }

    #[test]
    fn default_takes_leading_metrics() {
        assert_eq!(default_selection(&table(), 2), ["Sales", "Expenses"]);
        assert_eq!(default_selection(&table(), 10).len(), 3);
        assert!(default_selection(&table(), 0).is_empty());
    }
}
