use crate::error::{DashboardError, Result};
use crate::table::{Column, ColumnData, Table};

/// Appends (or recomputes) `total` as the row-wise sum of every numeric column.
///
/// Columns named in `exclude`, and any existing `total` column, are not summed.
/// Missing cells count as zero, so every row of the total is present. The
/// result is an integer column unless one of the summed columns is a float.
///
/// # Errors
///
/// Returns a parse error for `feed` if an integer row sum overflows `i64`.
pub fn append_total(feed: &str, mut table: Table, total: &str, exclude: &[&str]) -> Result<Table> {
    let rows = table.row_count();
    let summed: Vec<&Column> = table
        .columns()
        .iter()
        .filter(|c| c.name != total && !exclude.contains(&c.name.as_str()))
        .filter(|c| c.data.is_numeric())
        .collect();

    let data = if summed
        .iter()
        .all(|c| matches!(c.data, ColumnData::Integer(_)))
    {
        let mut sums = vec![0i64; rows];
        for column in &summed {
            if let ColumnData::Integer(values) = &column.data {
                for (row, (sum, value)) in sums.iter_mut().zip(values).enumerate() {
                    *sum = sum.checked_add(value.unwrap_or(0)).ok_or_else(|| {
                        DashboardError::parse(feed, format!("{total} total overflows on row {row}"))
                    })?;
                }
            }
        }
        ColumnData::Integer(sums.into_iter().map(Some).collect())
    } else {
        let sums = (0..rows)
            .map(|row| Some(summed.iter().map(|c| c.data.f64_at(row).unwrap_or(0.0)).sum()))
            .collect();
        ColumnData::Float(sums)
    };

    if !table.set_column(Column {
        name: total.to_string(),
        data,
    }) {
        return Err(DashboardError::parse(feed, format!("{total} total does not match row count")));
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_table;

    fn total_of(table: &Table, name: &str) -> ColumnData {
        table.column(name).unwrap().data.clone()
    }

    #[test]
    fn test_total_is_row_sum() {
        let table = parse_table(
            "t",
            "Date;Mitte;Pankow\n2023-01-01;5;3\n2023-01-02;2;7\n",
            b';',
        )
        .unwrap();
        let table = append_total("t", table, "Berlin", &["Date"]).unwrap();
        assert_eq!(
            total_of(&table, "Berlin"),
            ColumnData::Integer(vec![Some(8), Some(9)])
        );
        assert_eq!(table.column_names().last(), Some(&"Berlin"));
    }

    #[test]
    fn test_missing_counts_as_zero() {
        let table = parse_table("t", "Date;Mitte;Pankow\n2023-01-01;;3\n2023-01-02;2;\n", b';')
            .unwrap();
        let table = append_total("t", table, "Berlin", &["Date"]).unwrap();
        assert_eq!(
            total_of(&table, "Berlin"),
            ColumnData::Integer(vec![Some(3), Some(2)])
        );
    }

    #[test]
    fn test_existing_total_is_recomputed_not_summed() {
        let table = parse_table(
            "t",
            "Date;Mitte;Berlin\n2023-01-01;5;999\n",
            b';',
        )
        .unwrap();
        let table = append_total("t", table, "Berlin", &["Date"]).unwrap();
        assert_eq!(total_of(&table, "Berlin"), ColumnData::Integer(vec![Some(5)]));
        assert_eq!(table.columns().len(), 3);
    }

    #[test]
    fn test_float_columns_sum_as_float() {
        let table = parse_table("t", "a;b\n1.5;2\n", b';').unwrap();
        let table = append_total("t", table, "total", &[]).unwrap();
        assert_eq!(total_of(&table, "total"), ColumnData::Float(vec![Some(3.5)]));
    }

    #[test]
    fn test_integer_overflow_is_parse_error() {
        let table = parse_table("t", "Date;Mitte;Pankow\n2023-01-01;9223372036854775807;1\n", b';')
            .unwrap();
        let err = append_total("daily_series", table, "Berlin", &["Date"]).unwrap_err();
        assert_eq!(err.kind(), "parse_error");
        assert!(err.to_string().contains("Berlin total overflows on row 0"));
    }

    #[test]
    fn test_text_columns_are_ignored() {
        let table = parse_table("t", "Date;Note;Mitte\n2023-01-01;late;4\n", b';').unwrap();
        let table = append_total("t", table, "Berlin", &["Date"]).unwrap();
        assert_eq!(total_of(&table, "Berlin"), ColumnData::Integer(vec![Some(4)]));
    }
}
