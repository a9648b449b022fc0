use crate::cert::report::ReportColumn;
use std::fmt::Display;

/// Trait for types that can provide column values
pub trait GetColumnValue {
    fn get_column_value(&self, column: &ReportColumn) -> String;
}

/// Output format configuration
#[derive(Clone, Debug)]
pub struct OutputFormat {
    pub raw: bool,
}

/// Build table rows, headed by the column titles
pub fn build_table_data<T>(rows: &[T], columns: &[ReportColumn]) -> Vec<Vec<String>>
where
    T: GetColumnValue,
{
    let header: Vec<String> = columns.iter().map(|col| col.header().to_string()).collect();

    std::iter::once(header)
        .chain(rows.iter().map(|row| {
            columns
                .iter()
                .map(|col| row.get_column_value(col))
                .collect::<Vec<String>>()
        }))
        .collect()
}

impl OutputFormat {
    pub fn new(raw: bool) -> Self {
        Self { raw }
    }

    /// Print tabular data - either raw (tab-separated) or formatted (column-aligned)
    pub fn print_table<T>(&self, data: &[Vec<T>])
    where
        T: Display + AsRef<str>,
    {
        for line in self.render_table(data) {
            println!("{line}");
        }
    }

    /// Render the table lines without printing them
    pub fn render_table<T>(&self, data: &[Vec<T>]) -> Vec<String>
    where
        T: Display + AsRef<str>,
    {
        if data.is_empty() {
            return Vec::new();
        }

        if self.raw {
            data.iter()
                .map(|row| {
                    row.iter()
                        .map(|cell| cell.as_ref())
                        .collect::<Vec<_>>()
                        .join("\t")
                })
                .collect()
        } else {
            Self::format_aligned(data)
        }
    }

    /// Column-aligned like `column -t`
    fn format_aligned<T>(data: &[Vec<T>]) -> Vec<String>
    where
        T: Display + AsRef<str>,
    {
        let num_cols = data[0].len();
        let mut col_widths = vec![0; num_cols];

        for row in data {
            for (i, cell) in row.iter().enumerate() {
                col_widths[i] = col_widths[i].max(cell.as_ref().chars().count());
            }
        }

        data.iter()
            .map(|row| {
                let cells: Vec<String> = row
                    .iter()
                    .enumerate()
                    .map(|(i, cell)| {
                        if i == row.len() - 1 {
                            // Last column - no padding needed
                            cell.to_string()
                        } else {
                            format!("{:<width$}", cell.as_ref(), width = col_widths[i])
                        }
                    })
                    .collect();
                cells.join("  ")
            })
            .collect()
    }
}
