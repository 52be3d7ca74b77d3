/// Cell values that count as missing after trimming and lowercasing.
const MISSING_TOKENS: &[&str] = &["", "na", "n/a", "nan", "null", "none"];

/// A rectangular grid of cells with named columns.
///
/// Every row holds exactly one cell per column; constructors pad short rows
/// with empty cells and truncate long rows to the header width, so the
/// invariant holds for ragged source data as well.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// One classified column: its name plus the typed cell vector.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnVector {
    pub name: String,
    pub values: ColumnValues,
}

/// Result of the classification pass over one column.
///
/// A column is numeric only when every non-missing cell parses as a finite
/// number; anything else is categorical. Missing cells keep their position
/// as `None` in either variant.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Numeric(Vec<Option<f64>>),
    Categorical(Vec<Option<String>>),
}

impl Table {
    /// Builds a table from explicit column names and body rows, normalizing
    /// every row to the header width.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let columns = name_columns(columns);
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Table { columns, rows }
    }

    /// Builds a table whose first grid row is always the header, even when
    /// it is the only row. Returns `None` for an empty grid.
    pub fn with_header_row(mut grid: Vec<Vec<String>>) -> Option<Self> {
        if grid.is_empty() {
            return None;
        }
        let header = grid.remove(0);
        if header.is_empty() {
            return None;
        }
        Some(Table::new(header, grid))
    }

    /// Builds a table from a raw grid: two or more rows mean header plus
    /// body, a single row becomes a headerless table with positional column
    /// names, and an empty grid yields `None`.
    pub fn from_grid(grid: Vec<Vec<String>>) -> Option<Self> {
        match grid.len() {
            0 => None,
            1 => {
                let row = grid.into_iter().next()?;
                if row.is_empty() {
                    return None;
                }
                let columns = (0..row.len()).map(|i| i.to_string()).collect();
                Some(Table::new(columns, vec![row]))
            }
            _ => Table::with_header_row(grid),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Runs the classification pass over every column.
    pub fn classify(&self) -> Vec<ColumnVector> {
        (0..self.columns.len())
            .map(|index| ColumnVector {
                name: self.columns[index].clone(),
                values: classify_column(self.rows.iter().map(|row| row[index].as_str())),
            })
            .collect()
    }
}

/// Trims header cells and substitutes positional names for blank ones so
/// every column can be addressed in output.
fn name_columns(columns: Vec<String>) -> Vec<String> {
    columns
        .into_iter()
        .enumerate()
        .map(|(index, name)| {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                index.to_string()
            } else {
                trimmed.to_string()
            }
        })
        .collect()
}

pub fn is_missing(cell: &str) -> bool {
    let normalized = cell.trim().to_lowercase();
    MISSING_TOKENS.contains(&normalized.as_str())
}

fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn classify_column<'a>(cells: impl Iterator<Item = &'a str> + Clone) -> ColumnValues {
    let mut numeric = Vec::new();
    let mut all_numeric = true;
    let mut seen_value = false;

    for cell in cells.clone() {
        if is_missing(cell) {
            numeric.push(None);
            continue;
        }
        seen_value = true;
        match parse_number(cell) {
            Some(value) => numeric.push(Some(value)),
            None => {
                all_numeric = false;
                break;
            }
        }
    }

    if all_numeric && seen_value {
        return ColumnValues::Numeric(numeric);
    }

    ColumnValues::Categorical(
        cells
            .map(|cell| {
                if is_missing(cell) {
                    None
                } else {
                    Some(cell.trim().to_string())
                }
            })
            .collect(),
    )
}
