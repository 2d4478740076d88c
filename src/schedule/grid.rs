use std::collections::HashMap;
use std::fmt;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellAddress {
    pub row: usize,
    pub col: usize,
}

impl CellAddress {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub fn from_a1(column: &str, row: u32) -> Result<Self> {
        let col = column_index(column)?;
        if row == 0 {
            bail!("row numbers are 1-based, got 0 in column {column}");
        }
        Ok(Self::new(row as usize - 1, col))
    }

    pub fn to_a1(self) -> String {
        format!("{}{}", column_letters(self.col), self.row + 1)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

pub fn column_index(letters: &str) -> Result<usize> {
    if letters.is_empty() || !letters.bytes().all(|b| b.is_ascii_uppercase()) {
        bail!("invalid column letters: {letters:?}");
    }

    let mut index = 0_usize;
    for b in letters.bytes() {
        let Some(next) = index
            .checked_mul(26)
            .and_then(|shifted| shifted.checked_add(usize::from(b - b'A') + 1))
        else {
            bail!("column letters out of range: {letters:?}");
        };
        index = next;
    }
    Ok(index - 1)
}

pub fn column_letters(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (index % 26) as u8);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grid {
    rows: Vec<Vec<String>>,
}

impl Grid {
    #[cfg(test)]
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    #[cfg(test)]
    pub fn from_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self::new(
            rows.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        )
    }

    /// Text at `address`; cells outside the (possibly ragged) grid read as empty.
    pub fn cell(&self, address: CellAddress) -> &str {
        self.rows
            .get(address.row)
            .and_then(|row| row.get(address.col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn max_columns(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GridSet {
    grids: HashMap<String, Grid>,
}

impl GridSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, document: impl Into<String>, grid: Grid) {
        self.grids.insert(document.into(), grid);
    }

    #[cfg(test)]
    pub fn with(mut self, document: impl Into<String>, grid: Grid) -> Self {
        self.insert(document, grid);
        self
    }

    pub fn get(&self, document: &str) -> Option<&Grid> {
        self.grids.get(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a1_notation_maps_to_zero_based_addresses() {
        let address = CellAddress::from_a1("F", 12).unwrap();
        assert_eq!(address, CellAddress::new(11, 5));
        assert_eq!(address.to_a1(), "F12");

        let wide = CellAddress::from_a1("AB", 1).unwrap();
        assert_eq!(wide.col, 27);
        assert_eq!(wide.to_a1(), "AB1");
    }

    #[test]
    fn a1_notation_rejects_bad_input() {
        assert!(CellAddress::from_a1("f", 3).is_err());
        assert!(CellAddress::from_a1("", 3).is_err());
        assert!(CellAddress::from_a1("B", 0).is_err());
    }

    #[test]
    fn overlong_column_letters_are_an_error() {
        let letters = "Z".repeat(40);
        let err = column_index(&letters).unwrap_err();
        assert!(err.to_string().contains("out of range"), "{err}");
    }

    #[test]
    fn column_letters_round_trip_across_the_z_boundary() {
        for index in [0, 25, 26, 51, 52, 701, 702] {
            assert_eq!(column_index(&column_letters(index)).unwrap(), index);
        }
    }

    #[test]
    fn cells_outside_ragged_rows_read_empty() {
        let grid = Grid::from_rows(vec![vec!["a", "b"], vec!["c"]]);
        assert_eq!(grid.cell(CellAddress::new(0, 1)), "b");
        assert_eq!(grid.cell(CellAddress::new(1, 1)), "");
        assert_eq!(grid.cell(CellAddress::new(9, 0)), "");
        assert_eq!(grid.row_count(), 2);
        assert_eq!(grid.max_columns(), 2);
    }

    #[test]
    fn grid_deserializes_from_plain_nested_arrays() {
        let grid: Grid = serde_json::from_str(r#"[["x", ""], ["y"]]"#).unwrap();
        assert_eq!(grid.cell(CellAddress::new(1, 0)), "y");
    }
}
