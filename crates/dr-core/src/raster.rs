use std::fmt;

/// Carte de chaleur textuelle produite par le rasteriseur.
///
/// Chaque ligne contient exactement `columns` symboles.
///
/// # Example
/// ```
/// use dr_core::raster::Raster;
/// let raster = Raster::new(vec!["W ".into(), ". ".into()], 2);
/// assert_eq!(raster.row_count(), 2);
/// assert_eq!(raster.to_string(), "W \n. ");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster {
    rows: Vec<String>,
    columns: usize,
}

impl Raster {
    /// Assemble a raster from pre-rendered rows.
    #[must_use]
    pub fn new(rows: Vec<String>, columns: usize) -> Self {
        debug_assert!(rows.iter().all(|r| r.chars().count() == columns));
        Self { rows, columns }
    }

    /// Rows, top to bottom.
    #[must_use]
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Symbols per row.
    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Symbole en (colonne, ligne).
    #[must_use]
    pub fn symbol(&self, column: usize, row: usize) -> Option<char> {
        self.rows.get(row)?.chars().nth(column)
    }
}

impl fmt::Display for Raster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            f.write_str(row)?;
        }
        Ok(())
    }
}
