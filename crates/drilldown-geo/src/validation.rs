use drilldown_core::error::{DrilldownError, Result};
use drilldown_core::models::{DataTable, DepthRange};

/// Check that an input has one entry per row
pub fn check_length(what: &str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(DrilldownError::LengthMismatch { what: what.to_string(), expected, found });
    }
    Ok(())
}

/// Check that every data column has one cell per row
pub fn check_table_rows(table: &DataTable, expected: usize) -> Result<()> {
    for (i, column) in table.columns().iter().enumerate() {
        let what = match table.labels() {
            Some(labels) => format!("column '{}'", labels[i]),
            None => format!("column {}", i),
        };
        check_length(&what, expected, column.len())?;
    }
    Ok(())
}

/// Check that every dip lies within [-90, 90] degrees
pub fn check_dips<S: AsRef<str>>(hole_ids: &[S], dips: &[f64]) -> Result<()> {
    match hole_ids.iter().zip(dips).find(|(_, dip)| dip.abs() > 90.0) {
        Some((hole, &dip)) => {
            Err(DrilldownError::DipOutOfRange { hole: hole.as_ref().to_string(), dip })
        }
        None => Ok(()),
    }
}

/// Check that collar coordinates are finite
pub fn check_coordinates(hole: &str, coordinates: &[f64; 3]) -> Result<()> {
    if coordinates.iter().all(|c| c.is_finite()) {
        return Ok(());
    }
    Err(DrilldownError::InvalidCoordinates {
        hole: hole.to_string(),
        reason: format!("{:?} contains non-finite values", coordinates),
    })
}

/// Check that no interval ends above where it starts
pub fn check_intervals(ranges: &[DepthRange]) -> Result<()> {
    match ranges.iter().enumerate().find(|(_, range)| range.from > range.to) {
        Some((row, range)) => {
            Err(DrilldownError::InvalidInterval { row, from: range.from, to: range.to })
        }
        None => Ok(()),
    }
}

/// Names for the columns of `table`.
///
/// A labeled table names its own columns; otherwise `names` must be given,
/// one per column.
pub fn resolve_column_names(table: &DataTable, names: Option<Vec<String>>) -> Result<Vec<String>> {
    if let Some(labels) = table.labels() {
        return Ok(labels.to_vec());
    }

    let names = match names {
        Some(names) if !names.is_empty() => names,
        _ => return Err(DrilldownError::MissingColumnNames),
    };

    if names.len() != table.column_count() {
        return Err(DrilldownError::ColumnNameCount {
            expected: table.column_count(),
            found: names.len(),
        });
    }

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use drilldown_core::models::CellValue;

    #[test]
    fn test_dip_range() {
        assert!(check_dips(&["H1", "H1"], &[-90.0, 90.0]).is_ok());

        let err = check_dips(&["H1", "H2"], &[-60.0, 95.0]).unwrap_err();
        match err {
            DrilldownError::DipOutOfRange { hole, dip } => {
                assert_eq!(hole, "H2");
                assert_eq!(dip, 95.0);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_interval_order() {
        let touching = [DepthRange::new(0.0, 10.0), DepthRange::new(10.0, 10.0)];
        assert!(check_intervals(&touching).is_ok());
        assert!(matches!(
            check_intervals(&[DepthRange::new(0.0, 10.0), DepthRange::new(12.0, 11.0)]),
            Err(DrilldownError::InvalidInterval { row: 1, .. })
        ));
    }

    #[test]
    fn test_coordinates() {
        assert!(check_coordinates("H1", &[1.0, 2.0, 3.0]).is_ok());
        assert!(check_coordinates("H1", &[1.0, f64::INFINITY, 3.0]).is_err());
    }

    #[test]
    fn test_table_rows() {
        let table = DataTable::new().with_column("au", vec![CellValue::from(1.0)]);
        assert!(check_table_rows(&table, 1).is_ok());
        assert!(matches!(
            check_table_rows(&table, 2),
            Err(DrilldownError::LengthMismatch { expected: 2, found: 1, .. })
        ));
    }

    #[test]
    fn test_column_names() {
        let labeled = DataTable::new().with_column("lith", vec![CellValue::from("A")]);
        assert_eq!(resolve_column_names(&labeled, None).unwrap(), vec!["lith".to_string()]);

        let unlabeled = DataTable::unlabeled(vec![vec![CellValue::from("A")]]);
        assert!(matches!(
            resolve_column_names(&unlabeled, None),
            Err(DrilldownError::MissingColumnNames)
        ));
        assert!(matches!(
            resolve_column_names(&unlabeled, Some(vec!["a".into(), "b".into()])),
            Err(DrilldownError::ColumnNameCount { expected: 1, found: 2 })
        ));
        assert_eq!(
            resolve_column_names(&unlabeled, Some(vec!["lith".into()])).unwrap(),
            vec!["lith".to_string()]
        );
    }
}
