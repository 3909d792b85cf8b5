// Primitives for reading decision matrices from Excel worksheets.

use calamine::DataType;

use crate::analysis::{
    io_common::{make_default_id, ParsedRow},
    *,
};

/// Reads one row per area from the configured worksheet (or the first one).
pub fn read_xlsx_matrix(
    path: &str,
    source: &DecisionMatrixSource,
    num_values: usize,
) -> BAppResult<Vec<ParsedRow>> {
    let default_id = make_default_id(path);
    let wrange = get_range(path, source)?;

    let id_idx_o = source.id_column_index_int()?;
    let values_start_col = source.first_value_column_index()?;
    let first_row = source.first_row_index()?;

    let mut res: Vec<ParsedRow> = Vec::new();
    for (idx, row) in wrange.rows().enumerate().skip(first_row) {
        let lineno = idx + 1;
        debug!("read_xlsx_matrix: lineno: {:?} row: {:?}", lineno, row);
        if row.iter().all(|c| *c == DataType::Empty) {
            continue;
        }
        let id = match id_idx_o {
            Some(id_idx) => match row.get(id_idx) {
                Some(DataType::String(s)) => s.trim().to_string(),
                Some(DataType::Int(i)) => i.to_string(),
                Some(DataType::Float(f)) => f.to_string(),
                _ => {
                    return Err(Box::new(AppError::ExcelWrongCellType {
                        lineno: lineno as u64,
                        content: format!("{:?}", row),
                    }));
                }
            },
            None => default_id(lineno),
        };

        let mut values: Vec<f64> = Vec::with_capacity(num_values);
        for col in values_start_col..(values_start_col + num_values) {
            let value = match row.get(col) {
                Some(DataType::Float(f)) => *f,
                Some(DataType::Int(i)) => *i as f64,
                Some(DataType::String(s)) => s.trim().parse::<f64>().ok().context(NotANumberSnafu {
                    lineno,
                    content: s.clone(),
                })?,
                _ => {
                    return Err(Box::new(AppError::ExcelWrongCellType {
                        lineno: lineno as u64,
                        content: format!("{:?}", row),
                    }));
                }
            };
            values.push(value);
        }
        res.push(ParsedRow { id, values });
    }
    Ok(res)
}

fn get_range(path: &str, source: &DecisionMatrixSource) -> BAppResult<calamine::Range<DataType>> {
    debug!(
        "read_xlsx_matrix: path: {:?} worksheet: {:?}",
        path, source.worksheet_name
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    let wrange = match &source.worksheet_name {
        // A worksheet name was provided, use it.
        Some(worksheet_name) => workbook
            .worksheet_range(worksheet_name)
            .context(EmptyExcelSnafu {})?
            .context(OpeningExcelSnafu { path })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu {})?
            .context(OpeningExcelSnafu { path })?,
    };
    Ok(wrange)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(name: &str) -> String {
        format!("{}/tests/data/{}", env!("CARGO_MANIFEST_DIR"), name)
    }

    #[test]
    fn reads_the_first_worksheet() {
        let path = fixture("xlsx_matrix/areas.xlsx");
        let rows =
            read_xlsx_matrix(&path, &DecisionMatrixSource::new("xlsx", "areas.xlsx"), 3).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].id, "main-street");
        assert_eq!(rows[0].values, vec![3.0, 12.0, 7.5]);
        assert_eq!(rows[2].id, "school-lane");
        assert_eq!(rows[2].values, vec![2.0, 5.0, 4.0]);
    }

    #[test]
    fn unknown_worksheet() {
        let path = fixture("xlsx_matrix/areas.xlsx");
        let js = serde_json::json!({"provider": "xlsx", "filePath": "areas.xlsx", "idColumnIndex": 1, "worksheetName": "Nope"});
        let source: DecisionMatrixSource = serde_json::from_value(js).unwrap();
        let err = read_xlsx_matrix(&path, &source, 3).unwrap_err();
        assert!(matches!(*err, AppError::EmptyExcel {}));
    }

    #[test]
    fn missing_file() {
        let source = DecisionMatrixSource::new("xlsx", "nothing.xlsx");
        assert!(read_xlsx_matrix(&fixture("nothing.xlsx"), &source, 1).is_err());
    }
}
