// Primitives for reading decision matrices from CSV files.

use std::fs::File;

use crate::analysis::{
    io_common::{make_default_id, ParsedRow},
    *,
};

/// Reads one row per area, `num_values` numeric columns starting at the configured column.
pub fn read_csv_matrix(
    path: &str,
    source: &DecisionMatrixSource,
    num_values: usize,
) -> BAppResult<Vec<ParsedRow>> {
    let default_id = make_default_id(path);

    let id_idx_o = source.id_column_index_int()?;
    let values_start_col = source.first_value_column_index()?;

    let mut res: Vec<ParsedRow> = Vec::new();
    let (records, row_offset) = get_records(path, source)?;

    for (idx, line_r) in records.enumerate() {
        let lineno = idx + row_offset + 1;
        let line = line_r.context(CsvLineParseSnafu {})?;
        debug!("read_csv_matrix: lineno: {:?} line: {:?}", lineno, line);
        if line.iter().all(|s| s.trim().is_empty()) {
            continue;
        }
        let id = if let Some(id_idx) = id_idx_o {
            line.get(id_idx)
                .context(CsvLineTooShortSnafu { lineno })?
                .trim()
                .to_string()
        } else {
            default_id(lineno)
        };

        let mut values: Vec<f64> = Vec::with_capacity(num_values);
        for col in values_start_col..(values_start_col + num_values) {
            let cell = line.get(col).context(CsvLineTooShortSnafu { lineno })?;
            values.push(parse_value(cell, lineno)?);
        }
        res.push(ParsedRow { id, values });
    }
    Ok(res)
}

fn parse_value(cell: &str, lineno: usize) -> AppResult<f64> {
    cell.trim().parse::<f64>().ok().context(NotANumberSnafu {
        lineno,
        content: cell,
    })
}

fn get_records(
    path: &str,
    source: &DecisionMatrixSource,
) -> AppResult<(csv::StringRecordsIntoIter<File>, usize)> {
    let first_row = source.first_row_index()?;
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let mut records = rdr.into_records();
    for _ in 0..first_row {
        _ = records.next();
    }
    Ok((records, first_row))
}
