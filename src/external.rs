//! External series file exchange.
//!
//! An external series file stores the complete time series of one sequence
//! together with its own time grid, in one of two encodings:
//!
//! - tagged binary (`.dat`): the 13 header fields of the grid followed by
//!   the flat row-major values, all as 8-byte little-endian floats;
//! - text (`.asc`): the grid in its canonical call form on the first line,
//!   followed by one tab-separated row per time step.
//!
//! Loading validates the file's grid against the simulation grid.  A step
//! size difference is always fatal.  A series that does not cover the full
//! simulation window is fatal under the strict series check and otherwise
//! aligned: the overlap is copied into place and the uncovered steps are
//! filled with the sentinel value.

use crate::errors::{SequenceError, SequenceResult};
use crate::options::{FileType, RunContext};
use crate::storage::{decode_record, encode_record};
use crate::timegrid::{Timegrid, HEADER_LEN};
use crate::value::{format_float, FloatValue};
use ndarray::{s, Array2};
use std::fs;
use std::path::Path;

/// Load and validate the external series of one sequence, returning a
/// (steps × record length) array aligned to the simulation grid.
#[allow(clippy::too_many_arguments)]
pub fn load_series(
    path: &Path,
    filetype: FileType,
    ctx: &RunContext,
    record_len: usize,
    sentinel: FloatValue,
    sequence: &str,
    element: &str,
) -> SequenceResult<Array2<FloatValue>> {
    let (data_grid, values) = match filetype {
        FileType::Dat => read_tagged(path, record_len, sequence)?,
        FileType::Asc => read_text(path, record_len, sequence)?,
    };
    let sim_grid = &ctx.timegrid;
    if data_grid.step_seconds() != sim_grid.step_seconds() {
        return Err(SequenceError::StepSizeMismatch {
            sequence: sequence.to_string(),
            path: path.to_path_buf(),
            external: crate::timegrid::period_to_text(data_grid.step_seconds()),
            simulation: crate::timegrid::period_to_text(sim_grid.step_seconds()),
        });
    }
    if data_grid.contains(sim_grid) {
        let first = data_grid.index_of(sim_grid.firstdate())? as usize;
        Ok(values.slice(s![first..first + sim_grid.len(), ..]).to_owned())
    } else if ctx.options.check_series {
        Err(SequenceError::Coverage {
            sequence: sequence.to_string(),
            element: element.to_string(),
            path: path.to_path_buf(),
            simulation: sim_grid.to_string(),
            external: data_grid.to_string(),
        })
    } else {
        align_short_series(sim_grid, &data_grid, &values, sentinel)
    }
}

/// Write the complete series of one sequence to its external file.
pub fn save_series(
    path: &Path,
    filetype: FileType,
    grid: &Timegrid,
    series: &Array2<FloatValue>,
) -> SequenceResult<()> {
    match filetype {
        FileType::Dat => write_tagged(path, grid, series)?,
        FileType::Asc => write_text(path, grid, series)?,
    }
    Ok(())
}

/// Align a series that only partially overlaps the simulation window.
///
/// The returned array covers the full simulation grid; the steps the data
/// grid covers receive the corresponding records and every other step is
/// filled with the sentinel value.
pub fn align_short_series(
    sim_grid: &Timegrid,
    data_grid: &Timegrid,
    values: &Array2<FloatValue>,
    sentinel: FloatValue,
) -> SequenceResult<Array2<FloatValue>> {
    let first = data_grid.index_of(sim_grid.firstdate())?;
    let last = data_grid.index_of(sim_grid.lastdate())?;
    let available = values.nrows() as i64;
    let clip = |idx: i64| idx.clamp(0, available) as usize;
    let (src_first, src_last) = (clip(first), clip(last));

    let steps = sim_grid.len();
    let mut aligned = Array2::from_elem((steps, values.ncols()), sentinel);
    let dst_first = ((-first).max(0) as usize).min(steps);
    let dst_last = (dst_first + (src_last - src_first)).min(steps);
    aligned
        .slice_mut(s![dst_first..dst_last, ..])
        .assign(&values.slice(s![src_first..src_last, ..]));
    Ok(aligned)
}

fn open_error(path: &Path, sequence: &str, source: std::io::Error) -> SequenceError {
    SequenceError::MissingExternalFile {
        sequence: sequence.to_string(),
        path: path.to_path_buf(),
        source,
    }
}

fn read_tagged(
    path: &Path,
    record_len: usize,
    sequence: &str,
) -> SequenceResult<(Timegrid, Array2<FloatValue>)> {
    let bytes = fs::read(path).map_err(|source| open_error(path, sequence, source))?;
    let fields = decode_record(&bytes).map_err(|_| SequenceError::Parse {
        what: format!("a tagged series of sequence `{sequence}`"),
        input: path.display().to_string(),
    })?;
    let grid = Timegrid::from_array(&fields)?;
    let values = &fields[HEADER_LEN..];
    let steps = grid.len();
    if values.len() != steps * record_len {
        return Err(SequenceError::Parse {
            what: format!(
                "a series of {steps} x {record_len} values for sequence `{sequence}`"
            ),
            input: path.display().to_string(),
        });
    }
    let array = Array2::from_shape_vec((steps, record_len), values.to_vec())
        .expect("length checked above");
    Ok((grid, array))
}

fn read_text(
    path: &Path,
    record_len: usize,
    sequence: &str,
) -> SequenceResult<(Timegrid, Array2<FloatValue>)> {
    let content = fs::read_to_string(path).map_err(|source| open_error(path, sequence, source))?;
    let mut lines = content.lines();
    let header = lines.next().ok_or_else(|| SequenceError::Parse {
        what: format!("a text series of sequence `{sequence}`"),
        input: path.display().to_string(),
    })?;
    let grid = Timegrid::parse(header)?;
    let mut flat = Vec::with_capacity(grid.len() * record_len);
    let mut rows = 0;
    for line in lines.filter(|line| !line.trim().is_empty()) {
        let before = flat.len();
        for item in line.split('\t') {
            let value: FloatValue = item.trim().parse().map_err(|_| SequenceError::Parse {
                what: "a series value".to_string(),
                input: item.trim().to_string(),
            })?;
            flat.push(value);
        }
        if flat.len() - before != record_len {
            return Err(SequenceError::Parse {
                what: format!("a row of {record_len} values for sequence `{sequence}`"),
                input: line.to_string(),
            });
        }
        rows += 1;
    }
    if rows != grid.len() {
        return Err(SequenceError::Parse {
            what: format!(
                "a series of {} rows for sequence `{sequence}`",
                grid.len()
            ),
            input: path.display().to_string(),
        });
    }
    let array =
        Array2::from_shape_vec((rows, record_len), flat).expect("row lengths checked above");
    Ok((grid, array))
}

fn write_tagged(path: &Path, grid: &Timegrid, series: &Array2<FloatValue>) -> SequenceResult<()> {
    let flat: Vec<FloatValue> = series.iter().copied().collect();
    let tagged = grid.array2series(&flat);
    fs::write(path, encode_record(&tagged))?;
    Ok(())
}

fn write_text(path: &Path, grid: &Timegrid, series: &Array2<FloatValue>) -> SequenceResult<()> {
    let mut content = format!("{grid}\n");
    for row in series.outer_iter() {
        let items: Vec<String> = row.iter().map(|value| format_float(*value)).collect();
        content.push_str(&items.join("\t"));
        content.push('\n');
    }
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn grid(first: &str, last: &str) -> Timegrid {
        Timegrid::from_text(first, last, "1d").unwrap()
    }

    #[test]
    fn alignment_pads_a_late_start() {
        // Data starts two days into a five day simulation window.
        let sim = grid("2000-01-10", "2000-01-15");
        let data = grid("2000-01-12", "2000-01-15");
        let values = array![[1.0], [1.0], [1.0]];
        let aligned = align_short_series(&sim, &data, &values, f64::NAN).unwrap();
        assert!(aligned[[0, 0]].is_nan());
        assert!(aligned[[1, 0]].is_nan());
        assert_eq!(aligned.slice(s![2.., ..]), array![[1.0], [1.0], [1.0]]);
    }

    #[test]
    fn alignment_pads_an_early_end() {
        let sim = grid("2000-01-10", "2000-01-15");
        let data = grid("2000-01-10", "2000-01-13");
        let values = array![[1.0], [1.0], [1.0]];
        let aligned = align_short_series(&sim, &data, &values, f64::NAN).unwrap();
        assert_eq!(aligned.slice(s![..3, ..]), array![[1.0], [1.0], [1.0]]);
        assert!(aligned[[3, 0]].is_nan());
        assert!(aligned[[4, 0]].is_nan());
    }

    #[test]
    fn alignment_with_data_entirely_before_is_all_sentinel() {
        let sim = grid("2000-01-10", "2000-01-15");
        let data = grid("2000-01-01", "2000-01-05");
        let values = array![[1.0], [1.0], [1.0], [1.0]];
        let aligned = align_short_series(&sim, &data, &values, f64::NAN).unwrap();
        assert_eq!(aligned.nrows(), 5);
        assert!(aligned.iter().all(|value| value.is_nan()));
    }

    #[test]
    fn alignment_with_data_entirely_after_is_all_sentinel() {
        let sim = grid("2000-01-10", "2000-01-15");
        let data = grid("2000-01-16", "2000-01-18");
        let values = array![[1.0], [1.0]];
        let aligned = align_short_series(&sim, &data, &values, f64::NAN).unwrap();
        assert_eq!(aligned.nrows(), 5);
        assert!(aligned.iter().all(|value| value.is_nan()));
    }

    #[test]
    fn alignment_honors_the_default_sentinel() {
        let sim = grid("2000-01-10", "2000-01-15");
        let data = grid("2000-01-12", "2000-01-15");
        let values = array![[1.0], [1.0], [1.0]];
        let aligned = align_short_series(&sim, &data, &values, 0.0).unwrap();
        assert_eq!(aligned.column(0).to_vec(), vec![0.0, 0.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn tagged_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("series.dat");
        let grid = grid("2000-01-10", "2000-01-13");
        let series = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        write_tagged(&path, &grid, &series).unwrap();
        let (read_grid, read_series) = read_tagged(&path, 2, "t").unwrap();
        assert_eq!(read_grid, grid);
        assert_eq!(read_series, series);
    }

    #[test]
    fn text_file_roundtrip_keeps_nan() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("series.asc");
        let grid = grid("2000-01-10", "2000-01-13");
        let series = array![[1.0], [f64::NAN], [3.5]];
        write_text(&path, &grid, &series).unwrap();
        let (read_grid, read_series) = read_text(&path, 1, "t").unwrap();
        assert_eq!(read_grid, grid);
        assert_eq!(read_series[[0, 0]], 1.0);
        assert!(read_series[[1, 0]].is_nan());
        assert_eq!(read_series[[2, 0]], 3.5);
    }

    #[test]
    fn missing_file_is_reported_with_its_path() {
        let result = read_tagged(Path::new("/nowhere/series.dat"), 1, "t");
        assert!(matches!(
            result,
            Err(SequenceError::MissingExternalFile { .. })
        ));
    }

    #[test]
    fn step_size_mismatch_is_fatal_even_without_the_series_check() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("series.dat");
        let hourly = Timegrid::from_text("2000-01-10", "2000-01-11", "1h").unwrap();
        write_tagged(&path, &hourly, &Array2::zeros((24, 1))).unwrap();

        let mut ctx = RunContext::new(grid("2000-01-10", "2000-01-15"));
        ctx.options.check_series = false;
        let result = load_series(&path, FileType::Dat, &ctx, 1, f64::NAN, "t", "basin");
        assert!(matches!(
            result,
            Err(SequenceError::StepSizeMismatch { .. })
        ));
    }

    #[test]
    fn covered_window_is_sliced_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("series.dat");
        let data = grid("2000-01-05", "2000-01-20");
        let values = Array2::from_shape_fn((15, 1), |(row, _)| row as f64);
        write_tagged(&path, &data, &values).unwrap();

        let ctx = RunContext::new(grid("2000-01-10", "2000-01-15"));
        let series = load_series(&path, FileType::Dat, &ctx, 1, f64::NAN, "t", "basin").unwrap();
        assert_eq!(series.column(0).to_vec(), vec![5.0, 6.0, 7.0, 8.0, 9.0]);
    }

    #[test]
    fn short_series_fails_under_the_strict_check() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("series.dat");
        let data = grid("2000-01-12", "2000-01-15");
        write_tagged(&path, &data, &Array2::ones((3, 1))).unwrap();

        let ctx = RunContext::new(grid("2000-01-10", "2000-01-15"));
        let result = load_series(&path, FileType::Dat, &ctx, 1, f64::NAN, "t", "basin");
        assert!(matches!(result, Err(SequenceError::Coverage { .. })));

        let mut lenient = RunContext::new(grid("2000-01-10", "2000-01-15"));
        lenient.options.check_series = false;
        let series =
            load_series(&path, FileType::Dat, &lenient, 1, f64::NAN, "t", "basin").unwrap();
        assert!(series[[0, 0]].is_nan());
        assert!(series[[1, 0]].is_nan());
        assert_eq!(series.slice(s![2.., 0]).to_vec(), vec![1.0, 1.0, 1.0]);
    }
}
