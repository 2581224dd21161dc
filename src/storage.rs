//! Per-sequence series storage: RAM buffers, run-scratch disk files and
//! the binary record codec.
//!
//! Every persisted sequence owns one [`SeriesStorage`] descriptor holding
//! its mode flags, its RAM buffer or scratch-file path, and the open file
//! handle while a run is in progress.  A record is the flat row-major
//! concatenation of one step's elements as 8-byte little-endian floats,
//! with no per-record header; shape and length always come from the
//! sequence metadata, never from the file.
//!
//! Disk mode relies on the run's strictly ordered step indices: the handle
//! is positioned once via [`SeriesStorage::open_file`] and every subsequent
//! [`read_record`](SeriesStorage::read_record) /
//! [`write_record`](SeriesStorage::write_record) continues from the current
//! file position.

use ndarray::Array2;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Encoded size of one element.
pub const BYTES_PER_VALUE: usize = 8;

/// Encode one record as flat little-endian bytes.
pub fn encode_record(values: &[f64]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(values.len() * BYTES_PER_VALUE);
    for value in values {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Decode flat little-endian bytes back into values.
pub fn decode_record(bytes: &[u8]) -> io::Result<Vec<f64>> {
    if bytes.len() % BYTES_PER_VALUE != 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("{} bytes do not form whole records", bytes.len()),
        ));
    }
    Ok(bytes
        .chunks_exact(BYTES_PER_VALUE)
        .map(|chunk| {
            let mut raw = [0u8; BYTES_PER_VALUE];
            raw.copy_from_slice(chunk);
            f64::from_le_bytes(raw)
        })
        .collect())
}

/// Storage descriptor of one sequence: mode flags, RAM buffer, scratch
/// file path and the open handle.
///
/// At most one of the RAM and disk flags is active at a time; with both
/// inactive only the live value exists and no series is available.
#[derive(Debug, Default)]
pub struct SeriesStorage {
    ramflag: bool,
    diskflag: bool,
    array: Option<Array2<f64>>,
    path: Option<PathBuf>,
    file: Option<File>,
}

impl SeriesStorage {
    pub fn ram_flag(&self) -> bool {
        self.ramflag
    }

    pub fn disk_flag(&self) -> bool {
        self.diskflag
    }

    /// Whether any series data is being kept (RAM or disk).
    pub fn memory_flag(&self) -> bool {
        self.ramflag || self.diskflag
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Enter RAM mode with the given series buffer (steps × record length).
    pub fn enter_ram(&mut self, series: Array2<f64>) {
        debug_assert!(!self.diskflag);
        self.ramflag = true;
        self.array = Some(series);
    }

    /// Enter disk mode, writing the full series to the scratch file.
    pub fn enter_disk(&mut self, path: PathBuf, series: &Array2<f64>) -> io::Result<()> {
        debug_assert!(!self.ramflag);
        let mut bytes = Vec::with_capacity(series.len() * BYTES_PER_VALUE);
        for row in series.outer_iter() {
            let values: Vec<f64> = row.iter().copied().collect();
            bytes.extend_from_slice(&encode_record(&values));
        }
        fs::write(&path, bytes)?;
        self.diskflag = true;
        self.path = Some(path);
        Ok(())
    }

    /// Leave RAM mode, releasing the buffer.
    pub fn leave_ram(&mut self) {
        if self.ramflag {
            self.ramflag = false;
            self.array = None;
        }
    }

    /// Leave disk mode, closing the handle and deleting the scratch file.
    pub fn leave_disk(&mut self) -> io::Result<()> {
        if self.diskflag {
            self.diskflag = false;
            self.file = None;
            if let Some(path) = self.path.take() {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    /// Open the scratch file and seek to the record of step `idx`.
    ///
    /// A no-op unless disk mode is active.
    pub fn open_file(&mut self, idx: usize, record_len: usize) -> io::Result<()> {
        if !self.diskflag {
            return Ok(());
        }
        let path = self.path.as_ref().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "no scratch file path is set")
        })?;
        let mut file = OpenOptions::new().read(true).write(true).open(path)?;
        file.seek(SeekFrom::Start((idx * record_len * BYTES_PER_VALUE) as u64))?;
        self.file = Some(file);
        Ok(())
    }

    /// Release the file handle, if any.  Safe to call in any mode.
    pub fn close_file(&mut self) {
        self.file = None;
    }

    /// Read the next record (disk) or the record of step `idx` (RAM).
    ///
    /// Returns `None` when no series mode is active.
    pub fn read_record(&mut self, idx: usize, record_len: usize) -> io::Result<Option<Vec<f64>>> {
        if self.diskflag {
            let file = self.file.as_mut().ok_or_else(not_open)?;
            let mut bytes = vec![0u8; record_len * BYTES_PER_VALUE];
            file.read_exact(&mut bytes)?;
            decode_record(&bytes).map(Some)
        } else if self.ramflag {
            let array = self.array.as_ref().ok_or_else(not_open)?;
            Ok(Some(array.row(idx).iter().copied().collect()))
        } else {
            Ok(None)
        }
    }

    /// Write the next record (disk) or the record of step `idx` (RAM).
    ///
    /// A no-op when no series mode is active.
    pub fn write_record(&mut self, idx: usize, values: &[f64]) -> io::Result<()> {
        if self.diskflag {
            let file = self.file.as_mut().ok_or_else(not_open)?;
            file.write_all(&encode_record(values))?;
        } else if self.ramflag {
            let array = self.array.as_mut().ok_or_else(not_open)?;
            for (slot, value) in array.row_mut(idx).iter_mut().zip(values) {
                *slot = *value;
            }
        }
        Ok(())
    }

    /// The complete series as a (steps × record length) array, or `None`
    /// when no series mode is active.
    ///
    /// In disk mode the scratch file is read through a dedicated handle,
    /// leaving the run handle's position untouched.
    pub fn series(&self, steps: usize, record_len: usize) -> io::Result<Option<Array2<f64>>> {
        if self.diskflag {
            let path = self.path.as_ref().ok_or_else(not_open)?;
            let values = decode_record(&fs::read(path)?)?;
            Array2::from_shape_vec((steps, record_len), values)
                .map(Some)
                .map_err(|_| {
                    io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("scratch file does not hold {steps} x {record_len} values"),
                    )
                })
        } else if self.ramflag {
            Ok(self.array.clone())
        } else {
            Ok(None)
        }
    }

    /// Overwrite the complete series in the active mode.
    ///
    /// Returns `false` when no series mode is active.
    pub fn set_series(&mut self, series: &Array2<f64>) -> io::Result<bool> {
        if self.diskflag {
            let path = self.path.clone().ok_or_else(not_open)?;
            let mut bytes = Vec::with_capacity(series.len() * BYTES_PER_VALUE);
            for row in series.outer_iter() {
                let values: Vec<f64> = row.iter().copied().collect();
                bytes.extend_from_slice(&encode_record(&values));
            }
            fs::write(path, bytes)?;
            Ok(true)
        } else if self.ramflag {
            self.array = Some(series.clone());
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

fn not_open() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "series storage is not open")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn record_codec_roundtrip() {
        let values = [1.0, -2.5, f64::MAX, 0.0];
        let bytes = encode_record(&values);
        assert_eq!(bytes.len(), 4 * BYTES_PER_VALUE);
        assert_eq!(decode_record(&bytes).unwrap(), values);
    }

    #[test]
    fn codec_preserves_nan_bits() {
        let bytes = encode_record(&[f64::NAN]);
        let decoded = decode_record(&bytes).unwrap();
        assert!(decoded[0].is_nan());
    }

    #[test]
    fn truncated_records_are_rejected() {
        assert!(decode_record(&[0u8; 12]).is_err());
    }

    #[test]
    fn ram_records() {
        let mut storage = SeriesStorage::default();
        storage.enter_ram(Array2::zeros((3, 2)));
        storage.write_record(1, &[4.0, 5.0]).unwrap();
        assert_eq!(storage.read_record(1, 2).unwrap().unwrap(), vec![4.0, 5.0]);
        assert_eq!(storage.read_record(0, 2).unwrap().unwrap(), vec![0.0, 0.0]);
        storage.leave_ram();
        assert!(storage.read_record(0, 2).unwrap().is_none());
    }

    #[test]
    fn disk_records_positional_open_and_sequential_access() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seq.bin");
        let mut storage = SeriesStorage::default();
        storage
            .enter_disk(path.clone(), &array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]])
            .unwrap();

        // Open at step 1 and read the remaining records sequentially.
        storage.open_file(1, 2).unwrap();
        assert_eq!(storage.read_record(1, 2).unwrap().unwrap(), vec![3.0, 4.0]);
        assert_eq!(storage.read_record(2, 2).unwrap().unwrap(), vec![5.0, 6.0]);
        storage.close_file();

        // Overwrite the middle record in place.
        storage.open_file(1, 2).unwrap();
        storage.write_record(1, &[30.0, 40.0]).unwrap();
        storage.close_file();
        let series = storage.series(3, 2).unwrap().unwrap();
        assert_eq!(series, array![[1.0, 2.0], [30.0, 40.0], [5.0, 6.0]]);

        storage.leave_disk().unwrap();
        assert!(!path.exists());
    }
}
