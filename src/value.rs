//! Sequence value and shape management.
//!
//! A sequence's live value is either a bare float (0-dimensional) or a
//! fixed-shape float array (1- or 2-dimensional).  Assignments coerce their
//! right-hand side into the established shape: scalar-like inputs convert
//! to float, array inputs are broadcast-filled, and anything else is a
//! shape error.  The error values returned here are bare reason strings;
//! the owning sequence wraps them with its name and element context.

use ndarray::{ArrayD, IxDyn};

/// Floating point value type used throughout the engine.
pub type FloatValue = f64;

/// The live value of one sequence at one instant.
#[derive(Debug, Clone, PartialEq)]
pub enum SequenceValue {
    /// Value of a 0-dimensional sequence.
    Scalar(FloatValue),
    /// Value of a 1- or 2-dimensional sequence.
    Array(ArrayD<FloatValue>),
}

impl SequenceValue {
    /// Allocate an array value of the given shape, filled uniformly.
    pub fn filled(shape: &[usize], fill: FloatValue) -> Self {
        SequenceValue::Array(ArrayD::from_elem(IxDyn(shape), fill))
    }

    /// Per-axis lengths; empty for scalars.
    pub fn shape(&self) -> Vec<usize> {
        match self {
            SequenceValue::Scalar(_) => Vec::new(),
            SequenceValue::Array(array) => array.shape().to_vec(),
        }
    }

    /// Total number of elements (the record length of the sequence).
    pub fn length(&self) -> usize {
        match self {
            SequenceValue::Scalar(_) => 1,
            SequenceValue::Array(array) => array.len(),
        }
    }

    pub fn as_scalar(&self) -> Option<FloatValue> {
        match self {
            SequenceValue::Scalar(value) => Some(*value),
            SequenceValue::Array(_) => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayD<FloatValue>> {
        match self {
            SequenceValue::Scalar(_) => None,
            SequenceValue::Array(array) => Some(array),
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut ArrayD<FloatValue>> {
        match self {
            SequenceValue::Scalar(_) => None,
            SequenceValue::Array(array) => Some(array),
        }
    }

    /// Flatten to row-major element order (the on-record layout).
    pub fn to_flat(&self) -> Vec<FloatValue> {
        match self {
            SequenceValue::Scalar(value) => vec![*value],
            SequenceValue::Array(array) => array.iter().copied().collect(),
        }
    }

    /// Rebuild a value of the given shape from row-major elements.
    pub fn from_flat(shape: &[usize], values: &[FloatValue]) -> Result<Self, String> {
        if shape.is_empty() {
            if values.len() != 1 {
                return Err(format!(
                    "{} values cannot form a scalar record",
                    values.len()
                ));
            }
            return Ok(SequenceValue::Scalar(values[0]));
        }
        ArrayD::from_shape_vec(IxDyn(shape), values.to_vec())
            .map(SequenceValue::Array)
            .map_err(|_| {
                format!(
                    "{} values cannot form a record of shape {:?}",
                    values.len(),
                    shape
                )
            })
    }

    /// The call-style argument list of the canonical textual form, without
    /// the surrounding sequence name and parentheses.
    pub fn call_repr(&self) -> String {
        match self {
            SequenceValue::Scalar(value) => format_float(*value),
            SequenceValue::Array(array) if array.ndim() == 1 => array
                .iter()
                .map(|value| format_float(*value))
                .collect::<Vec<_>>()
                .join(", "),
            SequenceValue::Array(array) => {
                let rows: Vec<String> = array
                    .outer_iter()
                    .map(|row| {
                        let items: Vec<String> =
                            row.iter().map(|value| format_float(*value)).collect();
                        format!("[{}]", items.join(", "))
                    })
                    .collect();
                format!("[{}]", rows.join(", "))
            }
        }
    }
}

/// Right-hand side of a sequence assignment, as passed by model setup code
/// and condition initializer calls.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueArgs {
    Scalar(FloatValue),
    Vector(Vec<FloatValue>),
    Matrix(Vec<Vec<FloatValue>>),
}

impl From<FloatValue> for ValueArgs {
    fn from(value: FloatValue) -> Self {
        ValueArgs::Scalar(value)
    }
}

impl From<Vec<FloatValue>> for ValueArgs {
    fn from(values: Vec<FloatValue>) -> Self {
        ValueArgs::Vector(values)
    }
}

impl From<&[FloatValue]> for ValueArgs {
    fn from(values: &[FloatValue]) -> Self {
        ValueArgs::Vector(values.to_vec())
    }
}

/// Coerce an assignment into a bare float for a 0-dimensional sequence.
pub(crate) fn coerce_scalar(args: &ValueArgs) -> Result<FloatValue, String> {
    match args {
        ValueArgs::Scalar(value) => Ok(*value),
        ValueArgs::Vector(values) if values.len() == 1 => Ok(values[0]),
        ValueArgs::Vector(values) => Err(format!(
            "{} values are assigned to a scalar sequence, which is ambiguous",
            values.len()
        )),
        ValueArgs::Matrix(_) => {
            Err("a matrix cannot be assigned to a scalar sequence".to_string())
        }
    }
}

/// Coerce an assignment into the established array shape, broadcasting
/// where the trailing axis length matches.
pub(crate) fn coerce_array(
    shape: &[usize],
    args: &ValueArgs,
) -> Result<ArrayD<FloatValue>, String> {
    let broadcast_error = |given: usize| {
        format!("{given} values cannot be broadcast into shape {shape:?}")
    };
    match args {
        ValueArgs::Scalar(value) => Ok(ArrayD::from_elem(IxDyn(shape), *value)),
        ValueArgs::Vector(values) if values.len() == 1 => {
            Ok(ArrayD::from_elem(IxDyn(shape), values[0]))
        }
        ValueArgs::Vector(values) => match shape {
            [length] if values.len() == *length => {
                ArrayD::from_shape_vec(IxDyn(shape), values.clone())
                    .map_err(|_| broadcast_error(values.len()))
            }
            [rows, columns] if values.len() == *columns => {
                let mut flat = Vec::with_capacity(rows * columns);
                for _ in 0..*rows {
                    flat.extend_from_slice(values);
                }
                ArrayD::from_shape_vec(IxDyn(shape), flat)
                    .map_err(|_| broadcast_error(values.len()))
            }
            _ => Err(broadcast_error(values.len())),
        },
        ValueArgs::Matrix(rows) => match shape {
            [height, width]
                if rows.len() == *height && rows.iter().all(|row| row.len() == *width) =>
            {
                let flat: Vec<FloatValue> = rows.iter().flatten().copied().collect();
                ArrayD::from_shape_vec(IxDyn(shape), flat).map_err(|_| broadcast_error(flat_len(rows)))
            }
            _ => Err(format!(
                "a {}x{} matrix cannot be assigned to shape {shape:?}",
                rows.len(),
                rows.first().map_or(0, Vec::len),
            )),
        },
    }
}

fn flat_len(rows: &[Vec<FloatValue>]) -> usize {
    rows.iter().map(Vec::len).sum()
}

/// Canonical textual form of a single float: `nan` for not-a-number,
/// otherwise the shortest representation keeping a decimal point.
pub(crate) fn format_float(value: FloatValue) -> String {
    if value.is_nan() {
        "nan".to_string()
    } else {
        format!("{value:?}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_coercion() {
        assert_eq!(coerce_scalar(&ValueArgs::Scalar(1.5)).unwrap(), 1.5);
        assert_eq!(coerce_scalar(&ValueArgs::Vector(vec![2.5])).unwrap(), 2.5);
    }

    #[test]
    fn ambiguous_value_count_is_an_error() {
        let result = coerce_scalar(&ValueArgs::Vector(vec![1.0, 2.0]));
        assert!(result.unwrap_err().contains("ambiguous"));
    }

    #[test]
    fn scalar_broadcast_fills_the_whole_shape() {
        let array = coerce_array(&[2, 3], &ValueArgs::Scalar(4.0)).unwrap();
        assert_eq!(array.shape(), &[2, 3]);
        assert!(array.iter().all(|value| *value == 4.0));
    }

    #[test]
    fn vector_broadcasts_across_rows() {
        let array = coerce_array(&[2, 3], &ValueArgs::Vector(vec![1.0, 2.0, 3.0])).unwrap();
        assert_eq!(array.shape(), &[2, 3]);
        assert_eq!(array[[0, 2]], 3.0);
        assert_eq!(array[[1, 0]], 1.0);
    }

    #[test]
    fn mismatched_vector_is_an_error() {
        let result = coerce_array(&[3], &ValueArgs::Vector(vec![1.0, 2.0]));
        assert!(result.unwrap_err().contains("broadcast"));
    }

    #[test]
    fn matrix_assignment_must_match_exactly() {
        let rows = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let array = coerce_array(&[2, 2], &ValueArgs::Matrix(rows.clone())).unwrap();
        assert_eq!(array[[1, 1]], 4.0);
        assert!(coerce_array(&[3, 2], &ValueArgs::Matrix(rows)).is_err());
    }

    #[test]
    fn flat_roundtrip_preserves_row_major_order() {
        let value = SequenceValue::from_flat(&[2, 2], &[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(value.to_flat(), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(value.shape(), vec![2, 2]);
        assert_eq!(value.length(), 4);
    }

    #[test]
    fn call_reprs() {
        assert_eq!(SequenceValue::Scalar(1.5).call_repr(), "1.5");
        assert_eq!(SequenceValue::Scalar(f64::NAN).call_repr(), "nan");
        let vector = SequenceValue::from_flat(&[2], &[1.0, 2.5]).unwrap();
        assert_eq!(vector.call_repr(), "1.0, 2.5");
        let matrix = SequenceValue::from_flat(&[2, 2], &[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(matrix.call_repr(), "[[1.0, 2.0], [3.0, 4.0]]");
    }
}
