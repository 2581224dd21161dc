//! Zero-copy pointer links between models.
//!
//! A link sequence owns no value storage.  Each of its elements references
//! one shared mutable scalar cell, conceptually owned by the upstream
//! ("outlet") side and referenced by the downstream ("inlet") side, so that
//! a value written upstream is visible downstream without any copy call.
//! Cell identities are fixed at network-wiring time; the only sanctioned
//! rewiring is a full [`LinkSequence::set_shape`] reset.

use crate::errors::{SequenceError, SequenceResult};
use crate::sequence::SequenceDef;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// A shared mutable scalar cell.
///
/// Cloning produces another reference to the same cell.  The owning side
/// is a convention, not a type distinction: the upstream sequence creates
/// the cell, every downstream sequence holds a counted reference, and
/// ownership never transfers during a run.
#[derive(Clone, Default)]
pub struct DoubleCell(Rc<Cell<f64>>);

impl DoubleCell {
    pub fn new(value: f64) -> Self {
        Self(Rc::new(Cell::new(value)))
    }

    pub fn get(&self) -> f64 {
        self.0.get()
    }

    pub fn set(&self, value: f64) {
        self.0.set(value);
    }

    /// Accumulate-add, supporting multiple sequential contributions within
    /// one time step.
    pub fn add(&self, value: f64) {
        self.0.set(self.0.get() + value);
    }

    /// Whether two handles reference the same cell.
    pub fn ptr_eq(&self, other: &DoubleCell) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for DoubleCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DoubleCell({})", self.get())
    }
}

#[derive(Debug)]
enum LinkSlots {
    /// 0-dimensional link: a single cell reference.
    Scalar(Option<DoubleCell>),
    /// 1-dimensional link: an ordered, fixed-length list of cell
    /// references, one per connected element.
    Vector(Vec<Option<DoubleCell>>),
}

/// An inlet or outlet sequence aliasing shared cells across a model
/// boundary.
///
/// Reading and writing go through the referenced cells, never through
/// sequence-local memory; summing the contributions of a multi-element
/// link is the consuming model equation's job.
#[derive(Debug)]
pub struct LinkSequence {
    def: SequenceDef,
    element: String,
    slots: LinkSlots,
}

impl LinkSequence {
    pub fn new(def: SequenceDef, element: impl Into<String>) -> Self {
        let slots = match def.ndim {
            0 => LinkSlots::Scalar(None),
            _ => LinkSlots::Vector(Vec::new()),
        };
        Self {
            def,
            element: element.into(),
            slots,
        }
    }

    pub fn name(&self) -> &str {
        self.def.name
    }

    pub fn ndim(&self) -> usize {
        self.def.ndim
    }

    /// Number of connected elements (1 for a wired 0-dimensional link).
    pub fn len(&self) -> usize {
        match &self.slots {
            LinkSlots::Scalar(cell) => usize::from(cell.is_some()),
            LinkSlots::Vector(cells) => cells.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reallocate the slot list of a 1-dimensional link, discarding every
    /// existing cell reference.  This is the explicit full reset that any
    /// topology change requires.
    pub fn set_shape(&mut self, length: usize) -> SequenceResult<()> {
        match &mut self.slots {
            LinkSlots::Scalar(_) => Err(self.wiring_error(
                "a 0-dimensional link sequence has no shape to set".to_string(),
            )),
            LinkSlots::Vector(cells) => {
                cells.clear();
                cells.resize_with(length, || None);
                Ok(())
            }
        }
    }

    /// Wire the single cell of a 0-dimensional link.
    pub fn connect(&mut self, cell: DoubleCell) -> SequenceResult<()> {
        match &mut self.slots {
            LinkSlots::Scalar(slot) => {
                if slot.is_some() {
                    return Err(self.wiring_error(
                        "the cell is already wired; rewiring requires an explicit reset"
                            .to_string(),
                    ));
                }
                *slot = Some(cell);
                Ok(())
            }
            LinkSlots::Vector(_) => Err(self.wiring_error(
                "a 1-dimensional link sequence must be wired element-wise".to_string(),
            )),
        }
    }

    /// Wire the cell of element `idx` of a 1-dimensional link.
    pub fn connect_at(&mut self, idx: usize, cell: DoubleCell) -> SequenceResult<()> {
        match &mut self.slots {
            LinkSlots::Scalar(_) => Err(self.wiring_error(
                "a 0-dimensional link sequence has exactly one cell".to_string(),
            )),
            LinkSlots::Vector(cells) => {
                let length = cells.len();
                match cells.get_mut(idx) {
                    None => Err(self.wiring_error(format!(
                        "element index {idx} is out of range for length {length}"
                    ))),
                    Some(Some(_)) => Err(self.wiring_error(format!(
                        "element {idx} is already wired; rewiring requires an explicit reset"
                    ))),
                    Some(slot) => {
                        *slot = Some(cell);
                        Ok(())
                    }
                }
            }
        }
    }

    /// The cell of element `idx` (use 0 for 0-dimensional links).
    pub fn cell(&self, idx: usize) -> SequenceResult<&DoubleCell> {
        let unwired = |reason: String| SequenceError::Wiring {
            sequence: self.def.name.to_string(),
            element: self.element.clone(),
            reason,
        };
        match &self.slots {
            LinkSlots::Scalar(slot) => slot
                .as_ref()
                .ok_or_else(|| unwired("the cell has not been wired yet".to_string())),
            LinkSlots::Vector(cells) => cells
                .get(idx)
                .ok_or_else(|| unwired(format!("element index {idx} is out of range")))?
                .as_ref()
                .ok_or_else(|| unwired(format!("element {idx} has not been wired yet"))),
        }
    }

    /// Iterate over all wired cells in element order.
    pub fn cells(&self) -> impl Iterator<Item = &DoubleCell> {
        let slots: &[Option<DoubleCell>] = match &self.slots {
            LinkSlots::Scalar(slot) => std::slice::from_ref(slot),
            LinkSlots::Vector(cells) => cells,
        };
        slots.iter().flatten()
    }

    fn wiring_error(&self, reason: String) -> SequenceError {
        SequenceError::Wiring {
            sequence: self.def.name.to_string(),
            element: self.element.clone(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::SequenceDef;

    fn scalar_link() -> LinkSequence {
        LinkSequence::new(SequenceDef::new("q", 0, true), "stream_1")
    }

    #[test]
    fn writes_are_visible_through_every_reference() {
        let cell = DoubleCell::new(0.0);
        let mut link = scalar_link();
        link.connect(cell.clone()).unwrap();
        cell.add(1.5);
        cell.add(2.0);
        assert_eq!(link.cell(0).unwrap().get(), 3.5);
        assert!(link.cell(0).unwrap().ptr_eq(&cell));
    }

    #[test]
    fn rewiring_without_reset_is_rejected() {
        let mut link = scalar_link();
        link.connect(DoubleCell::new(0.0)).unwrap();
        let result = link.connect(DoubleCell::new(1.0));
        assert!(matches!(result, Err(SequenceError::Wiring { .. })));
    }

    #[test]
    fn vector_link_keeps_element_order() {
        let mut link = LinkSequence::new(SequenceDef::new("total", 1, true), "node_3");
        link.set_shape(2).unwrap();
        let upstream_a = DoubleCell::new(1.0);
        let upstream_b = DoubleCell::new(2.0);
        link.connect_at(0, upstream_a.clone()).unwrap();
        link.connect_at(1, upstream_b.clone()).unwrap();
        assert_eq!(link.len(), 2);
        let seen: Vec<f64> = link.cells().map(DoubleCell::get).collect();
        assert_eq!(seen, vec![1.0, 2.0]);
        assert!(link.connect_at(2, DoubleCell::new(0.0)).is_err());
        assert!(link.connect_at(1, DoubleCell::new(0.0)).is_err());
    }

    #[test]
    fn full_reset_discards_all_cells() {
        let mut link = LinkSequence::new(SequenceDef::new("total", 1, true), "node_3");
        link.set_shape(1).unwrap();
        link.connect_at(0, DoubleCell::new(4.0)).unwrap();
        link.set_shape(1).unwrap();
        assert!(link.cell(0).is_err());
    }
}
