//! Node sequences: the exchange points between model elements.
//!
//! A node carries exactly two 0-dimensional sequences.  The simulation
//! sequence (`sim`) holds the value the connected models exchange during
//! the current step; the observation sequence (`obs`) holds the measured
//! counterpart for comparison.  Both are persisted like any other series
//! sequence, but their live value is a shared [`DoubleCell`] so that link
//! sequences of neighboring models can alias it directly.
//!
//! Missing or unreadable backing files are handled leniently here: the
//! requested series mode is dropped with a warning instead of failing the
//! whole setup, since observation files in particular are routinely absent.
//! Step size mismatches and coverage violations stay fatal.

use crate::errors::{SequenceError, SequenceResult};
use crate::link::DoubleCell;
use crate::options::{Options, RunContext};
use crate::sequence::{DirKind, IoSequence, SequenceDef, SequenceKind};
use crate::value::FloatValue;
use log::warn;
use ndarray::Array2;

const SIM_DEF: SequenceDef = SequenceDef::new("sim", 0, false);
const OBS_DEF: SequenceDef = SequenceDef::new("obs", 0, false);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeRole {
    Sim,
    Obs,
}

/// One cell-backed 0-dimensional sequence of a node.
#[derive(Debug)]
pub struct NodeSequence {
    io: IoSequence,
    cell: DoubleCell,
    role: NodeRole,
}

impl NodeSequence {
    fn new(role: NodeRole, node: &str, variable: &str, options: &Options) -> Self {
        let (def, use_ext) = match role {
            NodeRole::Sim => (SIM_DEF, false),
            NodeRole::Obs => (OBS_DEF, true),
        };
        let rawfilename = format!("{}_{}_{}", node, def.name, variable.to_lowercase());
        Self {
            io: IoSequence::with_naming(
                def,
                SequenceKind::Input,
                node,
                rawfilename,
                DirKind::Node,
                use_ext,
                options,
            ),
            cell: DoubleCell::new(0.0),
            role,
        }
    }

    /// The sequence of simulated values exchanged between models.
    pub fn sim(node: &str, variable: &str, options: &Options) -> Self {
        Self::new(NodeRole::Sim, node, variable, options)
    }

    /// The sequence of observed values read from external data.
    pub fn obs(node: &str, variable: &str, options: &Options) -> Self {
        Self::new(NodeRole::Obs, node, variable, options)
    }

    pub fn name(&self) -> &str {
        self.io.name()
    }

    pub fn node(&self) -> &str {
        self.io.sequence().element()
    }

    /// The shared cell carrying the live value.  Link sequences of
    /// neighboring models wire themselves to clones of this handle.
    pub fn cell(&self) -> &DoubleCell {
        &self.cell
    }

    pub fn get(&self) -> FloatValue {
        self.cell.get()
    }

    pub fn set(&self, value: FloatValue) {
        self.cell.set(value);
    }

    /// The persistence side of the sequence.
    pub fn io(&self) -> &IoSequence {
        &self.io
    }

    pub fn io_mut(&mut self) -> &mut IoSequence {
        &mut self.io
    }

    /// Replay previously stored series data instead of starting from zero
    /// records on the next activation.  Only meaningful for the simulation
    /// sequence; the observation sequence always reads external data.
    pub fn set_read_external(&mut self, read: bool) {
        if self.role == NodeRole::Sim {
            self.io.set_use_ext(read);
        }
    }

    pub fn ram_flag(&self) -> bool {
        self.io.ram_flag()
    }

    pub fn disk_flag(&self) -> bool {
        self.io.disk_flag()
    }

    pub fn memory_flag(&self) -> bool {
        self.io.memory_flag()
    }

    /// Request RAM mode, downgrading with a warning when the backing file
    /// is missing or unreadable.
    pub fn activate_ram(&mut self, ctx: &RunContext) -> SequenceResult<()> {
        let result = self.io.activate_ram(ctx);
        self.absorb_missing_file(ctx, result)
    }

    /// Request disk mode, downgrading like [`NodeSequence::activate_ram`].
    pub fn activate_disk(&mut self, ctx: &RunContext) -> SequenceResult<()> {
        let result = self.io.activate_disk(ctx);
        self.absorb_missing_file(ctx, result)
    }

    pub fn deactivate_ram(&mut self) {
        self.io.deactivate_ram();
    }

    pub fn deactivate_disk(&mut self) -> SequenceResult<()> {
        self.io.deactivate_disk()
    }

    pub fn series(&self, ctx: &RunContext) -> SequenceResult<Array2<FloatValue>> {
        self.io.series(ctx)
    }

    pub fn set_series(
        &mut self,
        ctx: &RunContext,
        series: &Array2<FloatValue>,
    ) -> SequenceResult<()> {
        self.io.set_series(ctx, series)
    }

    /// Whether a series mode is active and covers every step with an
    /// actual value.
    pub fn series_complete(&self, ctx: &RunContext) -> SequenceResult<bool> {
        if !self.io.memory_flag() {
            return Ok(false);
        }
        Ok(self.io.series(ctx)?.iter().all(|value| !value.is_nan()))
    }

    pub fn open_file(&mut self, idx: usize) -> SequenceResult<()> {
        self.io.open_file(idx)
    }

    pub fn close_file(&mut self) {
        self.io.close_file();
    }

    /// Fill the cell from the series record of step `idx`.
    pub fn load_data(&mut self, idx: usize) -> SequenceResult<()> {
        self.io.load_data(idx)?;
        if self.io.memory_flag() {
            self.cell.set(self.io.scalar()?);
        }
        Ok(())
    }

    /// Persist the cell as the series record of step `idx`.
    pub fn save_data(&mut self, idx: usize) -> SequenceResult<()> {
        let value = self.cell.get();
        self.io.set_scalar(value)?;
        self.io.save_data(idx)
    }

    pub fn save_ext(&self, ctx: &RunContext) -> SequenceResult<()> {
        self.io.save_ext(ctx)
    }

    fn absorb_missing_file(
        &mut self,
        ctx: &RunContext,
        result: SequenceResult<()>,
    ) -> SequenceResult<()> {
        let err = match result {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };
        match err {
            SequenceError::MissingExternalFile { .. }
            | SequenceError::Parse { .. }
            | SequenceError::Io(_) => {
                let wanted = match self.role {
                    NodeRole::Sim => ctx.options.warn_missing_sim_file,
                    NodeRole::Obs => ctx.options.warn_missing_obs_file,
                };
                if wanted {
                    warn!(
                        "no series data will be available for sequence `{}` of node `{}`: {err}",
                        self.name(),
                        self.node()
                    );
                }
                Ok(())
            }
            fatal => Err(fatal),
        }
    }
}

/// The sequence pair of one node.
#[derive(Debug)]
pub struct NodeSequences {
    pub sim: NodeSequence,
    pub obs: NodeSequence,
}

impl NodeSequences {
    pub fn new(node: &str, variable: &str, options: &Options) -> Self {
        Self {
            sim: NodeSequence::sim(node, variable, options),
            obs: NodeSequence::obs(node, variable, options),
        }
    }

    pub fn open_files(&mut self, idx: usize) -> SequenceResult<()> {
        self.sim.open_file(idx)?;
        self.obs.open_file(idx)
    }

    pub fn close_files(&mut self) {
        self.sim.close_file();
        self.obs.close_file();
    }

    /// Fill both cells from their series records.
    pub fn load_data(&mut self, idx: usize) -> SequenceResult<()> {
        self.sim.load_data(idx)?;
        self.obs.load_data(idx)
    }

    /// Persist the simulated value.  Observations are external data and
    /// never written back per step.
    pub fn save_data(&mut self, idx: usize) -> SequenceResult<()> {
        self.sim.save_data(idx)
    }
}
