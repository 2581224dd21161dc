//! Category containers and the per-element sequence aggregate.
//!
//! A model type declares its sequences once, per category and in a fixed
//! order, through a [`ModelSequencesSpec`].  Instantiating the spec for an
//! element yields a [`ModelSequences`] aggregate whose containers preserve
//! that declaration order in every iteration and batch operation, keeping
//! run output deterministic.
//!
//! The batch operations mirror the per-step duties of the simulation loop:
//! inputs are loaded before the equations run, fluxes and states are saved
//! afterwards, states are committed once per step, and condition-bearing
//! sequences can be reset to their initializer arguments between runs.

use crate::errors::{SequenceError, SequenceResult};
use crate::link::LinkSequence;
use crate::options::{Options, RunContext};
use crate::sequence::{
    IoSequence, LogSequence, Sequence, SequenceDef, SequenceKind, StateSequence,
};

/// Declaration-ordered container of the persisted sequences of one
/// category (inputs or fluxes).
#[derive(Debug)]
pub struct IoSequences {
    element: String,
    seqs: Vec<IoSequence>,
}

impl IoSequences {
    pub fn inputs(defs: &[SequenceDef], element: &str, options: &Options) -> Self {
        Self::with_kind(SequenceKind::Input, defs, element, options)
    }

    pub fn fluxes(defs: &[SequenceDef], element: &str, options: &Options) -> Self {
        Self::with_kind(SequenceKind::Flux, defs, element, options)
    }

    fn with_kind(
        kind: SequenceKind,
        defs: &[SequenceDef],
        element: &str,
        options: &Options,
    ) -> Self {
        Self {
            element: element.to_string(),
            seqs: defs
                .iter()
                .map(|def| IoSequence::new_model(*def, kind, element, options))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.seqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seqs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &IoSequence> {
        self.seqs.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut IoSequence> {
        self.seqs.iter_mut()
    }

    pub fn get(&self, name: &str) -> SequenceResult<&IoSequence> {
        self.seqs
            .iter()
            .find(|seq| seq.name() == name)
            .ok_or_else(|| unknown(name, &self.element))
    }

    pub fn get_mut(&mut self, name: &str) -> SequenceResult<&mut IoSequence> {
        let element = self.element.clone();
        self.seqs
            .iter_mut()
            .find(|seq| seq.name() == name)
            .ok_or_else(|| unknown(name, &element))
    }

    /// Request RAM mode for all sequences, or for the named subset only.
    pub fn activate_ram(&mut self, ctx: &RunContext, names: Option<&[&str]>) -> SequenceResult<()> {
        self.check_names(names)?;
        for seq in self.seqs.iter_mut().filter(|seq| selected(names, seq.name())) {
            seq.activate_ram(ctx)?;
        }
        Ok(())
    }

    /// Request disk mode for all sequences, or for the named subset only.
    pub fn activate_disk(
        &mut self,
        ctx: &RunContext,
        names: Option<&[&str]>,
    ) -> SequenceResult<()> {
        self.check_names(names)?;
        for seq in self.seqs.iter_mut().filter(|seq| selected(names, seq.name())) {
            seq.activate_disk(ctx)?;
        }
        Ok(())
    }

    pub fn deactivate_ram(&mut self, names: Option<&[&str]>) -> SequenceResult<()> {
        self.check_names(names)?;
        for seq in self.seqs.iter_mut().filter(|seq| selected(names, seq.name())) {
            seq.deactivate_ram();
        }
        Ok(())
    }

    pub fn deactivate_disk(&mut self, names: Option<&[&str]>) -> SequenceResult<()> {
        self.check_names(names)?;
        for seq in self.seqs.iter_mut().filter(|seq| selected(names, seq.name())) {
            seq.deactivate_disk()?;
        }
        Ok(())
    }

    fn check_names(&self, names: Option<&[&str]>) -> SequenceResult<()> {
        let Some(names) = names else {
            return Ok(());
        };
        for name in names {
            if !self.seqs.iter().any(|seq| seq.name() == *name) {
                return Err(unknown(name, &self.element));
            }
        }
        Ok(())
    }

    pub fn open_files(&mut self, idx: usize) -> SequenceResult<()> {
        for seq in &mut self.seqs {
            seq.open_file(idx)?;
        }
        Ok(())
    }

    pub fn close_files(&mut self) {
        for seq in &mut self.seqs {
            seq.close_file();
        }
    }

    pub fn load_data(&mut self, idx: usize) -> SequenceResult<()> {
        for seq in &mut self.seqs {
            seq.load_data(idx)?;
        }
        Ok(())
    }

    pub fn save_data(&mut self, idx: usize) -> SequenceResult<()> {
        for seq in &mut self.seqs {
            seq.save_data(idx)?;
        }
        Ok(())
    }
}

/// Declaration-ordered container of the state sequences of one element.
#[derive(Debug)]
pub struct StateSequences {
    element: String,
    seqs: Vec<StateSequence>,
}

impl StateSequences {
    pub fn new(defs: &[SequenceDef], element: &str, options: &Options) -> Self {
        Self {
            element: element.to_string(),
            seqs: defs
                .iter()
                .map(|def| StateSequence::new(*def, element, options))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.seqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seqs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StateSequence> {
        self.seqs.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut StateSequence> {
        self.seqs.iter_mut()
    }

    pub fn get(&self, name: &str) -> SequenceResult<&StateSequence> {
        self.seqs
            .iter()
            .find(|seq| seq.name() == name)
            .ok_or_else(|| unknown(name, &self.element))
    }

    pub fn get_mut(&mut self, name: &str) -> SequenceResult<&mut StateSequence> {
        let element = self.element.clone();
        self.seqs
            .iter_mut()
            .find(|seq| seq.name() == name)
            .ok_or_else(|| unknown(name, &element))
    }

    /// Request RAM mode for all states, or for the named subset only.
    pub fn activate_ram(&mut self, ctx: &RunContext, names: Option<&[&str]>) -> SequenceResult<()> {
        self.check_names(names)?;
        for seq in self.seqs.iter_mut().filter(|seq| selected(names, seq.name())) {
            seq.io_mut().activate_ram(ctx)?;
        }
        Ok(())
    }

    /// Request disk mode for all states, or for the named subset only.
    pub fn activate_disk(
        &mut self,
        ctx: &RunContext,
        names: Option<&[&str]>,
    ) -> SequenceResult<()> {
        self.check_names(names)?;
        for seq in self.seqs.iter_mut().filter(|seq| selected(names, seq.name())) {
            seq.io_mut().activate_disk(ctx)?;
        }
        Ok(())
    }

    pub fn deactivate_ram(&mut self, names: Option<&[&str]>) -> SequenceResult<()> {
        self.check_names(names)?;
        for seq in self.seqs.iter_mut().filter(|seq| selected(names, seq.name())) {
            seq.io_mut().deactivate_ram();
        }
        Ok(())
    }

    pub fn deactivate_disk(&mut self, names: Option<&[&str]>) -> SequenceResult<()> {
        self.check_names(names)?;
        for seq in self.seqs.iter_mut().filter(|seq| selected(names, seq.name())) {
            seq.io_mut().deactivate_disk()?;
        }
        Ok(())
    }

    fn check_names(&self, names: Option<&[&str]>) -> SequenceResult<()> {
        let Some(names) = names else {
            return Ok(());
        };
        for name in names {
            if !self.seqs.iter().any(|seq| seq.name() == *name) {
                return Err(unknown(name, &self.element));
            }
        }
        Ok(())
    }

    /// Commit every state at the end of a successful step.
    pub fn new2old(&mut self) -> SequenceResult<()> {
        for seq in &mut self.seqs {
            seq.new2old()?;
        }
        Ok(())
    }

    /// Re-apply every state's initializer arguments.
    pub fn reset(&mut self) -> SequenceResult<()> {
        for seq in &mut self.seqs {
            seq.reset()?;
        }
        Ok(())
    }

    pub fn open_files(&mut self, idx: usize) -> SequenceResult<()> {
        for seq in &mut self.seqs {
            seq.io_mut().open_file(idx)?;
        }
        Ok(())
    }

    pub fn close_files(&mut self) {
        for seq in &mut self.seqs {
            seq.io_mut().close_file();
        }
    }

    pub fn save_data(&mut self, idx: usize) -> SequenceResult<()> {
        for seq in &mut self.seqs {
            seq.io_mut().save_data(idx)?;
        }
        Ok(())
    }
}

/// Declaration-ordered container of the log sequences of one element.
#[derive(Debug)]
pub struct LogSequences {
    element: String,
    seqs: Vec<LogSequence>,
}

impl LogSequences {
    pub fn new(defs: &[SequenceDef], element: &str, options: &Options) -> Self {
        Self {
            element: element.to_string(),
            seqs: defs
                .iter()
                .map(|def| LogSequence::new(*def, element, options))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.seqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seqs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LogSequence> {
        self.seqs.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut LogSequence> {
        self.seqs.iter_mut()
    }

    pub fn get(&self, name: &str) -> SequenceResult<&LogSequence> {
        self.seqs
            .iter()
            .find(|seq| seq.name() == name)
            .ok_or_else(|| unknown(name, &self.element))
    }

    pub fn get_mut(&mut self, name: &str) -> SequenceResult<&mut LogSequence> {
        let element = self.element.clone();
        self.seqs
            .iter_mut()
            .find(|seq| seq.name() == name)
            .ok_or_else(|| unknown(name, &element))
    }

    pub fn reset(&mut self) -> SequenceResult<()> {
        for seq in &mut self.seqs {
            seq.reset()?;
        }
        Ok(())
    }
}

/// Declaration-ordered container of the aide sequences of one element.
/// Pure per-step scratch values, never persisted.
#[derive(Debug)]
pub struct AideSequences {
    element: String,
    seqs: Vec<Sequence>,
}

impl AideSequences {
    pub fn new(defs: &[SequenceDef], element: &str, options: &Options) -> Self {
        Self {
            element: element.to_string(),
            seqs: defs
                .iter()
                .map(|def| Sequence::new(*def, element, options))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.seqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seqs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sequence> {
        self.seqs.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Sequence> {
        self.seqs.iter_mut()
    }

    pub fn get(&self, name: &str) -> SequenceResult<&Sequence> {
        self.seqs
            .iter()
            .find(|seq| seq.name() == name)
            .ok_or_else(|| unknown(name, &self.element))
    }

    pub fn get_mut(&mut self, name: &str) -> SequenceResult<&mut Sequence> {
        let element = self.element.clone();
        self.seqs
            .iter_mut()
            .find(|seq| seq.name() == name)
            .ok_or_else(|| unknown(name, &element))
    }
}

/// Declaration-ordered container of the inlet or outlet link sequences of
/// one element.
#[derive(Debug)]
pub struct LinkSequences {
    element: String,
    seqs: Vec<LinkSequence>,
}

impl LinkSequences {
    pub fn new(defs: &[SequenceDef], element: &str) -> Self {
        Self {
            element: element.to_string(),
            seqs: defs
                .iter()
                .map(|def| LinkSequence::new(*def, element))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.seqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seqs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LinkSequence> {
        self.seqs.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut LinkSequence> {
        self.seqs.iter_mut()
    }

    pub fn get(&self, name: &str) -> SequenceResult<&LinkSequence> {
        self.seqs
            .iter()
            .find(|seq| seq.name() == name)
            .ok_or_else(|| unknown(name, &self.element))
    }

    pub fn get_mut(&mut self, name: &str) -> SequenceResult<&mut LinkSequence> {
        let element = self.element.clone();
        self.seqs
            .iter_mut()
            .find(|seq| seq.name() == name)
            .ok_or_else(|| unknown(name, &element))
    }
}

/// Static declaration of every sequence of a model type, per category and
/// in a fixed order.
#[derive(Debug, Clone, Copy)]
pub struct ModelSequencesSpec {
    pub inputs: &'static [SequenceDef],
    pub fluxes: &'static [SequenceDef],
    pub states: &'static [SequenceDef],
    pub logs: &'static [SequenceDef],
    pub aides: &'static [SequenceDef],
    pub inlets: &'static [SequenceDef],
    pub outlets: &'static [SequenceDef],
}

impl ModelSequencesSpec {
    pub const EMPTY: Self = Self {
        inputs: &[],
        fluxes: &[],
        states: &[],
        logs: &[],
        aides: &[],
        inlets: &[],
        outlets: &[],
    };
}

/// All sequences of one model element, grouped by category.
#[derive(Debug)]
pub struct ModelSequences {
    element: String,
    pub inputs: IoSequences,
    pub fluxes: IoSequences,
    pub states: StateSequences,
    pub logs: LogSequences,
    pub aides: AideSequences,
    pub inlets: LinkSequences,
    pub outlets: LinkSequences,
}

impl ModelSequences {
    pub fn new(spec: &ModelSequencesSpec, element: &str, options: &Options) -> Self {
        Self {
            element: element.to_string(),
            inputs: IoSequences::inputs(spec.inputs, element, options),
            fluxes: IoSequences::fluxes(spec.fluxes, element, options),
            states: StateSequences::new(spec.states, element, options),
            logs: LogSequences::new(spec.logs, element, options),
            aides: AideSequences::new(spec.aides, element, options),
            inlets: LinkSequences::new(spec.inlets, element),
            outlets: LinkSequences::new(spec.outlets, element),
        }
    }

    pub fn element(&self) -> &str {
        &self.element
    }

    /// Whether the element carries any condition sequences (states or
    /// logs).
    pub fn has_conditions(&self) -> bool {
        !self.states.is_empty() || !self.logs.is_empty()
    }

    /// Open every scratch file at the record of step `idx`, to be called
    /// once before the simulation loop.
    pub fn open_files(&mut self, idx: usize) -> SequenceResult<()> {
        self.inputs.open_files(idx)?;
        self.fluxes.open_files(idx)?;
        self.states.open_files(idx)
    }

    pub fn close_files(&mut self) {
        self.inputs.close_files();
        self.fluxes.close_files();
        self.states.close_files();
    }

    /// Per-step entry duty: fill the input values from their series.
    pub fn load_data(&mut self, idx: usize) -> SequenceResult<()> {
        self.inputs.load_data(idx)
    }

    /// Per-step exit duty: persist the computed fluxes and states.
    pub fn save_data(&mut self, idx: usize) -> SequenceResult<()> {
        self.fluxes.save_data(idx)?;
        self.states.save_data(idx)
    }

    /// Commit every state at the end of a successful step.
    pub fn new2old(&mut self) -> SequenceResult<()> {
        self.states.new2old()
    }

    /// Re-apply the initializer arguments of every condition sequence.
    pub fn reset(&mut self) -> SequenceResult<()> {
        self.states.reset()?;
        self.logs.reset()
    }
}

fn unknown(name: &str, element: &str) -> SequenceError {
    SequenceError::UnknownSequence {
        sequence: name.to_string(),
        element: element.to_string(),
    }
}

fn selected(names: Option<&[&str]>, name: &str) -> bool {
    names.map_or(true, |names| names.contains(&name))
}
