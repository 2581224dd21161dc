//! Sequence entities: descriptors, the base entity, and the persisted,
//! state, and log specializations.
//!
//! A sequence is one named time-varying value of a model.  Model types
//! declare their sequences once, as ordered lists of [`SequenceDef`]
//! descriptors per category; instances are created from those lists when a
//! model is instantiated and live for the model's lifetime.
//!
//! - [`Sequence`]: name, dimensionality and the live value with its
//!   coercion rules.
//! - [`IoSequence`]: adds the persistence identity (raw filename, external
//!   file type/directory, run-scratch path) and the RAM/disk series modes.
//! - [`StateSequence`]: adds the old/new double buffer required by explicit
//!   time stepping, the eager-commit initializer contract and the external
//!   trimming hook.
//! - [`LogSequence`]: retained-window memory for difference equations;
//!   initializer/reset contract without persistence of its own.

use crate::errors::{SequenceError, SequenceResult};
use crate::external;
use crate::options::{FileType, Options, RunContext, SeriesManager};
use crate::storage::SeriesStorage;
use crate::value::{self, FloatValue, SequenceValue, ValueArgs};
use log::warn;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The kind of a sequence, deciding its category container, its role in
/// the per-step load/save dispatch and its default file locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SequenceKind {
    /// Externally defined forcing read every step.
    Input,
    /// Computed rate written every step.
    Flux,
    /// Double-buffered storage carried across steps.
    State,
    /// Retained window of past values for difference equations.
    Log,
    /// Internal scratch value, never persisted.
    Aide,
    /// Inter-model pass-through aliasing a shared cell.
    Link,
}

impl SequenceKind {
    /// The category name, also used in derived file names.
    pub fn group_name(self) -> &'static str {
        match self {
            SequenceKind::Input => "inputs",
            SequenceKind::Flux => "fluxes",
            SequenceKind::State => "states",
            SequenceKind::Log => "logs",
            SequenceKind::Aide => "aides",
            SequenceKind::Link => "links",
        }
    }
}

/// Compile-time descriptor of one sequence of a model type.
///
/// `numeric` marks participation in numeric integration; it is irrelevant
/// to storage but preserved as metadata.  `default` is the configured
/// default value used as the sentinel fill under the "use default values"
/// option (zero when unset).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SequenceDef {
    pub name: &'static str,
    pub ndim: usize,
    pub numeric: bool,
    pub default: Option<FloatValue>,
}

impl SequenceDef {
    pub const fn new(name: &'static str, ndim: usize, numeric: bool) -> Self {
        Self {
            name,
            ndim,
            numeric,
            default: None,
        }
    }

    pub const fn with_default(mut self, default: FloatValue) -> Self {
        self.default = Some(default);
        self
    }

    /// The fill value for unavailable entries: not-a-number by default,
    /// the configured default (or zero) under the "use default values"
    /// option.
    pub fn init_value(&self, options: &Options) -> FloatValue {
        if options.use_default_values {
            self.default.unwrap_or(0.0)
        } else {
            f64::NAN
        }
    }
}

// =============================================================================
// Base entity
// =============================================================================

/// One named time-varying value: a scalar or a fixed-shape float array.
#[derive(Debug)]
pub struct Sequence {
    def: SequenceDef,
    element: String,
    value: Option<SequenceValue>,
}

impl Sequence {
    pub fn new(def: SequenceDef, element: impl Into<String>, options: &Options) -> Self {
        let value = match def.ndim {
            0 => Some(SequenceValue::Scalar(def.init_value(options))),
            _ => None,
        };
        Self {
            def,
            element: element.into(),
            value,
        }
    }

    pub fn def(&self) -> &SequenceDef {
        &self.def
    }

    pub fn name(&self) -> &str {
        self.def.name
    }

    pub fn ndim(&self) -> usize {
        self.def.ndim
    }

    pub fn is_numeric(&self) -> bool {
        self.def.numeric
    }

    pub fn element(&self) -> &str {
        &self.element
    }

    /// The live value.
    pub fn value(&self) -> SequenceResult<&SequenceValue> {
        self.value.as_ref().ok_or_else(|| self.not_initialized())
    }

    pub fn value_mut(&mut self) -> SequenceResult<&mut SequenceValue> {
        match self.value {
            Some(ref mut value) => Ok(value),
            None => Err(SequenceError::NotInitialized {
                sequence: self.def.name.to_string(),
                element: self.element.clone(),
            }),
        }
    }

    /// The live value of a 0-dimensional sequence.
    pub fn scalar(&self) -> SequenceResult<FloatValue> {
        match self.value()? {
            SequenceValue::Scalar(value) => Ok(*value),
            SequenceValue::Array(_) => Err(self.shape_error(
                "the sequence is not 0-dimensional, use the array accessors".to_string(),
            )),
        }
    }

    /// Assign a new value, coercing it into the established shape.
    pub fn set_value(&mut self, args: &ValueArgs) -> SequenceResult<()> {
        let coerced = if self.def.ndim == 0 {
            value::coerce_scalar(args).map(SequenceValue::Scalar)
        } else {
            let shape = self.shape()?;
            value::coerce_array(&shape, args).map(SequenceValue::Array)
        };
        match coerced {
            Ok(new_value) => {
                self.value = Some(new_value);
                Ok(())
            }
            Err(reason) => Err(self.shape_error(reason)),
        }
    }

    /// Assign a bare float, broadcast-filling array-shaped sequences.
    pub fn set_scalar(&mut self, value: FloatValue) -> SequenceResult<()> {
        self.set_value(&ValueArgs::Scalar(value))
    }

    /// Per-axis lengths; always empty for 0-dimensional sequences.
    pub fn shape(&self) -> SequenceResult<Vec<usize>> {
        if self.def.ndim == 0 {
            return Ok(Vec::new());
        }
        Ok(self.value()?.shape())
    }

    /// (Re)allocate storage of the given shape, filled with the sentinel
    /// value, discarding any prior content.
    pub fn set_shape(&mut self, shape: &[usize], options: &Options) -> SequenceResult<()> {
        if self.def.ndim == 0 {
            if !shape.is_empty() {
                return Err(self.shape_error(format!(
                    "the shape of a 0-dimensional sequence can only be (), not {shape:?}"
                )));
            }
            self.value = Some(SequenceValue::Scalar(self.def.init_value(options)));
            return Ok(());
        }
        if shape.len() != self.def.ndim {
            return Err(self.shape_error(format!(
                "the sequence is {}-dimensional, but the given shape indicates \
                 {} dimensions",
                self.def.ndim,
                shape.len()
            )));
        }
        self.value = Some(SequenceValue::filled(shape, self.def.init_value(options)));
        Ok(())
    }

    /// Total elements per record: the product of the axis lengths, 1 for
    /// scalars.
    pub fn record_len(&self) -> SequenceResult<usize> {
        Ok(self.value()?.length())
    }

    /// The canonical call-style textual form, `name(values...)`.
    pub fn to_repr(&self) -> String {
        match &self.value {
            Some(value) => format!("{}({})", self.def.name, value.call_repr()),
            None => format!("{}(?)", self.def.name),
        }
    }

    pub(crate) fn flat(&self) -> SequenceResult<Vec<FloatValue>> {
        Ok(self.value()?.to_flat())
    }

    pub(crate) fn set_flat(&mut self, values: &[FloatValue]) -> SequenceResult<()> {
        let shape = self.shape()?;
        match SequenceValue::from_flat(&shape, values) {
            Ok(new_value) => {
                self.value = Some(new_value);
                Ok(())
            }
            Err(reason) => Err(self.shape_error(reason)),
        }
    }

    pub(crate) fn shape_error(&self, reason: String) -> SequenceError {
        SequenceError::Shape {
            sequence: self.def.name.to_string(),
            element: self.element.clone(),
            reason,
        }
    }

    pub(crate) fn not_initialized(&self) -> SequenceError {
        SequenceError::NotInitialized {
            sequence: self.def.name.to_string(),
            element: self.element.clone(),
        }
    }
}

// =============================================================================
// Persisted sequences
// =============================================================================

/// Which of the manager's directories and default encodings apply to a
/// sequence's external series file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirKind {
    Input,
    Output,
    Node,
}

/// A sequence whose series can be persisted to a RAM buffer or to a
/// dedicated run-scratch disk file.
///
/// Exactly one of the RAM and disk modes may be active at a time.  With
/// neither active, only the live value exists and requesting the series
/// is a [`SequenceError::StorageUnavailable`].
#[derive(Debug)]
pub struct IoSequence {
    seq: Sequence,
    kind: SequenceKind,
    dir_kind: DirKind,
    /// Load the external series on mode activation instead of starting
    /// from zero records.
    use_ext: bool,
    rawfilename: String,
    filetype_override: Option<FileType>,
    dirpath_override: Option<PathBuf>,
    storage: SeriesStorage,
}

impl IoSequence {
    /// Create a model-owned sequence with the derived raw filename
    /// `<element>_<category>_<name>`.
    pub fn new_model(
        def: SequenceDef,
        kind: SequenceKind,
        element: &str,
        options: &Options,
    ) -> Self {
        let rawfilename = format!("{}_{}_{}", element, kind.group_name(), def.name);
        let (dir_kind, use_ext) = match kind {
            SequenceKind::Input => (DirKind::Input, true),
            _ => (DirKind::Output, false),
        };
        Self::with_naming(def, kind, element, rawfilename, dir_kind, use_ext, options)
    }

    pub(crate) fn with_naming(
        def: SequenceDef,
        kind: SequenceKind,
        element: &str,
        rawfilename: String,
        dir_kind: DirKind,
        use_ext: bool,
        options: &Options,
    ) -> Self {
        Self {
            seq: Sequence::new(def, element, options),
            kind,
            dir_kind,
            use_ext,
            rawfilename,
            filetype_override: None,
            dirpath_override: None,
            storage: SeriesStorage::default(),
        }
    }

    pub fn kind(&self) -> SequenceKind {
        self.kind
    }

    /// Whether mode activation loads the external series instead of
    /// starting from zero records.
    pub fn use_ext(&self) -> bool {
        self.use_ext
    }

    pub fn set_use_ext(&mut self, use_ext: bool) {
        self.use_ext = use_ext;
    }

    pub fn sequence(&self) -> &Sequence {
        &self.seq
    }

    pub fn sequence_mut(&mut self) -> &mut Sequence {
        &mut self.seq
    }

    // Live-value delegates.

    pub fn name(&self) -> &str {
        self.seq.name()
    }

    pub fn value(&self) -> SequenceResult<&SequenceValue> {
        self.seq.value()
    }

    pub fn value_mut(&mut self) -> SequenceResult<&mut SequenceValue> {
        self.seq.value_mut()
    }

    pub fn scalar(&self) -> SequenceResult<FloatValue> {
        self.seq.scalar()
    }

    pub fn set_value(&mut self, args: &ValueArgs) -> SequenceResult<()> {
        self.seq.set_value(args)
    }

    pub fn set_scalar(&mut self, value: FloatValue) -> SequenceResult<()> {
        self.seq.set_scalar(value)
    }

    pub fn shape(&self) -> SequenceResult<Vec<usize>> {
        self.seq.shape()
    }

    pub fn set_shape(&mut self, shape: &[usize], options: &Options) -> SequenceResult<()> {
        self.seq.set_shape(shape, options)
    }

    pub fn record_len(&self) -> SequenceResult<usize> {
        self.seq.record_len()
    }

    pub fn to_repr(&self) -> String {
        self.seq.to_repr()
    }

    // Persistence identity.

    /// Base filename (no ending) of both the external and the scratch
    /// file.
    pub fn raw_filename(&self) -> &str {
        &self.rawfilename
    }

    pub fn set_raw_filename(&mut self, name: impl Into<String>) {
        self.rawfilename = name.into();
    }

    pub fn file_type(&self, manager: &SeriesManager) -> FileType {
        self.filetype_override.unwrap_or(match self.dir_kind {
            DirKind::Input => manager.input_file_type,
            DirKind::Output => manager.output_file_type,
            DirKind::Node => manager.node_file_type,
        })
    }

    pub fn set_file_type(&mut self, filetype: FileType) {
        self.filetype_override = Some(filetype);
    }

    pub fn set_external_dir(&mut self, dir: impl Into<PathBuf>) {
        self.dirpath_override = Some(dir.into());
    }

    /// Complete filename of the external series file.
    pub fn filename_ext(&self, manager: &SeriesManager) -> String {
        format!("{}.{}", self.rawfilename, self.file_type(manager).extension())
    }

    /// Complete filename of the run-scratch file, always `<basename>.bin`.
    pub fn filename_int(&self) -> String {
        format!("{}.bin", self.rawfilename)
    }

    pub fn filepath_ext(&self, manager: &SeriesManager) -> PathBuf {
        let dir: &Path = match &self.dirpath_override {
            Some(dir) => dir,
            None => match self.dir_kind {
                DirKind::Input => &manager.input_dir,
                DirKind::Output => &manager.output_dir,
                DirKind::Node => &manager.node_dir,
            },
        };
        dir.join(self.filename_ext(manager))
    }

    pub fn filepath_int(&self, manager: &SeriesManager) -> PathBuf {
        manager.temp_dir.join(self.filename_int())
    }

    // Series modes.

    pub fn ram_flag(&self) -> bool {
        self.storage.ram_flag()
    }

    pub fn disk_flag(&self) -> bool {
        self.storage.disk_flag()
    }

    /// Whether any series data is being kept (RAM or disk).
    pub fn memory_flag(&self) -> bool {
        self.storage.memory_flag()
    }

    /// Start keeping the series in one contiguous RAM buffer, initialized
    /// from the external file (input-like sequences) or with zero records
    /// (computed sequences).
    pub fn activate_ram(&mut self, ctx: &RunContext) -> SequenceResult<()> {
        self.deactivate_disk()?;
        let series = self.initial_series(ctx)?;
        self.storage.enter_ram(series);
        Ok(())
    }

    /// Start keeping the series in the run-scratch disk file, initialized
    /// like [`IoSequence::activate_ram`].
    pub fn activate_disk(&mut self, ctx: &RunContext) -> SequenceResult<()> {
        self.deactivate_ram();
        let series = self.initial_series(ctx)?;
        let path = self.filepath_int(&ctx.manager);
        self.storage.enter_disk(path, &series)?;
        Ok(())
    }

    /// Release the RAM buffer.
    pub fn deactivate_ram(&mut self) {
        self.storage.leave_ram();
    }

    /// Close and delete the run-scratch file.
    pub fn deactivate_disk(&mut self) -> SequenceResult<()> {
        self.storage.leave_disk()?;
        Ok(())
    }

    /// Move the complete series from RAM to disk without losing values.
    pub fn ram2disk(&mut self, ctx: &RunContext) -> SequenceResult<()> {
        let series = self.series(ctx)?;
        self.storage.leave_ram();
        let path = self.filepath_int(&ctx.manager);
        self.storage.enter_disk(path, &series)?;
        Ok(())
    }

    /// Move the complete series from disk to RAM without losing values.
    pub fn disk2ram(&mut self, ctx: &RunContext) -> SequenceResult<()> {
        let series = self.series(ctx)?;
        self.storage.leave_disk()?;
        self.storage.enter_ram(series);
        Ok(())
    }

    /// The complete series as a (steps × record length) array.
    pub fn series(&self, ctx: &RunContext) -> SequenceResult<Array2<FloatValue>> {
        let record_len = self.record_len()?;
        self.storage
            .series(ctx.timegrid.len(), record_len)?
            .ok_or_else(|| self.storage_unavailable())
    }

    /// Overwrite the complete series in the active mode.
    pub fn set_series(&mut self, ctx: &RunContext, series: &Array2<FloatValue>) -> SequenceResult<()> {
        let record_len = self.record_len()?;
        let steps = ctx.timegrid.len();
        if series.dim() != (steps, record_len) {
            return Err(self.seq.shape_error(format!(
                "a series of {steps} x {record_len} values is required, \
                 but {} x {} values are given",
                series.nrows(),
                series.ncols()
            )));
        }
        if !self.storage.set_series(series)? {
            return Err(self.storage_unavailable());
        }
        Ok(())
    }

    /// Open the scratch file and position it at the record of step `idx`
    /// (a no-op unless disk mode is active).
    pub fn open_file(&mut self, idx: usize) -> SequenceResult<()> {
        let record_len = self.record_len()?;
        self.storage.open_file(idx, record_len)?;
        Ok(())
    }

    /// Release the scratch file handle.
    pub fn close_file(&mut self) {
        self.storage.close_file();
    }

    /// Fill the live value from the series record of step `idx`
    /// (a no-op when neither mode is active).
    pub fn load_data(&mut self, idx: usize) -> SequenceResult<()> {
        let record_len = self.record_len()?;
        if let Some(values) = self.storage.read_record(idx, record_len)? {
            self.seq.set_flat(&values)?;
        }
        Ok(())
    }

    /// Persist the live value as the series record of step `idx`
    /// (a no-op when neither mode is active).
    pub fn save_data(&mut self, idx: usize) -> SequenceResult<()> {
        if self.storage.memory_flag() {
            let values = self.seq.flat()?;
            self.storage.write_record(idx, &values)?;
        }
        Ok(())
    }

    /// Write the active series into the external series file.
    pub fn save_ext(&self, ctx: &RunContext) -> SequenceResult<()> {
        let series = self.series(ctx)?;
        let path = self.filepath_ext(&ctx.manager);
        external::save_series(&path, self.file_type(&ctx.manager), &ctx.timegrid, &series)
    }

    fn initial_series(&mut self, ctx: &RunContext) -> SequenceResult<Array2<FloatValue>> {
        let record_len = self.record_len()?;
        if self.use_ext {
            let path = self.filepath_ext(&ctx.manager);
            let filetype = self.file_type(&ctx.manager);
            let sentinel = self.seq.def().init_value(&ctx.options);
            external::load_series(
                &path,
                filetype,
                ctx,
                record_len,
                sentinel,
                self.seq.name(),
                self.seq.element(),
            )
        } else {
            Ok(Array2::zeros((ctx.timegrid.len(), record_len)))
        }
    }

    fn storage_unavailable(&self) -> SequenceError {
        SequenceError::StorageUnavailable {
            sequence: self.seq.name().to_string(),
            element: self.seq.element().to_string(),
        }
    }
}

// =============================================================================
// State and log sequences
// =============================================================================

/// External trimming hook: clamp or validate a value against physical
/// bounds, returning whether anything was changed.
pub type TrimFn = fn(&mut SequenceValue) -> bool;

/// A double-buffered state sequence.
///
/// The live value is the `new` slot written by the current step's
/// equations; `old` carries the value committed at the end of the previous
/// step.  [`StateSequence::new2old`] commits, and must run exactly once
/// per committed step.  The canonical initializer call
/// ([`StateSequence::apply`]) sets `new` and commits eagerly so that the
/// first step of a run already has a valid `old`.
#[derive(Debug)]
pub struct StateSequence {
    io: IoSequence,
    old: Option<SequenceValue>,
    oldargs: Option<ValueArgs>,
    trimmer: Option<TrimFn>,
}

impl StateSequence {
    pub fn new(def: SequenceDef, element: &str, options: &Options) -> Self {
        let old = match def.ndim {
            0 => Some(SequenceValue::Scalar(def.init_value(options))),
            _ => None,
        };
        Self {
            io: IoSequence::new_model(def, SequenceKind::State, element, options),
            old,
            oldargs: None,
            trimmer: None,
        }
    }

    pub fn name(&self) -> &str {
        self.io.name()
    }

    /// The persistence side of the state.
    pub fn io(&self) -> &IoSequence {
        &self.io
    }

    pub fn io_mut(&mut self) -> &mut IoSequence {
        &mut self.io
    }

    /// The `new` slot (the live value written by the current step).
    pub fn value(&self) -> SequenceResult<&SequenceValue> {
        self.io.value()
    }

    pub fn value_mut(&mut self) -> SequenceResult<&mut SequenceValue> {
        self.io.value_mut()
    }

    pub fn scalar(&self) -> SequenceResult<FloatValue> {
        self.io.scalar()
    }

    pub fn set_scalar(&mut self, value: FloatValue) -> SequenceResult<()> {
        self.io.set_scalar(value)
    }

    /// The `old` slot (the value committed at the end of the previous
    /// step).
    pub fn old(&self) -> SequenceResult<&SequenceValue> {
        self.old
            .as_ref()
            .ok_or_else(|| self.io.sequence().not_initialized())
    }

    /// Assign the `old` slot directly, with the usual coercion.  Normally
    /// only [`StateSequence::new2old`] writes it; direct assignment is for
    /// demonstration and debugging.
    pub fn set_old(&mut self, args: &ValueArgs) -> SequenceResult<()> {
        let seq = self.io.sequence();
        let coerced = if seq.ndim() == 0 {
            value::coerce_scalar(args).map(SequenceValue::Scalar)
        } else {
            let shape = seq.shape()?;
            value::coerce_array(&shape, args).map(SequenceValue::Array)
        };
        match coerced {
            Ok(old) => {
                self.old = Some(old);
                Ok(())
            }
            Err(reason) => Err(self.io.sequence().shape_error(reason)),
        }
    }

    /// The canonical initializer: set `new`, trim, snapshot the arguments
    /// for [`StateSequence::reset`], and commit eagerly.
    pub fn apply(&mut self, args: ValueArgs) -> SequenceResult<()> {
        self.io.set_value(&args)?;
        self.trim();
        self.oldargs = Some(args);
        self.new2old()
    }

    /// Commit: copy `new` into `old` (a deep copy for array-shaped
    /// states).
    pub fn new2old(&mut self) -> SequenceResult<()> {
        self.old = Some(self.io.value()?.clone());
        Ok(())
    }

    /// Re-apply the last explicitly assigned initializer arguments.
    /// Independent of the current `old`/`new` contents.
    pub fn reset(&mut self) -> SequenceResult<()> {
        if let Some(args) = self.oldargs.clone() {
            self.apply(args)?;
        }
        Ok(())
    }

    /// Install the external trimming hook.
    pub fn set_trimmer(&mut self, trimmer: TrimFn) {
        self.trimmer = Some(trimmer);
    }

    /// Run the trimming hook against `new`, warning if it changed
    /// anything.
    pub fn trim(&mut self) {
        let Some(trimmer) = self.trimmer else {
            return;
        };
        let name = self.io.name().to_string();
        let element = self.io.sequence().element().to_string();
        if let Ok(value) = self.io.value_mut() {
            if trimmer(value) {
                warn!(
                    "at least one value of sequence `{name}` of element `{element}` \
                     needed to be trimmed"
                );
            }
        }
    }

    /// Reallocate both slots to the given shape.
    pub fn set_shape(&mut self, shape: &[usize], options: &Options) -> SequenceResult<()> {
        self.io.set_shape(shape, options)?;
        self.old = Some(self.io.value()?.clone());
        Ok(())
    }

    pub fn to_repr(&self) -> String {
        self.io.to_repr()
    }
}

/// A retained window of past values used by difference-equation models.
///
/// Shares the initializer/reset contract of [`StateSequence`] but has no
/// old/new split and no persistence of its own; it lives for the run only
/// and is snapshot-able through the condition codec.
#[derive(Debug)]
pub struct LogSequence {
    seq: Sequence,
    oldargs: Option<ValueArgs>,
    trimmer: Option<TrimFn>,
}

impl LogSequence {
    pub fn new(def: SequenceDef, element: &str, options: &Options) -> Self {
        Self {
            seq: Sequence::new(def, element, options),
            oldargs: None,
            trimmer: None,
        }
    }

    pub fn name(&self) -> &str {
        self.seq.name()
    }

    pub fn sequence(&self) -> &Sequence {
        &self.seq
    }

    pub fn value(&self) -> SequenceResult<&SequenceValue> {
        self.seq.value()
    }

    pub fn value_mut(&mut self) -> SequenceResult<&mut SequenceValue> {
        self.seq.value_mut()
    }

    pub fn set_shape(&mut self, shape: &[usize], options: &Options) -> SequenceResult<()> {
        self.seq.set_shape(shape, options)
    }

    /// The canonical initializer: set the window, trim, and snapshot the
    /// arguments for [`LogSequence::reset`].
    pub fn apply(&mut self, args: ValueArgs) -> SequenceResult<()> {
        self.seq.set_value(&args)?;
        self.trim();
        self.oldargs = Some(args);
        Ok(())
    }

    pub fn reset(&mut self) -> SequenceResult<()> {
        if let Some(args) = self.oldargs.clone() {
            self.apply(args)?;
        }
        Ok(())
    }

    pub fn set_trimmer(&mut self, trimmer: TrimFn) {
        self.trimmer = Some(trimmer);
    }

    pub fn trim(&mut self) {
        let Some(trimmer) = self.trimmer else {
            return;
        };
        let name = self.seq.name().to_string();
        let element = self.seq.element().to_string();
        if let Ok(value) = self.seq.value_mut() {
            if trimmer(value) {
                warn!(
                    "at least one value of sequence `{name}` of element `{element}` \
                     needed to be trimmed"
                );
            }
        }
    }

    pub fn to_repr(&self) -> String {
        self.seq.to_repr()
    }
}
