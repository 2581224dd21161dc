//! Error taxonomy of the sequence engine.
//!
//! Every error carries the name of the affected sequence and, where known,
//! the name of the owning element or node, so that failures deep inside the
//! storage backend stay attributable at the orchestrator level.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for sequence, storage and series-exchange operations.
#[derive(Error, Debug)]
pub enum SequenceError {
    /// A value could not be converted to the established shape or
    /// dimensionality of a sequence.
    #[error("cannot set the value of sequence `{sequence}` of element `{element}`: {reason}")]
    Shape {
        sequence: String,
        element: String,
        reason: String,
    },

    /// A value or shape was requested before being established.
    #[error("no value or shape of sequence `{sequence}` of element `{element}` has been defined so far")]
    NotInitialized { sequence: String, element: String },

    /// The step size of an external series differs from the simulation
    /// step size.  Always fatal.
    #[error(
        "according to external data file `{}`, the time step of sequence \
         `{sequence}` is `{external}`, but the simulation time step is `{simulation}`",
        path.display()
    )]
    StepSizeMismatch {
        sequence: String,
        path: PathBuf,
        external: String,
        simulation: String,
    },

    /// The external series does not cover the full simulation window and
    /// the strict series check is enabled.
    #[error(
        "for sequence `{sequence}` of element `{element}`, the initialization time grid \
         ({simulation}) does not define a subset of the time grid of the external data \
         file `{}` ({external})",
        path.display()
    )]
    Coverage {
        sequence: String,
        element: String,
        path: PathBuf,
        simulation: String,
        external: String,
    },

    /// The full series was requested while neither RAM nor disk mode is
    /// active.
    #[error(
        "sequence `{sequence}` of element `{element}` is not requested to make any \
         series data available"
    )]
    StorageUnavailable { sequence: String, element: String },

    /// An external backing file is missing or unreadable.  Recoverable
    /// (mode downgrade with a warning) for observation-only sequences,
    /// fatal otherwise.
    #[error(
        "the external data file `{}` of sequence `{sequence}` cannot be read: {source}",
        path.display()
    )]
    MissingExternalFile {
        sequence: String,
        path: PathBuf,
        source: std::io::Error,
    },

    /// A sequence name was looked up that the owning container does not
    /// define.
    #[error("element `{element}` does not handle a sequence named `{sequence}`")]
    UnknownSequence { sequence: String, element: String },

    /// An invalid link-cell wiring operation.
    #[error("cannot wire link sequence `{sequence}` of element `{element}`: {reason}")]
    Wiring {
        sequence: String,
        element: String,
        reason: String,
    },

    /// An invalid time grid definition.
    #[error("invalid time grid: {reason}")]
    Timegrid { reason: String },

    /// Malformed content in an external data file.
    #[error("cannot parse {what} from `{input}`")]
    Parse { what: String, input: String },

    /// Scratch-file input/output failure.
    #[error("sequence data i/o failed")]
    Io(#[from] std::io::Error),
}

/// Convenience type for `Result<T, SequenceError>`.
pub type SequenceResult<T> = Result<T, SequenceError>;
