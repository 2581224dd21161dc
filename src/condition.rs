//! Snapshotting and restoring condition sequences.
//!
//! The conditions of an element are its state and log sequences, the part
//! of a run that cannot be recomputed from external forcings.  They are
//! serialized in the canonical call form, one sequence per line:
//!
//! ```text
//! wc(0.31)
//! sm(12.0, 19.5, 63.0)
//! ```
//!
//! Restoring goes through [`apply_condition`], which dispatches one parsed
//! initializer call onto the named sequence and so re-establishes the
//! eager-commit contract (trimming included).  Parsing the surrounding
//! condition file syntax is the orchestrator's job, not handled here.

use crate::errors::{SequenceError, SequenceResult};
use crate::group::ModelSequences;
use crate::value::ValueArgs;
use std::io::Write;

/// Write the conditions of an element in declaration order, states first.
pub fn write_conditions<W: Write>(seqs: &ModelSequences, writer: &mut W) -> SequenceResult<()> {
    for state in seqs.states.iter() {
        writeln!(writer, "{}", state.to_repr())?;
    }
    for log in seqs.logs.iter() {
        writeln!(writer, "{}", log.to_repr())?;
    }
    Ok(())
}

/// The conditions of an element as one string, ready for a condition file.
pub fn conditions_repr(seqs: &ModelSequences) -> SequenceResult<String> {
    let mut buffer = Vec::new();
    write_conditions(seqs, &mut buffer)?;
    Ok(String::from_utf8(buffer).expect("reprs are valid utf-8"))
}

/// Apply one restored initializer call to the named condition sequence.
pub fn apply_condition(
    seqs: &mut ModelSequences,
    name: &str,
    args: ValueArgs,
) -> SequenceResult<()> {
    if let Ok(state) = seqs.states.get_mut(name) {
        return state.apply(args);
    }
    if let Ok(log) = seqs.logs.get_mut(name) {
        return log.apply(args);
    }
    Err(SequenceError::UnknownSequence {
        sequence: name.to_string(),
        element: seqs.element().to_string(),
    })
}

/// Run the trimming hooks of every condition sequence, for use after bulk
/// manipulation outside the initializer calls.
pub fn trim_conditions(seqs: &mut ModelSequences) {
    for state in seqs.states.iter_mut() {
        state.trim();
    }
    for log in seqs.logs.iter_mut() {
        log.trim();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::ModelSequencesSpec;
    use crate::options::Options;
    use crate::sequence::SequenceDef;

    const SPEC: ModelSequencesSpec = ModelSequencesSpec {
        inputs: &[],
        fluxes: &[],
        states: &[
            SequenceDef::new("wc", 0, true),
            SequenceDef::new("sm", 1, true),
        ],
        logs: &[SequenceDef::new("qlog", 1, false)],
        aides: &[],
        inlets: &[],
        outlets: &[],
    };

    fn sequences() -> ModelSequences {
        let options = Options::default();
        let mut seqs = ModelSequences::new(&SPEC, "land_dill", &options);
        seqs.states
            .get_mut("sm")
            .unwrap()
            .set_shape(&[3], &options)
            .unwrap();
        seqs.logs
            .get_mut("qlog")
            .unwrap()
            .set_shape(&[2], &options)
            .unwrap();
        seqs
    }

    #[test]
    fn conditions_are_written_in_call_form() {
        let mut seqs = sequences();
        apply_condition(&mut seqs, "wc", ValueArgs::Scalar(0.31)).unwrap();
        apply_condition(&mut seqs, "sm", ValueArgs::Vector(vec![12.0, 19.5, 63.0])).unwrap();
        apply_condition(&mut seqs, "qlog", ValueArgs::Vector(vec![0.5, 0.5])).unwrap();
        assert_eq!(
            conditions_repr(&seqs).unwrap(),
            "wc(0.31)\nsm(12.0, 19.5, 63.0)\nqlog(0.5, 0.5)\n"
        );
    }

    #[test]
    fn unset_conditions_are_marked_unknown() {
        let seqs = sequences();
        let repr = conditions_repr(&seqs).unwrap();
        assert!(repr.starts_with("wc(nan)\n"));
        assert!(repr.contains("sm(nan, nan, nan)"));
    }

    #[test]
    fn applying_commits_eagerly() {
        let mut seqs = sequences();
        apply_condition(&mut seqs, "wc", ValueArgs::Scalar(2.0)).unwrap();
        let state = seqs.states.get("wc").unwrap();
        assert_eq!(state.old().unwrap().as_scalar().unwrap(), 2.0);
    }

    #[test]
    fn unknown_condition_names_are_rejected() {
        let mut seqs = sequences();
        let result = apply_condition(&mut seqs, "uz", ValueArgs::Scalar(1.0));
        assert!(matches!(
            result,
            Err(SequenceError::UnknownSequence { .. })
        ));
    }

    #[test]
    fn roundtrip_through_applied_conditions() {
        let mut seqs = sequences();
        apply_condition(&mut seqs, "wc", ValueArgs::Scalar(0.25)).unwrap();
        apply_condition(&mut seqs, "sm", ValueArgs::Vector(vec![1.0, 2.0, 3.0])).unwrap();
        apply_condition(&mut seqs, "qlog", ValueArgs::Vector(vec![4.0, 5.0])).unwrap();
        let snapshot = conditions_repr(&seqs).unwrap();

        // Disturb everything, then restore from the snapshot's calls.
        seqs.states.get_mut("wc").unwrap().set_scalar(9.0).unwrap();
        apply_condition(&mut seqs, "wc", ValueArgs::Scalar(0.25)).unwrap();
        apply_condition(&mut seqs, "sm", ValueArgs::Vector(vec![1.0, 2.0, 3.0])).unwrap();
        assert_eq!(conditions_repr(&seqs).unwrap(), snapshot);
    }
}
