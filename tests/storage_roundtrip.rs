//! End-to-end persistence checks: values written per step come back
//! unchanged from both series modes, moving between the modes preserves
//! the series, and external files reproduce what was saved.

use hydroseq::external;
use hydroseq::sequence::{IoSequence, SequenceDef, SequenceKind};
use hydroseq::value::ValueArgs;
use hydroseq::{FileType, RunContext, SequenceError, SeriesManager, Timegrid};
use ndarray::{array, Array2};

fn context_in(dir: &std::path::Path) -> RunContext {
    let mut ctx = RunContext::new(Timegrid::from_text("2000-01-10", "2000-01-15", "1d").unwrap());
    ctx.manager = SeriesManager::in_dir(dir);
    ctx
}

fn flux(name: &'static str, ndim: usize, ctx: &RunContext) -> IoSequence {
    IoSequence::new_model(
        SequenceDef::new(name, ndim, true),
        SequenceKind::Flux,
        "basin",
        &ctx.options,
    )
}

#[test]
fn scalar_records_roundtrip_through_ram() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context_in(dir.path());
    let mut seq = flux("qah", 0, &ctx);
    seq.activate_ram(&ctx).unwrap();

    let written = [0.5, -1.25, f64::NAN, 1e300, 0.0];
    for (idx, value) in written.iter().enumerate() {
        seq.set_scalar(*value).unwrap();
        seq.save_data(idx).unwrap();
    }
    for (idx, value) in written.iter().enumerate() {
        seq.load_data(idx).unwrap();
        let loaded = seq.scalar().unwrap();
        assert_eq!(loaded.to_bits(), value.to_bits(), "step {idx}");
    }
}

#[test]
fn matrix_records_roundtrip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context_in(dir.path());
    let mut seq = flux("qjoints", 2, &ctx);
    seq.set_shape(&[2, 2], &ctx.options).unwrap();
    seq.activate_disk(&ctx).unwrap();
    assert!(seq.filepath_int(&ctx.manager).exists());

    seq.open_file(0).unwrap();
    for idx in 0..5 {
        let base = idx as f64 * 10.0;
        seq.set_value(&ValueArgs::Matrix(vec![
            vec![base, base + 1.0],
            vec![base + 2.0, base + 3.0],
        ]))
        .unwrap();
        seq.save_data(idx).unwrap();
    }
    seq.close_file();

    // Records are flat row-major concatenations of the matrix elements.
    let series = seq.series(&ctx).unwrap();
    assert_eq!(series.row(3).to_vec(), vec![30.0, 31.0, 32.0, 33.0]);

    seq.open_file(2).unwrap();
    seq.load_data(2).unwrap();
    seq.close_file();
    assert_eq!(seq.value().unwrap().to_flat(), vec![20.0, 21.0, 22.0, 23.0]);

    seq.deactivate_disk().unwrap();
    assert!(!seq.filepath_int(&ctx.manager).exists());
}

#[test]
fn moving_between_modes_preserves_the_series() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context_in(dir.path());
    let mut seq = flux("qz", 1, &ctx);
    seq.set_shape(&[2], &ctx.options).unwrap();
    seq.activate_ram(&ctx).unwrap();

    let series = array![
        [1.0, 2.0],
        [3.0, 4.0],
        [5.0, f64::NAN],
        [7.0, 8.0],
        [9.0, 10.0]
    ];
    seq.set_series(&ctx, &series).unwrap();

    seq.ram2disk(&ctx).unwrap();
    assert!(!seq.ram_flag());
    assert!(seq.disk_flag());
    let from_disk = seq.series(&ctx).unwrap();
    assert_eq!(from_disk[[2, 0]], 5.0);
    assert!(from_disk[[2, 1]].is_nan());
    assert_eq!(from_disk.row(4).to_vec(), vec![9.0, 10.0]);

    seq.disk2ram(&ctx).unwrap();
    assert!(seq.ram_flag());
    assert!(!seq.disk_flag());
    assert!(!seq.filepath_int(&ctx.manager).exists());
    assert_eq!(seq.series(&ctx).unwrap().row(0).to_vec(), vec![1.0, 2.0]);
}

#[test]
fn at_most_one_mode_is_ever_active() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context_in(dir.path());
    let mut seq = flux("qah", 0, &ctx);

    seq.activate_ram(&ctx).unwrap();
    seq.activate_disk(&ctx).unwrap();
    assert!(!seq.ram_flag());
    assert!(seq.disk_flag());

    seq.activate_ram(&ctx).unwrap();
    assert!(seq.ram_flag());
    assert!(!seq.disk_flag());

    seq.deactivate_ram();
    assert!(!seq.memory_flag());
    assert!(matches!(
        seq.series(&ctx),
        Err(SequenceError::StorageUnavailable { .. })
    ));
    // Transient per-step duties are silent no-ops.
    seq.set_scalar(1.0).unwrap();
    seq.save_data(0).unwrap();
    seq.load_data(0).unwrap();
    assert_eq!(seq.scalar().unwrap(), 1.0);
}

#[test]
fn saved_external_series_reproduce_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context_in(dir.path());
    let mut seq = flux("qah", 0, &ctx);
    seq.activate_ram(&ctx).unwrap();
    let series = Array2::from_shape_fn((5, 1), |(row, _)| row as f64 + 0.5);
    seq.set_series(&ctx, &series).unwrap();

    seq.save_ext(&ctx).unwrap();
    let path = seq.filepath_ext(&ctx.manager);
    assert!(path.ends_with("basin_fluxes_qah.dat"));
    let reloaded =
        external::load_series(&path, FileType::Dat, &ctx, 1, f64::NAN, "qah", "basin").unwrap();
    assert_eq!(reloaded, series);
}

#[test]
fn text_external_files_work_the_same_way() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = context_in(dir.path());
    let mut seq = flux("qa", 1, &ctx);
    seq.set_shape(&[2], &ctx.options).unwrap();
    seq.set_file_type(FileType::Asc);
    seq.activate_ram(&ctx).unwrap();
    let series = array![
        [1.0, 2.0],
        [3.0, 4.0],
        [5.0, 6.0],
        [7.0, 8.0],
        [9.0, 10.0]
    ];
    seq.set_series(&ctx, &series).unwrap();

    seq.save_ext(&ctx).unwrap();
    let path = seq.filepath_ext(&ctx.manager);
    assert!(path.ends_with("basin_fluxes_qa.asc"));
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("Timegrid(\"2000-01-10 00:00:00\""));
    let reloaded =
        external::load_series(&path, FileType::Asc, &ctx, 2, f64::NAN, "qa", "basin").unwrap();
    assert_eq!(reloaded, series);
}
