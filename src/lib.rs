#![warn(clippy::all)]

pub mod app_timers;
pub mod checksum;
pub mod field;
pub mod kernels;
pub mod model_inputs;
pub mod model_parameters;
pub mod physical_constants;
pub mod saturation;
pub mod stencil;
pub mod timer;
pub mod working_state;

use std::fs::File;
use std::io::Write;
use std::path::Path;

use thiserror::Error;

pub use app_timers::AppTimers;
pub use field::{Field1D, Field2D};
pub use model_inputs::ModelInputs;
pub use model_parameters::ModelParameters;
pub use saturation::SaturationTable;
pub use working_state::WorkingState;

use kernels::{
    init_column_arrays_kernel, init_rain_conversion_kernel, init_tracers_kernel,
    pa_to_cb_kernel, pbl_and_thermo_init_kernel,
};

pub type WorkingPrecision = f64;

#[derive(Debug, Error)]
pub enum InitError {
    #[error("model grid needs at least 3 vertical levels, got {0}")]
    TooFewLevels(usize),

    #[error("model grid needs at least 1 column")]
    NoColumns,

    #[error(
        "field '{field_name}' has extents {actual_columns}x{actual_levels}, \
         expected {expected_columns}x{expected_levels}"
    )]
    ExtentMismatch {
        field_name: &'static str,
        actual_columns: usize,
        actual_levels: usize,
        expected_columns: usize,
        expected_levels: usize,
    },

    #[error("per-column field '{field_name}' has {actual} columns, expected {expected}")]
    ColumnExtentMismatch {
        field_name: &'static str,
        actual: usize,
        expected: usize,
    },

    #[error("expected {expected} tracer fields, got {actual}")]
    TracerCountMismatch { expected: usize, actual: usize },

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub fn run_initialization() -> Result<(), InitError> {
    let model_params = ModelParameters::new("Config")?;
    println!("Model params: {:?}", model_params);

    let model_inputs = ModelInputs::idealized(&model_params);
    let mut working_state = WorkingState::new(&model_params);
    let saturation_table = SaturationTable::new();

    println!("Initialised input profiles and working state.");

    let mut app_timers = AppTimers::new(1);

    run_init_step(
        &model_params,
        &model_inputs,
        &mut working_state,
        &saturation_table,
        &mut app_timers,
    )?;

    let heo_checksum = checksum::field_checksum(&working_state.heo);
    let qeso_checksum = checksum::field_checksum(&working_state.qeso);
    let kpbl_checksum = checksum::level_index_checksum(&working_state.kpbl);

    println!("heo checksum  = {:.8E}", heo_checksum);
    println!("qeso checksum = {:.8E}", qeso_checksum);
    println!("kpbl checksum = {}", kpbl_checksum);

    output_diagnostics(&model_params, &working_state)?;

    println!("Kernel timing report:\n{}", app_timers.generate_report());
    write_timings_csv(&app_timers)?;

    Ok(())
}

/// Runs the five initialization stages in their fixed order over the whole
/// column set. All grid preconditions are checked up front; on any failure
/// no field has been mutated.
pub fn run_init_step(
    model_params: &ModelParameters,
    model_inputs: &ModelInputs,
    working_state: &mut WorkingState,
    saturation_table: &SaturationTable,
    app_timers: &mut AppTimers,
) -> Result<(), InitError> {
    validate_grid(model_params, model_inputs, working_state)?;

    app_timers.step.start();

    pa_to_cb_kernel(
        model_params,
        model_inputs,
        working_state,
        &mut app_timers.pa_to_cb,
    );
    init_column_arrays_kernel(
        model_params,
        model_inputs,
        working_state,
        &mut app_timers.column_reset,
    );
    init_rain_conversion_kernel(
        model_params,
        model_inputs,
        working_state,
        &mut app_timers.rain_conversion,
    );
    pbl_and_thermo_init_kernel(
        model_params,
        model_inputs,
        working_state,
        saturation_table,
        &mut app_timers.pbl_search,
    );
    init_tracers_kernel(
        model_params,
        model_inputs,
        working_state,
        &mut app_timers.tracers,
    );

    app_timers.step.stop();

    Ok(())
}

fn validate_grid(
    model_params: &ModelParameters,
    model_inputs: &ModelInputs,
    working_state: &WorkingState,
) -> Result<(), InitError> {
    let im = model_params.im;
    let km = model_params.km;

    if im < 1 {
        return Err(InitError::NoColumns);
    }
    // The sequential sweeps need an interior; two boundary levels plus at
    // least one interior level.
    if km < 3 {
        return Err(InitError::TooFewLevels(km));
    }

    let check = |field_name: &'static str, actual_columns: usize, actual_levels: usize| {
        if actual_columns == im && actual_levels == km {
            Ok(())
        } else {
            Err(InitError::ExtentMismatch {
                field_name,
                actual_columns,
                actual_levels,
                expected_columns: im,
                expected_levels: km,
            })
        }
    };

    check(
        "prslp",
        model_inputs.prslp.num_columns(),
        model_inputs.prslp.num_levels(),
    )?;
    check(
        "delp",
        model_inputs.delp.num_columns(),
        model_inputs.delp.num_levels(),
    )?;
    check("t1", model_inputs.t1.num_columns(), model_inputs.t1.num_levels())?;
    check("q1", model_inputs.q1.num_columns(), model_inputs.q1.num_levels())?;
    check("u1", model_inputs.u1.num_columns(), model_inputs.u1.num_levels())?;
    check("v1", model_inputs.v1.num_columns(), model_inputs.v1.num_levels())?;
    check(
        "phil",
        model_inputs.phil.num_columns(),
        model_inputs.phil.num_levels(),
    )?;
    check(
        "prsl",
        working_state.prsl.num_columns(),
        working_state.prsl.num_levels(),
    )?;
    check(
        "qeso",
        working_state.qeso.num_columns(),
        working_state.qeso.num_levels(),
    )?;
    check(
        "kpbl",
        working_state.kpbl.num_columns(),
        working_state.kpbl.num_levels(),
    )?;
    let check_columns = |field_name: &'static str, actual: usize| {
        if actual == im {
            Ok(())
        } else {
            Err(InitError::ColumnExtentMismatch {
                field_name,
                actual,
                expected: im,
            })
        }
    };

    check_columns("psp", model_inputs.psp.num_columns())?;
    check_columns("hpbl", model_inputs.hpbl.num_columns())?;
    check_columns("garea", model_inputs.garea.num_columns())?;
    check_columns("islimsk", model_inputs.islimsk.num_columns())?;
    check_columns("kcnv", model_inputs.kcnv.num_columns())?;

    if model_inputs.qtr.len() != model_params.ntr {
        return Err(InitError::TracerCountMismatch {
            expected: model_params.ntr,
            actual: model_inputs.qtr.len(),
        });
    }
    for qtr in &model_inputs.qtr {
        check("qtr", qtr.num_columns(), qtr.num_levels())?;
    }

    Ok(())
}

fn output_diagnostics(
    model_params: &ModelParameters,
    working_state: &WorkingState,
) -> Result<(), InitError> {
    let mut rows = vec!["column,level,pfld,to,qo,qeso,heo,heso,kpbl".to_owned()];

    for column_idx in 1..=model_params.im {
        for level_idx in 1..=model_params.km {
            rows.push(format!(
                "{},{},{:6.8E},{:6.8E},{:6.8E},{:6.8E},{:6.8E},{:6.8E},{}",
                column_idx,
                level_idx,
                working_state.pfld.get(column_idx, level_idx),
                working_state.to.get(column_idx, level_idx),
                working_state.qo.get(column_idx, level_idx),
                working_state.qeso.get(column_idx, level_idx),
                working_state.heo.get(column_idx, level_idx),
                working_state.heso.get(column_idx, level_idx),
                working_state.kpbl.get(column_idx, level_idx),
            ));
        }
    }

    let output_path = Path::new("shalconv_init_diag.csv");
    let mut file = File::create(output_path)?;
    file.write_all(rows.join("\n").as_bytes())?;

    println!("Wrote initialization diagnostics to {}.", output_path.display());
    Ok(())
}

fn write_timings_csv(app_timers: &AppTimers) -> Result<(), InitError> {
    let output_path = Path::new("shalconv_timings.csv");
    let mut file = File::create(output_path)?;
    file.write_all(app_timers.generate_timings_csv().as_bytes())?;

    println!("Wrote kernel timings to {}.", output_path.display());
    Ok(())
}
