use std::cmp::min;

use crate::physical_constants::{CP, EPS, EPSM1, G, HVAP, TTP};
use crate::saturation::SaturationTable;
use crate::stencil::{self, Sweep};
use crate::timer::Timer;
use crate::{ModelInputs, ModelParameters, WorkingState};

/// Rescales the caller's Pa pressure fields to centibars.
pub fn pa_to_cb_kernel(
    model_params: &ModelParameters,
    model_inputs: &ModelInputs,
    working_state: &mut WorkingState,
    kernel_timer: &mut Timer,
) {
    let im = model_params.im;
    let km = model_params.km;

    let psp = &model_inputs.psp;
    let prslp = &model_inputs.prslp;
    let delp = &model_inputs.delp;

    let WorkingState {
        ref mut ps,
        ref mut prsl,
        ref mut del0,
        ..
    } = *working_state;

    kernel_timer.start();

    stencil::apply(Sweep::Elementwise, im, 1..=1, |i, _| {
        ps.set(i, psp.get(i) * 0.001);
    });

    stencil::apply(Sweep::Elementwise, im, 1..=km, |i, k| {
        prsl.set(i, k, prslp.get(i, k) * 0.001);
        del0.set(i, k, delp.get(i, k) * 0.001);
    });

    kernel_timer.stop();
}

/// Resets the per-column flag, level-marker and diagnostic arrays. Columns
/// the deep scheme already handled this step (`kcnv == 1`) are masked out;
/// active columns get their cloud markers set to the "no cloud" sentinels.
pub fn init_column_arrays_kernel(
    model_params: &ModelParameters,
    model_inputs: &ModelInputs,
    working_state: &mut WorkingState,
    kernel_timer: &mut Timer,
) {
    let im = model_params.im;
    let km = model_params.km;

    let kcnv = &model_inputs.kcnv;
    let garea = &model_inputs.garea;

    let WorkingState {
        ref mut cnvflg,
        ref mut kbot,
        ref mut ktop,
        ref mut kbcon,
        ref mut kb,
        ref mut rn,
        ref mut gdx,
        ..
    } = *working_state;

    kernel_timer.start();

    stencil::apply(Sweep::Elementwise, im, 1..=1, |i, _| {
        cnvflg.set(i, 1);
        if kcnv.get(i) == 1 {
            cnvflg.set(i, 0);
        }

        if cnvflg.get(i) == 1 {
            kbot.set(i, km + 1);
            ktop.set(i, 0);
        }

        rn.set(i, 0.0);
        kbcon.set(i, km);
        kb.set(i, km);
        gdx.set(i, garea.get(i).sqrt());
    });

    kernel_timer.stop();
}

/// Selects the land/sea rain conversion parameter, applies the Han et al.
/// (2017) exponential reduction below freezing, and zeroes the convective
/// cloud and mass-flux diagnostics.
pub fn init_rain_conversion_kernel(
    model_params: &ModelParameters,
    model_inputs: &ModelInputs,
    working_state: &mut WorkingState,
    kernel_timer: &mut Timer,
) {
    let im = model_params.im;
    let km = model_params.km;
    let c0s = model_params.c0s;
    let asolfac = model_params.asolfac;
    let d0 = model_params.d0;

    let islimsk = &model_inputs.islimsk;
    let t1 = &model_inputs.t1;

    let WorkingState {
        ref mut c0,
        ref mut c0t,
        ref mut cnvw,
        ref mut cnvc,
        ref mut ud_mf,
        ref mut dt_mf,
        ..
    } = *working_state;

    kernel_timer.start();

    stencil::apply(Sweep::Elementwise, im, 1..=1, |i, _| {
        if islimsk.get(i) == 1 {
            c0.set(i, c0s * asolfac);
        } else {
            c0.set(i, c0s);
        }
    });

    stencil::apply(Sweep::Elementwise, im, 1..=km, |i, k| {
        let tem = (d0 * (t1.get(i, k) - TTP)).exp();
        if t1.get(i, k) > TTP {
            c0t.set(i, k, c0.get(i));
        } else {
            c0t.set(i, k, c0.get(i) * tem);
        }

        cnvw.set(i, k, 0.0);
        cnvc.set(i, k, 0.0);
        ud_mf.set(i, k, 0.0);
        dt_mf.set(i, k, 0.0);
    });

    kernel_timer.stop();
}

/// Locates the boundary-layer top and initializes the thermodynamic working
/// arrays. This is the stage that needs all three sweep modes:
///
/// 1. elementwise prologue: `kbm`/`kmax` pressure-ratio scan (an ordered
///    fold, last satisfying level wins), layer heights from geopotential,
///    mask and `kpbl` defaults;
/// 2. elementwise interface heights;
/// 3. forward sweep carrying the search mask up from the surface, recording
///    the last level whose height stays at or below `hpbl`;
/// 4. backward sweep propagating the found level down through the column;
/// 5. elementwise epilogue: `kpbl` clamp, saturation humidity with floors,
///    and the masked reset/snapshot of the updraft working arrays.
pub fn pbl_and_thermo_init_kernel(
    model_params: &ModelParameters,
    model_inputs: &ModelInputs,
    working_state: &mut WorkingState,
    saturation_table: &SaturationTable,
    kernel_timer: &mut Timer,
) {
    let im = model_params.im;
    let km = model_params.km;

    let t1 = &model_inputs.t1;
    let q1 = &model_inputs.q1;
    let u1 = &model_inputs.u1;
    let v1 = &model_inputs.v1;
    let phil = &model_inputs.phil;
    let hpbl = &model_inputs.hpbl;

    let WorkingState {
        ref ps,
        ref prsl,
        ref cnvflg,
        ref mut kbm,
        ref mut kmax,
        ref mut tx1,
        ref mut flg,
        ref mut kpbl,
        ref mut zo,
        ref mut zi,
        ref mut pfld,
        ref mut eta,
        ref mut hcko,
        ref mut qcko,
        ref mut qrcko,
        ref mut ucko,
        ref mut vcko,
        ref mut dbyo,
        ref mut pwo,
        ref mut dellal,
        ref mut to,
        ref mut qo,
        ref mut uo,
        ref mut vo,
        ref mut wu2,
        ref mut buo,
        ref mut drag,
        ref mut cnvwt,
        ref mut qeso,
        ref mut heo,
        ref mut heso,
        ..
    } = *working_state;

    kernel_timer.start();

    stencil::apply(Sweep::Elementwise, im, 1..=1, |i, _| {
        kbm.set(i, km);
        kmax.set(i, km);
        tx1.set(i, 1.0 / ps.get(i));
    });

    // Levels are scanned from the surface upward, so the last level still
    // satisfying each pressure-ratio test is the one that sticks.
    stencil::apply(Sweep::Forward, im, 1..=km, |i, k| {
        let pressure_ratio = prsl.get(i, k) * tx1.get(i);
        if pressure_ratio > 0.70 {
            kbm.set(i, k + 1);
        }
        if pressure_ratio > 0.60 {
            kmax.set(i, k + 1);
        }
    });

    stencil::apply(Sweep::Elementwise, im, 1..=1, |i, _| {
        kmax.set(i, min(kmax.get(i), km));
        kbm.set(i, min(kbm.get(i), kmax.get(i)));
    });

    stencil::apply(Sweep::Elementwise, im, 1..=km, |i, k| {
        // Hydrostatic height at layer centers, flat surface assumed.
        zo.set(i, k, phil.get(i, k) / G);
        flg.set(i, k, cnvflg.get(i));
        kpbl.set(i, k, 1);
    });

    stencil::apply(Sweep::Elementwise, im, 1..=km - 1, |i, k| {
        zi.set(i, k, 0.5 * (zo.get(i, k) + zo.get_offset(i, k, 1)));
    });

    // Carry the search mask up the column; kpbl records the 1-based index
    // of the last level at or below the boundary-layer height.
    stencil::apply(Sweep::Forward, im, 2..=km - 1, |i, k| {
        if flg.get_offset(i, k, -1) == 1 && zo.get(i, k) <= hpbl.get(i) {
            kpbl.set(i, k, k);
            flg.set(i, k, flg.get_offset(i, k, -1));
        } else {
            kpbl.set(i, k, kpbl.get_offset(i, k, -1));
            flg.set(i, k, 0);
        }
    });

    // Propagate the found level back down so the whole column agrees. The
    // sweep sources from level km - 1, the topmost level the forward sweep
    // wrote; the top boundary level keeps its pre-search default.
    stencil::apply(Sweep::Backward, im, 1..=km - 2, |i, k| {
        kpbl.set(i, k, kpbl.get_offset(i, k, 1));
        flg.set(i, k, flg.get_offset(i, k, 1));
    });

    stencil::apply(Sweep::Elementwise, im, 1..=km, |i, k| {
        kpbl.set(i, k, min(kpbl.get(i, k), kbm.get(i)));

        pfld.set(i, k, prsl.get(i, k) * 10.0);
        qo.set(i, k, q1.get(i, k));

        // The previous qeso enters the denominator: a one-step fixed-point
        // update inherited from the scheme's incremental formulation, not a
        // closed form.
        let qeso_value = (0.01 * EPS * saturation_table.fpvs(to.get(i, k)))
            / (pfld.get(i, k) + EPSM1 * qeso.get(i, k));
        qeso.set(i, k, qeso_value.max(1.0e-8));
        qo.set(i, k, qo.get(i, k).max(1.0e-10));

        if cnvflg.get(i) == 1 && k <= kmax.get(i) {
            pfld.set(i, k, prsl.get(i, k) * 10.0);
            eta.set(i, k, 1.0);
            hcko.set(i, k, 0.0);
            qcko.set(i, k, 0.0);
            qrcko.set(i, k, 0.0);
            ucko.set(i, k, 0.0);
            vcko.set(i, k, 0.0);
            dbyo.set(i, k, 0.0);
            pwo.set(i, k, 0.0);
            dellal.set(i, k, 0.0);

            to.set(i, k, t1.get(i, k));
            qo.set(i, k, q1.get(i, k));
            uo.set(i, k, u1.get(i, k));
            vo.set(i, k, v1.get(i, k));

            wu2.set(i, k, 0.0);
            buo.set(i, k, 0.0);
            drag.set(i, k, 0.0);
            cnvwt.set(i, k, 0.0);

            let tem = phil.get(i, k) + CP * to.get(i, k);
            heo.set(i, k, tem + HVAP * qo.get(i, k));
            heso.set(i, k, tem + HVAP * qeso.get(i, k));
        }
    });

    kernel_timer.stop();
}

/// Copies each tracer into its working arrays and zeroes the entrainment
/// transport diagnostic, masked to active columns within the search ceiling.
pub fn init_tracers_kernel(
    model_params: &ModelParameters,
    model_inputs: &ModelInputs,
    working_state: &mut WorkingState,
    kernel_timer: &mut Timer,
) {
    let im = model_params.im;
    let km = model_params.km;

    let WorkingState {
        ref cnvflg,
        ref kmax,
        ref mut ctr,
        ref mut ctro,
        ref mut ecko,
        ..
    } = *working_state;

    kernel_timer.start();

    for (tracer_idx, qtr) in model_inputs.qtr.iter().enumerate() {
        let ctr = &mut ctr[tracer_idx];
        let ctro = &mut ctro[tracer_idx];
        let ecko = &mut ecko[tracer_idx];

        stencil::apply(Sweep::Elementwise, im, 1..=km, |i, k| {
            if cnvflg.get(i) == 1 && k <= kmax.get(i) {
                ctr.set(i, k, qtr.get(i, k));
                ctro.set(i, k, qtr.get(i, k));
                ecko.set(i, k, 0.0);
            }
        });
    }

    kernel_timer.stop();
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn test_params(im: usize, km: usize) -> ModelParameters {
        ModelParameters {
            im,
            km,
            ntr: 1,
            ..ModelParameters::default()
        }
    }

    fn timer() -> Timer {
        Timer::new("test", 1)
    }

    /// Single column, five levels, heights chosen so 300 m falls between
    /// levels 3 and 4 and the pressure thresholds land mid-column.
    fn pbl_scenario() -> (ModelParameters, ModelInputs, WorkingState) {
        let model_params = test_params(1, 5);
        let mut model_inputs = ModelInputs::zeros(&model_params);
        let mut working_state = WorkingState::new(&model_params);

        let heights = [0.0, 100.0, 250.0, 500.0, 900.0];
        let sigma = [0.95, 0.85, 0.75, 0.65, 0.50];

        model_inputs.psp.set(1, 100_000.0);
        model_inputs.hpbl.set(1, 300.0);
        model_inputs.garea.set(1, 1.0e6);
        for k in 1..=5 {
            model_inputs.phil.set(1, k, G * heights[k - 1]);
            model_inputs.prslp.set(1, k, 100_000.0 * sigma[k - 1]);
            model_inputs.delp.set(1, k, 20_000.0);
            model_inputs.t1.set(1, k, 300.0 - 0.0065 * heights[k - 1]);
            model_inputs.q1.set(1, k, 0.015);
            model_inputs.u1.set(1, k, 4.0);
            model_inputs.v1.set(1, k, -2.0);
            working_state.to.set(1, k, 300.0 - 0.0065 * heights[k - 1]);
        }

        pa_to_cb_kernel(&model_params, &model_inputs, &mut working_state, &mut timer());
        init_column_arrays_kernel(&model_params, &model_inputs, &mut working_state, &mut timer());

        (model_params, model_inputs, working_state)
    }

    #[test]
    fn pa_to_cb_is_linear_and_invertible() {
        let model_params = test_params(2, 3);
        let mut model_inputs = ModelInputs::zeros(&model_params);
        let mut working_state = WorkingState::new(&model_params);

        model_inputs.psp.set(1, 101_325.0);
        model_inputs.prslp.set(1, 2, 85_000.0);
        model_inputs.delp.set(2, 3, 12_500.0);

        pa_to_cb_kernel(&model_params, &model_inputs, &mut working_state, &mut timer());

        assert_relative_eq!(working_state.ps.get(1) / 0.001, 101_325.0, max_relative = 1e-14);
        assert_relative_eq!(
            working_state.prsl.get(1, 2) / 0.001,
            85_000.0,
            max_relative = 1e-14
        );
        assert_relative_eq!(
            working_state.del0.get(2, 3) / 0.001,
            12_500.0,
            max_relative = 1e-14
        );
    }

    #[test]
    fn column_reset_applies_sentinels_and_masks() {
        let model_params = test_params(2, 6);
        let mut model_inputs = ModelInputs::zeros(&model_params);
        let mut working_state = WorkingState::new(&model_params);

        model_inputs.kcnv.set(1, 1);
        model_inputs.garea.set(1, 4.0e6);
        model_inputs.garea.set(2, 4.0e6);

        init_column_arrays_kernel(&model_params, &model_inputs, &mut working_state, &mut timer());

        // Column 1 was taken by the deep scheme: flag cleared, markers left.
        assert_eq!(working_state.cnvflg.get(1), 0);
        assert_eq!(working_state.kbot.get(1), 0);

        // Column 2 is active: "no cloud" sentinels installed.
        assert_eq!(working_state.cnvflg.get(2), 1);
        assert_eq!(working_state.kbot.get(2), 7);
        assert_eq!(working_state.ktop.get(2), 0);

        for i in 1..=2 {
            assert_eq!(working_state.kbcon.get(i), 6);
            assert_eq!(working_state.kb.get(i), 6);
            assert_eq!(working_state.rn.get(i), 0.0);
            assert_eq!(working_state.gdx.get(i), 2000.0);
        }
    }

    #[test]
    fn rain_conversion_selects_land_parameter() {
        let mut model_params = test_params(2, 1);
        model_params.c0s = 1.0;
        model_params.asolfac = 2.0;

        let mut model_inputs = ModelInputs::zeros(&model_params);
        model_inputs.islimsk.set(1, 1);
        model_inputs.islimsk.set(2, 0);
        model_inputs.t1.set(1, 1, 280.0);
        model_inputs.t1.set(2, 1, 280.0);

        let mut working_state = WorkingState::new(&model_params);
        init_rain_conversion_kernel(&model_params, &model_inputs, &mut working_state, &mut timer());

        assert_eq!(working_state.c0.get(1), 2.0);
        assert_eq!(working_state.c0.get(2), 1.0);
    }

    #[test]
    fn rain_conversion_decays_below_freezing() {
        let model_params = test_params(1, 2);
        let mut model_inputs = ModelInputs::zeros(&model_params);
        model_inputs.t1.set(1, 1, 280.0);
        model_inputs.t1.set(1, 2, 260.0);

        let mut working_state = WorkingState::new(&model_params);
        init_rain_conversion_kernel(&model_params, &model_inputs, &mut working_state, &mut timer());

        let c0 = working_state.c0.get(1);
        assert_eq!(working_state.c0t.get(1, 1), c0);
        assert_relative_eq!(
            working_state.c0t.get(1, 2),
            c0 * (model_params.d0 * (260.0 - 273.16)).exp(),
            max_relative = 1e-14
        );

        assert_eq!(working_state.cnvw.get(1, 2), 0.0);
        assert_eq!(working_state.cnvc.get(1, 2), 0.0);
        assert_eq!(working_state.ud_mf.get(1, 2), 0.0);
        assert_eq!(working_state.dt_mf.get(1, 2), 0.0);
    }

    #[test]
    fn pbl_search_finds_level_straddling_boundary_layer_height() {
        let (model_params, model_inputs, mut working_state) = pbl_scenario();
        let saturation_table = SaturationTable::new();

        pbl_and_thermo_init_kernel(
            &model_params,
            &model_inputs,
            &mut working_state,
            &saturation_table,
            &mut timer(),
        );

        // 300 m sits between the 250 m and 500 m layers, so level 3 wins
        // and the backward sweep spreads it over levels 1..=4.
        for k in 1..=4 {
            assert_eq!(working_state.kpbl.get(1, k), 3, "level {}", k);
        }
        // The top boundary level is outside both sweeps.
        assert_eq!(working_state.kpbl.get(1, 5), 1);

        // Pressure-ratio thresholds: 0.70 last satisfied at level 3,
        // 0.60 at level 4.
        assert_eq!(working_state.kbm.get(1), 4);
        assert_eq!(working_state.kmax.get(1), 5);
    }

    #[test]
    fn level_indices_are_ordered_after_initialization() {
        let model_params = test_params(8, 24);
        let model_inputs = ModelInputs::idealized(&model_params);
        let mut working_state = WorkingState::new(&model_params);
        let saturation_table = SaturationTable::new();

        pa_to_cb_kernel(&model_params, &model_inputs, &mut working_state, &mut timer());
        init_column_arrays_kernel(&model_params, &model_inputs, &mut working_state, &mut timer());
        pbl_and_thermo_init_kernel(
            &model_params,
            &model_inputs,
            &mut working_state,
            &saturation_table,
            &mut timer(),
        );

        for i in 1..=model_params.im {
            let kbm = working_state.kbm.get(i);
            let kmax = working_state.kmax.get(i);
            assert!(kbm <= kmax && kmax <= model_params.km);
            for k in 1..=model_params.km {
                let kpbl = working_state.kpbl.get(i, k);
                assert!(kpbl >= 1 && kpbl <= kbm, "column {}, level {}", i, k);
            }
        }
    }

    #[test]
    fn forward_backward_sweep_is_idempotent() {
        let (model_params, model_inputs, mut working_state) = pbl_scenario();
        let saturation_table = SaturationTable::new();

        pbl_and_thermo_init_kernel(
            &model_params,
            &model_inputs,
            &mut working_state,
            &saturation_table,
            &mut timer(),
        );
        let first_pass: Vec<usize> = working_state.kpbl.iter().copied().collect();

        pbl_and_thermo_init_kernel(
            &model_params,
            &model_inputs,
            &mut working_state,
            &saturation_table,
            &mut timer(),
        );
        let second_pass: Vec<usize> = working_state.kpbl.iter().copied().collect();

        assert_eq!(first_pass, second_pass);
    }

    #[test]
    fn humidity_floors_hold_for_degenerate_inputs() {
        let model_params = test_params(1, 4);
        let mut model_inputs = ModelInputs::zeros(&model_params);
        let mut working_state = WorkingState::new(&model_params);

        // Masked column so the snapshot does not overwrite the floors.
        model_inputs.kcnv.set(1, 1);
        model_inputs.psp.set(1, 100_000.0);
        for k in 1..=4 {
            model_inputs.prslp.set(1, k, 90_000.0);
            model_inputs.q1.set(1, k, -0.5);
            // A huge stale qeso drives the denominator negative, which
            // would leave qeso negative without the floor.
            working_state.qeso.set(1, k, 1.0e6);
            working_state.to.set(1, k, 250.0);
        }

        let saturation_table = SaturationTable::new();
        pa_to_cb_kernel(&model_params, &model_inputs, &mut working_state, &mut timer());
        init_column_arrays_kernel(&model_params, &model_inputs, &mut working_state, &mut timer());
        pbl_and_thermo_init_kernel(
            &model_params,
            &model_inputs,
            &mut working_state,
            &saturation_table,
            &mut timer(),
        );

        for k in 1..=4 {
            assert!(working_state.qeso.get(1, k) >= 1.0e-8);
            assert!(working_state.qo.get(1, k) >= 1.0e-10);
        }
    }

    #[test]
    fn masked_columns_keep_prior_updraft_state() {
        let model_params = test_params(2, 5);
        let mut model_inputs = ModelInputs::zeros(&model_params);
        let mut working_state = WorkingState::new(&model_params);

        model_inputs.kcnv.set(1, 1);
        for i in 1..=2 {
            model_inputs.psp.set(i, 100_000.0);
            for k in 1..=5 {
                model_inputs.prslp.set(i, k, 80_000.0);
                model_inputs.t1.set(i, k, 290.0);
                model_inputs.q1.set(i, k, 0.01);
            }
            working_state.hcko.set(i, 3, 5.5);
        }

        let saturation_table = SaturationTable::new();
        pa_to_cb_kernel(&model_params, &model_inputs, &mut working_state, &mut timer());
        init_column_arrays_kernel(&model_params, &model_inputs, &mut working_state, &mut timer());
        pbl_and_thermo_init_kernel(
            &model_params,
            &model_inputs,
            &mut working_state,
            &saturation_table,
            &mut timer(),
        );

        // Masked column untouched, active column reset.
        assert_eq!(working_state.hcko.get(1, 3), 5.5);
        assert_eq!(working_state.hcko.get(2, 3), 0.0);
        assert_eq!(working_state.eta.get(2, 3), 1.0);
        assert_eq!(working_state.eta.get(1, 3), 0.0);
    }

    #[test]
    fn moist_static_energy_matches_formula_for_active_columns() {
        let (model_params, model_inputs, mut working_state) = pbl_scenario();
        let saturation_table = SaturationTable::new();

        pbl_and_thermo_init_kernel(
            &model_params,
            &model_inputs,
            &mut working_state,
            &saturation_table,
            &mut timer(),
        );

        for k in 1..=working_state.kmax.get(1) {
            let expected_heo = model_inputs.phil.get(1, k)
                + CP * model_inputs.t1.get(1, k)
                + HVAP * model_inputs.q1.get(1, k);
            assert_relative_eq!(working_state.heo.get(1, k), expected_heo, max_relative = 1e-12);

            let expected_heso = model_inputs.phil.get(1, k)
                + CP * model_inputs.t1.get(1, k)
                + HVAP * working_state.qeso.get(1, k);
            assert_relative_eq!(
                working_state.heso.get(1, k),
                expected_heso,
                max_relative = 1e-12
            );
        }
    }

    #[test]
    fn tracers_copied_only_inside_active_mask() {
        let model_params = test_params(2, 4);
        let mut model_inputs = ModelInputs::zeros(&model_params);
        let mut working_state = WorkingState::new(&model_params);

        model_inputs.kcnv.set(2, 1);
        for i in 1..=2 {
            for k in 1..=4 {
                model_inputs.qtr[0].set(i, k, 3.0e-6);
            }
        }

        init_column_arrays_kernel(&model_params, &model_inputs, &mut working_state, &mut timer());
        working_state.kmax.set(1, 3);
        working_state.kmax.set(2, 3);
        working_state.ecko[0].set(1, 2, 9.9);

        init_tracers_kernel(&model_params, &model_inputs, &mut working_state, &mut timer());

        assert_eq!(working_state.ctr[0].get(1, 2), 3.0e-6);
        assert_eq!(working_state.ctro[0].get(1, 2), 3.0e-6);
        assert_eq!(working_state.ecko[0].get(1, 2), 0.0);

        // Above the ceiling and in the masked column nothing moves.
        assert_eq!(working_state.ctr[0].get(1, 4), 0.0);
        assert_eq!(working_state.ctr[0].get(2, 2), 0.0);
    }
}
