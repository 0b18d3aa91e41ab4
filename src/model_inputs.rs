use crate::field::{Field1D, Field2D};
use crate::model_parameters::ModelParameters;
use crate::physical_constants::{G, RD};
use crate::WorkingPrecision;

/// Caller-supplied state for one initialization step. Everything here is
/// read-only to the kernels; all results land in `WorkingState`.
pub struct ModelInputs {
    /// Surface pressure (Pa)
    pub psp: Field1D<WorkingPrecision>,
    /// Layer-center pressure (Pa)
    pub prslp: Field2D<WorkingPrecision>,
    /// Layer pressure thickness (Pa)
    pub delp: Field2D<WorkingPrecision>,

    /// Temperature (K)
    pub t1: Field2D<WorkingPrecision>,
    /// Specific humidity (kg/kg)
    pub q1: Field2D<WorkingPrecision>,
    /// Zonal wind (m/s)
    pub u1: Field2D<WorkingPrecision>,
    /// Meridional wind (m/s)
    pub v1: Field2D<WorkingPrecision>,
    /// Geopotential at layer centers (m^2/s^2)
    pub phil: Field2D<WorkingPrecision>,

    /// Boundary-layer height (m)
    pub hpbl: Field1D<WorkingPrecision>,
    /// Grid-cell area (m^2)
    pub garea: Field1D<WorkingPrecision>,
    /// Land/sea mask: 1 = land, 0 = sea, 2 = sea ice
    pub islimsk: Field1D<i32>,
    /// Convective-active flag from the deep scheme this step
    pub kcnv: Field1D<i32>,

    /// Tracer concentrations, one field per species
    pub qtr: Vec<Field2D<WorkingPrecision>>,
}

impl ModelInputs {
    /// All-zero inputs at the grid extents; used by tests and callers that
    /// fill fields themselves.
    pub fn zeros(model_params: &ModelParameters) -> Self {
        let im = model_params.im;
        let km = model_params.km;

        ModelInputs {
            psp: Field1D::new(im),
            prslp: Field2D::new(im, km),
            delp: Field2D::new(im, km),
            t1: Field2D::new(im, km),
            q1: Field2D::new(im, km),
            u1: Field2D::new(im, km),
            v1: Field2D::new(im, km),
            phil: Field2D::new(im, km),
            hpbl: Field1D::new(im),
            garea: Field1D::new(im),
            islimsk: Field1D::new(im),
            kcnv: Field1D::new(im),
            qtr: (0..model_params.ntr).map(|_| Field2D::new(im, km)).collect(),
        }
    }

    /// Analytic sounding for the demo driver: exponentially decaying
    /// pressure, a 6.5 K/km lapse rate, moisture decaying with height and a
    /// mix of land and sea columns.
    pub fn idealized(model_params: &ModelParameters) -> Self {
        let im = model_params.im;
        let km = model_params.km;

        let mut inputs = ModelInputs::zeros(model_params);

        let surface_pressure = 101_325.0;
        let surface_temperature = 300.0;
        let lapse_rate = 6.5e-3;
        let scale_height = RD * surface_temperature / G;

        for column_idx in 1..=im {
            inputs.psp.set(column_idx, surface_pressure);
            inputs
                .hpbl
                .set(column_idx, 600.0 + 40.0 * (column_idx % 8) as WorkingPrecision);
            inputs.garea.set(column_idx, 25.0e3 * 25.0e3);
            inputs
                .islimsk
                .set(column_idx, if column_idx % 3 == 0 { 1 } else { 0 });
            inputs
                .kcnv
                .set(column_idx, if column_idx % 11 == 0 { 1 } else { 0 });

            for level_idx in 1..=km {
                // Layer centers on a uniform sigma spacing.
                let sigma =
                    1.0 - (level_idx as WorkingPrecision - 0.5) / km as WorkingPrecision;
                let pressure = surface_pressure * sigma;
                let height = -scale_height * sigma.ln();

                inputs.prslp.set(column_idx, level_idx, pressure);
                inputs
                    .delp
                    .set(column_idx, level_idx, surface_pressure / km as WorkingPrecision);
                inputs.t1.set(
                    column_idx,
                    level_idx,
                    surface_temperature - lapse_rate * height,
                );
                inputs
                    .q1
                    .set(column_idx, level_idx, 0.016 * (-height / 2500.0).exp());
                inputs.u1.set(column_idx, level_idx, 5.0);
                inputs.v1.set(column_idx, level_idx, -3.0);
                inputs.phil.set(column_idx, level_idx, G * height);

                for tracer_idx in 0..model_params.ntr {
                    inputs.qtr[tracer_idx].set(
                        column_idx,
                        level_idx,
                        1.0e-6 * (tracer_idx + 1) as WorkingPrecision
                            * (-height / 4000.0).exp(),
                    );
                }
            }
        }

        inputs
    }
}
