use crate::field::{Field1D, Field2D};
use crate::model_parameters::ModelParameters;
use crate::WorkingPrecision;

/// Working and output fields of the initialization step. Allocated once per
/// grid and overwritten in place each step; nothing here is read before the
/// kernels write it, except `qeso` and `to`, which deliberately carry their
/// previous-step values into the saturation update (see `pbl_search_kernel`).
pub struct WorkingState {
    // Pressure fields after unit conversion
    /// Surface pressure (cb)
    pub ps: Field1D<WorkingPrecision>,
    /// Layer-center pressure (cb)
    pub prsl: Field2D<WorkingPrecision>,
    /// Layer pressure thickness (cb)
    pub del0: Field2D<WorkingPrecision>,
    /// Layer-center pressure (mb)
    pub pfld: Field2D<WorkingPrecision>,

    // Per-column flags and level indices
    /// Shallow-convection active flag
    pub cnvflg: Field1D<i32>,
    /// Maximum parcel-origin level
    pub kbm: Field1D<usize>,
    /// Cloud-top search ceiling
    pub kmax: Field1D<usize>,
    /// Updraft-base level ("not yet found" = km)
    pub kb: Field1D<usize>,
    /// Convection-base level ("not yet found" = km)
    pub kbcon: Field1D<usize>,
    /// Cloud-top marker ("no cloud" = 0)
    pub ktop: Field1D<usize>,
    /// Cloud-bottom marker ("no cloud" = km + 1)
    pub kbot: Field1D<usize>,
    /// Reciprocal surface pressure (cb^-1)
    pub tx1: Field1D<WorkingPrecision>,

    // Per-column diagnostics
    /// Accumulated convective rain
    pub rn: Field1D<WorkingPrecision>,
    /// Grid length scale, sqrt(area) (m)
    pub gdx: Field1D<WorkingPrecision>,
    /// Rain conversion parameter after the land/sea selection
    pub c0: Field1D<WorkingPrecision>,

    // PBL search working fields (per level so the sweeps can propagate)
    /// Search mask, carried level to level by the sweeps
    pub flg: Field2D<i32>,
    /// Level index nearest the boundary-layer height
    pub kpbl: Field2D<usize>,
    /// Layer-center height (m)
    pub zo: Field2D<WorkingPrecision>,
    /// Interface height (m)
    pub zi: Field2D<WorkingPrecision>,

    // Cloud microphysics and mass-flux diagnostics
    /// Rain conversion parameter with the below-freezing correction
    pub c0t: Field2D<WorkingPrecision>,
    /// Convective cloud water
    pub cnvw: Field2D<WorkingPrecision>,
    /// Convective cloud cover
    pub cnvc: Field2D<WorkingPrecision>,
    /// Updraft mass flux
    pub ud_mf: Field2D<WorkingPrecision>,
    /// Detrainment mass flux
    pub dt_mf: Field2D<WorkingPrecision>,

    // Updraft working arrays
    /// Normalized mass flux
    pub eta: Field2D<WorkingPrecision>,
    pub hcko: Field2D<WorkingPrecision>,
    pub qcko: Field2D<WorkingPrecision>,
    pub qrcko: Field2D<WorkingPrecision>,
    pub ucko: Field2D<WorkingPrecision>,
    pub vcko: Field2D<WorkingPrecision>,
    /// Updraft buoyancy excess
    pub dbyo: Field2D<WorkingPrecision>,
    /// Precipitation water
    pub pwo: Field2D<WorkingPrecision>,
    /// Detrained liquid water
    pub dellal: Field2D<WorkingPrecision>,
    /// Updraft velocity squared
    pub wu2: Field2D<WorkingPrecision>,
    pub buo: Field2D<WorkingPrecision>,
    pub drag: Field2D<WorkingPrecision>,
    /// Condensate weighting
    pub cnvwt: Field2D<WorkingPrecision>,

    // Thermodynamic state snapshots and diagnostics
    pub to: Field2D<WorkingPrecision>,
    pub qo: Field2D<WorkingPrecision>,
    pub uo: Field2D<WorkingPrecision>,
    pub vo: Field2D<WorkingPrecision>,
    /// Saturation specific humidity
    pub qeso: Field2D<WorkingPrecision>,
    /// Moist static energy
    pub heo: Field2D<WorkingPrecision>,
    /// Saturation moist static energy
    pub heso: Field2D<WorkingPrecision>,

    // Tracer working copies, one per species
    pub ctr: Vec<Field2D<WorkingPrecision>>,
    pub ctro: Vec<Field2D<WorkingPrecision>>,
    /// Tracer entrainment transport
    pub ecko: Vec<Field2D<WorkingPrecision>>,
}

impl WorkingState {
    pub fn new(model_params: &ModelParameters) -> Self {
        let im = model_params.im;
        let km = model_params.km;
        let ntr = model_params.ntr;

        let field_2d = || Field2D::new(im, km);
        let tracer_set = || (0..ntr).map(|_| Field2D::new(im, km)).collect();

        WorkingState {
            ps: Field1D::new(im),
            prsl: field_2d(),
            del0: field_2d(),
            pfld: field_2d(),

            cnvflg: Field1D::new(im),
            kbm: Field1D::new(im),
            kmax: Field1D::new(im),
            kb: Field1D::new(im),
            kbcon: Field1D::new(im),
            ktop: Field1D::new(im),
            kbot: Field1D::new(im),
            tx1: Field1D::new(im),

            rn: Field1D::new(im),
            gdx: Field1D::new(im),
            c0: Field1D::new(im),

            flg: Field2D::new(im, km),
            kpbl: Field2D::new(im, km),
            zo: field_2d(),
            zi: field_2d(),

            c0t: field_2d(),
            cnvw: field_2d(),
            cnvc: field_2d(),
            ud_mf: field_2d(),
            dt_mf: field_2d(),

            eta: field_2d(),
            hcko: field_2d(),
            qcko: field_2d(),
            qrcko: field_2d(),
            ucko: field_2d(),
            vcko: field_2d(),
            dbyo: field_2d(),
            pwo: field_2d(),
            dellal: field_2d(),
            wu2: field_2d(),
            buo: field_2d(),
            drag: field_2d(),
            cnvwt: field_2d(),

            to: field_2d(),
            qo: field_2d(),
            uo: field_2d(),
            vo: field_2d(),
            qeso: field_2d(),
            heo: field_2d(),
            heso: field_2d(),

            ctr: tracer_set(),
            ctro: tracer_set(),
            ecko: tracer_set(),
        }
    }
}
