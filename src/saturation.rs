use crate::physical_constants::{CLIQ, CSOL, CVAP, HFUS, HVAP, PSAT, RV, TTP};
use crate::WorkingPrecision;

const TABLE_SIZE: usize = 7501;
const TEMP_MIN: WorkingPrecision = 180.0;
const TEMP_MAX: WorkingPrecision = 330.0;

/// Saturation vapor pressure lookup table.
///
/// Built once at startup from the exact blended liquid/ice formula and then
/// only read, so one table can be shared by reference across all column and
/// level evaluations. Queries interpolate linearly between entries and clamp
/// to the table's temperature domain instead of erroring, which keeps the
/// elementwise passes that call it free of failure paths.
pub struct SaturationTable {
    values: Vec<WorkingPrecision>,
    temp_increment: WorkingPrecision,
}

impl SaturationTable {
    pub fn new() -> Self {
        let temp_increment = (TEMP_MAX - TEMP_MIN) / ((TABLE_SIZE - 1) as WorkingPrecision);
        let values = (0..TABLE_SIZE)
            .map(|entry_idx| {
                exact_saturation_vapor_pressure(
                    TEMP_MIN + temp_increment * entry_idx as WorkingPrecision,
                )
            })
            .collect();

        SaturationTable {
            values,
            temp_increment,
        }
    }

    /// Saturation vapor pressure (Pa) at `temperature` (K).
    pub fn fpvs(&self, temperature: WorkingPrecision) -> WorkingPrecision {
        let position = ((temperature - TEMP_MIN) / self.temp_increment)
            .max(0.0)
            .min((TABLE_SIZE - 1) as WorkingPrecision);

        let lower_idx = (position.floor() as usize).min(TABLE_SIZE - 2);
        let fraction = position - lower_idx as WorkingPrecision;

        self.values[lower_idx] + fraction * (self.values[lower_idx + 1] - self.values[lower_idx])
    }
}

impl Default for SaturationTable {
    fn default() -> Self {
        SaturationTable::new()
    }
}

/// Exact saturation vapor pressure from integrating Clausius-Clapeyron with
/// constant heat capacities, blending the pure-liquid and pure-ice branches
/// linearly over the 20 K band below the triple point.
pub fn exact_saturation_vapor_pressure(temperature: WorkingPrecision) -> WorkingPrecision {
    let t_liquid = TTP;
    let t_ice = TTP - 20.0;

    let dldt_liquid = CVAP - CLIQ;
    let xpona_liquid = -dldt_liquid / RV;
    let xponb_liquid = -dldt_liquid / RV + HVAP / (RV * TTP);

    let dldt_ice = CVAP - CSOL;
    let heat_ice = HVAP + HFUS;
    let xpona_ice = -dldt_ice / RV;
    let xponb_ice = -dldt_ice / RV + heat_ice / (RV * TTP);

    let tr = TTP / temperature;

    let over_liquid = PSAT * tr.powf(xpona_liquid) * (xponb_liquid * (1.0 - tr)).exp();
    let over_ice = PSAT * tr.powf(xpona_ice) * (xponb_ice * (1.0 - tr)).exp();

    if temperature >= t_liquid {
        over_liquid
    } else if temperature < t_ice {
        over_ice
    } else {
        let liquid_weight = (temperature - t_ice) / (t_liquid - t_ice);
        liquid_weight * over_liquid + (1.0 - liquid_weight) * over_ice
    }
}
