use serde_derive::Deserialize;

use crate::WorkingPrecision;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ModelParameters {
    /// Number of columns (horizontal grid points)
    pub im: usize,

    /// Number of vertical levels, surface at level 1
    pub km: usize,

    /// Number of tracer species carried through initialization
    pub ntr: usize,

    /// Base rain conversion parameter (s^-1)
    pub c0s: WorkingPrecision,

    /// Aerosol-aware scaling of the rain conversion parameter over land
    pub asolfac: WorkingPrecision,

    /// Decay rate of the rain conversion parameter below freezing (K^-1)
    pub d0: WorkingPrecision,
}

impl Default for ModelParameters {
    fn default() -> Self {
        ModelParameters {
            im: 64,
            km: 32,
            ntr: 2,
            c0s: 0.002,
            asolfac: 0.958,
            d0: 0.01,
        }
    }
}

impl ModelParameters {
    pub fn new(config_fname: &str) -> Result<Self, config::ConfigError> {
        let mut settings = config::Config::default();

        settings
            .merge(config::File::with_name(config_fname).required(false))?
            .merge(config::Environment::with_prefix("SHALCONV"))?;

        settings.try_into()
    }
}
