//! Physical constants shared by the initialization kernels, with the GFS
//! physics values. Supplied here rather than configured: the scheme's
//! formulas assume this exact set.

use crate::WorkingPrecision;

/// Gravitational acceleration (m s^-2).
pub const G: WorkingPrecision = 9.80665;
/// Specific heat of dry air at constant pressure (J kg^-1 K^-1).
pub const CP: WorkingPrecision = 1.0046e3;
/// Latent heat of vaporization (J kg^-1).
pub const HVAP: WorkingPrecision = 2.5e6;
/// Latent heat of fusion (J kg^-1).
pub const HFUS: WorkingPrecision = 3.3358e5;
/// Gas constant for dry air (J kg^-1 K^-1).
pub const RD: WorkingPrecision = 2.8705e2;
/// Gas constant for water vapor (J kg^-1 K^-1).
pub const RV: WorkingPrecision = 4.615e2;
/// Specific heat of water vapor at constant pressure (J kg^-1 K^-1).
pub const CVAP: WorkingPrecision = 1.846e3;
/// Specific heat of liquid water (J kg^-1 K^-1).
pub const CLIQ: WorkingPrecision = 4.1855e3;
/// Specific heat of ice (J kg^-1 K^-1).
pub const CSOL: WorkingPrecision = 2.106e3;
/// Saturation vapor pressure at the triple point (Pa).
pub const PSAT: WorkingPrecision = 6.1078e2;
/// Triple-point temperature of water (K).
pub const TTP: WorkingPrecision = 273.16;
/// 0 degrees Celsius (K).
pub const T0C: WorkingPrecision = 273.15;

pub const EPS: WorkingPrecision = RD / RV;
pub const EPSM1: WorkingPrecision = RD / RV - 1.0;
pub const FVIRT: WorkingPrecision = RV / RD - 1.0;
