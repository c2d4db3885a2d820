//! Bonded-interaction handle types and their plain-data parameters.
//!
//! Each synchronized type wraps one bond's physical parameters and
//! answers the read-only `energy` method (named argument `r`). Energy
//! evaluation is local arithmetic; only parameter changes replicate.

use chorus_core::DispatchError;
use chorus_object::{Context, ParamMap, SyncObject, Value};

/// Plain-data bond parameters, as a simulation core stores them.
///
/// This is what [`BondTable`](crate::BondTable) keeps per entry: no
/// handles, no sharing, just numbers a force loop can read.
#[derive(Clone, Debug, PartialEq)]
pub enum BondParams {
    /// Harmonic spring.
    Harmonic {
        /// Spring constant.
        k: f64,
        /// Rest length.
        r_0: f64,
        /// Range bound; non-positive disables the cutoff.
        r_cut: f64,
    },
    /// Short-range Coulomb pair with the prefactor folded in.
    Coulomb {
        /// Charge product times prefactor.
        q1q2: f64,
    },
    /// Energy samples on a uniform grid over `[min, max]`.
    Tabulated {
        /// Lower end of the tabulated range.
        min: f64,
        /// Upper end of the tabulated range.
        max: f64,
        /// Uniformly spaced energy samples, at least two.
        energy: Vec<f64>,
    },
}

impl BondParams {
    /// Bond energy at separation `r`, or `None` outside the bond's
    /// domain.
    ///
    /// - Harmonic: `k / 2 * (r - r_0)^2`, unbounded unless `r_cut > 0`.
    /// - Coulomb: `q1q2 / r`, undefined at `r <= 0`.
    /// - Tabulated: linear interpolation between the two surrounding
    ///   samples, undefined outside `[min, max]`.
    pub fn energy(&self, r: f64) -> Option<f64> {
        match self {
            Self::Harmonic { k, r_0, r_cut } => {
                if *r_cut > 0.0 && r > *r_cut {
                    return None;
                }
                let stretch = r - r_0;
                Some(0.5 * k * stretch * stretch)
            }
            Self::Coulomb { q1q2 } => {
                if r <= 0.0 {
                    return None;
                }
                Some(q1q2 / r)
            }
            Self::Tabulated { min, max, energy } => {
                if energy.len() < 2 || *max <= *min || r < *min || r > *max {
                    return None;
                }
                let span = (max - min) / (energy.len() - 1) as f64;
                let pos = (r - min) / span;
                let below = (pos.floor() as usize).min(energy.len() - 2);
                let frac = pos - below as f64;
                Some(energy[below] * (1.0 - frac) + energy[below + 1] * frac)
            }
        }
    }
}

fn real_arg(args: &ParamMap, name: &str) -> Result<f64, DispatchError> {
    args.get(name)
        .ok_or_else(|| DispatchError::MissingArgument {
            name: name.to_owned(),
        })?
        .as_real()
}

fn energy_value(params: &BondParams, args: &ParamMap) -> Result<Value, DispatchError> {
    let r = real_arg(args, "r")?;
    Ok(match params.energy(r) {
        Some(energy) => Value::Real(energy),
        None => Value::None,
    })
}

// ── Harmonic ────────────────────────────────────────────────────────────────

/// Harmonic spring bond: `E(r) = k / 2 * (r - r_0)^2`.
///
/// Parameters `"k"`, `"r_0"`, `"r_cut"`, all reals. A non-positive
/// `r_cut` disables the range bound; beyond an enabled bound the
/// `energy` method answers [`Value::None`].
#[derive(Debug, Default)]
pub struct HarmonicBond {
    /// Spring constant.
    pub k: f64,
    /// Rest length.
    pub r_0: f64,
    /// Range bound; non-positive disables the cutoff.
    pub r_cut: f64,
}

impl HarmonicBond {
    /// This bond's parameters as core-side plain data.
    pub fn params(&self) -> BondParams {
        BondParams::Harmonic {
            k: self.k,
            r_0: self.r_0,
            r_cut: self.r_cut,
        }
    }
}

impl SyncObject for HarmonicBond {
    fn parameter_names(&self) -> &'static [&'static str] {
        &["k", "r_0", "r_cut"]
    }

    fn set_parameter(&mut self, name: &str, value: &Value) -> Result<(), DispatchError> {
        match name {
            "k" => self.k = value.as_real()?,
            "r_0" => self.r_0 = value.as_real()?,
            "r_cut" => self.r_cut = value.as_real()?,
            _ => {
                return Err(DispatchError::UnknownParameter {
                    name: name.to_owned(),
                })
            }
        }
        Ok(())
    }

    fn get_parameter(&self, name: &str) -> Result<Value, DispatchError> {
        match name {
            "k" => Ok(Value::Real(self.k)),
            "r_0" => Ok(Value::Real(self.r_0)),
            "r_cut" => Ok(Value::Real(self.r_cut)),
            _ => Err(DispatchError::UnknownParameter {
                name: name.to_owned(),
            }),
        }
    }

    fn call_method(
        &mut self,
        _ctx: &dyn Context,
        name: &str,
        args: &ParamMap,
    ) -> Result<Value, DispatchError> {
        match name {
            "energy" => energy_value(&self.params(), args),
            _ => Err(DispatchError::UnknownMethod {
                name: name.to_owned(),
            }),
        }
    }
}

// ── Coulomb ─────────────────────────────────────────────────────────────────

/// Short-range Coulomb pair: `E(r) = q1q2 / r`.
///
/// Single parameter `"q1q2"`, the charge product with the prefactor
/// folded in. Undefined at `r <= 0`.
#[derive(Debug, Default)]
pub struct CoulombPair {
    /// Charge product times prefactor.
    pub q1q2: f64,
}

impl CoulombPair {
    /// This bond's parameters as core-side plain data.
    pub fn params(&self) -> BondParams {
        BondParams::Coulomb { q1q2: self.q1q2 }
    }
}

impl SyncObject for CoulombPair {
    fn parameter_names(&self) -> &'static [&'static str] {
        &["q1q2"]
    }

    fn set_parameter(&mut self, name: &str, value: &Value) -> Result<(), DispatchError> {
        match name {
            "q1q2" => {
                self.q1q2 = value.as_real()?;
                Ok(())
            }
            _ => Err(DispatchError::UnknownParameter {
                name: name.to_owned(),
            }),
        }
    }

    fn get_parameter(&self, name: &str) -> Result<Value, DispatchError> {
        match name {
            "q1q2" => Ok(Value::Real(self.q1q2)),
            _ => Err(DispatchError::UnknownParameter {
                name: name.to_owned(),
            }),
        }
    }

    fn call_method(
        &mut self,
        _ctx: &dyn Context,
        name: &str,
        args: &ParamMap,
    ) -> Result<Value, DispatchError> {
        match name {
            "energy" => energy_value(&self.params(), args),
            _ => Err(DispatchError::UnknownMethod {
                name: name.to_owned(),
            }),
        }
    }
}

// ── Tabulated ───────────────────────────────────────────────────────────────

/// Tabulated bond energies on a uniform grid over `[min, max]`.
///
/// Parameters `"min"`, `"max"` (reals) and `"energy"` (vector of
/// samples). Evaluation interpolates linearly between the surrounding
/// samples and answers [`Value::None`] outside the range.
#[derive(Debug, Default)]
pub struct TabulatedBond {
    /// Lower end of the tabulated range.
    pub min: f64,
    /// Upper end of the tabulated range.
    pub max: f64,
    /// Uniformly spaced energy samples.
    pub energy: Vec<f64>,
}

impl TabulatedBond {
    /// This bond's parameters as core-side plain data.
    pub fn params(&self) -> BondParams {
        BondParams::Tabulated {
            min: self.min,
            max: self.max,
            energy: self.energy.clone(),
        }
    }
}

impl SyncObject for TabulatedBond {
    fn parameter_names(&self) -> &'static [&'static str] {
        &["min", "max", "energy"]
    }

    fn set_parameter(&mut self, name: &str, value: &Value) -> Result<(), DispatchError> {
        match name {
            "min" => self.min = value.as_real()?,
            "max" => self.max = value.as_real()?,
            "energy" => self.energy = value.as_vector()?.to_vec(),
            _ => {
                return Err(DispatchError::UnknownParameter {
                    name: name.to_owned(),
                })
            }
        }
        Ok(())
    }

    fn get_parameter(&self, name: &str) -> Result<Value, DispatchError> {
        match name {
            "min" => Ok(Value::Real(self.min)),
            "max" => Ok(Value::Real(self.max)),
            "energy" => Ok(Value::from(self.energy.clone())),
            _ => Err(DispatchError::UnknownParameter {
                name: name.to_owned(),
            }),
        }
    }

    fn call_method(
        &mut self,
        _ctx: &dyn Context,
        name: &str,
        args: &ParamMap,
    ) -> Result<Value, DispatchError> {
        match name {
            "energy" => energy_value(&self.params(), args),
            _ => Err(DispatchError::UnknownMethod {
                name: name.to_owned(),
            }),
        }
    }
}
