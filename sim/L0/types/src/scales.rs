//! Reference scales for combining differently-dimensioned error terms.
//!
//! Every energy-error term measures a violation in its own units (kg, m,
//! m/s, N, ...). Dividing by a characteristic magnitude makes the violation
//! dimensionless, and multiplying by the energy scale `mass * specific_energy`
//! puts all terms on a common footing so they can be summed.
//!
//! No automatic scale discovery is performed. Pick scales that match the
//! modeled system: a satellite and a marble need very different constants.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Characteristic magnitudes of a physical system.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReferenceScales {
    /// Characteristic mass (kg).
    pub mass: f64,
    /// Characteristic length (m).
    pub length: f64,
    /// Characteristic time (s).
    pub time: f64,
    /// Characteristic energy per unit mass (J/kg).
    pub specific_energy: f64,
}

impl Default for ReferenceScales {
    fn default() -> Self {
        Self::unit()
    }
}

impl ReferenceScales {
    /// All scales equal to one SI unit.
    #[must_use]
    pub const fn unit() -> Self {
        Self {
            mass: 1.0,
            length: 1.0,
            time: 1.0,
            specific_energy: 1.0,
        }
    }

    /// Scales for a body of the given mass moving `length` in `time`.
    ///
    /// The specific energy is the kinetic energy per unit mass of that
    /// motion, `(length / time)²`.
    #[must_use]
    pub fn for_motion(mass: f64, length: f64, time: f64) -> Self {
        let speed = length / time;
        Self {
            mass,
            length,
            time,
            specific_energy: speed * speed,
        }
    }

    /// Energy scale (J).
    #[must_use]
    pub fn energy(&self) -> f64 {
        self.mass * self.specific_energy
    }

    /// Velocity scale (m/s).
    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.length / self.time
    }

    /// Acceleration scale (m/s²).
    #[must_use]
    pub fn acceleration(&self) -> f64 {
        self.length / (self.time * self.time)
    }

    /// Momentum scale (kg·m/s).
    #[must_use]
    pub fn momentum(&self) -> f64 {
        self.mass * self.velocity()
    }

    /// Force scale (N).
    #[must_use]
    pub fn force(&self) -> f64 {
        self.mass * self.acceleration()
    }

    /// Rotational energy scale `mass * length² / time²` (J).
    #[must_use]
    pub fn rotational_energy(&self) -> f64 {
        let v = self.velocity();
        self.mass * v * v
    }

    /// Validate that every scale is positive and finite.
    pub fn validate(&self) -> crate::Result<()> {
        let named = [
            ("mass", self.mass),
            ("length", self.length),
            ("time", self.time),
            ("specific_energy", self.specific_energy),
        ];
        for (name, value) in named {
            if !value.is_finite() || value <= 0.0 {
                return Err(crate::SimError::invalid_config(format!(
                    "reference {name} must be positive and finite, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_unit_scales() {
        let scales = ReferenceScales::unit();
        assert!(scales.validate().is_ok());
        assert_eq!(scales.energy(), 1.0);
        assert_eq!(scales.force(), 1.0);
        assert_eq!(scales, ReferenceScales::default());
    }

    #[test]
    fn test_derived_scales() {
        let scales = ReferenceScales::for_motion(2.0, 3.0, 0.5);
        assert_relative_eq!(scales.velocity(), 6.0, epsilon = 1e-12);
        assert_relative_eq!(scales.acceleration(), 12.0, epsilon = 1e-12);
        assert_relative_eq!(scales.momentum(), 12.0, epsilon = 1e-12);
        assert_relative_eq!(scales.force(), 24.0, epsilon = 1e-12);
        assert_relative_eq!(scales.specific_energy, 36.0, epsilon = 1e-12);
        assert_relative_eq!(scales.energy(), 72.0, epsilon = 1e-12);
        assert_relative_eq!(scales.rotational_energy(), 72.0, epsilon = 1e-12);
    }

    #[test]
    fn test_validation() {
        let mut scales = ReferenceScales::unit();
        scales.time = 0.0;
        assert!(scales.validate().is_err());

        scales.time = 1.0;
        scales.mass = f64::NAN;
        assert!(scales.validate().is_err());

        scales.mass = -1.0;
        let err = scales.validate().unwrap_err();
        assert!(err.to_string().contains("mass"));
    }
}
