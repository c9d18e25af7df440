use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MassPropertiesErrors {
    #[error("Ixx cant be less than or equal to  zero")]
    IxxLessThanOrEqualToZero,
    #[error("Iyy cant be less than or equal to zero")]
    IyyLessThanOrEqualToZero,
    #[error("Izz cant be less than or equal to zero")]
    IzzLessThanOrEqualToZero,
    #[error("inertia matrix is not symmetric")]
    InertiaNotSymmetric,
    #[error("mass cannot be less than or equal to zero")]
    MassLessThanOrEqualToZero,
    #[error("mass properties contain a non-finite value")]
    NonFinite,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CenterOfMass {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl CenterOfMass {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }
}

impl From<Vector3<f64>> for CenterOfMass {
    fn from(v: Vector3<f64>) -> CenterOfMass {
        CenterOfMass::new(v[0], v[1], v[2])
    }
}

/// Inertia tensor about the body origin, expressed in the body frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Inertia {
    pub ixx: f64,
    pub ixy: f64,
    pub ixz: f64,
    pub iyy: f64,
    pub iyz: f64,
    pub izz: f64,
}

impl Default for Inertia {
    fn default() -> Self {
        Self {
            ixx: 1.0,
            iyy: 1.0,
            izz: 1.0,
            ixy: 0.0,
            ixz: 0.0,
            iyz: 0.0,
        }
    }
}

impl Inertia {
    pub fn new(
        ixx: f64,
        iyy: f64,
        izz: f64,
        ixy: f64,
        ixz: f64,
        iyz: f64,
    ) -> Result<Self, MassPropertiesErrors> {
        let inertia = Self {
            ixx,
            iyy,
            izz,
            ixy,
            ixz,
            iyz,
        };
        inertia.validate()?;
        Ok(inertia)
    }

    /// Principal inertia with no products of inertia.
    pub fn diagonal(ixx: f64, iyy: f64, izz: f64) -> Result<Self, MassPropertiesErrors> {
        Self::new(ixx, iyy, izz, 0.0, 0.0, 0.0)
    }

    pub fn validate(&self) -> Result<(), MassPropertiesErrors> {
        let values = [self.ixx, self.iyy, self.izz, self.ixy, self.ixz, self.iyz];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(MassPropertiesErrors::NonFinite);
        }
        if self.ixx <= f64::EPSILON {
            return Err(MassPropertiesErrors::IxxLessThanOrEqualToZero);
        }
        if self.iyy <= f64::EPSILON {
            return Err(MassPropertiesErrors::IyyLessThanOrEqualToZero);
        }
        if self.izz <= f64::EPSILON {
            return Err(MassPropertiesErrors::IzzLessThanOrEqualToZero);
        }
        Ok(())
    }

    pub fn matrix(&self) -> Matrix3<f64> {
        Matrix3::new(
            self.ixx, self.ixy, self.ixz, //
            self.ixy, self.iyy, self.iyz, //
            self.ixz, self.iyz, self.izz,
        )
    }
}

impl TryFrom<Matrix3<f64>> for Inertia {
    type Error = MassPropertiesErrors;

    fn try_from(m: Matrix3<f64>) -> Result<Self, Self::Error> {
        if (m - m.transpose()).amax() > 1e-12 * m.amax().max(1.0) {
            return Err(MassPropertiesErrors::InertiaNotSymmetric);
        }
        Inertia::new(
            m[(0, 0)],
            m[(1, 1)],
            m[(2, 2)],
            m[(0, 1)],
            m[(0, 2)],
            m[(1, 2)],
        )
    }
}

/// Represents the mass properties of an object
/// Mass, Center of Mass, Inertia
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MassProperties {
    pub center_of_mass: CenterOfMass,
    pub mass: f64,
    pub inertia: Inertia,
}

impl Default for MassProperties {
    fn default() -> Self {
        Self {
            mass: 1.0,
            center_of_mass: CenterOfMass::default(),
            inertia: Inertia::default(),
        }
    }
}

impl MassProperties {
    pub fn new(
        mass: f64,
        center_of_mass: CenterOfMass,
        inertia: Inertia,
    ) -> Result<Self, MassPropertiesErrors> {
        let mp = MassProperties {
            mass,
            center_of_mass,
            inertia,
        };
        mp.validate()?;
        Ok(mp)
    }

    /// Checks values that may have bypassed `new`, e.g. when deserialized.
    pub fn validate(&self) -> Result<(), MassPropertiesErrors> {
        if !self.mass.is_finite() || !self.center_of_mass.vector().iter().all(|c| c.is_finite()) {
            return Err(MassPropertiesErrors::NonFinite);
        }
        if self.mass <= f64::EPSILON {
            return Err(MassPropertiesErrors::MassLessThanOrEqualToZero);
        }
        self.inertia.validate()
    }

    /// First mass moment, `mass * center_of_mass`.
    pub fn first_mass_moment(&self) -> Vector3<f64> {
        self.center_of_mass.vector() * self.mass
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_mass_must_be_positive() {
        let result = MassProperties::new(0.0, CenterOfMass::default(), Inertia::default());
        assert!(matches!(
            result,
            Err(MassPropertiesErrors::MassLessThanOrEqualToZero)
        ));
        let result = MassProperties::new(-2.0, CenterOfMass::default(), Inertia::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_inertia_diagonal_must_be_positive() {
        assert!(matches!(
            Inertia::diagonal(0.0, 1.0, 1.0),
            Err(MassPropertiesErrors::IxxLessThanOrEqualToZero)
        ));
        assert!(matches!(
            Inertia::diagonal(1.0, -1.0, 1.0),
            Err(MassPropertiesErrors::IyyLessThanOrEqualToZero)
        ));
        assert!(matches!(
            Inertia::diagonal(1.0, 1.0, 0.0),
            Err(MassPropertiesErrors::IzzLessThanOrEqualToZero)
        ));
    }

    #[test]
    fn test_non_finite_rejected() {
        let com = CenterOfMass::new(f64::NAN, 0.0, 0.0);
        assert!(matches!(
            MassProperties::new(1.0, com, Inertia::default()),
            Err(MassPropertiesErrors::NonFinite)
        ));
    }

    #[test]
    fn test_inertia_matrix_is_symmetric() {
        let inertia = Inertia::new(3.0, 4.0, 5.0, 0.1, 0.2, 0.3).unwrap();
        let m = inertia.matrix();
        assert_abs_diff_eq!(m, m.transpose(), epsilon = 1e-15);
        assert_abs_diff_eq!(m[(0, 1)], 0.1);
        assert_abs_diff_eq!(m[(0, 2)], 0.2);
        assert_abs_diff_eq!(m[(1, 2)], 0.3);
    }

    #[test]
    fn test_inertia_from_matrix() {
        let m = Matrix3::new(2.0, 0.5, 0.0, 0.5, 3.0, 0.0, 0.0, 0.0, 4.0);
        let inertia = Inertia::try_from(m).unwrap();
        assert_abs_diff_eq!(inertia.matrix(), m, epsilon = 1e-15);

        let asymmetric = Matrix3::new(2.0, 0.5, 0.0, 0.0, 3.0, 0.0, 0.0, 0.0, 4.0);
        assert!(matches!(
            Inertia::try_from(asymmetric),
            Err(MassPropertiesErrors::InertiaNotSymmetric)
        ));
    }

    #[test]
    fn test_first_mass_moment() {
        let mp = MassProperties::new(
            2.0,
            CenterOfMass::new(0.0, 1.0, -0.5),
            Inertia::default(),
        )
        .unwrap();
        assert_abs_diff_eq!(mp.first_mass_moment(), Vector3::new(0.0, 2.0, -1.0));
    }
}
