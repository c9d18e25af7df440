use mass_properties::MassProperties;
use nalgebra::{DMatrix, DVector, Matrix3, Vector3};
use std::ops::AddAssign;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpatialErrors {
    #[error("expected a vector of length {expected}, found length {found}")]
    ShapeMismatch { expected: usize, found: usize },
}

/// Cross product matrix of `v`, such that `skew(v) * w == v.cross(&w)`.
#[inline]
pub fn skew(v: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(
        0.0, -v.z, v.y, //
        v.z, 0.0, -v.x, //
        -v.y, v.x, 0.0,
    )
}

/// Cross product matrix from an untyped slice, which must have length 3.
pub fn try_skew(v: &[f64]) -> Result<Matrix3<f64>, SpatialErrors> {
    if v.len() != 3 {
        return Err(SpatialErrors::ShapeMismatch {
            expected: 3,
            found: v.len(),
        });
    }
    Ok(skew(&Vector3::from_column_slice(v)))
}

/// Copies a static 3x3 matrix into a dynamically sized one so it can be
/// multiplied against 3xn DOF maps.
#[inline]
pub fn dynamic(m: &Matrix3<f64>) -> DMatrix<f64> {
    DMatrix::from_column_slice(3, 3, m.as_slice())
}

/// Builds a 6x6 block matrix from four 3x3 quadrants.
pub fn from_4matrix3(
    q11: &Matrix3<f64>,
    q12: &Matrix3<f64>,
    q21: &Matrix3<f64>,
    q22: &Matrix3<f64>,
) -> DMatrix<f64> {
    let mut m = DMatrix::zeros(6, 6);
    m.fixed_view_mut::<3, 3>(0, 0).copy_from(q11);
    m.fixed_view_mut::<3, 3>(0, 3).copy_from(q12);
    m.fixed_view_mut::<3, 3>(3, 0).copy_from(q21);
    m.fixed_view_mut::<3, 3>(3, 3).copy_from(q22);
    m
}

/// Stacks a rotational 3xn block on top of a translational 3xn block.
///
/// Both blocks must be 3xn with the same n; callers validate DOF map shapes
/// before they get here.
pub fn stack(rotation: &DMatrix<f64>, translation: &DMatrix<f64>) -> DMatrix<f64> {
    let n = rotation.ncols();
    let mut m = DMatrix::zeros(6, n);
    m.view_mut((0, 0), (3, n)).copy_from(rotation);
    m.view_mut((3, 0), (3, n)).copy_from(translation);
    m
}

/// A 6 component quantity, rotational part first.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SpatialVector {
    pub rotation: Vector3<f64>,
    pub translation: Vector3<f64>,
}

impl SpatialVector {
    pub fn new(rotation: Vector3<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    pub fn zeros() -> Self {
        Self::default()
    }

    /// Spatial force of a world frame force `force` applied at `point`, a
    /// location in the body frame of a body with global rotation `rotation`.
    /// The moment is taken about the body origin in the body frame.
    pub fn force_at(
        point: &Vector3<f64>,
        force: &Vector3<f64>,
        rotation: &Matrix3<f64>,
    ) -> Self {
        Self::new(skew(point) * rotation.transpose() * force, *force)
    }

    pub fn vector(&self) -> DVector<f64> {
        DVector::from_iterator(
            6,
            self.rotation
                .iter()
                .chain(self.translation.iter())
                .copied(),
        )
    }
}

impl AddAssign<SpatialVector> for SpatialVector {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.rotation += rhs.rotation;
        self.translation += rhs.translation;
    }
}

/// Mass properties in the form used by the spatial equations of motion.
///
/// Everything here depends only on the body's mass properties, so it is
/// computed once when the body is created.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpatialMass {
    pub mass: f64,
    pub center_of_mass: Vector3<f64>,
    /// Inertia about the body origin, body frame.
    pub inertia: Matrix3<f64>,
    pub mass_ident: Matrix3<f64>,
    pub first_mass_moment_skew: Matrix3<f64>,
}

impl SpatialMass {
    /// 6x6 spatial mass matrix for a body whose rotational velocity is in
    /// the body frame and translational velocity is in the world frame.
    pub fn matrix(&self, rotation_global: &Matrix3<f64>) -> DMatrix<f64> {
        let corner = self.first_mass_moment_skew * rotation_global.transpose();
        from_4matrix3(
            &self.inertia,
            &corner,
            &corner.transpose(),
            &self.mass_ident,
        )
    }

    /// Velocity product terms, gyroscopic moment and centripetal force.
    pub fn bias(
        &self,
        omega: &Vector3<f64>,
        omega_skew: &Matrix3<f64>,
        rotation_global: &Matrix3<f64>,
    ) -> SpatialVector {
        let omega_squared = omega_skew * omega_skew;
        SpatialVector::new(
            omega_skew * self.inertia * omega,
            rotation_global * omega_squared * self.center_of_mass * self.mass,
        )
    }
}

impl From<&MassProperties> for SpatialMass {
    fn from(mp: &MassProperties) -> Self {
        let mass = mp.mass;
        Self {
            mass,
            center_of_mass: mp.center_of_mass.vector(),
            inertia: mp.inertia.matrix(),
            mass_ident: Matrix3::identity() * mass,
            first_mass_moment_skew: skew(&mp.first_mass_moment()),
        }
    }
}

impl From<MassProperties> for SpatialMass {
    fn from(mp: MassProperties) -> Self {
        SpatialMass::from(&mp)
    }
}
