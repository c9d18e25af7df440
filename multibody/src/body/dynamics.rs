use nalgebra::{DMatrix, DVector};
use spatial_algebra::SpatialVector;
use std::ops::AddAssign;

use super::{Body, kinematics::BodyKinematics};
use crate::{MultibodyErrors, check_shape, force::Force};

/// Generalized equations of motion `h * xddot + d = f`, either for a single
/// body or summed over a subtree.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneralizedDynamics {
    /// Generalized mass matrix, n x n.
    pub h: DMatrix<f64>,
    /// Velocity product terms.
    pub d: DVector<f64>,
    /// Generalized applied forces.
    pub f: DVector<f64>,
}

impl GeneralizedDynamics {
    pub fn zeros(n: usize) -> Self {
        Self {
            h: DMatrix::zeros(n, n),
            d: DVector::zeros(n),
            f: DVector::zeros(n),
        }
    }
}

impl AddAssign<&GeneralizedDynamics> for GeneralizedDynamics {
    fn add_assign(&mut self, rhs: &GeneralizedDynamics) {
        self.h += &rhs.h;
        self.d += &rhs.d;
        self.f += &rhs.f;
    }
}

impl AddAssign<GeneralizedDynamics> for GeneralizedDynamics {
    fn add_assign(&mut self, rhs: GeneralizedDynamics) {
        *self += &rhs;
    }
}

impl Body {
    /// This body's own contribution to the generalized dynamics.
    pub fn dynamics(
        &self,
        kinematics: &BodyKinematics,
        x: &DVector<f64>,
        xdot: &DVector<f64>,
    ) -> Result<GeneralizedDynamics, MultibodyErrors> {
        let jacobian_t = kinematics.jacobian.transpose();
        let mass = self.spatial_mass.matrix(&kinematics.rotation_global);
        let jacobian_t_mass = &jacobian_t * mass;

        let h = &jacobian_t_mass * &kinematics.jacobian;

        let bias = self.spatial_mass.bias(
            &kinematics.omega_global,
            &kinematics.omega_global_skew,
            &kinematics.rotation_global,
        );
        let d = &jacobian_t_mass * (&kinematics.jacobian_dot * xdot) + &jacobian_t * bias.vector();

        let (spatial, joint) = self.applied_forces(kinematics, x, xdot)?;
        let f = &jacobian_t * spatial.vector() + joint;

        Ok(GeneralizedDynamics { h, d, f })
    }

    /// Sums the attached forces into one spatial force about the body origin
    /// and one generalized force vector.
    fn applied_forces(
        &self,
        kinematics: &BodyKinematics,
        x: &DVector<f64>,
        xdot: &DVector<f64>,
    ) -> Result<(SpatialVector, DVector<f64>), MultibodyErrors> {
        let mut spatial = SpatialVector::zeros();
        let mut joint = DVector::zeros(self.dof());
        for force in &self.forces {
            match force {
                Force::Global(model) => {
                    let (point, vector) = model.get(self, kinematics);
                    spatial += SpatialVector::force_at(
                        &point,
                        &vector,
                        &kinematics.rotation_global,
                    );
                }
                Force::Joint(model) => {
                    let generalized = model.get(self, x, xdot);
                    check_shape("joint force", (self.dof(), 1), generalized.shape())?;
                    joint += generalized;
                }
            }
        }
        Ok((spatial, joint))
    }
}
