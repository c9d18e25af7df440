use nalgebra::{DMatrix, DVector, Matrix3, Vector3};
use spatial_algebra::{dynamic, from_4matrix3, skew, stack};

use super::Body;

/// Kinematic state of one body for one evaluation.
///
/// The Jacobian maps generalized velocities to the body's spatial velocity:
/// rows 0..3 are the angular velocity in the body frame, rows 3..6 the
/// velocity of the body origin in the world frame.
#[derive(Clone, Debug)]
pub struct BodyKinematics {
    /// Rotation from the body frame to the world frame.
    pub rotation_global: Matrix3<f64>,
    /// Angular velocity accumulated from the root, in this body's parent frame
    /// chain. Used for the velocity product terms.
    pub omega_global: Vector3<f64>,
    pub omega_global_skew: Matrix3<f64>,
    /// Local translational velocity, `itilde * xdot`.
    pub velocity: Vector3<f64>,
    pub jacobian: DMatrix<f64>,
    pub jacobian_dot: DMatrix<f64>,
}

fn vector3(v: &DVector<f64>) -> Vector3<f64> {
    Vector3::new(v[0], v[1], v[2])
}

impl Body {
    /// Kinematics of the root body.
    ///
    /// The root's own DOF maps seed its Jacobian, so zero maps give a fixed
    /// base and identity blocks give a free one. Its Jacobian derivative is
    /// zero.
    pub fn root_kinematics(&self, xdot: &DVector<f64>) -> BodyKinematics {
        let jacobian = stack(&self.ihat, &self.itilde);
        let spatial_velocity = &jacobian * xdot;
        let omega_global = Vector3::new(
            spatial_velocity[0],
            spatial_velocity[1],
            spatial_velocity[2],
        );
        let velocity = Vector3::new(
            spatial_velocity[3],
            spatial_velocity[4],
            spatial_velocity[5],
        );
        BodyKinematics {
            rotation_global: self.rotation,
            omega_global,
            omega_global_skew: skew(&omega_global),
            velocity,
            jacobian_dot: DMatrix::zeros(6, self.dof()),
            jacobian,
        }
    }

    /// Kinematics of a non-root body from its parent's kinematics.
    pub fn kinematics(&self, parent: &BodyKinematics, xdot: &DVector<f64>) -> BodyKinematics {
        let n = self.dof();
        let parent_rotation = &parent.rotation_global;
        let rotation_global = parent_rotation * self.rotation;

        let omega_local = vector3(&(&self.ihat * xdot));
        let velocity = vector3(&(&self.itilde * xdot));
        let omega_global = parent.omega_global + self.rotation * omega_local;

        let omega_local_skew = skew(&omega_local);
        let omega_global_skew = skew(&omega_global);
        let position_skew = skew(&self.position);
        let velocity_skew = skew(&velocity);
        let zero = Matrix3::zeros();

        // carries the parent's spatial velocity to this body's origin
        let jacobian_prime = from_4matrix3(
            &self.rotation.transpose(),
            &zero,
            &(parent_rotation * position_skew.transpose()),
            &Matrix3::identity(),
        );

        let jacobian = &jacobian_prime * &parent.jacobian
            + stack(&self.ihat, &(dynamic(parent_rotation) * &self.itilde));

        let jacobian_star = from_4matrix3(
            &(omega_local_skew * parent_rotation),
            &zero,
            &(-parent_rotation * (parent.omega_global_skew * position_skew + velocity_skew)),
            &zero,
        );

        let jacobian_dot = &jacobian_star * &parent.jacobian
            + &jacobian_prime * &parent.jacobian_dot
            + stack(
                &DMatrix::zeros(3, n),
                &(dynamic(&(parent_rotation * omega_local_skew)) * &self.itilde),
            );

        BodyKinematics {
            rotation_global,
            omega_global,
            omega_global_skew,
            velocity,
            jacobian,
            jacobian_dot,
        }
    }
}
