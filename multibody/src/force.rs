use nalgebra::{DVector, Vector3};
use std::fmt::Debug;

use crate::body::{Body, kinematics::BodyKinematics};

/// A force applied at a point on a body.
pub trait GlobalForceModel: Debug {
    /// Returns the application point in the body frame and the force vector
    /// in the world frame.
    fn get(&self, body: &Body, kinematics: &BodyKinematics) -> (Vector3<f64>, Vector3<f64>);
}

/// A force applied directly in generalized coordinates.
pub trait JointForceModel: Debug {
    /// Returns a generalized force with one entry per DOF.
    fn get(&self, body: &Body, x: &DVector<f64>, xdot: &DVector<f64>) -> DVector<f64>;
}

/// A force attached to a body, tagged by how it enters the equations of motion.
#[derive(Debug)]
pub enum Force {
    Global(Box<dyn GlobalForceModel>),
    Joint(Box<dyn JointForceModel>),
}

/// Uniform gravity, applied at the center of mass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gravity {
    /// Gravitational acceleration in the world frame.
    pub vector: Vector3<f64>,
}

impl Gravity {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            vector: Vector3::new(x, y, z),
        }
    }
}

impl GlobalForceModel for Gravity {
    fn get(&self, body: &Body, _kinematics: &BodyKinematics) -> (Vector3<f64>, Vector3<f64>) {
        (body.center_of_mass(), self.vector * body.mass())
    }
}

/// Viscous damping on the DOFs a body's maps select, `-c * xdot` on each.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViscousFriction {
    pub coefficient: f64,
}

impl ViscousFriction {
    pub fn new(coefficient: f64) -> Self {
        Self { coefficient }
    }
}

impl JointForceModel for ViscousFriction {
    fn get(&self, body: &Body, _x: &DVector<f64>, xdot: &DVector<f64>) -> DVector<f64> {
        let ihat = body.ihat();
        let itilde = body.itilde();
        let projection = ihat.transpose() * ihat + itilde.transpose() * itilde;
        projection * xdot * -self.coefficient
    }
}

impl From<Gravity> for Force {
    fn from(gravity: Gravity) -> Self {
        Force::Global(Box::new(gravity))
    }
}

impl From<ViscousFriction> for Force {
    fn from(friction: ViscousFriction) -> Self {
        Force::Joint(Box::new(friction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DofMap;
    use mass_properties::MassProperties;
    use nalgebra::DMatrix;

    #[test]
    fn test_friction_opposes_selected_dofs() {
        let body = Body::new("cart", MassProperties::default(), 3)
            .unwrap()
            .with_dof_maps(
                DofMap::single(0, 1).matrix(3).unwrap(),
                DofMap::single(1, 0).matrix(3).unwrap(),
            )
            .unwrap();
        let friction = ViscousFriction::new(2.0);
        let xdot = DVector::from_vec(vec![1.0, -0.5, 4.0]);
        let force = friction.get(&body, &DVector::zeros(3), &xdot);
        // dof 2 is not driven by this body, so it is left alone
        assert_eq!(force.as_slice(), &[-2.0, 1.0, 0.0]);
    }

    #[test]
    fn test_gravity_acts_at_center_of_mass() {
        let mut mp = MassProperties::default();
        mp.mass = 3.0;
        mp.center_of_mass.y = 1.0;
        let body = Body::new("link", mp, 1).unwrap();
        let kin = body.root_kinematics(&DVector::zeros(1));
        let (point, force) = Gravity::new(0.0, 0.0, -10.0).get(&body, &kin);
        assert_eq!(point, Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(force, Vector3::new(0.0, 0.0, -30.0));
        assert_eq!(kin.jacobian, DMatrix::zeros(6, 1));
    }

    #[test]
    fn test_force_tags() {
        assert!(matches!(Force::from(Gravity::new(0.0, 0.0, -1.0)), Force::Global(_)));
        assert!(matches!(Force::from(ViscousFriction::new(1.0)), Force::Joint(_)));
    }
}
