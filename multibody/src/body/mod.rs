use mass_properties::MassProperties;
use nalgebra::{DMatrix, Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use spatial_algebra::SpatialMass;

use crate::{MultibodyErrors, check_shape, force::Force};

pub mod dynamics;
pub mod kinematics;

/// Index of a body in its `BodyTree`. The root is always `BodyId::ROOT`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub(crate) usize);

impl BodyId {
    pub const ROOT: BodyId = BodyId(0);
}

/// Sparse description of a 3xn DOF map.
///
/// Each entry `(axis, dof)` puts a 1 at row `axis`, column `dof`. Most joints
/// only ever need one or two entries, so this is what configuration files
/// store instead of a dense matrix.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DofMap(pub Vec<(usize, usize)>);

impl DofMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// A map with a single unit entry.
    pub fn single(axis: usize, dof: usize) -> Self {
        Self(vec![(axis, dof)])
    }

    pub fn with(mut self, axis: usize, dof: usize) -> Self {
        self.0.push((axis, dof));
        self
    }

    /// Dense 3x`ndof` matrix for this map.
    pub fn matrix(&self, ndof: usize) -> Result<DMatrix<f64>, MultibodyErrors> {
        let mut m = DMatrix::zeros(3, ndof);
        for &(axis, dof) in &self.0 {
            if axis >= 3 || dof >= ndof {
                return Err(MultibodyErrors::DofOutOfRange { axis, dof, ndof });
            }
            m[(axis, dof)] = 1.0;
        }
        Ok(m)
    }
}

/// A rigid body in a body tree.
///
/// `position` and `rotation` place the body relative to its parent: the
/// position of this body's origin in the parent frame, and the rotation
/// taking vectors from this frame to the parent frame. Both may be
/// overwritten by a `Mechanism` before every evaluation.
///
/// The DOF maps project the generalized velocities onto this body's local
/// angular velocity (`ihat`) and local translational velocity (`itilde`),
/// both expressed in the parent frame.
#[derive(Debug)]
pub struct Body {
    pub name: String,
    pub position: Vector3<f64>,
    pub rotation: Matrix3<f64>,
    mass_properties: MassProperties,
    spatial_mass: SpatialMass,
    ihat: DMatrix<f64>,
    itilde: DMatrix<f64>,
    pub(crate) parent: Option<BodyId>,
    pub(crate) children: Vec<BodyId>,
    pub(crate) forces: Vec<Force>,
}

impl Body {
    /// Creates a body for a system with `dof` generalized coordinates, at
    /// its parent's origin, aligned with its parent, with both DOF maps zero.
    pub fn new(
        name: &str,
        mass_properties: MassProperties,
        dof: usize,
    ) -> Result<Self, MultibodyErrors> {
        if name.is_empty() {
            return Err(MultibodyErrors::EmptyName);
        }
        mass_properties.validate()?;
        Ok(Self {
            name: name.to_string(),
            position: Vector3::zeros(),
            rotation: Matrix3::identity(),
            spatial_mass: SpatialMass::from(&mass_properties),
            mass_properties,
            ihat: DMatrix::zeros(3, dof),
            itilde: DMatrix::zeros(3, dof),
            parent: None,
            children: Vec::new(),
            forces: Vec::new(),
        })
    }

    pub fn with_position(mut self, position: Vector3<f64>) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Matrix3<f64>) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_dof_maps(
        mut self,
        ihat: DMatrix<f64>,
        itilde: DMatrix<f64>,
    ) -> Result<Self, MultibodyErrors> {
        self.set_dof_maps(ihat, itilde)?;
        Ok(self)
    }

    /// Replaces both DOF maps. Each must be 3x`dof`.
    pub fn set_dof_maps(
        &mut self,
        ihat: DMatrix<f64>,
        itilde: DMatrix<f64>,
    ) -> Result<(), MultibodyErrors> {
        let expected = (3, self.dof());
        check_shape("ihat", expected, ihat.shape())?;
        check_shape("itilde", expected, itilde.shape())?;
        self.ihat = ihat;
        self.itilde = itilde;
        Ok(())
    }

    pub fn with_force(mut self, force: impl Into<Force>) -> Self {
        self.forces.push(force.into());
        self
    }

    pub fn add_force(&mut self, force: impl Into<Force>) {
        self.forces.push(force.into());
    }

    /// Number of generalized coordinates in the system this body belongs to.
    pub fn dof(&self) -> usize {
        self.ihat.ncols()
    }

    pub fn ihat(&self) -> &DMatrix<f64> {
        &self.ihat
    }

    pub fn itilde(&self) -> &DMatrix<f64> {
        &self.itilde
    }

    pub fn mass_properties(&self) -> &MassProperties {
        &self.mass_properties
    }

    pub fn spatial_mass(&self) -> &SpatialMass {
        &self.spatial_mass
    }

    pub fn mass(&self) -> f64 {
        self.mass_properties.mass
    }

    pub fn center_of_mass(&self) -> Vector3<f64> {
        self.mass_properties.center_of_mass.vector()
    }

    pub fn parent(&self) -> Option<BodyId> {
        self.parent
    }

    pub fn children(&self) -> &[BodyId] {
        &self.children
    }

    pub fn forces(&self) -> &[Force] {
        &self.forces
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::force::Gravity;
    use mass_properties::{CenterOfMass, Inertia};

    #[test]
    fn test_dof_map_matrix() {
        let m = DofMap::single(0, 1).with(2, 2).matrix(3).unwrap();
        assert_eq!(m.shape(), (3, 3));
        assert_eq!(m[(0, 1)], 1.0);
        assert_eq!(m[(2, 2)], 1.0);
        assert_eq!(m.sum(), 2.0);
        assert!(DofMap::new().matrix(2).unwrap().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_dof_map_out_of_range() {
        assert!(matches!(
            DofMap::single(3, 0).matrix(1),
            Err(MultibodyErrors::DofOutOfRange {
                axis: 3,
                dof: 0,
                ndof: 1
            })
        ));
        assert!(DofMap::single(0, 2).matrix(2).is_err());
    }

    #[test]
    fn test_new_body() {
        let body = Body::new("link", MassProperties::default(), 4).unwrap();
        assert_eq!(body.dof(), 4);
        assert_eq!(body.ihat().shape(), (3, 4));
        assert_eq!(body.rotation, Matrix3::identity());
        assert!(body.parent().is_none());
        assert!(body.children().is_empty());
    }

    #[test]
    fn test_empty_name() {
        assert!(matches!(
            Body::new("", MassProperties::default(), 1),
            Err(MultibodyErrors::EmptyName)
        ));
    }

    #[test]
    fn test_invalid_mass_properties() {
        let mut mp = MassProperties::default();
        mp.mass = 0.0;
        assert!(matches!(
            Body::new("link", mp, 1),
            Err(MultibodyErrors::MassProperties(_))
        ));
    }

    #[test]
    fn test_dof_map_shape_checked() {
        let body = Body::new("link", MassProperties::default(), 2).unwrap();
        let result = body.with_dof_maps(DMatrix::zeros(3, 2), DMatrix::zeros(3, 3));
        assert!(matches!(
            result,
            Err(MultibodyErrors::ShapeMismatch {
                what: "itilde",
                expected: (3, 2),
                found: (3, 3)
            })
        ));
    }

    #[test]
    fn test_spatial_mass_cached() {
        let mp = MassProperties::new(
            2.0,
            CenterOfMass::new(0.0, 1.0, 0.0),
            Inertia::diagonal(2.5, 0.5, 2.5).unwrap(),
        )
        .unwrap();
        let body = Body::new("link", mp, 1)
            .unwrap()
            .with_force(Gravity::new(0.0, 0.0, -9.81));
        assert_eq!(body.spatial_mass().inertia, mp.inertia.matrix());
        assert_eq!(body.spatial_mass().first_mass_moment_skew[(0, 2)], 2.0);
        assert_eq!(body.forces().len(), 1);
    }
}
