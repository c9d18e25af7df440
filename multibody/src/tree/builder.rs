use mass_properties::MassProperties;
use nalgebra::{DVector, Matrix3, Rotation3, Vector3};
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::debug;

use super::BodyTree;
use crate::{
    MultibodyErrors,
    body::{Body, BodyId, DofMap},
    force::{Force, Gravity, ViscousFriction},
    mechanism::Mechanism,
};

/// Serializable description of a force attached to a body.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum ForceBuilder {
    /// Uniform gravitational acceleration in the world frame.
    Gravity([f64; 3]),
    /// Viscous damping coefficient.
    ViscousFriction(f64),
}

impl From<ForceBuilder> for Force {
    fn from(builder: ForceBuilder) -> Self {
        match builder {
            ForceBuilder::Gravity([x, y, z]) => Gravity::new(x, y, z).into(),
            ForceBuilder::ViscousFriction(c) => ViscousFriction::new(c).into(),
        }
    }
}

fn identity_rotation() -> [[f64; 3]; 3] {
    [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]
}

/// Serializable description of a body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BodyBuilder {
    pub name: String,
    /// Name of the parent body. Ignored for the root.
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub mass_properties: MassProperties,
    /// Origin in the parent frame.
    #[serde(default)]
    pub position: [f64; 3],
    /// Rotation to the parent frame, row major.
    #[serde(default = "identity_rotation")]
    pub rotation: [[f64; 3]; 3],
    /// Angular velocity DOF map.
    #[serde(default)]
    pub ihat: DofMap,
    /// Translational velocity DOF map.
    #[serde(default)]
    pub itilde: DofMap,
    /// `(axis, dof)`: rotate about a body axis by `x[dof]` on top of `rotation`.
    #[serde(default)]
    pub joint_rotation: Option<(usize, usize)>,
    /// `(axis, dof)`: translate along a parent axis by `x[dof]` on top of `position`.
    #[serde(default)]
    pub joint_translation: Option<(usize, usize)>,
    #[serde(default)]
    pub forces: Vec<ForceBuilder>,
}

impl BodyBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
            mass_properties: MassProperties::default(),
            position: [0.0; 3],
            rotation: identity_rotation(),
            ihat: DofMap::new(),
            itilde: DofMap::new(),
            joint_rotation: None,
            joint_translation: None,
            forces: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }

    pub fn with_mass_properties(mut self, mass_properties: MassProperties) -> Self {
        self.mass_properties = mass_properties;
        self
    }

    pub fn with_position(mut self, position: [f64; 3]) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: [[f64; 3]; 3]) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_ihat(mut self, ihat: DofMap) -> Self {
        self.ihat = ihat;
        self
    }

    pub fn with_itilde(mut self, itilde: DofMap) -> Self {
        self.itilde = itilde;
        self
    }

    pub fn with_force(mut self, force: ForceBuilder) -> Self {
        self.forces.push(force);
        self
    }

    /// Drives this body's rotation about `axis` with coordinate `dof`.
    pub fn with_joint_rotation(mut self, axis: usize, dof: usize) -> Self {
        self.joint_rotation = Some((axis, dof));
        self
    }

    /// Drives this body's position along `axis` with coordinate `dof`.
    pub fn with_joint_translation(mut self, axis: usize, dof: usize) -> Self {
        self.joint_translation = Some((axis, dof));
        self
    }

    fn fixed_rotation(&self) -> Matrix3<f64> {
        let r = &self.rotation;
        Matrix3::new(
            r[0][0], r[0][1], r[0][2], //
            r[1][0], r[1][1], r[1][2], //
            r[2][0], r[2][1], r[2][2],
        )
    }

    fn is_driven(&self) -> bool {
        self.joint_rotation.is_some() || self.joint_translation.is_some()
    }

    /// Rotation and position for positions `x`. Joint entries must already
    /// be range checked against `x`.
    fn placement(&self, x: &DVector<f64>) -> (Matrix3<f64>, Vector3<f64>) {
        let mut rotation = self.fixed_rotation();
        let mut position = Vector3::from(self.position);
        if let Some((axis, dof)) = self.joint_rotation {
            rotation *= Rotation3::from_axis_angle(&Vector3::ith_axis(axis), x[dof]).into_inner();
        }
        if let Some((axis, dof)) = self.joint_translation {
            position[axis] += x[dof];
        }
        (rotation, position)
    }

    fn to_body(&self, dof: usize) -> Result<Body, MultibodyErrors> {
        for &(axis, index) in self.joint_rotation.iter().chain(&self.joint_translation) {
            if axis >= 3 || index >= dof {
                return Err(MultibodyErrors::DofOutOfRange {
                    axis,
                    dof: index,
                    ndof: dof,
                });
            }
        }
        let (rotation, position) = self.placement(&DVector::zeros(dof));
        let mut body = Body::new(&self.name, self.mass_properties, dof)?
            .with_position(position)
            .with_rotation(rotation)
            .with_dof_maps(self.ihat.matrix(dof)?, self.itilde.matrix(dof)?)?;
        for &force in &self.forces {
            body.add_force(force);
        }
        Ok(body)
    }
}

/// Serializable description of a whole body tree with a fixed topology.
///
/// Bodies are added in order, so a parent must be listed before its
/// children.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BodyTreeBuilder {
    pub dof: usize,
    pub root: BodyBuilder,
    #[serde(default)]
    pub bodies: Vec<BodyBuilder>,
}

impl BodyTreeBuilder {
    pub fn new(dof: usize, root: BodyBuilder) -> Self {
        Self {
            dof,
            root,
            bodies: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: BodyBuilder) -> Self {
        self.bodies.push(body);
        self
    }

    pub fn to_tree(&self) -> Result<BodyTree, MultibodyErrors> {
        let mut tree = BodyTree::new(self.root.to_body(self.dof)?);
        for builder in &self.bodies {
            let parent_name = builder
                .parent
                .as_deref()
                .ok_or_else(|| MultibodyErrors::MissingParent(builder.name.clone()))?;
            let parent: BodyId = tree.find(parent_name)?;
            tree.add_body(parent, builder.to_body(self.dof)?)?;
        }
        debug!(bodies = tree.len(), dof = self.dof, "built body tree");
        Ok(tree)
    }

    pub fn from_ron(s: &str) -> Result<Self, MultibodyErrors> {
        Ok(ron::from_str(s)?)
    }

    pub fn to_ron(&self) -> Result<String, MultibodyErrors> {
        Ok(ron::ser::to_string_pretty(self, PrettyConfig::default())?)
    }

    pub fn load(path: &Path) -> Result<Self, MultibodyErrors> {
        debug!(path = %path.display(), "loading body tree");
        let s = fs::read_to_string(path)?;
        Self::from_ron(&s)
    }

    pub fn save(&self, path: &Path) -> Result<(), MultibodyErrors> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}

/// Bodies are created in listing order, so the body described at index `i`
/// of `[root, bodies..]` is `BodyId(i)`.
impl Mechanism for BodyTreeBuilder {
    fn build(&mut self) -> Result<BodyTree, MultibodyErrors> {
        self.to_tree()
    }

    fn configure(
        &mut self,
        tree: &mut BodyTree,
        x: &DVector<f64>,
        _xdot: &DVector<f64>,
    ) -> Result<(), MultibodyErrors> {
        let builders = std::iter::once(&self.root).chain(&self.bodies);
        for (i, builder) in builders.enumerate().filter(|(_, b)| b.is_driven()) {
            let (rotation, position) = builder.placement(x);
            let body = tree.body_mut(BodyId(i))?;
            body.rotation = rotation;
            body.position = position;
        }
        Ok(())
    }
}
