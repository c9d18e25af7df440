use nalgebra::DVector;
use tracing::{debug, trace};

use crate::{
    MultibodyErrors, check_shape,
    body::{Body, BodyId, dynamics::GeneralizedDynamics, kinematics::BodyKinematics},
    force::Force,
};

pub mod builder;

/// A rooted tree of bodies sharing one set of generalized coordinates.
///
/// Bodies live in a flat arena indexed by `BodyId`; each body stores its
/// parent and children ids. The root is always at `BodyId::ROOT`.
#[derive(Debug)]
pub struct BodyTree {
    bodies: Vec<Body>,
}

impl BodyTree {
    pub fn new(mut root: Body) -> Self {
        root.parent = None;
        root.children.clear();
        Self { bodies: vec![root] }
    }

    /// Number of generalized coordinates.
    pub fn dof(&self) -> usize {
        self.bodies[0].dof()
    }

    /// Number of bodies, including the root.
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Always false, a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn root(&self) -> &Body {
        &self.bodies[0]
    }

    pub fn body(&self, id: BodyId) -> Result<&Body, MultibodyErrors> {
        self.bodies
            .get(id.0)
            .ok_or(MultibodyErrors::BodyIdNotFound(id.0))
    }

    pub fn body_mut(&mut self, id: BodyId) -> Result<&mut Body, MultibodyErrors> {
        self.bodies
            .get_mut(id.0)
            .ok_or(MultibodyErrors::BodyIdNotFound(id.0))
    }

    /// Looks up a body id by name.
    pub fn find(&self, name: &str) -> Result<BodyId, MultibodyErrors> {
        self.bodies
            .iter()
            .position(|body| body.name == name)
            .map(BodyId)
            .ok_or_else(|| MultibodyErrors::BodyNotFound(name.to_string()))
    }

    /// Attaches `body` as a child of `parent`.
    pub fn add_body(&mut self, parent: BodyId, mut body: Body) -> Result<BodyId, MultibodyErrors> {
        self.body(parent)?;
        if self.find(&body.name).is_ok() {
            return Err(MultibodyErrors::NameTaken(body.name));
        }
        check_shape("body dof maps", (3, self.dof()), body.ihat().shape())?;

        let id = BodyId(self.bodies.len());
        body.parent = Some(parent);
        body.children.clear();
        debug!(body = %body.name, id = id.0, parent = parent.0, "adding body");
        self.bodies.push(body);
        self.bodies[parent.0].children.push(id);
        Ok(id)
    }

    pub fn add_force(
        &mut self,
        id: BodyId,
        force: impl Into<Force>,
    ) -> Result<(), MultibodyErrors> {
        self.body_mut(id)?.add_force(force);
        Ok(())
    }

    /// Aggregated generalized dynamics of the whole tree at `(x, xdot)`.
    ///
    /// Kinematics run parent to child, and each body's dynamics are summed
    /// with those of its subtree on the way back up.
    pub fn update(
        &self,
        x: &DVector<f64>,
        xdot: &DVector<f64>,
    ) -> Result<GeneralizedDynamics, MultibodyErrors> {
        let n = self.dof();
        check_shape("x", (n, 1), x.shape())?;
        check_shape("xdot", (n, 1), xdot.shape())?;
        let root_kinematics = self.root().root_kinematics(xdot);
        self.update_subtree(BodyId::ROOT, &root_kinematics, x, xdot)
    }

    fn update_subtree(
        &self,
        id: BodyId,
        kinematics: &BodyKinematics,
        x: &DVector<f64>,
        xdot: &DVector<f64>,
    ) -> Result<GeneralizedDynamics, MultibodyErrors> {
        let body = &self.bodies[id.0];
        trace!(body = %body.name, "updating body");
        let mut total = body.dynamics(kinematics, x, xdot)?;
        for &child_id in &body.children {
            let child_kinematics = self.bodies[child_id.0].kinematics(kinematics, xdot);
            total += self.update_subtree(child_id, &child_kinematics, x, xdot)?;
        }
        Ok(total)
    }
}
