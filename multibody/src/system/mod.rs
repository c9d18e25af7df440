use diffeq::SecondOrderModel;
use nalgebra::DVector;
use tracing::{debug, warn};

use crate::{
    MultibodyErrors, check_shape, body::dynamics::GeneralizedDynamics, mechanism::Mechanism,
    tree::BodyTree,
};

/// A mechanism together with the body tree it built, evaluated as a
/// second-order system `xddot = H^-1 (F - d)`.
#[derive(Debug)]
pub struct MultibodySystem<M: Mechanism> {
    mechanism: M,
    tree: BodyTree,
}

impl<M: Mechanism> MultibodySystem<M> {
    pub fn new(mut mechanism: M) -> Result<Self, MultibodyErrors> {
        let tree = mechanism.build()?;
        debug!(bodies = tree.len(), dof = tree.dof(), "built multibody system");
        Ok(Self { mechanism, tree })
    }

    pub fn dof(&self) -> usize {
        self.tree.dof()
    }

    pub fn tree(&self) -> &BodyTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut BodyTree {
        &mut self.tree
    }

    /// Configures the tree for `(x, xdot)` and returns the aggregated mass
    /// matrix, velocity product terms and generalized forces.
    pub fn evaluate(
        &mut self,
        x: &DVector<f64>,
        xdot: &DVector<f64>,
    ) -> Result<GeneralizedDynamics, MultibodyErrors> {
        let n = self.dof();
        check_shape("x", (n, 1), x.shape())?;
        check_shape("xdot", (n, 1), xdot.shape())?;
        self.mechanism.configure(&mut self.tree, x, xdot)?;
        self.tree.update(x, xdot)
    }

    /// Generalized accelerations at `(x, xdot)`.
    pub fn eval(
        &mut self,
        x: &DVector<f64>,
        xdot: &DVector<f64>,
    ) -> Result<DVector<f64>, MultibodyErrors> {
        let GeneralizedDynamics { h, d, f } = self.evaluate(x, xdot)?;
        h.lu().solve(&(f - d)).ok_or_else(|| {
            warn!("mass matrix is singular");
            MultibodyErrors::SingularMassMatrix
        })
    }

    /// Kinetic energy, `0.5 * xdot' * H * xdot`.
    pub fn kinetic_energy(
        &mut self,
        x: &DVector<f64>,
        xdot: &DVector<f64>,
    ) -> Result<f64, MultibodyErrors> {
        let dynamics = self.evaluate(x, xdot)?;
        Ok(0.5 * xdot.dot(&(&dynamics.h * xdot)))
    }
}

impl<M: Mechanism> SecondOrderModel for MultibodySystem<M> {
    type Error = MultibodyErrors;

    fn eval(
        &mut self,
        x: &DVector<f64>,
        xdot: &DVector<f64>,
    ) -> Result<DVector<f64>, MultibodyErrors> {
        MultibodySystem::eval(self, x, xdot)
    }
}
