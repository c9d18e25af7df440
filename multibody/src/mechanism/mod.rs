use nalgebra::DVector;

use crate::{MultibodyErrors, tree::BodyTree};

/// A concrete mechanism: the topology of a body tree and how its bodies are
/// placed for a given state.
///
/// `build` runs once when a `MultibodySystem` is created. `configure` runs
/// before every evaluation and is where state dependent geometry goes, e.g.
/// writing a joint rotation from `x` into a body's `rotation`. The tree's
/// links and DOF count are fixed after `build`.
pub trait Mechanism {
    fn build(&mut self) -> Result<BodyTree, MultibodyErrors>;

    fn configure(
        &mut self,
        _tree: &mut BodyTree,
        _x: &DVector<f64>,
        _xdot: &DVector<f64>,
    ) -> Result<(), MultibodyErrors> {
        Ok(())
    }
}
