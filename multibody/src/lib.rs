pub mod body;
pub mod force;
pub mod mechanism;
pub mod system;
pub mod tree;

pub use body::{Body, BodyId, DofMap, dynamics::GeneralizedDynamics, kinematics::BodyKinematics};
pub use force::{Force, GlobalForceModel, Gravity, JointForceModel, ViscousFriction};
pub use mechanism::Mechanism;
pub use system::MultibodySystem;
pub use tree::{
    BodyTree,
    builder::{BodyBuilder, BodyTreeBuilder, ForceBuilder},
};

use mass_properties::MassPropertiesErrors;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MultibodyErrors {
    #[error("could not find body '{0}' in the tree")]
    BodyNotFound(String),
    #[error("no body with id {0} in the tree")]
    BodyIdNotFound(usize),
    #[error("dof map entry (axis {axis}, dof {dof}) does not fit a 3x{ndof} map")]
    DofOutOfRange { axis: usize, dof: usize, ndof: usize },
    #[error("name cannot be empty for body")]
    EmptyName,
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    MassProperties(#[from] MassPropertiesErrors),
    #[error("body '{0}' must have a parent")]
    MissingParent(String),
    #[error("the name '{0}' is already taken")]
    NameTaken(String),
    #[error("{0}")]
    RonDeserialize(#[from] ron::error::SpannedError),
    #[error("{0}")]
    RonSerialize(#[from] ron::Error),
    #[error("{what} has shape {found:?}, expected {expected:?}")]
    ShapeMismatch {
        what: &'static str,
        expected: (usize, usize),
        found: (usize, usize),
    },
    #[error("mass matrix is singular, the mechanism is under-constrained")]
    SingularMassMatrix,
}

/// Checks a matrix or vector shape, reporting `what` on mismatch.
pub(crate) fn check_shape(
    what: &'static str,
    expected: (usize, usize),
    found: (usize, usize),
) -> Result<(), MultibodyErrors> {
    if expected != found {
        return Err(MultibodyErrors::ShapeMismatch {
            what,
            expected,
            found,
        });
    }
    Ok(())
}
