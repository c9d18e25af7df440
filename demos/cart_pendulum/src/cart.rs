use mass_properties::{CenterOfMass, Inertia, MassProperties};
use multibody::{
    Body, BodyId, BodyTree, DofMap, Gravity, Mechanism, MultibodyErrors, ViscousFriction,
};
use nalgebra::{DVector, Matrix3, Rotation3, Vector3};

const GRAVITY: f64 = -9.81;
const FRICTION: f64 = 1.0;

fn rotx(angle: f64) -> Matrix3<f64> {
    Rotation3::from_axis_angle(&Vector3::x_axis(), angle).into_inner()
}

/// A cart on a rail along y and a two link pendulum that swings about x. Both
/// hang off the ground, so the cart and the pendulum only share friction and
/// the integration.
///
/// `x[0]` is the cart position, `x[1]` the upper link angle relative to the
/// ground and `x[2]` the lower link angle relative to the upper link. Every
/// link has unit mass with its center of mass 1 along its own y axis and unit
/// inertia about its origin.
#[derive(Debug, Default)]
pub struct CartPendulum {
    cart: Option<BodyId>,
    upper: Option<BodyId>,
    lower: Option<BodyId>,
}

impl Mechanism for CartPendulum {
    fn build(&mut self) -> Result<BodyTree, MultibodyErrors> {
        const DOF: usize = 3;
        let mut tree = BodyTree::new(Body::new("ground", MassProperties::default(), DOF)?);
        let link = MassProperties::new(
            1.0,
            CenterOfMass::new(0.0, 1.0, 0.0),
            Inertia::default(),
        )?;
        let none = DofMap::new().matrix(DOF)?;

        let cart = Body::new("cart", link, DOF)?
            .with_dof_maps(none.clone(), DofMap::single(1, 0).matrix(DOF)?)?
            .with_force(ViscousFriction::new(FRICTION));

        let upper = Body::new("upper", link, DOF)?
            .with_dof_maps(DofMap::single(0, 1).matrix(DOF)?, none.clone())?
            .with_force(Gravity::new(0.0, 0.0, GRAVITY))
            .with_force(ViscousFriction::new(FRICTION));

        let lower = Body::new("lower", link, DOF)?
            .with_position(Vector3::new(0.0, 1.0, 0.0))
            .with_dof_maps(DofMap::single(0, 2).matrix(DOF)?, none)?
            .with_force(Gravity::new(0.0, 0.0, GRAVITY))
            .with_force(ViscousFriction::new(FRICTION));

        let cart = tree.add_body(BodyId::ROOT, cart)?;
        let upper = tree.add_body(BodyId::ROOT, upper)?;
        let lower = tree.add_body(upper, lower)?;
        self.cart = Some(cart);
        self.upper = Some(upper);
        self.lower = Some(lower);
        Ok(tree)
    }

    fn configure(
        &mut self,
        tree: &mut BodyTree,
        x: &DVector<f64>,
        _xdot: &DVector<f64>,
    ) -> Result<(), MultibodyErrors> {
        if let Some(cart) = self.cart {
            tree.body_mut(cart)?.position = Vector3::new(0.0, x[0], 0.0);
        }
        if let Some(upper) = self.upper {
            tree.body_mut(upper)?.rotation = rotx(x[1]);
        }
        if let Some(lower) = self.lower {
            tree.body_mut(lower)?.rotation = rotx(x[2]);
        }
        Ok(())
    }
}
