#![allow(dead_code)]

use mass_properties::{CenterOfMass, Inertia, MassProperties};
use multibody::{
    Body, BodyId, BodyTree, DofMap, Gravity, Mechanism, MultibodyErrors, ViscousFriction,
};
use nalgebra::{DMatrix, DVector, Matrix3, Rotation3, Vector3};

pub const G: f64 = 9.81;

pub fn rotx(angle: f64) -> Matrix3<f64> {
    Rotation3::from_axis_angle(&Vector3::x_axis(), angle).into_inner()
}

pub fn revolute_x(dof: usize, index: usize) -> (DMatrix<f64>, DMatrix<f64>) {
    (
        DofMap::single(0, index).matrix(dof).unwrap(),
        DMatrix::zeros(3, dof),
    )
}

/// A single link swinging about x, mass 2, center of mass 0.5 below the
/// pivot. The pivot is the link origin, where its inertia about x is 0.6.
#[derive(Debug, Default)]
pub struct Pendulum {
    pub gravity: bool,
    pub friction: Option<f64>,
    pub link: Option<BodyId>,
}

impl Pendulum {
    pub const MASS: f64 = 2.0;
    pub const LENGTH: f64 = 0.5;
    pub const PIVOT_INERTIA: f64 = 0.6;
}

impl Mechanism for Pendulum {
    fn build(&mut self) -> Result<BodyTree, MultibodyErrors> {
        let mut tree = BodyTree::new(Body::new("base", MassProperties::default(), 1)?);
        let mp = MassProperties::new(
            Self::MASS,
            CenterOfMass::new(0.0, 0.0, -Self::LENGTH),
            Inertia::diagonal(Self::PIVOT_INERTIA, Self::PIVOT_INERTIA, 0.1)?,
        )?;
        let (ihat, itilde) = revolute_x(1, 0);
        let link = Body::new("link", mp, 1)?.with_dof_maps(ihat, itilde)?;
        let id = tree.add_body(BodyId::ROOT, link)?;
        if self.gravity {
            tree.add_force(id, Gravity::new(0.0, 0.0, -G))?;
        }
        if let Some(c) = self.friction {
            tree.add_force(id, ViscousFriction::new(c))?;
        }
        self.link = Some(id);
        Ok(tree)
    }

    fn configure(
        &mut self,
        tree: &mut BodyTree,
        x: &DVector<f64>,
        _xdot: &DVector<f64>,
    ) -> Result<(), MultibodyErrors> {
        if let Some(id) = self.link {
            tree.body_mut(id)?.rotation = rotx(x[0]);
        }
        Ok(())
    }
}

/// A cart sliding along y, and beside it a two link pendulum swinging about x
/// from the ground.
#[derive(Debug, Default)]
pub struct CartPendulum {
    ids: Vec<BodyId>,
}

impl Mechanism for CartPendulum {
    fn build(&mut self) -> Result<BodyTree, MultibodyErrors> {
        let mut tree = BodyTree::new(Body::new("ground", MassProperties::default(), 3)?);
        let mp = MassProperties::new(
            1.0,
            CenterOfMass::new(0.0, 1.0, 0.0),
            Inertia::default(),
        )?;

        let cart = Body::new("cart", mp, 3)?.with_dof_maps(
            DMatrix::zeros(3, 3),
            DofMap::single(1, 0).matrix(3)?,
        )?;
        let cart = tree.add_body(BodyId::ROOT, cart)?;

        let (ihat, itilde) = revolute_x(3, 1);
        let upper = Body::new("upper", mp, 3)?.with_dof_maps(ihat, itilde)?;
        let upper = tree.add_body(BodyId::ROOT, upper)?;

        let (ihat, itilde) = revolute_x(3, 2);
        let lower = Body::new("lower", mp, 3)?
            .with_position(Vector3::new(0.0, 1.0, 0.0))
            .with_dof_maps(ihat, itilde)?;
        let lower = tree.add_body(upper, lower)?;

        for id in [upper, lower] {
            tree.add_force(id, Gravity::new(0.0, 0.0, -G))?;
        }
        for id in [cart, upper, lower] {
            tree.add_force(id, ViscousFriction::new(1.0))?;
        }
        self.ids = vec![cart, upper, lower];
        Ok(tree)
    }

    fn configure(
        &mut self,
        tree: &mut BodyTree,
        x: &DVector<f64>,
        _xdot: &DVector<f64>,
    ) -> Result<(), MultibodyErrors> {
        if let &[cart, upper, lower] = self.ids.as_slice() {
            tree.body_mut(cart)?.position = Vector3::new(0.0, x[0], 0.0);
            tree.body_mut(upper)?.rotation = rotx(x[1]);
            tree.body_mut(lower)?.rotation = rotx(x[2]);
        }
        Ok(())
    }
}
