use clap::Parser;
use diffeq::{Integrator, RungeKutta4, Solution};
use multibody::{BodyTreeBuilder, Mechanism, MultibodySystem};
use nalgebra::DVector;
use std::{error::Error, path::PathBuf, time::Instant};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cart;

use cart::CartPendulum;

/// Simulates a cart alongside a double pendulum, or any body tree described
/// in a RON file.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Length of the simulation in seconds
    #[arg(long, default_value_t = 20.0)]
    duration: f64,

    /// Fixed integration step in seconds
    #[arg(long, default_value_t = 0.01)]
    step: f64,

    /// Write the solution to this CSV file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Simulate the body tree in this RON file instead of the cart and pendulum
    #[arg(long)]
    system: Option<PathBuf>,

    /// Initial positions, comma separated. Defaults to zeros
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    x0: Vec<f64>,

    /// Initial velocities, comma separated. Defaults to zeros
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    xdot0: Vec<f64>,
}

fn initial_state(values: &[f64], dof: usize, name: &str) -> Result<DVector<f64>, Box<dyn Error>> {
    match values.len() {
        0 => Ok(DVector::zeros(dof)),
        n if n == dof => Ok(DVector::from_column_slice(values)),
        n => Err(format!("{name} has {n} values but the system has {dof} dofs").into()),
    }
}

fn simulate<M: Mechanism>(mechanism: M, cli: &Cli) -> Result<Solution, Box<dyn Error>> {
    let mut system = MultibodySystem::new(mechanism)?;
    let dof = system.dof();
    let x0 = initial_state(&cli.x0, dof, "x0")?;
    let xdot0 = initial_state(&cli.xdot0, dof, "xdot0")?;

    info!(
        bodies = system.tree().len(),
        dof,
        duration = cli.duration,
        step = cli.step,
        "starting simulation"
    );
    let start = Instant::now();
    let solution = RungeKutta4.solve(&mut system, &x0, &xdot0, (0.0, cli.duration), cli.step)?;
    info!(
        samples = solution.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "simulation complete"
    );
    Ok(solution)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let solution = match &cli.system {
        Some(path) => simulate(BodyTreeBuilder::load(path)?, &cli)?,
        None => simulate(CartPendulum::default(), &cli)?,
    };

    if let Some((t, x, xdot)) = solution.last() {
        info!(t, x = ?x.as_slice(), xdot = ?xdot.as_slice(), "final state");
    }

    if let Some(path) = &cli.output {
        solution.write_csv(path)?;
        info!(path = %path.display(), "wrote solution");
    }

    Ok(())
}
