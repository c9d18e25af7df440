use std::{fs::File, io::BufWriter, io::Write, path::Path};

use csv::Writer;
use nalgebra::DVector;

use crate::DiffeqErrors;

/// Time-major record of a fixed-step run, one `(t, x, xdot)` sample per step.
///
/// Filled by `Integrator::solve` and read-only afterwards.
#[derive(Clone, Debug, Default)]
pub struct Solution {
    /// Recorded times.
    pub t: Vec<f64>,
    /// Recorded positions.
    pub x: Vec<DVector<f64>>,
    /// Recorded velocities.
    pub xdot: Vec<DVector<f64>>,
}

impl Solution {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            t: Vec::with_capacity(n),
            x: Vec::with_capacity(n),
            xdot: Vec::with_capacity(n),
        }
    }

    pub(crate) fn push(&mut self, t: f64, x: DVector<f64>, xdot: DVector<f64>) {
        self.t.push(t);
        self.x.push(x);
        self.xdot.push(xdot);
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, &DVector<f64>, &DVector<f64>)> {
        self.t
            .iter()
            .zip(self.x.iter())
            .zip(self.xdot.iter())
            .map(|((t, x), xdot)| (*t, x, xdot))
    }

    pub fn last(&self) -> Option<(f64, &DVector<f64>, &DVector<f64>)> {
        self.iter().last()
    }

    /// Column names `t, x0.., xdot0..` for a system with the recorded DOF count.
    pub fn headers(&self) -> Vec<String> {
        let n = self.x.first().map_or(0, |x| x.len());
        let mut headers = Vec::with_capacity(2 * n + 1);
        headers.push("t".to_string());
        headers.extend((0..n).map(|i| format!("x{i}")));
        headers.extend((0..n).map(|i| format!("xdot{i}")));
        headers
    }

    /// Writes the solution as CSV, one row per sample.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), DiffeqErrors> {
        let mut writer = Writer::from_writer(writer);
        writer.write_record(self.headers())?;
        for (t, x, xdot) in self.iter() {
            let record = std::iter::once(t)
                .chain(x.iter().copied())
                .chain(xdot.iter().copied())
                .map(|v| v.to_string());
            writer.write_record(record)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Writes the solution to a CSV file, creating parent directories as needed.
    pub fn write_csv(&self, path: &Path) -> Result<(), DiffeqErrors> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        self.to_writer(BufWriter::new(file))
    }
}
