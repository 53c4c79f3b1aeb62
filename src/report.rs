use std::fmt;

use truss3d::{AnalysisResults, Model};

/// Plain-text tables of displacements, member forces and reactions.
pub struct Report<'a> {
    model: &'a Model,
    results: &'a AnalysisResults,
}

impl<'a> Report<'a> {
    pub fn new(model: &'a Model, results: &'a AnalysisResults) -> Self {
        Self { model, results }
    }
}

/// Format an optional reaction component, leaving free axes blank.
fn component(value: Option<f64>) -> String {
    value.map_or_else(String::new, |value| format!("{value:+.4e}"))
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Displacements")?;
        writeln!(f, "{:>6} {:>13} {:>13} {:>13}", "node", "dx", "dy", "dz")?;
        for (node, d) in self.results.displacements.iter().enumerate() {
            writeln!(f, "{node:>6} {:>+13.5e} {:>+13.5e} {:>+13.5e}", d.x, d.y, d.z)?;
        }

        writeln!(f)?;
        writeln!(f, "Member end forces")?;
        writeln!(
            f,
            "{:>6} {:>5} {:>5} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}",
            "member", "I", "J", "XI", "YI", "ZI", "XJ", "YJ", "ZJ", "axial", "stress"
        )?;
        for ((_, start, end, _), forces) in self.model.members().zip(&self.results.member_forces) {
            write!(f, "{:>6} {:>5} {:>5}", forces.member, start.index(), end.index())?;
            for value in forces.components() {
                write!(f, " {value:>+12.4e}")?;
            }
            writeln!(f, " {:>+12.4e} {:>+12.4e}", forces.axial_force, forces.stress)?;
        }

        writeln!(f)?;
        writeln!(f, "Reactions")?;
        writeln!(f, "{:>6} {:>12} {:>12} {:>12}", "node", "Rx", "Ry", "Rz")?;
        for reaction in &self.results.reactions {
            let [x, y, z] = reaction.force.map(component);
            writeln!(f, "{:>6} {x:>12} {y:>12} {z:>12}", reaction.node)?;
        }
        Ok(())
    }
}
