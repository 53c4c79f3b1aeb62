//! Result types published by a successful analysis.

use petgraph::graph::{EdgeIndex, NodeIndex};
use serde::Serialize;

use crate::geometry::{Displacement, Force};

/// End forces of one member in the global frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MemberEndForces {
    /// Member index.
    pub member: usize,
    /// Force at the first end (node I).
    pub start: Force,
    /// Force at the second end (node J).
    pub end: Force,
    /// Axial force, tension positive.
    pub axial_force: f64,
    /// Axial stress, tension positive.
    pub stress: f64,
}

impl MemberEndForces {
    /// The six end-force components `[XI, YI, ZI, XJ, YJ, ZJ]`.
    #[must_use]
    pub fn components(&self) -> [f64; 6] {
        let [xi, yi, zi] = self.start.components();
        let [xj, yj, zj] = self.end.components();
        [xi, yi, zi, xj, yj, zj]
    }
}

/// Support reaction for one boundary record.
///
/// Axes that are not constrained at the node carry no value rather than zero.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Reaction {
    /// Node index.
    pub node: usize,
    /// Reaction per axis.
    pub force: [Option<f64>; 3],
}

impl Reaction {
    /// Reaction as a force, with unconstrained axes counted as zero.
    #[must_use]
    pub fn as_force(&self) -> Force {
        let [x, y, z] = self.force.map(|value| value.unwrap_or(0.0));
        Force::new(x, y, z)
    }
}

/// Everything a run produces. Built only when the whole pipeline succeeds.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalysisResults {
    /// Displacement per node, in node order.
    pub displacements: Vec<Displacement>,
    /// End forces per member, in member order.
    pub member_forces: Vec<MemberEndForces>,
    /// Reactions per boundary record, in record order.
    pub reactions: Vec<Reaction>,
    /// Penalty constant used to enforce the supports.
    pub penalty: f64,
    /// Bandwidth of the assembled system.
    pub bandwidth: usize,
}

impl AnalysisResults {
    /// Displacement of a node.
    #[must_use]
    pub fn node_displacement(&self, node: NodeIndex) -> Option<Displacement> {
        self.displacements.get(node.index()).copied()
    }

    /// End forces of a member.
    #[must_use]
    pub fn member_end_forces(&self, member: EdgeIndex) -> Option<&MemberEndForces> {
        self.member_forces.get(member.index())
    }

    /// Sum of all reactions.
    #[must_use]
    pub fn total_reaction(&self) -> Force {
        self.reactions
            .iter()
            .fold(Force::default(), |total, reaction| total + reaction.as_force())
    }
}
