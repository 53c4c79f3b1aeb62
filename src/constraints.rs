//! Prescribed displacements enforced with the large-number (penalty) method.
//!
//! For a constrained dof `k` with prescribed value `u`, `cnst` is added to
//! `S[k][k]` and `cnst · u` to `F[k]`. The solved displacement approaches `u`
//! with an error of order `1 / cnst`; the dof is never removed from the system.

use std::collections::HashSet;

use log::{debug, warn};
use nalgebra::DVector;
use petgraph::graph::NodeIndex;

use crate::band::BandMatrix;
use crate::errors::BandError;
use crate::model::Model;

/// One constrained degree of freedom.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Constraint {
    /// Index of the boundary record that produced it.
    pub boundary: usize,
    /// Constrained node.
    pub node: NodeIndex,
    /// Axis, 0 = X, 1 = Y, 2 = Z.
    pub axis: usize,
    /// Global dof number, `3 · node + axis`.
    pub dof: usize,
    /// Prescribed displacement.
    pub value: f64,
}

/// Penalty constant: `factor` times the largest diagonal stiffness entry.
///
/// Must be taken from the assembled stiffness before any constraint is applied.
#[must_use]
pub fn penalty_constant(stiffness: &BandMatrix, factor: f64) -> f64 {
    factor * stiffness.max_diagonal()
}

/// Constrained dofs in boundary-record order.
///
/// The node restraint decides which axes are constrained: a fixed axis of a
/// node named by a boundary record is constrained (at zero when the record has
/// no value for it), a free axis never is.
#[must_use]
pub fn collect_constraints(model: &Model) -> Vec<Constraint> {
    let mut constraints = Vec::new();
    let mut bounded = HashSet::new();
    for (boundary, record) in model.boundaries().iter().enumerate() {
        let Some(node) = model.node(record.node) else {
            continue;
        };
        bounded.insert(record.node);
        for (axis, fixed) in node.restraint().into_iter().enumerate() {
            if fixed {
                constraints.push(Constraint {
                    boundary,
                    node: record.node,
                    axis,
                    dof: 3 * record.node.index() + axis,
                    value: record.value(axis),
                });
            } else if record.prescribed[axis].is_some_and(|value| value != 0.0) {
                warn!(
                    "boundary value on free axis {} of node {} is ignored",
                    axis,
                    record.node.index()
                );
            }
        }
    }
    for (index, node) in model.nodes() {
        if node.restraint().contains(&true) && !bounded.contains(&index) {
            warn!(
                "node {} has fixed axes but no boundary record; it is left unconstrained",
                index.index()
            );
        }
    }
    constraints
}

/// Add the penalty terms for every constraint to the stiffness and load.
///
/// # Errors
///
/// Returns [`BandError`] when a constraint addresses a dof outside the system.
pub fn apply_penalty(
    stiffness: &mut BandMatrix,
    load: &mut DVector<f64>,
    constraints: &[Constraint],
    penalty: f64,
) -> Result<(), BandError> {
    for constraint in constraints {
        stiffness.add(constraint.dof, constraint.dof, penalty)?;
        load[constraint.dof] += penalty * constraint.value;
    }
    debug!(
        "applied {} constraints with penalty {:e}",
        constraints.len(),
        penalty
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point;
    use crate::model::BoundaryCondition;

    #[test]
    fn restraint_mask_decides_constrained_axes() {
        let mut model = Model::new();
        let a = model.add_node(point(0.0, 0.0, 0.0), [true, false, true]);
        let b = model.add_node(point(1.0, 0.0, 0.0), [true, true, true]);
        model
            .add_boundary(BoundaryCondition::new(a, [Some(0.5), Some(9.0), None]))
            .expect("boundary accepted");

        let constraints = collect_constraints(&model);
        let dofs: Vec<usize> = constraints.iter().map(|c| c.dof).collect();
        assert_eq!(dofs, vec![0, 2]);
        assert_eq!(constraints[0].value, 0.5);
        assert_eq!(constraints[1].value, 0.0);
        assert!(constraints.iter().all(|c| c.node != b));
    }

    #[test]
    fn penalty_is_added_to_diagonal_and_load() {
        let mut stiffness = BandMatrix::zeros(3, 3);
        stiffness.set(0, 0, 2.0).expect("in band");
        stiffness.set(1, 1, 8.0).expect("in band");
        let penalty = penalty_constant(&stiffness, 10_000.0);
        assert_eq!(penalty, 80_000.0);

        let mut load = DVector::from_vec(vec![1.0, 0.0, 0.0]);
        let constraint = Constraint {
            boundary: 0,
            node: NodeIndex::new(0),
            axis: 2,
            dof: 2,
            value: 0.25,
        };
        apply_penalty(&mut stiffness, &mut load, &[constraint], penalty).expect("in band");
        assert_eq!(stiffness.diagonal(2), 80_000.0);
        assert_eq!(load[2], 20_000.0);
        assert_eq!(load[0], 1.0);
    }
}
