//! Displacements, member end forces and reactions from the solved system.

use nalgebra::DVector;

use crate::analysis::{LoadSelection, MemberLoadRecovery, ReactionRecovery};
use crate::assembly::{element_dofs, member_element, selected_cases};
use crate::constraints::Constraint;
use crate::element::ElementVector;
use crate::errors::AnalysisError;
use crate::geometry::{Displacement, Force};
use crate::model::Model;
use crate::results::{MemberEndForces, Reaction};

/// Split the solution vector into per-node displacement triples.
#[must_use]
pub fn displacements(solution: &DVector<f64>) -> Vec<Displacement> {
    (0..solution.len() / 3)
        .map(|node| Displacement::from_slice(solution.as_slice(), 3 * node))
        .collect()
}

/// Distributed load intensity applied to each member by the selected cases.
///
/// With [`MemberLoadRecovery::LastEncountered`] only the last load found for
/// a member (cases in id order, loads in insertion order) counts; with
/// [`MemberLoadRecovery::Summed`] all of them add up, matching the load vector.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidReference`] for a missing load case.
pub fn member_load_intensities(
    model: &Model,
    selection: &LoadSelection,
    mode: MemberLoadRecovery,
) -> Result<Vec<Option<Force>>, AnalysisError> {
    let mut intensities = vec![None; model.member_count()];
    for case in selected_cases(model, selection)? {
        for load in &case.distributed {
            let slot = &mut intensities[load.member.index()];
            *slot = match (mode, *slot) {
                (MemberLoadRecovery::Summed, Some(previous)) => Some(previous + load.intensity),
                _ => Some(load.intensity),
            };
        }
    }
    Ok(intensities)
}

/// Member end forces: `k · d` minus the member's own equivalent load.
///
/// # Errors
///
/// Returns [`AnalysisError`] for a degenerate member or missing load case.
pub fn member_forces(
    model: &Model,
    solution: &DVector<f64>,
    selection: &LoadSelection,
    mode: MemberLoadRecovery,
) -> Result<Vec<MemberEndForces>, AnalysisError> {
    let intensities = member_load_intensities(model, selection, mode)?;
    let mut forces = Vec::with_capacity(model.member_count());
    for (member, start, end, properties) in model.members() {
        let element = member_element(model, member)?;
        let (axial_rigidity, _) = model.member_properties(properties);
        let dofs = element_dofs([start, end]);
        let local = ElementVector::from_fn(|i, _| solution[dofs[i]]);

        let mut end_forces = element.stiffness(axial_rigidity) * local;
        if let Some(intensity) = intensities[member.index()] {
            end_forces -= element.equivalent_nodal_load(intensity);
        }

        let start_force = Force::new(end_forces[0], end_forces[1], end_forces[2]);
        let end_force = Force::new(end_forces[3], end_forces[4], end_forces[5]);
        let axis = element.direction();
        let axial_force =
            (end_force.to_vector().dot(&axis) - start_force.to_vector().dot(&axis)) / 2.0;
        let area = model
            .section(properties.section())
            .map_or(f64::NAN, |section| section.area);

        forces.push(MemberEndForces {
            member: member.index(),
            start: start_force,
            end: end_force,
            axial_force,
            stress: axial_force / area,
        });
    }
    Ok(forces)
}

/// Reactions per boundary record on each constrained axis: `cnst · (0 − d)`,
/// or `cnst · (u − d)` with [`ReactionRecovery::FromPrescribed`].
#[must_use]
pub fn reactions(
    model: &Model,
    constraints: &[Constraint],
    solution: &DVector<f64>,
    penalty: f64,
    mode: ReactionRecovery,
) -> Vec<Reaction> {
    let mut reactions: Vec<Reaction> = model
        .boundaries()
        .iter()
        .map(|boundary| Reaction {
            node: boundary.node.index(),
            force: [None; 3],
        })
        .collect();
    for constraint in constraints {
        let reference = match mode {
            ReactionRecovery::FromZero => 0.0,
            ReactionRecovery::FromPrescribed => constraint.value,
        };
        let value = penalty * (reference - solution[constraint.dof]);
        reactions[constraint.boundary].force[constraint.axis] = Some(value);
    }
    reactions
}

#[cfg(test)]
mod tests {
    use petgraph::graph::EdgeIndex;

    use super::*;
    use crate::geometry::{force, point};
    use crate::model::{BoundaryCondition, Material, Section};

    fn loaded_bar() -> (Model, EdgeIndex) {
        let mut model = Model::new();
        let a = model.add_node(point(0.0, 0.0, 0.0), [true; 3]);
        let b = model.add_node(point(2.0, 0.0, 0.0), [true; 3]);
        model
            .add_material(Material::new("Steel", 10.0))
            .expect("material accepted");
        model
            .add_section(Section::new("Bar", 2.0))
            .expect("section accepted");
        let member = model.add_member(a, b, 0, 0).expect("member accepted");
        model
            .add_boundary(BoundaryCondition::fixed(a))
            .expect("boundary accepted");
        for intensity in [force(0.0, -1.0, 0.0), force(0.0, -3.0, 0.0)] {
            let case = model.add_load_case();
            model
                .add_distributed_load(case, member, intensity)
                .expect("load accepted");
        }
        (model, member)
    }

    #[test]
    fn last_encountered_keeps_only_final_member_load() {
        let (model, member) = loaded_bar();
        let last = member_load_intensities(
            &model,
            &LoadSelection::Combined,
            MemberLoadRecovery::LastEncountered,
        )
        .expect("cases exist");
        assert_eq!(last[member.index()], Some(force(0.0, -3.0, 0.0)));

        let summed =
            member_load_intensities(&model, &LoadSelection::Combined, MemberLoadRecovery::Summed)
                .expect("cases exist");
        assert_eq!(summed[member.index()], Some(force(0.0, -4.0, 0.0)));

        let first = member_load_intensities(
            &model,
            &LoadSelection::Case(0),
            MemberLoadRecovery::LastEncountered,
        )
        .expect("case exists");
        assert_eq!(first[member.index()], Some(force(0.0, -1.0, 0.0)));
    }

    #[test]
    fn end_forces_subtract_equivalent_member_load() {
        let (model, _) = loaded_bar();
        let solution = DVector::from_vec(vec![0.0, 0.0, 0.0, 0.2, 0.0, 0.0]);
        let forces = member_forces(
            &model,
            &solution,
            &LoadSelection::Combined,
            MemberLoadRecovery::Summed,
        )
        .expect("forces recovered");

        // EA/L = 10, elongation 0.2: 2.0 axial; w·L/2 = -4 at each end in y.
        let bar = forces[0];
        assert_eq!(bar.components(), [-2.0, 4.0, 0.0, 2.0, 4.0, 0.0]);
        assert!((bar.axial_force - 2.0).abs() < 1.0e-12);
        assert!((bar.stress - 1.0).abs() < 1.0e-12);
    }

    #[test]
    fn reactions_only_report_constrained_axes() {
        let mut model = Model::new();
        let a = model.add_node(point(0.0, 0.0, 0.0), [false, true, true]);
        model
            .add_boundary(BoundaryCondition::fixed(a))
            .expect("boundary accepted");
        let constraints = crate::constraints::collect_constraints(&model);
        let solution = DVector::from_vec(vec![5.0, -1.0e-6, 2.0e-6]);

        let reactions = reactions(
            &model,
            &constraints,
            &solution,
            1.0e6,
            ReactionRecovery::FromZero,
        );
        assert_eq!(reactions.len(), 1);
        assert_eq!(reactions[0].force[0], None);
        assert!((reactions[0].force[1].expect("y constrained") - 1.0).abs() < 1.0e-9);
        assert!((reactions[0].force[2].expect("z constrained") + 2.0).abs() < 1.0e-9);
    }

    #[test]
    fn prescribed_reference_only_applies_when_selected() {
        let mut model = Model::new();
        let a = model.add_node(point(0.0, 0.0, 0.0), [true, false, false]);
        model
            .add_boundary(BoundaryCondition::new(a, [Some(0.5), None, None]))
            .expect("boundary accepted");
        let constraints = crate::constraints::collect_constraints(&model);
        let solution = DVector::from_vec(vec![0.499, 0.0, 0.0]);

        let from_zero = reactions(
            &model,
            &constraints,
            &solution,
            100.0,
            ReactionRecovery::FromZero,
        );
        let from_prescribed = reactions(
            &model,
            &constraints,
            &solution,
            100.0,
            ReactionRecovery::FromPrescribed,
        );
        assert!((from_zero[0].force[0].expect("x constrained") + 49.9).abs() < 1.0e-9);
        assert!((from_prescribed[0].force[0].expect("x constrained") - 0.1).abs() < 1.0e-9);
    }

    #[test]
    fn displacements_are_read_in_triples() {
        let solution = DVector::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let triples = displacements(&solution);
        assert_eq!(triples.len(), 2);
        assert_eq!(triples[1], Displacement::new(4.0, 5.0, 6.0));
    }
}
