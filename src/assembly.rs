//! Scatter element matrices and loads into the global banded system.

use log::debug;
use nalgebra::DVector;
use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::analysis::LoadSelection;
use crate::band::BandMatrix;
use crate::element::{BarElement, ElementMatrix};
use crate::errors::{AnalysisError, BandError, Entity, ModelError};
use crate::model::{LoadCase, Model, NodalMass};

/// Global stiffness, mass and load for one analysis run.
#[derive(Clone, Debug)]
pub struct GlobalSystem {
    /// Banded stiffness matrix S.
    pub stiffness: BandMatrix,
    /// Banded lumped mass matrix M. Assembled for completeness; the static
    /// solve does not use it.
    pub mass: BandMatrix,
    /// Combined load vector F.
    pub load: DVector<f64>,
}

impl GlobalSystem {
    /// Assemble stiffness, mass and the load vector for the selected cases.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::DegenerateMember`] for a zero-length member and
    /// [`AnalysisError::InvalidReference`] when the selection names a missing case.
    pub fn assemble(model: &Model, selection: &LoadSelection) -> Result<Self, AnalysisError> {
        let dof = model.dof_count();
        let bandwidth = bandwidth(model);
        let mut stiffness = BandMatrix::zeros(dof, bandwidth);
        let mut mass = BandMatrix::zeros(dof, bandwidth);

        for (member, start, end, properties) in model.members() {
            let element = member_element(model, member)?;
            let (axial_rigidity, mass_per_length) = model.member_properties(properties);
            let nodes = [start, end];
            assemble_element(&mut stiffness, nodes, &element.stiffness(axial_rigidity))?;
            assemble_element(&mut mass, nodes, &element.lumped_mass(mass_per_length))?;
        }
        form_nodal_masses(&mut mass, model.nodal_masses())?;

        let load = combined_load_vector(model, selection)?;
        debug!(
            "assembled {} members into {} dof with bandwidth {}",
            model.member_count(),
            dof,
            bandwidth
        );
        Ok(Self {
            stiffness,
            mass,
            load,
        })
    }

    /// Sum of the diagonal mass entries acting along `axis`.
    #[must_use]
    pub fn translational_mass(&self, axis: usize) -> f64 {
        (axis..self.mass.order())
            .step_by(3)
            .map(|dof| self.mass.diagonal(dof))
            .sum()
    }
}

/// Bandwidth `3 · (max |I − J| + 1)` over all members, at least 6.
#[must_use]
pub fn bandwidth(model: &Model) -> usize {
    let span = model
        .members()
        .map(|(_, start, end, _)| start.index().abs_diff(end.index()))
        .max()
        .unwrap_or(0);
    (3 * (span + 1)).max(6)
}

/// Global dof numbers of the two ends of a member.
#[must_use]
pub fn element_dofs(nodes: [NodeIndex; 2]) -> [usize; 6] {
    let start = 3 * nodes[0].index();
    let end = 3 * nodes[1].index();
    [start, start + 1, start + 2, end, end + 1, end + 2]
}

/// Add an element matrix into the upper band of `matrix`.
///
/// Entries that land below the diagonal are skipped; the matrix is symmetric
/// so they carry no extra information.
///
/// # Errors
///
/// Returns [`BandError`] when an entry falls outside the band, which means the
/// bandwidth was computed for a different model.
pub fn assemble_element(
    matrix: &mut BandMatrix,
    nodes: [NodeIndex; 2],
    local: &ElementMatrix,
) -> Result<(), BandError> {
    let dofs = element_dofs(nodes);
    for (row_local, &global_row) in dofs.iter().enumerate() {
        for (col_local, &global_col) in dofs.iter().enumerate() {
            if global_col >= global_row {
                matrix.add(global_row, global_col, local[(row_local, col_local)])?;
            }
        }
    }
    Ok(())
}

/// Add lumped nodal masses onto the diagonal of the mass matrix.
///
/// # Errors
///
/// Returns [`BandError`] when a node lies outside the matrix.
pub fn form_nodal_masses(mass: &mut BandMatrix, masses: &[NodalMass]) -> Result<(), BandError> {
    for nodal in masses {
        let base = 3 * nodal.node.index();
        for (axis, value) in nodal.mass.iter().enumerate() {
            mass.add(base + axis, base + axis, *value)?;
        }
    }
    Ok(())
}

/// Accumulate the concentrated loads of one case.
pub fn form_nodal_loads(load: &mut DVector<f64>, case: &LoadCase) {
    for nodal in &case.nodal {
        let base = 3 * nodal.node.index();
        for (axis, value) in nodal.force.components().iter().enumerate() {
            load[base + axis] += value;
        }
    }
}

/// Accumulate the equivalent end loads of the distributed loads of one case.
///
/// # Errors
///
/// Returns [`AnalysisError::DegenerateMember`] for a zero-length member.
pub fn form_element_loads(
    model: &Model,
    load: &mut DVector<f64>,
    case: &LoadCase,
) -> Result<(), AnalysisError> {
    for distributed in &case.distributed {
        let element = member_element(model, distributed.member)?;
        let nodes = member_nodes(model, distributed.member)?;
        let equivalent = element.equivalent_nodal_load(distributed.intensity);
        for (local, dof) in element_dofs(nodes).into_iter().enumerate() {
            load[dof] += equivalent[local];
        }
    }
    Ok(())
}

/// Combined load vector: the sum, case by case, of nodal loads followed by
/// equivalent member loads for every selected case.
///
/// Accumulation only ever adds, so the order of the cases does not matter.
///
/// # Errors
///
/// Returns [`AnalysisError`] for a missing case or a zero-length loaded member.
pub fn combined_load_vector(
    model: &Model,
    selection: &LoadSelection,
) -> Result<DVector<f64>, AnalysisError> {
    let mut load = DVector::zeros(model.dof_count());
    for case in selected_cases(model, selection)? {
        form_nodal_loads(&mut load, case);
        form_element_loads(model, &mut load, case)?;
    }
    Ok(load)
}

/// Load cases named by `selection`, in id order.
pub(crate) fn selected_cases<'a>(
    model: &'a Model,
    selection: &LoadSelection,
) -> Result<Vec<&'a LoadCase>, ModelError> {
    let cases = model.load_cases();
    match *selection {
        LoadSelection::Combined => Ok(cases.iter().collect()),
        LoadSelection::Case(id) => cases
            .get(id)
            .map(|case| vec![case])
            .ok_or(ModelError::IndexOutOfRange {
                entity: Entity::LoadCase,
                index: id,
                len: cases.len(),
            }),
    }
}

/// End nodes of a member.
pub(crate) fn member_nodes(model: &Model, member: EdgeIndex) -> Result<[NodeIndex; 2], ModelError> {
    model
        .member_nodes(member)
        .map(|(start, end)| [start, end])
        .ok_or(ModelError::IndexOutOfRange {
            entity: Entity::Member,
            index: member.index(),
            len: model.member_count(),
        })
}

/// Bar geometry of a member.
pub(crate) fn member_element(model: &Model, member: EdgeIndex) -> Result<BarElement, AnalysisError> {
    let [start, end] = member_nodes(model, member)?;
    let position = |node: NodeIndex| {
        model
            .node(node)
            .map(|node| node.position())
            .ok_or(ModelError::IndexOutOfRange {
                entity: Entity::Node,
                index: node.index(),
                len: model.node_count(),
            })
    };
    BarElement::new(position(start)?, position(end)?).ok_or(AnalysisError::DegenerateMember(member))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::geometry::{force, point};
    use crate::model::{Material, Section};

    /// Three collinear nodes numbered so that one member spans two nodes.
    fn chain() -> (Model, [NodeIndex; 3], [EdgeIndex; 2]) {
        let mut model = Model::new();
        let a = model.add_node(point(0.0, 0.0, 0.0), [true; 3]);
        let b = model.add_node(point(2.0, 0.0, 0.0), [false, true, true]);
        let c = model.add_node(point(1.0, 0.0, 0.0), [false, true, true]);
        model
            .add_material(Material::new("Steel", 100.0).with_mass_density(2.0))
            .expect("material accepted");
        model
            .add_section(Section::new("Bar", 1.0))
            .expect("section accepted");
        let ac = model.add_member(a, c, 0, 0).expect("member accepted");
        let cb = model.add_member(c, b, 0, 0).expect("member accepted");
        (model, [a, b, c], [ac, cb])
    }

    #[test]
    fn bandwidth_follows_largest_node_gap() {
        let (model, _, _) = chain();
        assert_eq!(bandwidth(&model), 9);
        assert_eq!(bandwidth(&Model::new()), 6);
    }

    #[test]
    fn assembled_stiffness_is_symmetric_and_matches_hand_values() {
        let (model, _, _) = chain();
        let system = GlobalSystem::assemble(&model, &LoadSelection::Combined).expect("assembles");
        let k = &system.stiffness;

        // EA/L = 100 for both members.
        assert_relative_eq!(k.get(0, 0).expect("in band"), 100.0);
        assert_relative_eq!(k.get(6, 6).expect("in band"), 200.0);
        assert_relative_eq!(k.get(0, 6).expect("in band"), -100.0);
        assert_relative_eq!(k.get(3, 6).expect("in band"), -100.0);
        assert_eq!(k.get(0, 3).expect("in band"), 0.0);

        let dense = k.to_dense();
        assert_eq!(dense, dense.transpose());
    }

    #[test]
    fn lumped_and_nodal_masses_accumulate_on_the_diagonal() {
        let (mut model, nodes, _) = chain();
        model
            .add_nodal_mass(nodes[1], [5.0, 0.0, 0.0])
            .expect("mass accepted");
        let system = GlobalSystem::assemble(&model, &LoadSelection::Combined).expect("assembles");

        // Each member has mass 2 · 1 · 1 = 2, half to each end.
        assert_relative_eq!(system.mass.diagonal(6), 2.0);
        assert_relative_eq!(system.mass.diagonal(3), 6.0);
        assert_relative_eq!(system.translational_mass(0), 9.0);
        assert_relative_eq!(system.translational_mass(1), 4.0);
        assert_eq!(system.mass.get(0, 6), Ok(0.0));
    }

    #[test]
    fn load_cases_are_summed_in_any_order() {
        let (mut model, nodes, members) = chain();
        let first = model.add_load_case();
        let second = model.add_load_case();
        model
            .add_nodal_load(first, nodes[1], force(10.0, 0.0, 0.0))
            .expect("load accepted");
        model
            .add_distributed_load(second, members[1], force(0.0, -4.0, 0.0))
            .expect("load accepted");
        model
            .add_nodal_load(second, nodes[1], force(1.0, 0.0, 0.0))
            .expect("load accepted");

        let combined = combined_load_vector(&model, &LoadSelection::Combined).expect("loads");
        assert_relative_eq!(combined[3], 11.0);
        assert_relative_eq!(combined[4], -2.0);
        assert_relative_eq!(combined[7], -2.0);

        let mut reversed = DVector::zeros(model.dof_count());
        for case in model.load_cases().iter().rev() {
            form_element_loads(&model, &mut reversed, case).expect("loads");
            form_nodal_loads(&mut reversed, case);
        }
        assert_eq!(reversed, combined);

        let only_first = combined_load_vector(&model, &LoadSelection::Case(first)).expect("loads");
        assert_relative_eq!(only_first[3], 10.0);
        assert_eq!(only_first[4], 0.0);
    }

    #[test]
    fn unknown_case_is_reported() {
        let (model, _, _) = chain();
        let error = combined_load_vector(&model, &LoadSelection::Case(3)).expect_err("no case 3");
        assert_eq!(
            error,
            AnalysisError::InvalidReference(ModelError::IndexOutOfRange {
                entity: Entity::LoadCase,
                index: 3,
                len: 0
            })
        );
    }

    #[test]
    fn degenerate_member_is_fatal() {
        let mut model = Model::new();
        let a = model.add_node(point(1.0, 1.0, 1.0), [true; 3]);
        let b = model.add_node(point(1.0, 1.0, 1.0), [false; 3]);
        model
            .add_material(Material::new("Steel", 1.0))
            .expect("material accepted");
        model
            .add_section(Section::new("Bar", 1.0))
            .expect("section accepted");
        let member = model.add_member(a, b, 0, 0).expect("member accepted");
        let error = GlobalSystem::assemble(&model, &LoadSelection::Combined).expect_err("zero length");
        assert_eq!(error, AnalysisError::DegenerateMember(member));
    }
}
