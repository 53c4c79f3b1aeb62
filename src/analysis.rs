//! Analysis options and the formulate → assemble → constrain → solve → recover pipeline.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::assembly::GlobalSystem;
use crate::constraints::{apply_penalty, collect_constraints, penalty_constant};
use crate::errors::AnalysisError;
use crate::model::Model;
use crate::recovery;
use crate::results::AnalysisResults;
use crate::solver::solve_in_place;

/// Which load cases feed the load vector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadSelection {
    /// Sum every load case into one combined load vector.
    #[default]
    Combined,
    /// Use a single load case by id.
    Case(usize),
}

/// How distributed member loads are subtracted when recovering end forces.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberLoadRecovery {
    /// Only the last distributed load found for a member is subtracted, even
    /// when several selected cases load it.
    #[default]
    LastEncountered,
    /// Every distributed load on the member is subtracted, consistent with
    /// the combined load vector.
    Summed,
}

/// Which displacement the penalty spring force is measured from when
/// recovering support reactions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReactionRecovery {
    /// `cnst · (0 − d)` on every constrained axis, whatever its prescribed value.
    #[default]
    FromZero,
    /// `cnst · (u − d)`, the force that holds the axis at its prescribed
    /// value `u`. Identical to [`ReactionRecovery::FromZero`] when `u = 0`.
    FromPrescribed,
}

/// Options for a linear static analysis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Multiplier on the largest diagonal stiffness giving the penalty constant.
    pub penalty_factor: f64,
    /// Pivots at or below this fraction of the largest diagonal stiffness are singular.
    pub pivot_tolerance: f64,
    /// Load cases to analyse.
    pub load_selection: LoadSelection,
    /// Treatment of distributed loads during force recovery.
    pub member_load_recovery: MemberLoadRecovery,
    /// Reference displacement for support reactions.
    pub reaction_recovery: ReactionRecovery,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            penalty_factor: 10_000.0,
            pivot_tolerance: 1.0e-10,
            load_selection: LoadSelection::Combined,
            member_load_recovery: MemberLoadRecovery::LastEncountered,
            reaction_recovery: ReactionRecovery::FromZero,
        }
    }
}

impl AnalysisOptions {
    /// Set the penalty factor.
    #[must_use]
    pub fn with_penalty_factor(mut self, factor: f64) -> Self {
        self.penalty_factor = factor;
        self
    }

    /// Set the relative pivot tolerance.
    #[must_use]
    pub fn with_pivot_tolerance(mut self, tolerance: f64) -> Self {
        self.pivot_tolerance = tolerance;
        self
    }

    /// Analyse a single load case instead of the combination of all cases.
    #[must_use]
    pub fn with_load_case(mut self, case: usize) -> Self {
        self.load_selection = LoadSelection::Case(case);
        self
    }

    /// Set how distributed loads are treated during force recovery.
    #[must_use]
    pub fn with_member_load_recovery(mut self, mode: MemberLoadRecovery) -> Self {
        self.member_load_recovery = mode;
        self
    }

    /// Set the reference displacement for support reactions.
    #[must_use]
    pub fn with_reaction_recovery(mut self, mode: ReactionRecovery) -> Self {
        self.reaction_recovery = mode;
        self
    }
}

/// Run a linear static analysis of `model`.
///
/// The model is only read. Every call allocates its own matrices, so repeated
/// calls on an unchanged model give bit-identical results and independent
/// calls may run on separate threads.
///
/// # Errors
///
/// Returns [`AnalysisError::EmptyModel`] for a model without nodes,
/// [`AnalysisError::DegenerateMember`] for a zero-length member and
/// [`AnalysisError::SingularSystem`] when the supports leave a rigid-body
/// mode or a node unconnected.
///
/// # Examples
/// ```
/// use truss3d::{analyze, force, point, AnalysisOptions, BoundaryCondition, Material, Model, Section};
///
/// let mut model = Model::new();
/// let support = model.add_node(point(0.0, 0.0, 0.0), [true, true, true]);
/// let tip = model.add_node(point(1.0, 0.0, 0.0), [false, true, true]);
/// let steel = model.add_material(Material::new("Steel", 200.0e9))?;
/// let bar = model.add_section(Section::new("Bar", 0.01))?;
/// model.add_member(support, tip, steel, bar)?;
/// model.add_boundary(BoundaryCondition::fixed(support))?;
/// model.add_boundary(BoundaryCondition::fixed(tip))?;
/// let case = model.add_load_case();
/// model.add_nodal_load(case, tip, force(1_000.0, 0.0, 0.0))?;
///
/// let results = analyze(&model, &AnalysisOptions::default())?;
/// let stretch = results.node_displacement(tip).unwrap().x;
/// assert!((stretch - 5.0e-7).abs() < 1.0e-9);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn analyze(model: &Model, options: &AnalysisOptions) -> Result<AnalysisResults, AnalysisError> {
    if model.node_count() == 0 {
        return Err(AnalysisError::EmptyModel);
    }

    let GlobalSystem {
        mut stiffness,
        mut load,
        ..
    } = GlobalSystem::assemble(model, &options.load_selection)?;
    let bandwidth = stiffness.bandwidth();

    let max_diagonal = stiffness.max_diagonal();
    let penalty = penalty_constant(&stiffness, options.penalty_factor);
    let constraints = collect_constraints(model);
    apply_penalty(&mut stiffness, &mut load, &constraints, penalty)?;
    debug!(
        "solving {} dof, penalty {:e}, {} constrained",
        stiffness.order(),
        penalty,
        constraints.len()
    );

    solve_in_place(stiffness, &mut load, options.pivot_tolerance * max_diagonal)?;
    let solution = load;

    let member_forces = recovery::member_forces(
        model,
        &solution,
        &options.load_selection,
        options.member_load_recovery,
    )?;
    Ok(AnalysisResults {
        displacements: recovery::displacements(&solution),
        member_forces,
        reactions: recovery::reactions(
            model,
            &constraints,
            &solution,
            penalty,
            options.reaction_recovery,
        ),
        penalty,
        bandwidth,
    })
}
