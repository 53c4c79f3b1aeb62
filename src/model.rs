//! The truss model: nodes, members, properties, supports and loads.
//!
//! Nodes and members live in a [`petgraph::Graph`]; their [`NodeIndex`] and
//! [`EdgeIndex`] handles are dense, zero-based and never invalidated because
//! the model does not support removal. Every cross-reference is checked when
//! the record is added, so an analysis never meets a dangling index.

use petgraph::graph::{EdgeIndex, Graph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use crate::analysis::{analyze, AnalysisOptions};
use crate::errors::{AnalysisError, Entity, ModelError};
use crate::geometry::{Displacement, Force, Point};
use crate::results::AnalysisResults;

/// A joint of the truss.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    /// Position of the node.
    position: Point,
    /// `true` for each of the X, Y and Z axes that is fixed.
    restraint: [bool; 3],
    /// Displacement written back after a successful analysis.
    displacement: Displacement,
}

impl Node {
    /// Position of the node.
    #[must_use]
    pub fn position(&self) -> Point {
        self.position
    }

    /// Fixed flag per axis.
    #[must_use]
    pub fn restraint(&self) -> [bool; 3] {
        self.restraint
    }

    /// Displacement from the last analysis applied to the model.
    #[must_use]
    pub fn displacement(&self) -> Displacement {
        self.displacement
    }
}

/// A two-force member. The end nodes are the endpoints of its graph edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Member {
    /// Index into the material table.
    material: usize,
    /// Index into the section table.
    section: usize,
}

impl Member {
    /// Material index of the member.
    #[must_use]
    pub fn material(&self) -> usize {
        self.material
    }

    /// Section index of the member.
    #[must_use]
    pub fn section(&self) -> usize {
        self.section
    }
}

/// Elastic and inertial properties of a material.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Display name.
    pub name: String,
    /// Elastic modulus E.
    pub elastic_modulus: f64,
    /// Coefficient of thermal expansion. Carried, not used by the analysis.
    pub thermal_coefficient: f64,
    /// Weight per unit volume. Carried, not used by the analysis.
    pub weight_density: f64,
    /// Mass per unit volume, used for the lumped mass matrix.
    pub mass_density: f64,
}

impl Material {
    /// Material with the given modulus and no thermal or inertial data.
    #[must_use]
    pub fn new(name: &str, elastic_modulus: f64) -> Self {
        Self {
            name: name.to_string(),
            elastic_modulus,
            thermal_coefficient: 0.0,
            weight_density: 0.0,
            mass_density: 0.0,
        }
    }

    /// Set the mass per unit volume.
    #[must_use]
    pub fn with_mass_density(mut self, mass_density: f64) -> Self {
        self.mass_density = mass_density;
        self
    }
}

/// Cross-section properties.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Display name.
    pub name: String,
    /// Cross-sectional area A.
    pub area: f64,
    /// Second moment of area. Carried, not used by a pin-jointed truss.
    pub moment_of_inertia: f64,
}

impl Section {
    /// Section with the given area.
    #[must_use]
    pub fn new(name: &str, area: f64) -> Self {
        Self {
            name: name.to_string(),
            area,
            moment_of_inertia: 0.0,
        }
    }
}

/// Prescribed displacements at a node.
///
/// Only axes that the node's restraint marks as fixed are constrained; a value
/// given for a free axis is ignored. A fixed axis without a value is held at
/// zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundaryCondition {
    /// Constrained node.
    pub node: NodeIndex,
    /// Prescribed displacement per axis.
    pub prescribed: [Option<f64>; 3],
}

impl BoundaryCondition {
    /// Boundary condition with explicit per-axis values.
    #[must_use]
    pub const fn new(node: NodeIndex, prescribed: [Option<f64>; 3]) -> Self {
        Self { node, prescribed }
    }

    /// Hold every fixed axis of `node` at zero.
    #[must_use]
    pub const fn fixed(node: NodeIndex) -> Self {
        Self::new(node, [Some(0.0); 3])
    }

    /// Prescribed value for `axis`, defaulting to zero.
    #[must_use]
    pub fn value(&self, axis: usize) -> f64 {
        self.prescribed[axis].unwrap_or(0.0)
    }
}

/// Concentrated load at a node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodalLoad {
    /// Loaded node.
    pub node: NodeIndex,
    /// Applied force in the global frame.
    pub force: Force,
}

/// Uniform load along a member, per unit length, in the global frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistributedLoad {
    /// Loaded member.
    pub member: EdgeIndex,
    /// Load intensity (force per unit length).
    pub intensity: Force,
}

/// A group of loads analysed together.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadCase {
    /// Concentrated nodal loads.
    pub nodal: Vec<NodalLoad>,
    /// Uniform member loads.
    pub distributed: Vec<DistributedLoad>,
}

/// Lumped mass added directly to a node's diagonal mass entries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodalMass {
    /// Node carrying the mass.
    pub node: NodeIndex,
    /// Mass per axis.
    pub mass: [f64; 3],
}

/// Container for a pin-jointed truss model.
#[derive(Clone, Debug, Default)]
pub struct Model {
    /// Joints as graph nodes, members as graph edges.
    graph: Graph<Node, Member>,
    /// Material table.
    materials: Vec<Material>,
    /// Section table.
    sections: Vec<Section>,
    /// Boundary condition records in insertion order.
    boundaries: Vec<BoundaryCondition>,
    /// Load cases indexed by id.
    load_cases: Vec<LoadCase>,
    /// Extra lumped masses.
    nodal_masses: Vec<NodalMass>,
}

impl Model {
    /// Create an empty model.
    ///
    /// # Examples
    /// ```
    /// use truss3d::Model;
    ///
    /// let model = Model::new();
    /// assert_eq!(model.node_count(), 0);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Return the number of members.
    #[must_use]
    pub fn member_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Return the number of degrees of freedom, three per node.
    #[must_use]
    pub fn dof_count(&self) -> usize {
        3 * self.node_count()
    }

    /// Add a node with the given fixed flags per axis.
    ///
    /// # Examples
    /// ```
    /// use truss3d::{point, Model};
    ///
    /// let mut model = Model::new();
    /// let node = model.add_node(point(0.0, 0.0, 0.0), [true, true, true]);
    /// assert_eq!(node.index(), 0);
    /// ```
    pub fn add_node(&mut self, position: Point, restraint: [bool; 3]) -> NodeIndex {
        self.graph.add_node(Node {
            position,
            restraint,
            displacement: Displacement::default(),
        })
    }

    /// Replace the fixed flags of a node.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::IndexOutOfRange`] when `node` is not part of this model.
    pub fn set_restraint(&mut self, node: NodeIndex, restraint: [bool; 3]) -> Result<(), ModelError> {
        self.check_node(node)?;
        self.graph[node].restraint = restraint;
        Ok(())
    }

    /// Append a material and return its index.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidMaterial`] when the elastic modulus is not
    /// strictly positive.
    pub fn add_material(&mut self, material: Material) -> Result<usize, ModelError> {
        if material.elastic_modulus.is_nan() || material.elastic_modulus <= 0.0 {
            return Err(ModelError::InvalidMaterial {
                elastic_modulus: material.elastic_modulus,
                name: material.name,
            });
        }
        self.materials.push(material);
        Ok(self.materials.len() - 1)
    }

    /// Append a section and return its index.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidSection`] when the area is not strictly positive.
    pub fn add_section(&mut self, section: Section) -> Result<usize, ModelError> {
        if section.area.is_nan() || section.area <= 0.0 {
            return Err(ModelError::InvalidSection {
                area: section.area,
                name: section.name,
            });
        }
        self.sections.push(section);
        Ok(self.sections.len() - 1)
    }

    /// Connect two distinct nodes with a member.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::IndexOutOfRange`] for an unknown node, material or
    /// section and [`ModelError::CoincidentNodes`] when `start == end`.
    pub fn add_member(
        &mut self,
        start: NodeIndex,
        end: NodeIndex,
        material: usize,
        section: usize,
    ) -> Result<EdgeIndex, ModelError> {
        self.check_node(start)?;
        self.check_node(end)?;
        if start == end {
            return Err(ModelError::CoincidentNodes(start.index()));
        }
        check_index(Entity::Material, material, self.materials.len())?;
        check_index(Entity::Section, section, self.sections.len())?;
        Ok(self.graph.add_edge(start, end, Member { material, section }))
    }

    /// Record prescribed displacements for a node.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::IndexOutOfRange`] when the node is unknown.
    pub fn add_boundary(&mut self, boundary: BoundaryCondition) -> Result<(), ModelError> {
        self.check_node(boundary.node)?;
        self.boundaries.push(boundary);
        Ok(())
    }

    /// Append an empty load case and return its id.
    pub fn add_load_case(&mut self) -> usize {
        self.load_cases.push(LoadCase::default());
        self.load_cases.len() - 1
    }

    /// Make sure load case `id` exists, creating empty cases up to it.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::IndexOutOfRange`] when `id + 1` overflows.
    pub fn ensure_load_case(&mut self, id: usize) -> Result<(), ModelError> {
        let len = id.checked_add(1).ok_or(ModelError::IndexOutOfRange {
            entity: Entity::LoadCase,
            index: id,
            len: self.load_cases.len(),
        })?;
        if self.load_cases.len() < len {
            self.load_cases.resize_with(len, LoadCase::default);
        }
        Ok(())
    }

    /// Add a concentrated load to a load case.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::IndexOutOfRange`] for an unknown case or node.
    pub fn add_nodal_load(&mut self, case: usize, node: NodeIndex, force: Force) -> Result<(), ModelError> {
        check_index(Entity::LoadCase, case, self.load_cases.len())?;
        self.check_node(node)?;
        self.load_cases[case].nodal.push(NodalLoad { node, force });
        Ok(())
    }

    /// Add a uniform member load (force per unit length, global frame) to a load case.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::IndexOutOfRange`] for an unknown case or member.
    pub fn add_distributed_load(
        &mut self,
        case: usize,
        member: EdgeIndex,
        intensity: Force,
    ) -> Result<(), ModelError> {
        check_index(Entity::LoadCase, case, self.load_cases.len())?;
        check_index(Entity::Member, member.index(), self.member_count())?;
        self.load_cases[case]
            .distributed
            .push(DistributedLoad { member, intensity });
        Ok(())
    }

    /// Add lumped mass at a node.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::IndexOutOfRange`] when the node is unknown.
    pub fn add_nodal_mass(&mut self, node: NodeIndex, mass: [f64; 3]) -> Result<(), ModelError> {
        self.check_node(node)?;
        self.nodal_masses.push(NodalMass { node, mass });
        Ok(())
    }

    /// Look up a node.
    #[must_use]
    pub fn node(&self, node: NodeIndex) -> Option<&Node> {
        self.graph.node_weight(node)
    }

    /// Iterate over nodes in index order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &Node)> {
        self.graph
            .node_indices()
            .map(move |index| (index, &self.graph[index]))
    }

    /// Look up a member.
    #[must_use]
    pub fn member(&self, member: EdgeIndex) -> Option<&Member> {
        self.graph.edge_weight(member)
    }

    /// End nodes `(I, J)` of a member.
    #[must_use]
    pub fn member_nodes(&self, member: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(member)
    }

    /// Iterate over members in index order together with their end nodes.
    pub fn members(&self) -> impl Iterator<Item = (EdgeIndex, NodeIndex, NodeIndex, &Member)> {
        self.graph
            .edge_references()
            .map(|edge| (edge.id(), edge.source(), edge.target(), edge.weight()))
    }

    /// Axial rigidity `E·A` and mass per length `ρ·A` of a member.
    #[must_use]
    pub fn member_properties(&self, member: &Member) -> (f64, f64) {
        let material = &self.materials[member.material];
        let area = self.sections[member.section].area;
        (material.elastic_modulus * area, material.mass_density * area)
    }

    /// Look up a material.
    #[must_use]
    pub fn material(&self, index: usize) -> Option<&Material> {
        self.materials.get(index)
    }

    /// Look up a section.
    #[must_use]
    pub fn section(&self, index: usize) -> Option<&Section> {
        self.sections.get(index)
    }

    /// Boundary conditions in insertion order.
    #[must_use]
    pub fn boundaries(&self) -> &[BoundaryCondition] {
        &self.boundaries
    }

    /// Load cases indexed by id.
    #[must_use]
    pub fn load_cases(&self) -> &[LoadCase] {
        &self.load_cases
    }

    /// Extra lumped masses.
    #[must_use]
    pub fn nodal_masses(&self) -> &[NodalMass] {
        &self.nodal_masses
    }

    /// Copy solved displacements onto the node records.
    pub fn apply_results(&mut self, results: &AnalysisResults) {
        for (node, displacement) in self.graph.node_weights_mut().zip(&results.displacements) {
            node.displacement = *displacement;
        }
    }

    /// Analyse the model and write the displacements back onto its nodes.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError`] when the model cannot be solved. The node
    /// records are left untouched in that case.
    pub fn evaluate(&mut self, options: &AnalysisOptions) -> Result<AnalysisResults, AnalysisError> {
        let results = analyze(self, options)?;
        self.apply_results(&results);
        Ok(results)
    }

    /// Reject handles that do not belong to this model.
    fn check_node(&self, node: NodeIndex) -> Result<(), ModelError> {
        check_index(Entity::Node, node.index(), self.node_count())
    }
}

/// Check that `index` addresses one of `len` records.
fn check_index(entity: Entity, index: usize, len: usize) -> Result<(), ModelError> {
    if index < len {
        Ok(())
    } else {
        Err(ModelError::IndexOutOfRange { entity, index, len })
    }
}
