//! Error types produced while building, reading or analysing a truss model.

use std::fmt;
use std::path::PathBuf;

use petgraph::graph::EdgeIndex;
use thiserror::Error;

/// Kind of model record referenced by an index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entity {
    /// A node (joint).
    Node,
    /// A member (two-force element).
    Member,
    /// A material record.
    Material,
    /// A cross-section record.
    Section,
    /// A load case.
    LoadCase,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Entity::Node => "node",
            Entity::Member => "member",
            Entity::Material => "material",
            Entity::Section => "section",
            Entity::LoadCase => "load case",
        };
        f.write_str(name)
    }
}

/// Error returned when a record cannot be added to a [`Model`](crate::Model).
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ModelError {
    /// Returned when a record references an index past the end of its collection.
    #[error("{entity} index {index} is out of range (model has {len})")]
    IndexOutOfRange {
        /// Kind of record that was referenced.
        entity: Entity,
        /// Rejected index.
        index: usize,
        /// Number of records of that kind in the model.
        len: usize,
    },
    /// Returned when both ends of a member name the same node.
    #[error("member would connect node {0} to itself")]
    CoincidentNodes(usize),
    /// Returned when the elastic modulus of a material is not strictly positive.
    #[error("material '{name}' must have a positive elastic modulus (received {elastic_modulus})")]
    InvalidMaterial {
        /// Name of the offending material.
        name: String,
        /// Rejected elastic modulus.
        elastic_modulus: f64,
    },
    /// Returned when the area of a section is not strictly positive.
    #[error("section '{name}' must have a positive area (received {area})")]
    InvalidSection {
        /// Name of the offending section.
        name: String,
        /// Rejected cross-sectional area.
        area: f64,
    },
}

/// Error returned when a [`BandMatrix`](crate::BandMatrix) is addressed outside its band.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum BandError {
    /// Returned when the column lies outside the stored band of the row.
    #[error("entry ({row}, {col}) lies outside the band of width {bandwidth}")]
    OutOfBand {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
        /// Stored bandwidth.
        bandwidth: usize,
    },
    /// Returned when a row or column exceeds the matrix order.
    #[error("entry ({row}, {col}) lies outside a matrix of order {order}")]
    OutOfRange {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
        /// Order of the matrix.
        order: usize,
    },
}

/// Error returned when a truss analysis fails.
///
/// Every variant aborts the whole run; no partial results are published.
#[derive(Debug, Error, PartialEq)]
pub enum AnalysisError {
    /// Returned when the model has no nodes.
    #[error("model contains no nodes")]
    EmptyModel,
    /// Returned when a member spans zero distance.
    #[error("member {0:?} has zero length")]
    DegenerateMember(EdgeIndex),
    /// Returned when the band solver meets a zero, tiny or non-finite pivot.
    #[error("stiffness matrix is singular at dof {dof} (pivot {pivot}); check supports and connectivity")]
    SingularSystem {
        /// Degree of freedom whose pivot failed.
        dof: usize,
        /// Value of the rejected pivot.
        pivot: f64,
    },
    /// Returned when the model references a record that does not exist.
    #[error(transparent)]
    InvalidReference(#[from] ModelError),
    /// Returned when assembly writes outside the computed band.
    #[error(transparent)]
    OutOfBand(#[from] BandError),
}

/// Error returned when a model description cannot be read.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Returned when the source file cannot be opened or read.
    #[error("cannot read model file {}: {source}", path.display())]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// Returned when a record is malformed.
    #[error("line {line}: {message}")]
    Syntax {
        /// One-based line number of the record.
        line: usize,
        /// Description of the problem.
        message: String,
    },
    /// Returned when a well-formed record is rejected by the model.
    #[error("line {line}: {source}")]
    Model {
        /// One-based line number of the record.
        line: usize,
        /// Validation failure.
        #[source]
        source: ModelError,
    },
}
