#![warn(clippy::all)]
#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

pub mod analysis;
pub mod assembly;
pub mod band;
pub mod constraints;
pub mod element;
pub mod errors;
pub mod geometry;
pub mod model;
pub mod parser;
pub mod recovery;
pub mod results;
pub mod solver;

pub use analysis::{
    analyze, AnalysisOptions, LoadSelection, MemberLoadRecovery, ReactionRecovery,
};
pub use assembly::GlobalSystem;
pub use band::BandMatrix;
pub use element::BarElement;
pub use errors::{AnalysisError, BandError, Entity, LoadError, ModelError};
pub use geometry::{displacement, force, point, Displacement, Force, Point};
pub use model::{
    BoundaryCondition, DistributedLoad, LoadCase, Material, Member, Model, NodalLoad, NodalMass,
    Node, Section,
};
pub use parser::{parse_model, read_model};
pub use results::{AnalysisResults, MemberEndForces, Reaction};
