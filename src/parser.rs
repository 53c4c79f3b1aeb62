//! Reader for the comma-separated model description format.
//!
//! Each non-empty line holds one record; the first field is a tag selecting
//! the record kind and lines starting with `;` are comments:
//!
//! ```text
//! ; tag, fields...
//! node,x,y,z,mask          mask: three characters, '0' marks a fixed axis
//! line,I,J,material,section
//! boundary,node,ux,uy,uz   an empty value means "not given"
//! Mat,name,E,alpha,weight density,mass density
//! Sec,name,A,I
//! nodalmass,node,Mx,My,Mz
//! loadcase,id,nodes,node,Fx,Fy,Fz
//! loadcase,id,dists,member,Wx,Wy,Wz
//! ```
//!
//! Records may appear in any order. Indices are zero-based and resolved once
//! the whole text has been read.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use log::{debug, warn};
use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::errors::{LoadError, ModelError};
use crate::geometry::{force, point, Force, Point};
use crate::model::{BoundaryCondition, Material, Model, Section};

/// One record with the line it came from.
#[derive(Debug)]
struct Record {
    line: usize,
    kind: RecordKind,
}

#[derive(Debug)]
enum RecordKind {
    Node { position: Point, restraint: [bool; 3] },
    Member { start: usize, end: usize, material: usize, section: usize },
    Boundary { node: usize, prescribed: [Option<f64>; 3] },
    Material(Material),
    Section(Section),
    NodalMass { node: usize, mass: [f64; 3] },
    NodalLoad { case: usize, node: usize, force: Force },
    DistributedLoad { case: usize, member: usize, intensity: Force },
}

/// Fields of one line after the tag, with the line number for error messages.
struct Fields<'a> {
    line: usize,
    values: Vec<&'a str>,
}

impl<'a> Fields<'a> {
    fn new(line: usize, values: Vec<&'a str>, expected: usize, tag: &str) -> Result<Self, LoadError> {
        if values.len() < expected {
            return Err(LoadError::Syntax {
                line,
                message: format!(
                    "'{tag}' record needs {expected} fields, found {}",
                    values.len()
                ),
            });
        }
        Ok(Self { line, values })
    }

    fn text(&self, index: usize) -> &'a str {
        self.values[index]
    }

    fn parse<T: FromStr>(&self, index: usize, what: &str) -> Result<T, LoadError> {
        let raw = self.values[index];
        raw.parse().map_err(|_| LoadError::Syntax {
            line: self.line,
            message: format!("invalid {what} '{raw}'"),
        })
    }

    fn optional(&self, index: usize, what: &str) -> Result<Option<f64>, LoadError> {
        match self.values.get(index) {
            None => Ok(None),
            Some(raw) if raw.is_empty() => Ok(None),
            Some(_) => self.parse(index, what).map(Some),
        }
    }

    fn triple(&self, first: usize, what: &str) -> Result<[f64; 3], LoadError> {
        Ok([
            self.parse(first, what)?,
            self.parse(first + 1, what)?,
            self.parse(first + 2, what)?,
        ])
    }
}

/// Parse a model from its text description.
///
/// # Errors
///
/// Returns [`LoadError::Syntax`] for a malformed record and
/// [`LoadError::Model`] when a record references something that does not exist
/// or carries invalid properties.
///
/// # Examples
/// ```
/// let text = "\
/// ; two-node bar
/// node,0,0,0,000
/// node,10,0,0,100
/// Mat,Steel,29.5e6,0,0,0
/// Sec,Bar,1,0
/// line,0,1,0,0
/// boundary,0,0,0,0
/// boundary,1,,0,0
/// loadcase,0,nodes,1,1000,0,0
/// ";
/// let model = truss3d::parse_model(text)?;
/// assert_eq!(model.node_count(), 2);
/// assert_eq!(model.member_count(), 1);
/// assert_eq!(model.load_cases().len(), 1);
/// # Ok::<(), truss3d::LoadError>(())
/// ```
pub fn parse_model(text: &str) -> Result<Model, LoadError> {
    let mut records = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with(';') {
            continue;
        }
        let mut values: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        let tag = values.remove(0);
        match parse_record(line, tag, values)? {
            Some(kind) => records.push(Record { line, kind }),
            None => warn!("line {line}: unknown record '{tag}' skipped"),
        }
    }
    let model = build_model(records)?;
    debug!(
        "parsed model with {} nodes, {} members, {} load cases",
        model.node_count(),
        model.member_count(),
        model.load_cases().len()
    );
    Ok(model)
}

/// Read and parse a model file.
///
/// # Errors
///
/// Returns [`LoadError::Io`] when the file cannot be read, otherwise the
/// errors of [`parse_model`].
pub fn read_model(path: impl AsRef<Path>) -> Result<Model, LoadError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_model(&text)
}

fn parse_record(line: usize, tag: &str, values: Vec<&str>) -> Result<Option<RecordKind>, LoadError> {
    let kind = match tag {
        "node" => {
            let fields = Fields::new(line, values, 4, tag)?;
            let [x, y, z] = fields.triple(0, "coordinate")?;
            RecordKind::Node {
                position: point(x, y, z),
                restraint: parse_mask(line, fields.text(3))?,
            }
        }
        "line" => {
            let fields = Fields::new(line, values, 4, tag)?;
            RecordKind::Member {
                start: fields.parse(0, "node index")?,
                end: fields.parse(1, "node index")?,
                material: fields.parse(2, "material index")?,
                section: fields.parse(3, "section index")?,
            }
        }
        "boundary" => {
            let fields = Fields::new(line, values, 1, tag)?;
            RecordKind::Boundary {
                node: fields.parse(0, "node index")?,
                prescribed: [
                    fields.optional(1, "displacement")?,
                    fields.optional(2, "displacement")?,
                    fields.optional(3, "displacement")?,
                ],
            }
        }
        "Mat" => {
            let fields = Fields::new(line, values, 5, tag)?;
            RecordKind::Material(Material {
                name: fields.text(0).to_string(),
                elastic_modulus: fields.parse(1, "elastic modulus")?,
                thermal_coefficient: fields.parse(2, "thermal coefficient")?,
                weight_density: fields.parse(3, "weight density")?,
                mass_density: fields.parse(4, "mass density")?,
            })
        }
        "Sec" => {
            let fields = Fields::new(line, values, 3, tag)?;
            RecordKind::Section(Section {
                name: fields.text(0).to_string(),
                area: fields.parse(1, "area")?,
                moment_of_inertia: fields.parse(2, "moment of inertia")?,
            })
        }
        "nodalmass" => {
            let fields = Fields::new(line, values, 4, tag)?;
            RecordKind::NodalMass {
                node: fields.parse(0, "node index")?,
                mass: fields.triple(1, "mass")?,
            }
        }
        "loadcase" => {
            let fields = Fields::new(line, values, 6, tag)?;
            let case = fields.parse(0, "load case id")?;
            let target = fields.parse(2, "index")?;
            let [x, y, z] = fields.triple(3, "load")?;
            match fields.text(1) {
                "nodes" => RecordKind::NodalLoad {
                    case,
                    node: target,
                    force: force(x, y, z),
                },
                "dists" => RecordKind::DistributedLoad {
                    case,
                    member: target,
                    intensity: force(x, y, z),
                },
                other => {
                    return Err(LoadError::Syntax {
                        line,
                        message: format!("load kind must be 'nodes' or 'dists', found '{other}'"),
                    })
                }
            }
        }
        _ => return Ok(None),
    };
    Ok(Some(kind))
}

/// Node mask: exactly three characters, `'0'` fixes the axis.
fn parse_mask(line: usize, mask: &str) -> Result<[bool; 3], LoadError> {
    let chars: Vec<char> = mask.chars().collect();
    if chars.len() != 3 {
        return Err(LoadError::Syntax {
            line,
            message: format!("restraint mask '{mask}' must have three characters"),
        });
    }
    Ok([chars[0] == '0', chars[1] == '0', chars[2] == '0'])
}

/// Insert the records in dependency order so forward references resolve.
fn build_model(records: Vec<Record>) -> Result<Model, LoadError> {
    let mut model = Model::new();
    let at = |line: usize| move |source: ModelError| LoadError::Model { line, source };
    // Case ids may leave gaps but cannot outnumber the load records.
    let load_records = records
        .iter()
        .filter(|record| {
            matches!(
                record.kind,
                RecordKind::NodalLoad { .. } | RecordKind::DistributedLoad { .. }
            )
        })
        .count();

    for record in &records {
        match &record.kind {
            RecordKind::Node {
                position,
                restraint,
            } => {
                model.add_node(*position, *restraint);
            }
            RecordKind::Material(material) => {
                model.add_material(material.clone()).map_err(at(record.line))?;
            }
            RecordKind::Section(section) => {
                model.add_section(section.clone()).map_err(at(record.line))?;
            }
            RecordKind::NodalLoad { case, .. } | RecordKind::DistributedLoad { case, .. } => {
                if *case > load_records {
                    return Err(LoadError::Syntax {
                        line: record.line,
                        message: format!(
                            "load case id {case} exceeds the {load_records} load records in the model"
                        ),
                    });
                }
                model.ensure_load_case(*case).map_err(at(record.line))?;
            }
            _ => {}
        }
    }

    for record in &records {
        if let RecordKind::Member {
            start,
            end,
            material,
            section,
        } = record.kind
        {
            model
                .add_member(NodeIndex::new(start), NodeIndex::new(end), material, section)
                .map_err(at(record.line))?;
        }
    }

    for record in records {
        let result = match record.kind {
            RecordKind::Boundary { node, prescribed } => {
                model.add_boundary(BoundaryCondition::new(NodeIndex::new(node), prescribed))
            }
            RecordKind::NodalMass { node, mass } => model.add_nodal_mass(NodeIndex::new(node), mass),
            RecordKind::NodalLoad { case, node, force } => {
                model.add_nodal_load(case, NodeIndex::new(node), force)
            }
            RecordKind::DistributedLoad {
                case,
                member,
                intensity,
            } => model.add_distributed_load(case, EdgeIndex::new(member), intensity),
            _ => Ok(()),
        };
        result.map_err(at(record.line))?;
    }
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Entity;
    use crate::model::LoadCase;

    const FOUR_NODE: &str = include_str!("../tests/data/four_node.csv");

    #[test]
    fn reads_every_record_kind() {
        let model = parse_model(FOUR_NODE).expect("valid model");
        assert_eq!(model.node_count(), 4);
        assert_eq!(model.member_count(), 4);
        assert_eq!(model.boundaries().len(), 4);
        assert_eq!(model.nodal_masses().len(), 1);
        assert_eq!(model.load_cases()[0].nodal.len(), 2);

        let node = model.node(NodeIndex::new(1)).expect("node exists");
        assert_eq!(node.restraint(), [false, true, true]);
        assert_eq!(model.boundaries()[1].prescribed, [None, Some(0.0), Some(0.0)]);
        assert_eq!(model.boundaries()[2].prescribed, [None, None, Some(0.0)]);

        let steel = model.material(0).expect("material exists");
        assert_eq!(steel.name, "Steel");
        assert_eq!(steel.mass_density, 7.345e-4);
    }

    #[test]
    fn forward_references_and_gaps_in_case_ids() {
        let text = "\
loadcase,2,dists,0,0,-1,0
line,0,1,0,0
node,0,0,0,000
node,1,0,0,111
Sec,Bar,1,0
Mat,Steel,100,0,0,0
loadcase,0,nodes,1,5,0,0
";
        let model = parse_model(text).expect("valid model");
        assert_eq!(model.load_cases().len(), 3);
        assert_eq!(model.load_cases()[0].nodal.len(), 1);
        assert_eq!(model.load_cases()[1], LoadCase::default());
        assert_eq!(model.load_cases()[2].distributed.len(), 1);
    }

    #[test]
    fn oversized_load_case_ids_are_rejected() {
        for id in ["18446744073709551615", "1000000000000", "2"] {
            let text = format!("node,0,0,0,000\nloadcase,{id},nodes,0,1,0,0\n");
            let error = parse_model(&text).expect_err("id beyond the load records");
            match error {
                LoadError::Syntax { line, message } => {
                    assert_eq!(line, 2);
                    assert!(message.contains(id), "message '{message}' names the id");
                }
                other => panic!("unexpected error {other:?}"),
            }
        }
    }

    #[test]
    fn unknown_tags_are_skipped() {
        let model = parse_model("node,0,0,0,000\nhinge,1,2\n").expect("valid model");
        assert_eq!(model.node_count(), 1);
    }

    #[test]
    fn malformed_number_reports_line() {
        let error = parse_model("; header\nnode,0,zero,0,000\n").expect_err("bad coordinate");
        match error {
            LoadError::Syntax { line, message } => {
                assert_eq!(line, 2);
                assert!(message.contains("zero"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn short_mask_is_rejected() {
        let error = parse_model("node,0,0,0,00\n").expect_err("bad mask");
        assert!(matches!(error, LoadError::Syntax { line: 1, .. }));
    }

    #[test]
    fn dangling_member_reference_is_reported() {
        let text = "node,0,0,0,000\nMat,Steel,100,0,0,0\nSec,Bar,1,0\nline,0,4,0,0\n";
        let error = parse_model(text).expect_err("node 4 missing");
        match error {
            LoadError::Model { line, source } => {
                assert_eq!(line, 4);
                assert_eq!(
                    source,
                    ModelError::IndexOutOfRange {
                        entity: Entity::Node,
                        index: 4,
                        len: 1,
                    }
                );
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let error = read_model("/nonexistent/model.csv").expect_err("no such file");
        assert!(matches!(error, LoadError::Io { .. }));
    }
}
