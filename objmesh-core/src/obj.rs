/// Wavefront OBJ parser: vertex pool plus faces split into mesh groups
use tracing::{debug, warn};

use crate::error::MeshError;
use crate::geometry::{Face, VertexPool};
use crate::material::{MaterialLibrary, Rgba};
use crate::tokens::{directives, parse_index, Directive};

/// A run of faces sharing one identifier and one color.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshGroup {
    /// Name from the last `g`/`o`, `None` if faces came before any marker.
    pub id: Option<String>,
    pub color: Option<Rgba>,
    pub faces: Vec<Face>,
}

/// Result of parsing one OBJ text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedObj {
    pub vertices: VertexPool,
    /// Groups with at least one face, in source order.
    pub groups: Vec<MeshGroup>,
    /// Recoverable problems, in source order.
    pub issues: Vec<MeshError>,
}

/// Where the parser is between group markers.
#[derive(Debug, Clone, PartialEq)]
enum GroupState {
    NoGroup,
    Open(String),
}

impl GroupState {
    fn id(&self) -> Option<String> {
        match self {
            Self::NoGroup => None,
            Self::Open(id) => Some(id.clone()),
        }
    }
}

/// Accumulates vertices and faces and closes groups at `g`/`o`/`usemtl`
/// boundaries and at end of input.
#[derive(Debug)]
pub struct ObjBuilder<'m> {
    materials: Option<&'m MaterialLibrary>,
    state: GroupState,
    active_color: Option<Rgba>,
    faces: Vec<Face>,
    parsed: ParsedObj,
}

impl<'m> ObjBuilder<'m> {
    pub fn new(materials: Option<&'m MaterialLibrary>) -> Self {
        Self {
            materials,
            state: GroupState::NoGroup,
            active_color: None,
            faces: Vec::new(),
            parsed: ParsedObj::default(),
        }
    }

    pub fn add_vertex(&mut self, x: f32, y: f32, z: f32) {
        self.parsed.vertices.push(x, y, z);
    }

    pub fn add_face(&mut self, face: Face) {
        self.faces.push(face);
    }

    /// Close the current face list. Only groups with faces are kept.
    pub fn flush_group(&mut self) {
        if self.faces.is_empty() {
            return;
        }
        let group = MeshGroup {
            id: self.state.id(),
            color: self.active_color,
            faces: std::mem::take(&mut self.faces),
        };
        debug!(id = ?group.id, faces = group.faces.len(), "closed group");
        self.parsed.groups.push(group);
    }

    /// `g`/`o`: close the current group and open a new one named `id`.
    /// A marker without a name leaves the following faces unnamed.
    pub fn start_group(&mut self, id: Option<&str>) {
        self.flush_group();
        self.state = match id {
            Some(id) => GroupState::Open(id.to_string()),
            None => GroupState::NoGroup,
        };
    }

    /// `usemtl`: close the current group, keep its name, and switch the
    /// active color if the material has one.
    pub fn use_material(&mut self, name: &str, line: usize) {
        self.flush_group();

        let Some(materials) = self.materials else {
            debug!(material = name, "usemtl without a material library");
            return;
        };
        match materials.get(name) {
            Some(material) => match material.color() {
                Some(color) => self.active_color = Some(color),
                None => debug!(material = name, "material has no usable color"),
            },
            None => self.record(MeshError::MissingMaterial {
                line,
                name: name.to_string(),
            }),
        }
    }

    fn record(&mut self, err: MeshError) {
        warn!(%err, "obj directive ignored");
        self.parsed.issues.push(err);
    }

    /// Feed one directive through the state machine.
    pub fn apply(&mut self, directive: &Directive<'_>) {
        match directive.keyword {
            "v" => match directive.floats::<3>() {
                Ok([x, y, z]) => self.add_vertex(x, y, z),
                Err(err) => {
                    // keep the slot so later indices stay aligned
                    self.parsed.vertices.push_invalid();
                    self.record(err);
                }
            },
            "f" => match face_indices(directive) {
                Ok(indices) => self.add_face(Face::from_source(indices, directive.line)),
                Err(err) => self.record(err),
            },
            "g" | "o" => self.start_group(directive.args.first().copied()),
            // like group names, only the first token names the material
            "usemtl" => self.use_material(
                directive.args.first().copied().unwrap_or_default(),
                directive.line,
            ),
            _ => {}
        }
    }

    pub fn finish(mut self) -> ParsedObj {
        self.flush_group();
        debug!(
            vertices = self.parsed.vertices.len(),
            groups = self.parsed.groups.len(),
            issues = self.parsed.issues.len(),
            "parsed obj"
        );
        self.parsed
    }
}

// only the first three tokens are read
fn face_indices(directive: &Directive<'_>) -> Result<[i64; 3], MeshError> {
    let mut indices = [0; 3];
    for (i, slot) in indices.iter_mut().enumerate() {
        *slot = parse_index(directive.arg(i)?, directive.line)?;
    }
    Ok(indices)
}

/// Parse OBJ text, attaching colors from `materials` on `usemtl`.
pub fn parse_obj(text: &str, materials: Option<&MaterialLibrary>) -> ParsedObj {
    let mut builder = ObjBuilder::new(materials);
    for directive in directives(text) {
        builder.apply(&directive);
    }
    builder.finish()
}

/// The path named by the first `mtllib` line, if any.
pub fn material_lib_path(text: &str) -> Option<&str> {
    directives(text)
        .find(|d| d.keyword == "mtllib" && !d.rest.is_empty())
        .map(|d| d.rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\n";

    fn lib() -> MaterialLibrary {
        MaterialLibrary::parse("newmtl red\nKd 1 0 0\nnewmtl blue\nKd 0 0 1\nd 0.5\nnewmtl bare\n")
    }

    fn ids(parsed: &ParsedObj) -> Vec<Option<&str>> {
        parsed.groups.iter().map(|g| g.id.as_deref()).collect()
    }

    #[test]
    fn test_vertex_pool_matches_v_lines() {
        let parsed = parse_obj("v 1 2 3\n# c\nv 4 5 6\nvn 0 1 0\nv 7 8 9\n", None);
        assert_eq!(parsed.vertices.len(), 3);
        assert!(parsed.groups.is_empty());
    }

    #[test]
    fn test_faces_before_marker_have_no_id() {
        let parsed = parse_obj(&format!("{TRIANGLE}f 1 2 3\n"), None);
        assert_eq!(ids(&parsed), vec![None]);
        assert_eq!(parsed.groups[0].faces[0].indices, [0, 1, 2]);
    }

    #[test]
    fn test_usemtl_inside_object_keeps_faces() {
        let text = format!("{TRIANGLE}o house\nusemtl red\nf 1 2 3\no shed\nf 1 2 3\n");
        let lib = lib();
        let parsed = parse_obj(&text, Some(&lib));

        assert_eq!(ids(&parsed), vec![Some("house"), Some("shed")]);
        assert_eq!(parsed.groups[0].faces.len(), 1);
        assert_eq!(parsed.groups[1].faces.len(), 1);
        assert_eq!(parsed.groups[0].color, Some([1.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_usemtl_splits_group_under_same_id() {
        let text = format!("{TRIANGLE}g roof\nf 1 2 3\nusemtl blue\nf 3 2 1\n");
        let lib = lib();
        let parsed = parse_obj(&text, Some(&lib));

        assert_eq!(ids(&parsed), vec![Some("roof"), Some("roof")]);
        assert_eq!(parsed.groups[0].color, None);
        assert_eq!(parsed.groups[1].color, Some([0.0, 0.0, 1.0, 0.5]));
    }

    #[test]
    fn test_active_color_is_sticky() {
        let text = format!("{TRIANGLE}usemtl red\ng a\nf 1 2 3\ng b\nf 1 2 3\nusemtl bare\nf 1 2 3\n");
        let lib = lib();
        let parsed = parse_obj(&text, Some(&lib));

        let red = Some([1.0, 0.0, 0.0, 1.0]);
        let colors: Vec<_> = parsed.groups.iter().map(|g| g.color).collect();
        assert_eq!(colors, vec![red, red, red]);
    }

    #[test]
    fn test_empty_groups_dropped() {
        let parsed = parse_obj(&format!("{TRIANGLE}o empty\no used\nf 1 2 3\n"), None);
        assert_eq!(ids(&parsed), vec![Some("used")]);
    }

    #[test]
    fn test_group_name_is_first_token() {
        let parsed = parse_obj(&format!("{TRIANGLE}g wing left\nf 1 2 3\ng\nf 1 2 3\n"), None);
        assert_eq!(ids(&parsed), vec![Some("wing"), None]);
    }

    #[test]
    fn test_material_name_is_first_token() {
        let text = format!("{TRIANGLE}usemtl red extra\nf 1 2 3\n");
        let lib = lib();
        let parsed = parse_obj(&text, Some(&lib));
        assert!(parsed.issues.is_empty());
        assert_eq!(parsed.groups[0].color, Some([1.0, 0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_colorless_material_keeps_active_color() {
        let lib = MaterialLibrary::parse("newmtl red\nKd 1 0 0\nnewmtl broken\nKd 0 zero 1\n");
        let text = format!("{TRIANGLE}usemtl red\nf 1 2 3\nusemtl broken\nf 1 2 3\n");
        let parsed = parse_obj(&text, Some(&lib));

        assert_eq!(parsed.groups.len(), 2);
        assert_eq!(parsed.groups[1].color, Some([1.0, 0.0, 0.0, 1.0]));
        assert!(parsed.issues.is_empty());
    }

    #[test]
    fn test_missing_material_is_recorded() {
        let text = format!("{TRIANGLE}usemtl red\nf 1 2 3\nusemtl nope\nf 1 2 3\n");
        let lib = lib();
        let parsed = parse_obj(&text, Some(&lib));

        assert_eq!(parsed.groups.len(), 2);
        assert_eq!(parsed.groups[1].color, Some([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(
            parsed.issues,
            vec![MeshError::MissingMaterial {
                line: 6,
                name: "nope".into()
            }]
        );
    }

    #[test]
    fn test_extra_face_tokens_ignored() {
        let parsed = parse_obj(&format!("{TRIANGLE}v 1 1 0\nf 1/1/1 2//2 3 4\n"), None);
        assert_eq!(parsed.groups[0].faces.len(), 1);
        assert_eq!(parsed.groups[0].faces[0].indices, [0, 1, 2]);
    }

    #[test]
    fn test_malformed_vertex_keeps_slot() {
        let parsed = parse_obj("v 0 0 0\nv 1 x 0\nv 0 1 0\nf 1 2 3\n", None);
        assert_eq!(parsed.vertices.len(), 3);
        assert_eq!(parsed.vertices.get(1), Some(None));
        assert_eq!(
            parsed.issues,
            vec![MeshError::MalformedNumber {
                line: 2,
                token: "x".into()
            }]
        );
    }

    #[test]
    fn test_malformed_face_rejected() {
        let parsed = parse_obj(&format!("{TRIANGLE}f 1 two 3\nf 1 2\nf 1 2 3\n"), None);
        assert_eq!(parsed.groups[0].faces.len(), 1);
        assert_eq!(parsed.issues.len(), 2);
        assert!(matches!(
            parsed.issues[1],
            MeshError::MalformedDirective { line: 5, .. }
        ));
    }

    #[test]
    fn test_material_lib_path() {
        assert_eq!(
            material_lib_path("# x\nmtllib  house.mtl \nv 0 0 0\nmtllib other.mtl"),
            Some("house.mtl")
        );
        assert_eq!(material_lib_path("v 0 0 0\n"), None);
    }
}
