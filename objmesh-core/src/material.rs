/// MTL material library parser
use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::MeshError;
use crate::tokens::directives;

/// RGBA color with channels in `[0, 1]`.
pub type Rgba = [f32; 4];

/// A named material as declared by `newmtl`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
    pub name: String,
    /// `Kd` diffuse color.
    pub diffuse: Option<[f32; 3]>,
    /// `d` dissolve, used as alpha.
    pub dissolve: Option<f32>,
    /// Set when a `Kd` or `d` operand was malformed.
    pub invalid: bool,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// The usable color: requires a valid `Kd`, alpha defaults to 1.
    pub fn color(&self) -> Option<Rgba> {
        if self.invalid {
            return None;
        }
        let [r, g, b] = self.diffuse?;
        Some([r, g, b, self.dissolve.unwrap_or(1.0)])
    }
}

/// Materials by name, as parsed from one MTL file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialLibrary {
    materials: HashMap<String, Material>,
    pub issues: Vec<MeshError>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse MTL text. Only `newmtl`, `Kd` and `d` are recognized.
    pub fn parse(text: &str) -> Self {
        let mut library = Self::new();
        let mut current: Option<Material> = None;

        for directive in directives(text) {
            match directive.keyword {
                "newmtl" => {
                    library.commit(current.take());
                    let name = directive.args.first().copied().unwrap_or_default();
                    current = Some(Material::new(name));
                }
                "Kd" => {
                    // directives before the first newmtl have nothing to apply to
                    let Some(material) = current.as_mut() else {
                        continue;
                    };
                    match directive.floats::<3>() {
                        Ok(rgb) => material.diffuse = Some(rgb),
                        Err(err) => {
                            material.invalid = true;
                            library.record(err);
                        }
                    }
                }
                "d" => {
                    let Some(material) = current.as_mut() else {
                        continue;
                    };
                    match directive.floats::<1>() {
                        Ok([alpha]) => material.dissolve = Some(alpha),
                        Err(err) => {
                            material.invalid = true;
                            library.record(err);
                        }
                    }
                }
                _ => {}
            }
        }
        library.commit(current);

        debug!(materials = library.len(), "parsed material library");
        library
    }

    fn commit(&mut self, material: Option<Material>) {
        if let Some(material) = material {
            self.materials.insert(material.name.clone(), material);
        }
    }

    fn record(&mut self, err: MeshError) {
        warn!(%err, "material color discarded");
        self.issues.push(err);
    }

    pub fn insert(&mut self, material: Material) {
        self.commit(Some(material));
    }

    pub fn get(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    /// The usable color of `name`, if the material exists and has one.
    pub fn color(&self, name: &str) -> Option<Rgba> {
        self.get(name).and_then(Material::color)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_ordering() {
        let lib = MaterialLibrary::parse("newmtl A\nKd 1 0 0\nnewmtl B\nKd 0 1 0\nd 0.5");
        assert_eq!(lib.len(), 2);
        assert_eq!(lib.get("A").unwrap().diffuse, Some([1.0, 0.0, 0.0]));
        assert_eq!(lib.get("A").unwrap().dissolve, None);
        assert_eq!(lib.color("A"), Some([1.0, 0.0, 0.0, 1.0]));
        assert_eq!(lib.color("B"), Some([0.0, 1.0, 0.0, 0.5]));
    }

    #[test]
    fn test_material_without_kd_has_no_color() {
        let lib = MaterialLibrary::parse("newmtl glass\nd 0.2\n");
        assert!(lib.get("glass").is_some());
        assert_eq!(lib.color("glass"), None);
    }

    #[test]
    fn test_directives_before_newmtl_are_discarded() {
        let lib = MaterialLibrary::parse("Kd 1 1 1\nd 0.5\n");
        assert!(lib.is_empty());
        assert!(lib.issues.is_empty());
    }

    #[test]
    fn test_malformed_kd_is_not_zero() {
        let lib = MaterialLibrary::parse("newmtl bad\nKd 1 oops 0\nnewmtl ok\nKd 0 0 0\n");
        assert_eq!(lib.color("bad"), None);
        assert_eq!(lib.color("ok"), Some([0.0, 0.0, 0.0, 1.0]));
        assert_eq!(
            lib.issues,
            vec![MeshError::MalformedNumber {
                line: 2,
                token: "oops".into()
            }]
        );
    }

    #[test]
    fn test_unrecognized_lines_ignored() {
        let lib = MaterialLibrary::parse("# comment\n\nnewmtl m\nNs 10\nKa 0 0 0\n  Kd 0.5 0.5 0.5  \r\n");
        assert_eq!(lib.color("m"), Some([0.5, 0.5, 0.5, 1.0]));
    }

    #[test]
    fn test_name_is_first_token() {
        let lib = MaterialLibrary::parse("newmtl brick wall\nKd 1 0 0\n");
        assert_eq!(lib.color("brick"), Some([1.0, 0.0, 0.0, 1.0]));
        assert!(lib.get("brick wall").is_none());
    }

    #[test]
    fn test_redefinition_replaces() {
        let lib = MaterialLibrary::parse("newmtl m\nKd 1 0 0\nnewmtl m\nKd 0 0 1\n");
        assert_eq!(lib.len(), 1);
        assert_eq!(lib.color("m"), Some([0.0, 0.0, 1.0, 1.0]));
    }
}
