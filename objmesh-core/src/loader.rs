/// Two-stage model retrieval: the OBJ text, then its material library if it names one
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::aggregate::Model;
use crate::error::{MeshError, MeshResult};
use crate::material::MaterialLibrary;
use crate::obj::material_lib_path;
use crate::options::ModelOptions;

/// Anything that can hand out text by path or URL.
#[allow(async_fn_in_trait)]
pub trait TextSource {
    async fn fetch(&self, path: &str) -> MeshResult<String>;
}

/// Reads files relative to a root directory.
///
/// Reads are synchronous and block the polling thread; fine for
/// `pollster::block_on` and tools, not for a shared async executor.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TextSource for FsSource {
    async fn fetch(&self, path: &str) -> MeshResult<String> {
        std::fs::read_to_string(self.root.join(path)).map_err(|e| MeshError::fetch(path, e))
    }
}

/// Replace the last segment of `base` with `relative`.
pub fn resolve_sibling(base: &str, relative: &str) -> String {
    match base.rfind('/') {
        Some(i) => format!("{}{}", &base[..=i], relative),
        None => relative.to_string(),
    }
}

/// Fetch and assemble the model at `path`.
///
/// The material library is only requested after the model text names one.
/// If it cannot be fetched the model is built with default colors and the
/// failure is kept in [`Model::issues`].
pub async fn load_model<S: TextSource>(
    source: &S,
    path: &str,
    options: &ModelOptions,
) -> MeshResult<Model> {
    let obj = source.fetch(path).await?;

    let mut issues = Vec::new();
    let materials = match material_lib_path(&obj) {
        Some(mtl) => {
            let mtl_path = resolve_sibling(path, mtl);
            debug!(path = %mtl_path, "fetching material library");
            match source.fetch(&mtl_path).await {
                Ok(text) => {
                    let mut library = MaterialLibrary::parse(&text);
                    issues.append(&mut library.issues);
                    Some(library)
                }
                Err(err) => {
                    warn!(%err, "material library unavailable, using default colors");
                    issues.push(err);
                    None
                }
            }
        }
        None => None,
    };

    let mut model = Model::from_text(&obj, materials.as_ref(), options)?;
    issues.append(&mut model.issues);
    model.issues = issues;
    Ok(model)
}
