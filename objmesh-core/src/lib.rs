/// objmesh core library - OBJ/MTL parsing and render buffer assembly
///
/// Turns Wavefront model text and its material library into flat-shaded,
/// per-vertex attribute arrays (positions, normals, texture coordinates,
/// colors and picking ids) plus one item record per mesh group.

pub mod aggregate;
pub mod error;
pub mod geometry;
pub mod loader;
pub mod material;
pub mod obj;
pub mod options;
pub mod picking;
pub mod tokens;
pub mod transform;

// Re-export commonly used types
pub use aggregate::{color_variance, ItemAggregator, MeshItem, Model, VertexBuffers};
pub use error::{MeshError, MeshResult};
pub use geometry::{Face, GroupGeometry, VertexPool};
pub use loader::{load_model, FsSource, TextSource};
pub use material::{Material, MaterialLibrary, Rgba};
pub use obj::{parse_obj, MeshGroup, ObjBuilder, ParsedObj};
pub use options::{ModelOptions, DEFAULT_COLOR};
pub use picking::{PickEncoder, RgbPicking};
pub use transform::{GeoPosition, Placement};
