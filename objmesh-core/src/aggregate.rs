/// Whole-model vertex buffers assembled from mesh groups
use tracing::{debug, warn};

use crate::error::{MeshError, MeshResult};
use crate::geometry::GroupGeometry;
use crate::material::{MaterialLibrary, Rgba};
use crate::obj::{parse_obj, ParsedObj};
use crate::options::ModelOptions;
use crate::picking::{PickEncoder, RgbPicking};

/// Flattened per-vertex attributes for a whole model. All arrays describe
/// the same vertices in the same order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexBuffers {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub tex_coords: Vec<f32>,
    pub colors: Vec<f32>,
    pub ids: Vec<f32>,
}

impl VertexBuffers {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }
}

/// One renderable item, i.e. one mesh group after assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshItem {
    /// Forced id, else the group name.
    pub id: Option<String>,
    /// Numeric id used for picking and color variance.
    pub pick_id: u32,
    /// Index of the item's first vertex in the model buffers.
    pub first_vertex: usize,
    pub vertex_count: usize,
    pub height: f32,
}

impl MeshItem {
    pub fn vertex_range(&self) -> std::ops::Range<usize> {
        self.first_vertex..self.first_vertex + self.vertex_count
    }
}

/// Per-item brightness offset so that neighbouring items with the same
/// color stay distinguishable.
pub fn color_variance(id: u32) -> f32 {
    let sign = if (id / 2) % 2 == 0 { 1.0 } else { -1.0 };
    let magnitude = if id % 2 == 0 { 0.06 } else { 0.03 };
    sign * magnitude
}

/// 1-based picking id for the item at `position`.
fn sequence_id(position: usize) -> MeshResult<u32> {
    position
        .checked_add(1)
        .and_then(|id| u32::try_from(id).ok())
        .ok_or(MeshError::PickIdOutOfRange { id: u32::MAX })
}

/// Appends group geometries to the model buffers and records their items.
pub struct ItemAggregator<'a, P: PickEncoder = RgbPicking> {
    options: &'a ModelOptions,
    picking: P,
    buffers: VertexBuffers,
    items: Vec<MeshItem>,
}

impl<'a, P: PickEncoder> ItemAggregator<'a, P> {
    pub fn new(options: &'a ModelOptions, picking: P) -> Self {
        Self {
            options,
            picking,
            buffers: VertexBuffers::default(),
            items: Vec::new(),
        }
    }

    /// Add one group. Without a forced id, items are numbered from 1 in
    /// the order they are added.
    pub fn add(
        &mut self,
        group_id: Option<&str>,
        group_color: Option<Rgba>,
        geometry: &GroupGeometry,
    ) -> MeshResult<&MeshItem> {
        let forced_id = self.options.forced_id();
        let pick_id = match forced_id {
            Some(id) => id,
            None => sequence_id(self.items.len())?,
        };
        let id = match forced_id {
            Some(forced) => Some(forced.to_string()),
            None => group_id.map(str::to_string),
        };
        let id_color = self.picking.id_to_color(pick_id)?;

        let base = match (self.options.color, group_color) {
            (Some(forced), _) => forced,
            (None, Some([r, g, b, _])) => [r, g, b],
            (None, None) => self.options.default_color,
        };
        let variance = color_variance(pick_id);
        let color = base.map(|c| c + variance);

        let first_vertex = self.buffers.vertex_count();
        let vertex_count = geometry.vertex_count();

        self.buffers.positions.extend_from_slice(&geometry.positions);
        self.buffers.normals.extend_from_slice(&geometry.normals);
        self.buffers.tex_coords.extend_from_slice(&geometry.tex_coords);
        for _ in 0..vertex_count {
            self.buffers.colors.extend_from_slice(&color);
            self.buffers.ids.extend_from_slice(&id_color);
        }

        self.items.push(MeshItem {
            id,
            pick_id,
            first_vertex,
            vertex_count,
            height: geometry.height,
        });
        Ok(&self.items[self.items.len() - 1])
    }

    pub fn finish(self) -> (VertexBuffers, Vec<MeshItem>) {
        (self.buffers, self.items)
    }
}

/// A fully assembled model: buffers, items and every recoverable problem
/// found on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    pub buffers: VertexBuffers,
    pub items: Vec<MeshItem>,
    pub issues: Vec<MeshError>,
}

impl Model {
    /// Parse and assemble OBJ text with an already loaded material library.
    pub fn from_text(
        obj: &str,
        materials: Option<&MaterialLibrary>,
        options: &ModelOptions,
    ) -> MeshResult<Self> {
        Self::from_parsed(parse_obj(obj, materials), options, RgbPicking)
    }

    pub fn from_parsed<P: PickEncoder>(
        parsed: ParsedObj,
        options: &ModelOptions,
        picking: P,
    ) -> MeshResult<Self> {
        let ParsedObj {
            vertices,
            groups,
            mut issues,
        } = parsed;
        let mut aggregator = ItemAggregator::new(options, picking);

        for group in &groups {
            let mut geometry = match GroupGeometry::build(&vertices, &group.faces) {
                Ok(geometry) => geometry,
                Err(err) if !options.strict => {
                    warn!(%err, id = ?group.id, "group rejected");
                    issues.push(err);
                    continue;
                }
                Err(err) => return Err(err),
            };
            issues.append(&mut geometry.issues);
            if geometry.is_empty() {
                continue;
            }
            aggregator.add(group.id.as_deref(), group.color, &geometry)?;
        }

        let (buffers, items) = aggregator.finish();
        debug!(
            items = items.len(),
            vertices = buffers.vertex_count(),
            issues = issues.len(),
            "assembled model"
        );
        Ok(Self {
            buffers,
            items,
            issues,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.buffers.vertex_count()
    }

    /// Replicate a per-item tuple once per vertex, in buffer order.
    pub fn expand_per_vertex<const N: usize>(&self, f: impl Fn(&MeshItem) -> [f32; N]) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.vertex_count() * N);
        for item in &self.items {
            let value = f(item);
            for _ in 0..item.vertex_count {
                out.extend_from_slice(&value);
            }
        }
        out
    }

    /// Item height for every vertex.
    pub fn vertex_heights(&self) -> Vec<f32> {
        self.expand_per_vertex(|item| [item.height])
    }
}
