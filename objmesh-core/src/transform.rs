/// Placement of an assembled model in the map's metric frame
use nalgebra::{Matrix4, Vector3};

use crate::options::ModelOptions;

/// Meters per degree of latitude on the WGS84 equator radius.
pub const METERS_PER_DEGREE_LATITUDE: f64 = 6_378_137.0 * std::f64::consts::PI / 180.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPosition {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPosition {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Offset in meters from `origin`, east as +x and north as -y.
    pub fn offset_from(&self, origin: &GeoPosition) -> (f32, f32) {
        let meters_per_degree_longitude =
            METERS_PER_DEGREE_LATITUDE * origin.latitude.to_radians().cos();
        let d_lat = self.latitude - origin.latitude;
        let d_lon = self.longitude - origin.longitude;
        (
            (d_lon * meters_per_degree_longitude) as f32,
            (-d_lat * METERS_PER_DEGREE_LATITUDE) as f32,
        )
    }
}

/// Where and how a model sits on the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: GeoPosition,
    pub scale: f32,
    /// Degrees, clockwise seen from above.
    pub rotation: f32,
    pub elevation: f32,
}

impl Placement {
    pub fn new(position: GeoPosition, options: &ModelOptions) -> Self {
        Self {
            position,
            scale: options.scale,
            rotation: options.rotation,
            elevation: options.elevation,
        }
    }

    /// Model matrix relative to `origin` (z up): lift by the elevation,
    /// scale, rotate about z, then move to the geographic offset.
    pub fn matrix(&self, origin: &GeoPosition) -> Matrix4<f32> {
        let lift = Matrix4::new_translation(&Vector3::new(0.0, 0.0, self.elevation));
        let scale = Matrix4::new_scaling(self.scale);
        let rotate = Matrix4::new_rotation(Vector3::new(0.0, 0.0, -self.rotation.to_radians()));
        let (dx, dy) = self.position.offset_from(origin);
        let place = Matrix4::new_translation(&Vector3::new(dx, dy, 0.0));

        place * rotate * scale * lift
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn placement(scale: f32, rotation: f32, elevation: f32) -> Placement {
        Placement {
            position: GeoPosition::new(52.0, 13.0),
            scale,
            rotation,
            elevation,
        }
    }

    #[test]
    fn test_identity_at_origin() {
        let p = placement(1.0, 0.0, 0.0);
        let matrix = p.matrix(&p.position);
        assert!((matrix - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_rotation_is_clockwise() {
        let p = placement(1.0, 90.0, 0.0);
        let out = p.matrix(&p.position).transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!((out - Point3::new(0.0, -1.0, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn test_scale_and_elevation() {
        let p = placement(2.0, 0.0, 3.0);
        let out = p.matrix(&p.position).transform_point(&Point3::new(1.0, 1.0, 0.0));
        assert!((out - Point3::new(2.0, 2.0, 6.0)).norm() < 1e-5);
    }

    #[test]
    fn test_geographic_offset() {
        let origin = GeoPosition::new(0.0, 0.0);
        let (dx, dy) = GeoPosition::new(1.0, 1.0).offset_from(&origin);
        assert!((dx as f64 - METERS_PER_DEGREE_LATITUDE).abs() < 1.0);
        assert!((dy as f64 + METERS_PER_DEGREE_LATITUDE).abs() < 1.0);
    }

    #[test]
    fn test_from_options() {
        let options = ModelOptions {
            scale: 0.5,
            rotation: 45.0,
            elevation: 10.0,
            ..Default::default()
        };
        let p = Placement::new(GeoPosition::new(1.0, 2.0), &options);
        assert_eq!(p.scale, 0.5);
        assert_eq!(p.rotation, 45.0);
        assert_eq!(p.elevation, 10.0);
    }
}
