// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Low-poly vehicle: body, cabin, four wheels and light clusters

use crate::buffer::{GeometryBuffer, SubMeshRange};
use crate::config::VehicleConfig;
use crate::curve::Frame;
use crate::error::Result;
use crate::extrusion::{extrude, UvMapping};
use crate::material::MaterialId;
use crate::path::CirclePath;
use crate::profile::ring;
use crate::shapes::add_box;
use nalgebra::{Point3, Vector2, Vector3};

/// Point at (right, up, forward) in the basis of `basis`
#[inline]
fn local(basis: &Frame, x: f64, y: f64, z: f64) -> Point3<f64> {
    basis.offset(x, y) + basis.forward * z
}

/// Emit a vehicle standing on `basis.position`, nose along `basis.forward`.
///
/// Returns the body range (body, cabin, wheels) and the lights range.
pub fn build_vehicle(
    buffer: &mut GeometryBuffer,
    basis: &Frame,
    config: &VehicleConfig,
) -> Result<(SubMeshRange, SubMeshRange)> {
    let half_length = config.length * 0.5;
    let half_width = config.width * 0.5;
    let body_bottom = config.ground_clearance;
    let body_top = body_bottom + config.body_height;

    buffer.set_material(MaterialId::VehicleBody);
    let body_start = buffer.index_count() as u32;

    add_box(
        buffer,
        basis,
        local(basis, 0.0, body_bottom + config.body_height * 0.5, 0.0),
        Vector3::new(half_width, config.body_height * 0.5, half_length),
        config.body_color,
    )?;

    // Cabin sits slightly behind the middle
    let cabin_length = config.length * config.cabin_fraction.clamp(0.1, 1.0);
    add_box(
        buffer,
        basis,
        local(basis, 0.0, body_top + config.cabin_height * 0.5, -config.length * 0.08),
        Vector3::new(half_width * 0.85, config.cabin_height * 0.5, cabin_length * 0.5),
        config.body_color,
    )?;

    let tube = (config.wheel_width * 0.5).min(config.wheel_radius * 0.5);
    let tread = ring(
        MaterialId::VehicleBody,
        Vector2::zeros(),
        tube,
        (config.wheel_segments / 2).max(3),
        config.wheel_color,
    );
    let axle = half_length - config.wheel_radius * 1.4;
    for (x, z) in [
        (-half_width, axle),
        (half_width, axle),
        (-half_width, -axle),
        (half_width, -axle),
    ] {
        let hub = local(basis, x, config.wheel_radius, z);
        let sweep = CirclePath::new(hub, basis.right, config.wheel_radius - tube);
        extrude(buffer, &sweep, &tread, config.wheel_segments, UvMapping::default())?;
    }
    let body = buffer.range_since(body_start);

    buffer.set_material(MaterialId::VehicleLights);
    let lights_start = buffer.index_count() as u32;
    let lamp_height = body_bottom + config.body_height * 0.7;
    let lamp = Vector3::new(0.15, 0.06, 0.03);
    for (z, color) in [
        (half_length, config.head_light_color),
        (-half_length, config.tail_light_color),
    ] {
        for x in [-half_width * 0.65, half_width * 0.65] {
            add_box(buffer, basis, local(basis, x, lamp_height, z), lamp, color)?;
        }
    }
    let lights = buffer.range_since(lights_start);

    Ok((body, lights))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::BOX_COUNTS;

    #[test]
    fn test_vehicle_materials() {
        let config = VehicleConfig::default();
        let basis = Frame::from_forward(Point3::origin(), Vector3::z());
        let mut buffer = GeometryBuffer::new();
        let (body, lights) = build_vehicle(&mut buffer, &basis, &config).unwrap();

        assert_eq!(body.material, MaterialId::VehicleBody);
        assert_eq!(lights.material, MaterialId::VehicleLights);
        assert_eq!(lights.start, body.end());
        assert_eq!(lights.count as usize, 4 * BOX_COUNTS.1);
        assert_eq!(buffer.sub_meshes().len(), 2);
        assert!(buffer.validate().is_ok());
    }

    #[test]
    fn test_vehicle_stands_on_the_ground() {
        let config = VehicleConfig::default();
        let basis = Frame::from_forward(Point3::new(5.0, 2.0, 7.0), Vector3::x());
        let mut buffer = GeometryBuffer::new();
        build_vehicle(&mut buffer, &basis, &config).unwrap();

        let lowest = buffer.vertices().iter().map(|v| v.position[1]).fold(f32::MAX, f32::min);
        assert!((lowest - 2.0).abs() < 1e-4);
        // Heading +X: the long axis runs along X
        let xs = buffer.vertices().iter().map(|v| v.position[0]);
        let (min, max) = xs.fold((f32::MAX, f32::MIN), |(lo, hi), x| (lo.min(x), hi.max(x)));
        assert!(max - min > config.length as f32 - 1e-3);
    }
}
