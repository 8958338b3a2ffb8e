// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Material ids shared with the renderer
//!
//! The numeric values are a fixed contract: the renderer binds one material
//! per id, so variants must never be renumbered.

/// Material tag of a sub-mesh range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum MaterialId {
    #[default]
    RoadSurface = 0,
    Barrier = 1,
    LaneMarking = 2,
    TunnelWall = 3,
    Hazard = 4,
    VehicleBody = 5,
    VehicleLights = 6,
    /// Overpass decks and their support pillars
    Overpass = 7,
    LightStructure = 8,
    LightEmitter = 9,
}

impl MaterialId {
    pub const ALL: [MaterialId; 10] = [
        MaterialId::RoadSurface,
        MaterialId::Barrier,
        MaterialId::LaneMarking,
        MaterialId::TunnelWall,
        MaterialId::Hazard,
        MaterialId::VehicleBody,
        MaterialId::VehicleLights,
        MaterialId::Overpass,
        MaterialId::LightStructure,
        MaterialId::LightEmitter,
    ];

    /// Numeric id handed to the renderer
    #[inline]
    pub fn id(self) -> u32 {
        self as u32
    }

    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            MaterialId::RoadSurface => "road_surface",
            MaterialId::Barrier => "barrier",
            MaterialId::LaneMarking => "lane_marking",
            MaterialId::TunnelWall => "tunnel_wall",
            MaterialId::Hazard => "hazard",
            MaterialId::VehicleBody => "vehicle_body",
            MaterialId::VehicleLights => "vehicle_lights",
            MaterialId::Overpass => "overpass",
            MaterialId::LightStructure => "light_structure",
            MaterialId::LightEmitter => "light_emitter",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_stable() {
        for (i, material) in MaterialId::ALL.iter().enumerate() {
            assert_eq!(material.id(), i as u32);
            assert_eq!(MaterialId::from_id(i as u32), Some(*material));
        }
        assert_eq!(MaterialId::from_id(10), None);
        assert_eq!(MaterialId::Overpass.id(), 7);
    }
}
