use foundation::bounds::Rect;
use foundation::math::{DVec2, LocalPoint};
use serde::{Deserialize, Serialize};

use crate::spatial::{contains_point, signed_area};

/// Host-side material handle attached to a region at runtime.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaterialId(pub u32);

/// One polygon of a country or province, in map-local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    points: Vec<DVec2>,
    bounds: Rect,
    display_material: Option<MaterialId>,
}

impl Region {
    pub fn new(points: Vec<DVec2>) -> Self {
        let bounds = Rect::from_points(&points);
        Self {
            points,
            bounds,
            display_material: None,
        }
    }

    pub fn points(&self) -> &[DVec2] {
        &self.points
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Exact containment; callers prune with `bounds()` first.
    pub fn polygon_contains(&self, p: DVec2) -> bool {
        contains_point(&self.points, p)
    }

    pub fn contains(&self, p: DVec2) -> bool {
        self.bounds.contains(p) && self.polygon_contains(p)
    }

    pub fn area(&self) -> f64 {
        signed_area(&self.points).abs()
    }

    pub fn display_material(&self) -> Option<MaterialId> {
        self.display_material
    }

    pub fn set_display_material(&mut self, material: Option<MaterialId>) {
        self.display_material = material;
    }
}

fn combined_bounds(regions: &[Region]) -> Rect {
    regions
        .iter()
        .fold(Rect::EMPTY, |acc, r| acc.union(r.bounds()))
}

/// Label anchor: center of the largest region's bounds.
fn main_region_center(regions: &[Region]) -> LocalPoint {
    regions
        .iter()
        .max_by(|a, b| a.area().total_cmp(&b.area()))
        .map(|r| LocalPoint(r.bounds().center()))
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Country {
    pub index: usize,
    pub name: String,
    pub continent: String,
    pub regions: Vec<Region>,
    pub bounds: Rect,
    pub hidden: bool,
    pub provinces: Vec<usize>,
    pub capital: Option<usize>,
    pub center: LocalPoint,
}

impl Country {
    pub fn new(
        index: usize,
        name: impl Into<String>,
        continent: impl Into<String>,
        regions: Vec<Region>,
    ) -> Self {
        Self {
            index,
            name: name.into(),
            continent: continent.into(),
            bounds: combined_bounds(&regions),
            center: main_region_center(&regions),
            regions,
            hidden: false,
            provinces: Vec::new(),
            capital: None,
        }
    }

    pub fn area(&self) -> f64 {
        self.regions.iter().map(Region::area).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Province {
    pub index: usize,
    pub name: String,
    pub country: usize,
    pub regions: Vec<Region>,
    pub bounds: Rect,
    pub center: LocalPoint,
}

impl Province {
    pub fn new(index: usize, name: impl Into<String>, country: usize, regions: Vec<Region>) -> Self {
        Self {
            index,
            name: name.into(),
            country,
            bounds: combined_bounds(&regions),
            center: main_region_center(&regions),
            regions,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CityClass {
    #[default]
    Ordinary,
    RegionCapital,
    CountryCapital,
}

#[derive(Debug, Clone, PartialEq)]
pub struct City {
    pub index: usize,
    pub name: String,
    pub country: usize,
    pub province: Option<usize>,
    pub position: LocalPoint,
    pub class: CityClass,
    pub population: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect_ring(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<DVec2> {
        vec![
            DVec2::new(x0, y0),
            DVec2::new(x1, y0),
            DVec2::new(x1, y1),
            DVec2::new(x0, y1),
        ]
    }

    #[test]
    fn region_bounds_contain_polygon() {
        let r = Region::new(rect_ring(-0.1, -0.2, 0.3, 0.1));
        for p in r.points() {
            assert!(r.bounds().contains(*p));
        }
        assert!(r.contains(DVec2::new(0.0, 0.0)));
        assert!(!r.contains(DVec2::new(0.31, 0.0)));
    }

    #[test]
    fn country_bounds_and_center_follow_largest_region() {
        let small = Region::new(rect_ring(0.3, 0.3, 0.32, 0.32));
        let big = Region::new(rect_ring(-0.2, -0.1, 0.0, 0.1));
        let c = Country::new(0, "A", "Europe", vec![small, big]);
        assert_eq!(c.bounds.min, DVec2::new(-0.2, -0.1));
        assert_eq!(c.bounds.max, DVec2::new(0.32, 0.32));
        assert_eq!(c.center, LocalPoint::new(-0.1, 0.0));
    }

    #[test]
    fn material_is_a_runtime_overlay() {
        let mut r = Region::new(rect_ring(0.0, 0.0, 0.1, 0.1));
        assert_eq!(r.display_material(), None);
        r.set_display_material(Some(MaterialId(4)));
        assert_eq!(r.display_material(), Some(MaterialId(4)));
    }
}
