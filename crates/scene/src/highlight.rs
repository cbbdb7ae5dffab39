use runtime::MapEvent;

use crate::picking::{MapHit, RegionHit};

/// Tracks what is under the pointer and turns changes into enter/exit events.
///
/// A change of region inside the same entity counts as leaving and
/// re-entering, since the event payload names the region.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightTracker {
    current: MapHit,
}

impl HighlightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> MapHit {
        self.current
    }

    /// Exits fire innermost first (city, province, country), enters
    /// outermost first. Identical consecutive hits produce nothing.
    pub fn update(&mut self, hit: MapHit) -> Vec<MapEvent> {
        let old = self.current;
        let mut events = Vec::new();
        if old == hit {
            return events;
        }

        if old.city != hit.city {
            if let Some(city) = old.city {
                events.push(MapEvent::CityExit { city });
            }
        }
        if old.province != hit.province {
            if let Some(RegionHit { entity, region }) = old.province {
                events.push(MapEvent::ProvinceExit {
                    province: entity,
                    region,
                });
            }
        }
        if old.country != hit.country {
            if let Some(RegionHit { entity, region }) = old.country {
                events.push(MapEvent::CountryExit {
                    country: entity,
                    region,
                });
            }
            if let Some(RegionHit { entity, region }) = hit.country {
                events.push(MapEvent::CountryEnter {
                    country: entity,
                    region,
                });
            }
        }
        if old.province != hit.province {
            if let Some(RegionHit { entity, region }) = hit.province {
                events.push(MapEvent::ProvinceEnter {
                    province: entity,
                    region,
                });
            }
        }
        if old.city != hit.city {
            if let Some(city) = hit.city {
                events.push(MapEvent::CityEnter { city });
            }
        }

        self.current = hit;
        events
    }

    /// Click events for everything currently highlighted.
    pub fn click_events(&self) -> Vec<MapEvent> {
        let mut events = Vec::new();
        if let Some(RegionHit { entity, region }) = self.current.country {
            events.push(MapEvent::CountryClick {
                country: entity,
                region,
            });
        }
        if let Some(RegionHit { entity, region }) = self.current.province {
            events.push(MapEvent::ProvinceClick {
                province: entity,
                region,
            });
        }
        if let Some(city) = self.current.city {
            events.push(MapEvent::CityClick { city });
        }
        events
    }

    /// Forgets the highlight without emitting exits; used when the map it
    /// refers to is replaced.
    pub fn reset(&mut self) {
        self.current = MapHit::NONE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn country(entity: usize, region: usize) -> MapHit {
        MapHit {
            country: Some(RegionHit { entity, region }),
            ..MapHit::NONE
        }
    }

    #[test]
    fn enter_then_nothing_on_repeat() {
        let mut t = HighlightTracker::new();
        assert_eq!(
            t.update(country(0, 0)),
            vec![MapEvent::CountryEnter { country: 0, region: 0 }]
        );
        assert!(t.update(country(0, 0)).is_empty());
    }

    #[test]
    fn moving_between_countries_exits_before_entering() {
        let mut t = HighlightTracker::new();
        t.update(country(0, 0));
        assert_eq!(
            t.update(country(1, 0)),
            vec![
                MapEvent::CountryExit { country: 0, region: 0 },
                MapEvent::CountryEnter { country: 1, region: 0 },
            ]
        );
        assert_eq!(
            t.update(MapHit::NONE),
            vec![MapEvent::CountryExit { country: 1, region: 0 }]
        );
    }

    #[test]
    fn nested_entities_exit_inside_out() {
        let mut t = HighlightTracker::new();
        let full = MapHit {
            country: Some(RegionHit { entity: 2, region: 0 }),
            province: Some(RegionHit { entity: 5, region: 1 }),
            city: Some(9),
        };
        assert_eq!(
            t.update(full),
            vec![
                MapEvent::CountryEnter { country: 2, region: 0 },
                MapEvent::ProvinceEnter { province: 5, region: 1 },
                MapEvent::CityEnter { city: 9 },
            ]
        );
        assert_eq!(
            t.click_events(),
            vec![
                MapEvent::CountryClick { country: 2, region: 0 },
                MapEvent::ProvinceClick { province: 5, region: 1 },
                MapEvent::CityClick { city: 9 },
            ]
        );
        assert_eq!(
            t.update(MapHit::NONE),
            vec![
                MapEvent::CityExit { city: 9 },
                MapEvent::ProvinceExit { province: 5, region: 1 },
                MapEvent::CountryExit { country: 2, region: 0 },
            ]
        );
    }

    #[test]
    fn reset_is_silent() {
        let mut t = HighlightTracker::new();
        t.update(country(0, 0));
        t.reset();
        assert_eq!(t.current(), MapHit::NONE);
        assert_eq!(
            t.update(country(0, 0)),
            vec![MapEvent::CountryEnter { country: 0, region: 0 }]
        );
    }
}
