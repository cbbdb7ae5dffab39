use serde::{Deserialize, Serialize};

use crate::frame::Frame;

/// Interaction notifications published to the host.
///
/// Entity payloads are indices into the loaded map's collections; `region` is
/// the index of the polygon that was hit inside that entity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MapEvent {
    CountryEnter { country: usize, region: usize },
    CountryExit { country: usize, region: usize },
    CountryClick { country: usize, region: usize },
    ProvinceEnter { province: usize, region: usize },
    ProvinceExit { province: usize, region: usize },
    ProvinceClick { province: usize, region: usize },
    CityEnter { city: usize },
    CityExit { city: usize },
    CityClick { city: usize },
    DragStart,
    DragEnd,
    FlyToEnd,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub frame_index: u64,
    pub kind: MapEvent,
}

/// Frame-stamped event queue; the host drains it after each update.
#[derive(Debug, Default)]
pub struct EventBus {
    events: Vec<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, frame: Frame, kind: MapEvent) {
        self.emit_at(frame.index, kind);
    }

    pub fn emit_at(&mut self, frame_index: u64, kind: MapEvent) {
        self.events.push(Event { frame_index, kind });
    }

    pub fn extend(&mut self, frame_index: u64, kinds: impl IntoIterator<Item = MapEvent>) {
        for kind in kinds {
            self.emit_at(frame_index, kind);
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::{EventBus, MapEvent};
    use crate::frame::Frame;
    use pretty_assertions::assert_eq;

    #[test]
    fn records_events_with_frame_index() {
        let mut bus = EventBus::new();
        bus.emit(Frame::new(2, 0.1), MapEvent::DragStart);
        assert_eq!(bus.events().len(), 1);
        assert_eq!(bus.events()[0].frame_index, 2);
        assert_eq!(bus.events()[0].kind, MapEvent::DragStart);
    }

    #[test]
    fn drain_preserves_order_and_clears() {
        let mut bus = EventBus::new();
        bus.extend(
            7,
            [
                MapEvent::CountryExit { country: 1, region: 0 },
                MapEvent::CountryEnter { country: 2, region: 3 },
            ],
        );
        let drained: Vec<_> = bus.drain().into_iter().map(|e| e.kind).collect();
        assert_eq!(
            drained,
            vec![
                MapEvent::CountryExit { country: 1, region: 0 },
                MapEvent::CountryEnter { country: 2, region: 3 },
            ]
        );
        assert!(bus.events().is_empty());
    }
}
