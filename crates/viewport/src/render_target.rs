use foundation::bounds::PixelRect;
use scene::components::Transform;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureId(pub u64);

/// Offscreen color target owned by the resolver.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RenderTexture {
    pub id: TextureId,
    pub width: u32,
    pub height: u32,
}

impl RenderTexture {
    pub fn is_ready(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn pixel_rect(&self) -> PixelRect {
        PixelRect::from_size(self.width as f64, self.height as f64)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetMode {
    Direct,
    Proxy3D,
    UiPanel,
}

/// A quad in the scene that shows the offscreen map texture.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ProxySurface {
    pub transform: Transform,
    /// The host object can display a texture.
    pub has_renderer: bool,
    /// Keep the quad glued in front of the main camera over a screen rect.
    pub screen_space_overlay: bool,
    pub material_texture: Option<TextureId>,
}

impl ProxySurface {
    pub fn new(transform: Transform) -> Self {
        Self {
            transform,
            has_renderer: true,
            screen_space_overlay: false,
            material_texture: None,
        }
    }

    pub fn overlay() -> Self {
        Self {
            screen_space_overlay: true,
            ..Self::new(Transform::identity())
        }
    }
}

/// A rectangular UI image that shows the offscreen map texture.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct UiPanel {
    pub screen_rect: PixelRect,
    pub has_image: bool,
    pub texture: Option<TextureId>,
}

impl UiPanel {
    pub fn new(screen_rect: PixelRect) -> Self {
        Self {
            screen_rect,
            has_image: true,
            texture: None,
        }
    }
}

/// Where the map is displayed. `None` renders the map directly.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub enum ViewportTarget {
    #[default]
    None,
    Proxy3D(ProxySurface),
    UiPanel(UiPanel),
}

impl ViewportTarget {
    pub fn mode(&self) -> TargetMode {
        match self {
            ViewportTarget::None => TargetMode::Direct,
            ViewportTarget::Proxy3D(_) => TargetMode::Proxy3D,
            ViewportTarget::UiPanel(_) => TargetMode::UiPanel,
        }
    }

    /// Whether the target can actually display a texture.
    pub fn has_surface(&self) -> bool {
        match self {
            ViewportTarget::None => true,
            ViewportTarget::Proxy3D(p) => p.has_renderer,
            ViewportTarget::UiPanel(u) => u.has_image,
        }
    }

    pub fn assigned_texture(&self) -> Option<TextureId> {
        match self {
            ViewportTarget::None => None,
            ViewportTarget::Proxy3D(p) => p.material_texture,
            ViewportTarget::UiPanel(u) => u.texture,
        }
    }

    pub fn assign_texture(&mut self, texture: Option<TextureId>) {
        match self {
            ViewportTarget::None => {}
            ViewportTarget::Proxy3D(p) => p.material_texture = texture,
            ViewportTarget::UiPanel(u) => u.texture = texture,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modes_and_surfaces() {
        assert_eq!(ViewportTarget::None.mode(), TargetMode::Direct);
        let mut proxy = ProxySurface::new(Transform::identity());
        proxy.has_renderer = false;
        assert!(!ViewportTarget::Proxy3D(proxy).has_surface());
        assert!(ViewportTarget::UiPanel(UiPanel::new(PixelRect::from_size(1.0, 1.0))).has_surface());
    }

    #[test]
    fn texture_assignment_lands_on_the_surface() {
        let mut t = ViewportTarget::UiPanel(UiPanel::new(PixelRect::from_size(10.0, 5.0)));
        t.assign_texture(Some(TextureId(3)));
        assert_eq!(t.assigned_texture(), Some(TextureId(3)));

        let mut none = ViewportTarget::None;
        none.assign_texture(Some(TextureId(1)));
        assert_eq!(none.assigned_texture(), None);
    }

    #[test]
    fn zero_sized_texture_is_not_ready() {
        let t = RenderTexture {
            id: TextureId(0),
            width: 0,
            height: 1024,
        };
        assert!(!t.is_ready());
    }
}
