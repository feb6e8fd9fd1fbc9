pub trait HasSize {
    fn size(&self) -> Size;
}

/// Viewport extent in physical pixels (the device pixel ratio is already
/// applied by the windowing layer).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Minimized windows report a zero extent; surfaces cannot be configured
    /// to one.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl From<winit::dpi::PhysicalSize<u32>> for Size {
    fn from(size: winit::dpi::PhysicalSize<u32>) -> Self {
        Self {
            width: size.width,
            height: size.height,
        }
    }
}

impl HasSize for winit::window::Window {
    fn size(&self) -> Size {
        self.inner_size().into()
    }
}

pub trait Window: HasSize + raw_window_handle::HasRawWindowHandle {}

impl Window for winit::window::Window {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_ratio_follows_width_over_height() {
        let size = Size {
            width: 800,
            height: 600,
        };
        assert!((size.aspect_ratio() - 800. / 600.).abs() < 1e-6);
    }

    #[test]
    fn zero_extent_is_empty() {
        assert!(Size {
            width: 0,
            height: 720
        }
        .is_empty());
        assert!(Size {
            width: 1280,
            height: 0
        }
        .is_empty());
        assert!(!Size {
            width: 1280,
            height: 720
        }
        .is_empty());
    }

    #[test]
    fn converts_from_physical_size() {
        let size: Size = winit::dpi::PhysicalSize::new(1920, 1080).into();
        assert_eq!(
            size,
            Size {
                width: 1920,
                height: 1080
            }
        );
    }
}
