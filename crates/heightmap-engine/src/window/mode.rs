use winit::window::{Fullscreen, Window};

/// Window presentation mode.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum WindowMode {
    #[default]
    Windowed,
    /// Borderless full screen on the current monitor.
    FullScreen,
}

impl WindowMode {
    pub(crate) fn of(window: &Window) -> Self {
        if window.fullscreen().is_some() {
            WindowMode::FullScreen
        } else {
            WindowMode::Windowed
        }
    }

    /// The `set_fullscreen` argument that moves a window currently in `live`
    /// into `self`, or `None` if it is already there.
    pub(crate) fn switch_from(self, live: WindowMode) -> Option<Option<Fullscreen>> {
        (self != live).then(|| self.fullscreen())
    }

    fn fullscreen(self) -> Option<Fullscreen> {
        match self {
            WindowMode::Windowed => None,
            WindowMode::FullScreen => Some(Fullscreen::Borderless(None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_mode_is_a_no_op() {
        assert_eq!(WindowMode::Windowed.switch_from(WindowMode::Windowed), None);
        assert_eq!(WindowMode::FullScreen.switch_from(WindowMode::FullScreen), None);
    }

    #[test]
    fn full_screen_is_reentered_after_the_os_leaves_it() {
        // Requested full screen, but the compositor put the window back.
        let requested = WindowMode::FullScreen;
        let live = WindowMode::Windowed;
        assert_eq!(
            requested.switch_from(live),
            Some(Some(Fullscreen::Borderless(None)))
        );
    }

    #[test]
    fn windowed_clears_full_screen() {
        assert_eq!(
            WindowMode::Windowed.switch_from(WindowMode::FullScreen),
            Some(None)
        );
    }
}
