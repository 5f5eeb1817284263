use glam::{Mat4, Vec3};

use crate::input::InputEvent;
use crate::window::WindowMode;

use super::controls::ViewCommand;
use super::modes::FillMode;
use super::orbit::OrbitControls;
use super::projection::Projection;

/// Static camera placement and lens.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraConfig {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Aspect used until the first resize arrives.
    pub initial_aspect: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 10.0, 54.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y_degrees: 45.0,
            near: 0.05,
            far: 350.0,
            initial_aspect: 720.0 / 576.0,
        }
    }
}

/// Everything the per-frame draw needs besides GPU resources.
#[derive(Debug, Clone)]
pub struct RenderState {
    view: Mat4,
    projection: Projection,
    controls: OrbitControls,
    fill_mode: FillMode,
    window_mode: WindowMode,
    /// Drawable size in physical pixels.
    viewport: (u32, u32),
}

impl RenderState {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            view: Mat4::look_at_rh(config.eye, config.target, config.up),
            projection: Projection::new(
                config.fov_y_degrees,
                config.initial_aspect,
                config.near,
                config.far,
            ),
            controls: OrbitControls::new(),
            fill_mode: FillMode::default(),
            window_mode: WindowMode::default(),
            viewport: (0, 0),
        }
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn fill_mode(&self) -> FillMode {
        self.fill_mode
    }

    pub fn window_mode(&self) -> WindowMode {
        self.window_mode
    }

    /// Viewport in physical pixels, as stored by the last [`resize`](Self::resize).
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Recomputes the projection aspect from the logical size and stores the
    /// physical viewport (`size * scale_factor`).
    ///
    /// A zero-area size (minimized window) keeps the previous aspect.
    pub fn resize(&mut self, width: f32, height: f32, scale_factor: f64) {
        if width > 0.0 && height > 0.0 {
            self.projection = self.projection.with_aspect(width / height);
        }

        let scale = scale_factor as f32;
        self.viewport = (
            (width * scale).round().max(0.0) as u32,
            (height * scale).round().max(0.0) as u32,
        );
    }

    /// Applies a keyboard command. `Quit` is left to the caller.
    pub fn apply(&mut self, cmd: ViewCommand) {
        match cmd {
            ViewCommand::Wireframe => self.fill_mode = self.fill_mode.to_wireframe(),
            ViewCommand::Filled => self.fill_mode = self.fill_mode.to_filled(),
            ViewCommand::FullScreen => self.window_mode = WindowMode::FullScreen,
            ViewCommand::Windowed => self.window_mode = WindowMode::Windowed,
            ViewCommand::Quit => {}
        }
    }

    /// Forwards pointer input to the orbit controls.
    pub fn apply_input(&mut self, ev: &InputEvent) -> bool {
        self.controls.apply_event(ev)
    }

    pub fn model(&self) -> Mat4 {
        self.controls.model_matrix()
    }

    /// `projection * view * model`.
    pub fn mvp(&self) -> Mat4 {
        self.projection.matrix() * self.view * self.model()
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state() {
        let s = RenderState::default();
        assert_eq!(s.fill_mode(), FillMode::Filled);
        assert_eq!(s.window_mode(), WindowMode::Windowed);
        assert_eq!(s.viewport(), (0, 0));
        assert_eq!(s.projection().aspect, 720.0 / 576.0);
    }

    #[test]
    fn wireframe_toggle_twice_restores_fill() {
        let mut s = RenderState::default();
        for _ in 0..2 {
            s.apply(ViewCommand::Wireframe);
            assert_eq!(s.fill_mode(), FillMode::Wireframe);
            s.apply(ViewCommand::Filled);
        }
        assert_eq!(s.fill_mode(), FillMode::Filled);
    }

    #[test]
    fn window_mode_commands() {
        let mut s = RenderState::default();
        s.apply(ViewCommand::FullScreen);
        assert_eq!(s.window_mode(), WindowMode::FullScreen);
        s.apply(ViewCommand::Windowed);
        assert_eq!(s.window_mode(), WindowMode::Windowed);
    }

    #[test]
    fn quit_leaves_state_alone() {
        let mut s = RenderState::default();
        s.apply(ViewCommand::Quit);
        assert_eq!(s.fill_mode(), FillMode::Filled);
        assert_eq!(s.window_mode(), WindowMode::Windowed);
    }

    #[test]
    fn resize_updates_aspect_only() {
        let mut s = RenderState::default();
        let before = *s.projection();

        s.resize(1600.0, 900.0, 1.0);
        let after = *s.projection();

        assert_eq!(after.aspect, 1600.0 / 900.0);
        assert_eq!(after.fov_y_degrees, before.fov_y_degrees);
        assert_eq!(after.near, before.near);
        assert_eq!(after.far, before.far);
    }

    #[test]
    fn resize_scales_viewport_by_density() {
        let mut s = RenderState::default();
        s.resize(720.0, 576.0, 2.0);
        assert_eq!(s.viewport(), (1440, 1152));
    }

    #[test]
    fn zero_height_keeps_aspect() {
        let mut s = RenderState::default();
        s.resize(800.0, 400.0, 1.0);
        s.resize(800.0, 0.0, 1.0);
        assert_eq!(s.projection().aspect, 2.0);
        assert_eq!(s.viewport(), (800, 0));
    }

    #[test]
    fn mvp_composes_projection_view_model() {
        let mut s = RenderState::default();
        s.resize(1000.0, 500.0, 1.0);
        let expected = s.projection().matrix() * s.view() * s.model();
        assert_eq!(s.mvp(), expected);
    }

    #[test]
    fn origin_projects_inside_clip_volume() {
        let s = RenderState::default();
        let clip = s.mvp() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;

        assert!(clip.w > 0.0);
        assert!(ndc.x.abs() < 1e-5);
        assert!((0.0..=1.0).contains(&ndc.z));
    }
}
