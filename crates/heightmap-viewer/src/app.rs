use std::path::Path;

use anyhow::{Context, Result};
use winit::window::WindowId;

use heightmap_engine::camera::{RenderState, ViewCommand};
use heightmap_engine::core::{App, AppControl, FrameCtx};
use heightmap_engine::input::InputEvent;
use heightmap_engine::mesh::{build_grid, GridMesh, Heightmap};
use heightmap_engine::render::{ShaderSources, TerrainConfig, TerrainRenderer};

use crate::config::ViewerConfig;

/// Heightmap terrain viewer.
///
/// The mesh is built on the CPU before the window opens and handed to the GPU
/// on the first frame, once a device exists.
pub struct Viewer {
    state: RenderState,
    pending_mesh: Option<GridMesh>,
    shaders: ShaderSources,
    terrain_config: TerrainConfig,
    renderer: Option<TerrainRenderer>,
}

impl Viewer {
    /// Decodes `image`, builds its grid and loads the shaders.
    pub fn load(image: &Path, config: &ViewerConfig) -> Result<Self> {
        let heightmap = Heightmap::open(image)?;
        let mesh = build_grid(&heightmap, config.extents)
            .with_context(|| format!("cannot build terrain from {}", image.display()))?;
        log::info!(
            "terrain mesh: {} vertices, {} indices, {} strips",
            mesh.vertices().len(),
            mesh.indices().len(),
            mesh.strip_count()
        );

        let shaders = ShaderSources::load(&config.shader_dir)?;
        Ok(Self::new(mesh, shaders, config))
    }

    pub fn new(mesh: GridMesh, shaders: ShaderSources, config: &ViewerConfig) -> Self {
        Self {
            state: RenderState::new(config.camera),
            pending_mesh: Some(mesh),
            shaders,
            terrain_config: config.terrain,
            renderer: None,
        }
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    /// Applies this frame's input in arrival order.
    pub fn handle_input(&mut self, events: &[InputEvent]) -> AppControl {
        for ev in events {
            match ViewCommand::from_event(ev) {
                Some(ViewCommand::Quit) => {
                    log::info!("escape pressed, exiting");
                    return AppControl::Exit;
                }
                Some(cmd) => {
                    log::debug!("view command {cmd:?}");
                    self.state.apply(cmd);
                }
                None => {
                    self.state.apply_input(ev);
                }
            }
        }
        AppControl::Continue
    }

    fn ensure_renderer(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<()> {
        if self.renderer.is_some() {
            return Ok(());
        }
        let Some(mesh) = self.pending_mesh.take() else {
            anyhow::bail!("terrain mesh already consumed");
        };
        let renderer = TerrainRenderer::new(ctx.gpu, &mesh, &self.shaders, self.terrain_config)
            .context("failed to create terrain renderer")?;
        self.renderer = Some(renderer);
        Ok(())
    }
}

impl App for Viewer {
    fn on_resize(&mut self, _window_id: WindowId, width: f32, height: f32, scale_factor: f64) {
        self.state.resize(width, height, scale_factor);
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if self.handle_input(&ctx.input_frame.events) == AppControl::Exit {
            return AppControl::Exit;
        }

        // Checked against the live window each frame.
        ctx.window.set_window_mode(self.state.window_mode());

        if let Err(err) = self.ensure_renderer(ctx) {
            ctx.runtime.fail(err);
            return AppControl::Exit;
        }

        let Some(renderer) = self.renderer.as_mut() else {
            return AppControl::Continue;
        };
        let state = &self.state;
        ctx.render(|rctx, target| renderer.render(rctx, target, state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heightmap_engine::camera::FillMode;
    use heightmap_engine::window::WindowMode;
    use heightmap_engine::input::{
        Key, KeyState, Modifiers, MouseButton, MouseButtonState, PointerButtonEvent,
        PointerMoveEvent,
    };
    use image::RgbImage;

    fn viewer() -> Viewer {
        let config = ViewerConfig::default();
        let heightmap = Heightmap::from_rgb(RgbImage::new(3, 3));
        let mesh = build_grid(&heightmap, config.extents).unwrap();
        let shaders = ShaderSources::load(&config.shader_dir).unwrap();
        Viewer::new(mesh, shaders, &config)
    }

    fn key(key: Key, state: KeyState, repeat: bool) -> InputEvent {
        InputEvent::Key {
            key,
            state,
            modifiers: Modifiers::default(),
            code: 0,
            repeat,
        }
    }

    fn press(k: Key) -> InputEvent {
        key(k, KeyState::Pressed, false)
    }

    #[test]
    fn shipped_shaders_validate() {
        ShaderSources::load(ViewerConfig::default().shader_dir).unwrap();
    }

    #[test]
    fn escape_exits() {
        let mut v = viewer();
        assert_eq!(v.handle_input(&[press(Key::Escape)]), AppControl::Exit);
    }

    #[test]
    fn escape_release_is_ignored() {
        let mut v = viewer();
        let ev = key(Key::Escape, KeyState::Released, false);
        assert_eq!(v.handle_input(&[ev]), AppControl::Continue);
    }

    #[test]
    fn w_and_s_toggle_fill_mode() {
        let mut v = viewer();
        assert_eq!(v.handle_input(&[press(Key::W)]), AppControl::Continue);
        assert_eq!(v.state().fill_mode(), FillMode::Wireframe);

        v.handle_input(&[press(Key::S)]);
        assert_eq!(v.state().fill_mode(), FillMode::Filled);
    }

    #[test]
    fn repeated_keys_do_nothing() {
        let mut v = viewer();
        v.handle_input(&[key(Key::W, KeyState::Pressed, true)]);
        assert_eq!(v.state().fill_mode(), FillMode::Filled);
    }

    #[test]
    fn f_and_n_switch_window_mode() {
        let mut v = viewer();
        v.handle_input(&[press(Key::F)]);
        assert_eq!(v.state().window_mode(), WindowMode::FullScreen);
        v.handle_input(&[press(Key::N)]);
        assert_eq!(v.state().window_mode(), WindowMode::Windowed);
    }

    #[test]
    fn events_after_escape_are_not_applied() {
        let mut v = viewer();
        v.handle_input(&[press(Key::Escape), press(Key::W)]);
        assert_eq!(v.state().fill_mode(), FillMode::Filled);
    }

    #[test]
    fn left_drag_spins_terrain() {
        let mut v = viewer();
        let events = [
            InputEvent::PointerButton(PointerButtonEvent {
                button: MouseButton::Left,
                state: MouseButtonState::Pressed,
                x: 10.0,
                y: 10.0,
                modifiers: Modifiers::default(),
            }),
            InputEvent::PointerMoved(PointerMoveEvent { x: 30.0, y: 14.0 }),
        ];
        v.handle_input(&events);

        let controls = v.state().controls();
        assert!((controls.spin_y - 10.0).abs() < 1e-5);
        assert!((controls.spin_x - 2.0).abs() < 1e-5);
    }
}
