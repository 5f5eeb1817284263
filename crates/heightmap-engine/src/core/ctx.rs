use anyhow::Result;
use winit::window::{Window, WindowId};

use crate::device::{Gpu, SurfaceErrorAction};
use crate::input::InputFrame;
use crate::render::{RenderCtx, RenderTarget};
use crate::window::{RuntimeCtx, WindowMode};

use super::app::AppControl;

/// Window handle plus the few window operations apps are allowed to perform.
pub struct WindowCtx<'a> {
    pub id: WindowId,
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    /// Switches between borderless full screen and a normal window.
    ///
    /// No-op if the window is already in `mode`.
    pub fn set_window_mode(&self, mode: WindowMode) {
        if let Some(fullscreen) = mode.switch_from(WindowMode::of(self.window)) {
            log::debug!("window mode -> {mode:?}");
            self.window.set_fullscreen(fullscreen);
        }
    }
}

/// Per-frame context passed to `core::App::on_frame`.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window-borrow lifetime carried by `Gpu<'w>`
pub struct FrameCtx<'a, 'w> {
    pub window: WindowCtx<'a>,
    pub gpu: &'a mut Gpu<'w>,
    pub input_frame: &'a InputFrame,
    pub runtime: &'a mut RuntimeCtx,
}

impl<'a, 'w> FrameCtx<'a, 'w> {
    /// Acquires a frame, hands `draw` a [`RenderCtx`] and [`RenderTarget`], then
    /// submits and presents.
    ///
    /// `draw` owns the render pass, clears included. If it fails the error is
    /// reported to the runtime and the app exits.
    pub fn render<F>(&mut self, draw: F) -> AppControl
    where
        F: FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>) -> Result<()>,
    {
        // Minimized: the surface keeps its old configuration, so skip the frame.
        let size = self.gpu.size();
        if size.width == 0 || size.height == 0 {
            return AppControl::Continue;
        }

        let mut frame = match self.gpu.begin_frame() {
            Ok(f) => f,
            Err(err) => {
                log::debug!("surface error: {err}");
                return match self.gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => {
                        self.runtime.fail(anyhow::anyhow!("GPU surface ran out of memory"));
                        AppControl::Exit
                    }
                    _ => AppControl::Continue,
                };
            }
        };

        // Attachments must match the acquired texture, not the requested size.
        let texture_size = frame.surface_texture.texture.size();
        let rctx = RenderCtx::new(
            self.gpu.device(),
            self.gpu.queue(),
            self.gpu.surface_format(),
            (texture_size.width, texture_size.height),
        );

        // RenderTarget borrows frame.encoder; dropped before submit() takes frame.
        let drawn = {
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
            draw(&rctx, &mut target)
        };

        if let Err(err) = drawn {
            self.runtime.fail(err);
            return AppControl::Exit;
        }

        self.window.window.pre_present_notify();
        self.gpu.submit(frame);

        AppControl::Continue
    }
}
