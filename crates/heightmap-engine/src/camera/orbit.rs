use glam::{Mat4, Vec3};

use crate::input::{
    InputEvent, MouseButton, MouseButtonState, MouseWheelDelta, PointerButtonEvent,
    PointerMoveEvent,
};

/// Degrees of spin per logical pixel of left-drag.
pub const ROTATION_PER_PIXEL: f32 = 0.5;

/// World units per logical pixel of right-drag.
pub const TRANSLATION_PER_PIXEL: f32 = 0.01;

/// World units along Z per wheel notch.
pub const ZOOM_PER_NOTCH: f32 = 0.1;

/// Mouse-driven model transform.
///
/// Left drag spins the model, right drag pans it, the wheel moves it along Z.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrbitControls {
    /// Rotation about X, in degrees.
    pub spin_x: f32,
    /// Rotation about Y, in degrees.
    pub spin_y: f32,
    /// Translation written into the model matrix.
    pub position: Vec3,

    rotate_from: Option<(f32, f32)>,
    translate_from: Option<(f32, f32)>,
}

impl OrbitControls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the transform from a single input event. Returns `true` if it changed.
    pub fn apply_event(&mut self, ev: &InputEvent) -> bool {
        match ev {
            InputEvent::PointerButton(PointerButtonEvent {
                button,
                state,
                x,
                y,
                ..
            }) => {
                let slot = match button {
                    MouseButton::Left => &mut self.rotate_from,
                    MouseButton::Right => &mut self.translate_from,
                    _ => return false,
                };
                *slot = match state {
                    MouseButtonState::Pressed => Some((*x, *y)),
                    MouseButtonState::Released => None,
                };
                false
            }

            InputEvent::PointerMoved(PointerMoveEvent { x, y }) => self.drag_to(*x, *y),

            InputEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseWheelDelta::Line { y, .. } | MouseWheelDelta::Pixel { y, .. } => *y,
                };
                if dy > 0.0 {
                    self.position.z += ZOOM_PER_NOTCH;
                    true
                } else if dy < 0.0 {
                    self.position.z -= ZOOM_PER_NOTCH;
                    true
                } else {
                    false
                }
            }

            // Losing the pointer or focus mid-drag must not leave a drag latched.
            InputEvent::PointerLeft | InputEvent::Focused(false) => {
                self.rotate_from = None;
                self.translate_from = None;
                false
            }

            _ => false,
        }
    }

    fn drag_to(&mut self, x: f32, y: f32) -> bool {
        let mut changed = false;

        if let Some((ox, oy)) = self.rotate_from {
            self.spin_y += ROTATION_PER_PIXEL * (x - ox);
            self.spin_x += ROTATION_PER_PIXEL * (y - oy);
            self.rotate_from = Some((x, y));
            changed = true;
        }

        if let Some((ox, oy)) = self.translate_from {
            self.position.x += TRANSLATION_PER_PIXEL * (x - ox);
            self.position.y -= TRANSLATION_PER_PIXEL * (y - oy);
            self.translate_from = Some((x, y));
            changed = true;
        }

        changed
    }

    pub fn is_dragging(&self) -> bool {
        self.rotate_from.is_some() || self.translate_from.is_some()
    }

    /// `rotate_y(spin_y) * rotate_x(spin_x)` with `position` in the last column.
    pub fn model_matrix(&self) -> Mat4 {
        let mut m = Mat4::from_rotation_y(self.spin_y.to_radians())
            * Mat4::from_rotation_x(self.spin_x.to_radians());
        m.w_axis = self.position.extend(1.0);
        m
    }
}
