use super::types::InputEvent;

/// Input collected since the previous frame, in arrival order.
///
/// Order matters: a drag is a press followed by moves, and a key can be pressed
/// and released within one frame.
#[derive(Debug, Default)]
pub struct InputFrame {
    pub events: Vec<InputEvent>,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn push_event(&mut self, ev: InputEvent) {
        self.events.push(ev);
    }
}
