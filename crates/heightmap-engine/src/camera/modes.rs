/// Polygon rasterization mode.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum FillMode {
    #[default]
    Filled,
    Wireframe,
}

impl FillMode {
    #[inline]
    pub fn to_wireframe(self) -> Self {
        FillMode::Wireframe
    }

    #[inline]
    pub fn to_filled(self) -> Self {
        FillMode::Filled
    }

    #[inline]
    pub fn is_wireframe(self) -> bool {
        self == FillMode::Wireframe
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_filled() {
        assert_eq!(FillMode::default(), FillMode::Filled);
    }

    #[test]
    fn transitions_are_idempotent() {
        let m = FillMode::default().to_wireframe().to_wireframe();
        assert!(m.is_wireframe());
        assert_eq!(m.to_filled().to_filled(), FillMode::Filled);
    }

    #[test]
    fn double_round_trip_returns_to_initial() {
        let initial = FillMode::default();
        let m = initial.to_wireframe().to_filled().to_wireframe().to_filled();
        assert_eq!(m, initial);
    }
}
