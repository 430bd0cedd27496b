/// Layer key. Controls draw order and collision scope.
///
/// Layers are drawn back-to-front in ascending key order, and objects only
/// collide with objects on the same layer. `Layer::GUI` is reserved: it is
/// drawn last at screen-fixed coordinates and never takes part in
/// collision detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Layer(pub i32);

impl Layer {
    /// Reserved screen-space layer.
    pub const GUI: Layer = Layer(0xFFFF);

    pub fn is_gui(self) -> bool {
        self == Self::GUI
    }
}

impl From<i32> for Layer {
    fn from(value: i32) -> Self {
        Self(value)
    }
}
