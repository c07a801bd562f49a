use std::sync::Arc;

use crate::tui::keymap::KeyMap;
use crate::tui::styles::Styles;

/// Styles, key map and the last known size, handed to every component.
///
/// Styles and keys are shared and immutable; the size is per component.
#[derive(Debug, Clone)]
pub struct Common {
    pub styles: Arc<Styles>,
    pub keymap: Arc<KeyMap>,
    pub width: u16,
    pub height: u16,
}

impl Common {
    pub fn new(styles: Arc<Styles>, keymap: Arc<KeyMap>) -> Self {
        Self {
            styles,
            keymap,
            width: 0,
            height: 0,
        }
    }

    pub fn set_size(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }
}

impl Default for Common {
    fn default() -> Self {
        Self::new(Arc::new(Styles::default()), Arc::new(KeyMap::default()))
    }
}
