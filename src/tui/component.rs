use ratatui::Frame;
use ratatui::layout::Rect;

use crate::tui::event::{Command, Msg};
use crate::tui::keymap::KeyBinding;

/// A reusable UI component.
///
/// Components own their presentation state and follow a message loop:
/// - `init` returns the commands to run when the component starts.
/// - `update` reacts to one [`Msg`] and returns follow-up commands.
/// - `render` draws into a `Frame` within a given `Rect`.
/// - `set_size` tells the component how much room it has.
///
/// # Mutability
///
/// The `render` method takes `&mut self` so components can update caches
/// (wrapped line counts, hit boxes) during the render pass.
pub trait Component {
    fn init(&mut self) -> Vec<Command> {
        Vec::new()
    }

    fn update(&mut self, msg: &Msg) -> Vec<Command>;

    fn render(&mut self, frame: &mut Frame, area: Rect);

    fn set_size(&mut self, width: u16, height: u16);
}

/// Bindings to advertise in the help footer.
pub trait HelpKeyMap {
    /// One line of the most useful bindings.
    fn short_help(&self) -> Vec<KeyBinding>;

    /// Columns of bindings for the expanded help.
    fn full_help(&self) -> Vec<Vec<KeyBinding>>;
}
