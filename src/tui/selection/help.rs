use super::{ActiveTab, Selection};
use crate::tui::component::HelpKeyMap;
use crate::tui::keymap::{KeyBinding, KeyMap};

fn copy_command(keymap: &KeyMap) -> KeyBinding {
    keymap.copy.clone().with_help("c", "copy command")
}

impl HelpKeyMap for Selection {
    fn short_help(&self) -> Vec<KeyBinding> {
        let common = &self.common.keymap;
        let mut bindings = vec![common.up_down.clone(), common.section.clone()];
        if self.active == ActiveTab::Selector {
            let k = self.selector.keymap();
            bindings.extend([
                common.select.clone(),
                k.filter.clone(),
                k.clear_filter.clone(),
                copy_command(common),
            ]);
        }
        bindings
    }

    fn full_help(&self) -> Vec<Vec<KeyBinding>> {
        match self.active {
            ActiveTab::Readme => {
                let k = self.readme.keymap();
                vec![
                    vec![k.page_down.clone(), k.page_up.clone()],
                    vec![k.half_page_down.clone(), k.half_page_up.clone()],
                    vec![k.down.clone(), k.up.clone()],
                ]
            }
            ActiveTab::Selector => {
                let common = &self.common.keymap;
                let k = self.selector.keymap();
                vec![
                    vec![
                        common.select.clone(),
                        copy_command(common),
                        k.cursor_up.clone(),
                        k.cursor_down.clone(),
                    ],
                    vec![
                        k.next_page.clone(),
                        k.prev_page.clone(),
                        k.go_to_start.clone(),
                        k.go_to_end.clone(),
                    ],
                    vec![
                        k.filter.clone(),
                        k.clear_filter.clone(),
                        k.cancel_while_filtering.clone(),
                        k.accept_while_filtering.clone(),
                    ],
                ]
            }
        }
    }
}
