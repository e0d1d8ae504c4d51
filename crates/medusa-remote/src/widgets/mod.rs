pub mod pane_chrome;
pub mod progress_bar;
pub mod search_input;
pub mod select_list;
pub mod status_bar;
pub mod toast;
