pub mod help_overlay;
pub mod now_playing;
pub mod search_panel;
pub mod snake_picker;
pub mod track_picker;
