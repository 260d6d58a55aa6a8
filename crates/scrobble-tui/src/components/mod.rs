pub mod header;
pub mod help_overlay;
pub mod modal;
pub mod station_list;
pub mod track_panel;
