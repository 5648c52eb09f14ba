pub mod location_dialog;
pub mod map_view;
