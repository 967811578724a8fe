pub mod main_window;
pub mod svg_icons;

pub mod backend;

pub mod query_interface;

pub mod query_state;
