pub use crate::app::App;
pub use webnotify_types::prelude::*;

// vim: ts=4
