pub use webnotify_types::prelude::*;

// vim: ts=4
