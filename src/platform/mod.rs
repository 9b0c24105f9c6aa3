//! Platform abstraction layer
//!
//! Front-end agnostic pieces the window or terminal layer plugs into:
//! - Keyboard mapping to movement intents and menu commands

pub mod input;

pub use input::{Command, Controls, Key};
