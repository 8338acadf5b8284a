//! Keyboard input mapped to camera movement.
//!
//! # Invariants
//! - Hosts deliver raw key events; only `KeyAction`s reach the camera.
//! - Each action is held and released independently of the others.

pub mod action;
pub mod state;

pub use action::{Axis, Direction, KeyAction, KeyEvent, KeyEventKind, Modifiers};
pub use state::InputState;
