//! Editor-session coordination for the multi-window record editor.
//!
//! A viewer window lists records; selecting one opens a child editor.
//! The coordination layer enforces that at most one editor is ever open
//! per record, relays commit and close notifications from child editors
//! back to the view that spawned them over an explicit event channel,
//! and keeps a parent from closing while its children are still open.
//! The GUI toolkit sits above all of this; nothing here draws anything.

pub mod coordinator;
pub mod editor;
