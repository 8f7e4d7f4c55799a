mod component;
mod controller;
mod dialogs;
pub mod edge_geometry;
pub mod interaction;
pub mod layout;
mod render;
pub mod state;
mod types;
pub mod viewport;

pub use component::RelationshipGraphEditor;
