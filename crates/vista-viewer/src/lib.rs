//! Desktop viewer for vista scenes.
//!
//! Renders the scene model with GPU-accelerated lambert shading and fog,
//! draws POI markers, and hosts the egui overlay that the interaction state
//! machine in `vista-core` commands.

pub mod app;
pub mod assets;
pub mod content;
pub mod overlay;
pub mod renderer;
