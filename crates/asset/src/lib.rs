//! Asset loading/parsers producing CPU-friendly data for the renderer.
//! Meshes come from the OBJ loader or the built-in cube; textures from
//! PNG files or the procedural checkerboard.

pub mod mesh;
pub mod obj;
pub mod texture;
