//! Ember Projector: depth-buffered software 3D projector
//!
//! Everything the binary renders goes through these modules: the
//! rasterizer draws into plain pixel and depth buffers, the scene and
//! particle modules decide what to draw, and the engine runs the
//! fixed-rate threads behind the window loop.

pub mod config;
pub mod engine;
pub mod input;
pub mod particles;
pub mod rasterizer;
pub mod scene;
