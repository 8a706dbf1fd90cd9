#![deny(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::float_cmp
)]
//! # Batched drone simulation core
//!
//! Many independent planar scenes, each with its own lights, walls and wall
//! textures, and many drones moving through them in lockstep. Every tick runs
//! the same pipeline over all of them at once:
//!
//! -   [`respawn`] places flagged drones inside their scene's spawn volumes.
//! -   [`physics`] applies commands, damping and wall contact.
//! -   [`bake`] precomputes per-texel lighting into a cache on the [`Scene`].
//! -   [`render`] casts a fan of rays per drone and reports the nearest hits.
//!
//! Scene data of different sizes lives in [`RaggedBatch`]es: one flat tensor
//! per column plus shared group tables, so every lane finds its scene in
//! constant time.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sim::{bake, initialize, physics, render, respawn, SimConfig};
//!
//! let ctx = initialize(SimConfig::default())?;
//! let mut scene = builder.build(&ctx, frame)?;
//! bake(&ctx, &mut scene, 0)?;
//! respawn(&ctx, &reset, &respawns, &mut drones)?;
//! physics(&ctx, &movement, &scene, &mut drones)?;
//! let seen = render(&ctx, &drones, &scene)?;
//! ```

pub mod config;
pub mod context;
pub mod drones;
pub mod error;
pub mod geometry;
pub mod ragged;
pub mod respawns;
pub mod scene;
pub mod scenery;
pub mod steps;
pub mod types;

pub use config::{Occlusion, SimConfig};
pub use context::{initialize, initialize_on, Context};
pub use drones::{DroneState, Movement};
pub use error::SimError;
pub use ragged::{Grouping, RaggedBatch};
pub use respawns::{Respawns, SpawnVolume};
pub use scene::{BakedLighting, Bounds, Scene};
pub use scenery::{boxed_room, painted, palette_color, uniform_frame, SceneBuilder, Wall};
pub use steps::{bake, physics, render, respawn, RenderResult};
pub use types::{Command, Drone, Light, Line, RayHit, Texel};
