//! Liminal Player - First-Person Forced Perspective
//!
//! Ties the grab mechanic, the Rapier world and the puzzle layer together
//! behind a single per-frame call.
//!
//! ```text
//! InputSnapshot
//!      │
//!      ▼
//! LookController ──► player body ──► GrabSession ──► PhysicsWorld::step
//!                                        │                  │
//!                                  Released/Acquired   collision events
//!                                        │             ┌────┴─────┐
//!                                        ▼             ▼          ▼
//!                                CollisionPushback ◄─ solid    sensor ──► PuzzleSystem
//!                                                                              │
//!                                                                        door writes
//! ```
//!
//! # Example
//!
//! ```ignore
//! use liminal_player::prelude::*;
//!
//! let config = PlayerConfig::discover();
//! let mut world = PhysicsWorld::new(config.physics.clone());
//! let mut puzzles = PuzzleSystem::new();
//! let mut player = Player::new(PLAYER_ID, spawn, &config, &mut world)?;
//!
//! loop {
//!     let report = player.tick(&sample_input(), dt, &mut world, &mut puzzles);
//!     render(&world, &report);
//! }
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod input;
pub mod player;

pub mod prelude {
    //! Common imports for the player
    pub use crate::config::{LookConfig, PlayerConfig};
    pub use crate::controller::LookController;
    pub use crate::error::{PlayerError, Result};
    pub use crate::input::InputSnapshot;
    pub use crate::player::{FrameReport, Player};
}

pub use prelude::*;
