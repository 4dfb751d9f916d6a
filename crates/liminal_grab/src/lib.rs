//! Liminal Grab - Forced Perspective Object Manipulation
//!
//! This crate implements the grab / hold / release mechanic where a distant
//! object is picked up, held at a fixed close offset from the camera while
//! being rescaled so its on-screen size never changes, and finally walked back
//! out along the view ray until it would touch the environment.
//!
//! # Features
//!
//! - Edge-triggered grab toggle from a sampled button state
//! - Forced-perspective scale law (`scale = original * distance / original_distance`)
//! - Camera-relative rotation with mouse-driven rotation accumulation
//! - Collision-aware stepped withdrawal on release
//! - Reactive collision pushback for objects still settling after release
//!
//! # Architecture
//!
//! ```text
//!   GrabInput ──────► EdgeDetector ──► GrabSession ──► GrabEvent::Released
//!                                          │                   │
//!                                          ▼                   ▼
//!                                   ┌────────────┐     CollisionPushback
//!                                   │ GrabScene  │◄──── (collision began)
//!                                   │  (traits)  │
//!                                   └────────────┘
//! ```
//!
//! The session never talks to a physics engine directly: the host world
//! implements [`SceneTransforms`], [`SpatialQuery`] and
//! [`PhysicsCapabilities`].
//!
//! # Example
//!
//! ```ignore
//! use liminal_grab::prelude::*;
//!
//! let config = GrabConfig::default()
//!     .with_grabbable_mask(LayerMask::layer(3))
//!     .with_hold_distance(0.2);
//! let mut session = GrabSession::new(config)?;
//!
//! // Once per frame
//! let input = GrabInput::new(grab_held, rotate_held, mouse_delta);
//! if let Some(GrabEvent::Released(report)) = session.update(&input, Some(&camera), &mut scene) {
//!     pushback.start_release(
//!         report.camera_position,
//!         report.camera_forward,
//!         report.original_distance,
//!         report.original_scale,
//!     );
//! }
//! ```

pub mod config;
pub mod error;
pub mod geometry;
pub mod input;
pub mod pushback;
pub mod scene;
pub mod session;

pub mod prelude {
    //! Common imports for the grab mechanic
    pub use crate::config::{GrabConfig, HoldPlacement};
    pub use crate::error::{GrabError, Result};
    pub use crate::geometry::{CameraPose, OrientedBox, PerspectiveAnchor, Pose};
    pub use crate::input::{EdgeDetector, GrabInput};
    pub use crate::pushback::{CollisionPushback, PushbackConfig};
    pub use crate::scene::{
        BodyId, Capabilities, ColliderId, EntityId, GrabScene, LayerMask, PhysicsCapabilities,
        RayHit, SceneTransforms, SpatialQuery,
    };
    pub use crate::session::{GrabEvent, GrabSession, GrabState, ReleaseOutcome, ReleaseReport};
}

pub use prelude::*;
