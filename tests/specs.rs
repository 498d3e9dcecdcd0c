//! Behavioral specifications for the gantry dispatcher and agent.
//!
//! These tests are black-box at the crate boundary: a real dispatcher is
//! started on a loopback port and real agents connect to it over TCP.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

// dispatch/
#[path = "specs/dispatch/build.rs"]
mod dispatch_build;
#[path = "specs/dispatch/cancel.rs"]
mod dispatch_cancel;
#[path = "specs/dispatch/registration.rs"]
mod dispatch_registration;
#[path = "specs/dispatch/routing.rs"]
mod dispatch_routing;
