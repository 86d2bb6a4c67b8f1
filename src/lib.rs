//! Pan, zoom and drag interaction engine for rendered diagrams.
//!
//! This crate is compiled to WebAssembly and runs inside a note-taking host.
//! It wraps every rendered diagram in an interactive container: translating
//! raw pointer, wheel, touch and keyboard input into view transforms, keeping
//! per-container state across re-renders, and tearing that state down when
//! views close. The host JavaScript layer only discovers diagram nodes,
//! forwards DOM events, and applies the resulting [`engine::Effect`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level [`engine::Engine`] and testable [`engine::EngineCore`] |
//! | [`transform`] | Points, sizes, the view transform and its pure math |
//! | [`registry`] | Per-view, per-container state records and ids |
//! | [`store`] | Defaulting reads over the registry and the keyboard focus pointer |
//! | [`input`] | Input event, intent and gesture state types |
//! | [`router`] | Per-node gesture machines and keyboard shortcuts |
//! | [`actions`] | Transform and toggle operations on a named container |
//! | [`lifecycle`] | Wiring and disposal as host content changes |
//! | [`viewport`] | Viewport indicator region and throttling |
//! | [`export`] | Export file naming and SVG document preparation |
//! | [`host`] | Host query and presentation contracts |
//! | [`config`] | Settings snapshot and validation |
//! | [`wasm`] | JS bridge |
//! | [`consts`] | Shared numeric defaults (zoom limits, step sizes, timeouts) |

pub mod actions;
pub mod config;
pub mod consts;
pub mod engine;
pub mod export;
pub mod host;
pub mod input;
pub mod lifecycle;
pub mod registry;
pub mod router;
pub mod store;
pub mod transform;
pub mod viewport;
pub mod wasm;
