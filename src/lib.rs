//! Interaction and synchronization engine for sheet panels.
//!
//! Turns raw pointer and keyboard input into select, drag, resize, nudge and
//! delete gestures over the panels ("objects") of a sheet, converts between
//! screen pixels and percent-of-grid bounds, and keeps local state in step
//! with a remote document store that can change underneath it. The host is
//! responsible only for wiring its events to [`engine::SheetEditor`] and
//! implementing [`surface::Surface`] and [`store::DocumentStore`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Per-sheet editor instance and its input handlers |
//! | [`gestures`] | Select, drag, resize, nudge and delete logic |
//! | [`input`] | Modifier keys and the gesture state machine |
//! | [`sync`] | Fetch, push, invalidation-driven refetch, synthetic panels |
//! | [`registry`] | Object list derived from the latest sheet properties |
//! | [`selection`] | Selection set and its click transitions |
//! | [`mode`] | Edit-mode gate |
//! | [`geometry`] | Pixel and percent-of-grid conversions |
//! | [`doc`] | Cells, sheet properties and the property tree |
//! | [`store`] | Remote document store contract |
//! | [`surface`] | Host document contract and scoped preview/capture guards |
//! | [`memory_store`] | In-memory store for tests and replay |
//! | [`headless`] | In-process surface for tests and replay |
//! | [`replay`] | Headless replay of recorded input |
//! | [`config`] | Environment-driven editor configuration |
//! | [`consts`] | Shared numeric and naming constants |

pub mod config;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod geometry;
pub mod gestures;
pub mod headless;
pub mod input;
pub mod memory_store;
pub mod mode;
pub mod registry;
pub mod replay;
pub mod selection;
pub mod store;
pub mod surface;
pub mod sync;
