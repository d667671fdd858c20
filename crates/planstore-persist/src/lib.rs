//! State persistence for planstore
//!
//! Persistence sits outside the dispatch path: it watches the store's
//! debounced change signal, and encode/decode failures are reported as
//! `false` / `None`, never as dispatch errors.
//!
//! - [`StateCodec`]: save/restore contract
//! - [`JsonFileCodec`]: JSON snapshot file with a metadata envelope
//! - [`Autosave`]: background task saving the latest state after changes

pub mod autosave;
pub mod codec;

pub use autosave::{restore_into, Autosave};
pub use codec::{codec_fn, FnCodec, JsonFileCodec, StateCodec, SNAPSHOT_VERSION};
