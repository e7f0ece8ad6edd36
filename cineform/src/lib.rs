// CineForm-rs
// Licensed under either the Apache License, Version 2.0, or the MIT license, at your option.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! `cineform` is the session orchestrator: it wires the wavelet transform
//! (`cineform-wavelet`), the entropy codec (`cineform-entropy`), the TLV sample container
//! (`cineform-container`), the color converter (`cineform-color`), and the layered metadata
//! database (`cineform-metadata`) into a single `Session::encode`/`Session::decode` API.
//!
//! # Usage
//!
//! 1. Construct a [`SessionConfig`], tuning lossless mode, thread limit, or scratch arena size.
//! 2. Build a [`Session`] from it. The worker pool and FSM cache are created lazily on first use.
//! 3. Wrap a packed pixel buffer in a [`Frame`], tagged with its wire [`PixelFormat`][cineform_color::PixelFormat]
//!    and whether it is a keyframe.
//! 4. Call [`Session::encode`] to get a TLV sample, or [`Session::decode`] to reconstruct a
//!    [`Frame`] from one. A difference frame's missing channels are filled in from the session's
//!    most recently keyed frame automatically.
//! 5. Call [`Session::update_metadata`] to install a CFHDDATA overlay ahead of an encode, or read
//!    back whatever a decoded sample's in-band metadata resolved to via the session's database.

mod config;
mod decode;
mod encode;
mod frame;
mod fsm_cache;
mod pool;
mod reconstruct;
mod session;
mod stats;

pub use cineform_color::PixelFormat;
pub use cineform_core::errors::{CineformError, Result};
pub use cineform_core::frame::EncodedFormat;
pub use cineform_metadata::{CfhdData, ChannelDelta, Layer, COMMON_CHANNEL};

pub use config::{SessionConfig, SimdProfile};
pub use frame::Frame;
pub use session::Session;
pub use stats::StatsSnapshot;
