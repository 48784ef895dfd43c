//!
//! # Chain State
//!
//! A deterministic key-value substrate for block-driven applications:
//! - `MemDB`: committed storage backed by an ordered map
//! - `ChainState`: the committed view plus the latest committed height
//! - `State`: a working overlay with session semantics, so a failed
//!   transaction leaves no trace
//!
//! All iteration is in ascending lexicographic order of key bytes.
//!

pub mod db;
pub mod state;
pub mod store;
