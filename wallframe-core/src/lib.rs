//! # Wallframe Core
//!
//! Core types and utilities shared by the Wallframe image decoders.
//!
//! This crate provides:
//! - Error handling types
//! - A bounds-checked byte cursor with explicit big/little-endian reads
//! - LSB-first bit reading/writing for dictionary-coded streams

pub mod error;
pub mod bitstream;

pub use error::{BitstreamError, Error, Result};
pub use bitstream::{BitReader, BitWriter, ByteReader};
