//! Servarm Hardware Abstraction Layer
//!
//! This crate defines the capabilities the arm core consumes from the
//! board: a byte-addressed non-volatile store and a source of a unique
//! device identifier. Chip-specific crates implement them so the same
//! application code runs on different hardware.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (servarm-firmware, etc.)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  servarm-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │   servarm-    │       │   mem::       │
//! │ hal-rp2040    │       │ MemoryStore   │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`store::ByteStore`] - Persistent byte store with explicit commit
//! - [`device::DeviceId`] - Hardware-unique identifier

#![no_std]
#![deny(unsafe_code)]

pub mod device;
pub mod mem;
pub mod store;

// Re-export key traits at crate root for convenience
pub use device::DeviceId;
pub use mem::MemoryStore;
pub use store::{ByteStore, StoreError};
