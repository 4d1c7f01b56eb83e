// quarry-core/src/lib.rs

// 1. Documentation is not mandatory yet
#![allow(missing_docs)]
// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (Interfaces / Traits)
// Contract with the remote database API (query endpoints, capabilities, wizard).
pub mod ports;

// 2. Domain (pure logic)
// Stage list, validator, composer, result classifier, wizard, history.
// Depends on NOTHING else (neither infra nor app).
pub mod domain;

// 3. Infrastructure (Adapters)
// HTTP backend, workspace config files.
// Depends on Domain and Ports.
pub mod infrastructure;

// 4. Application (Use Cases)
// Dispatcher, workspace session, normalization workflow.
// Depends on Domain, Infra and Ports.
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
// use quarry_core::QuarryError;
pub use error::QuarryError;
