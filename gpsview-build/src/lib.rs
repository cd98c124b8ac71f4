//! Shared build utilities for gpsview crates.
//!
//! Android bridges are small Kotlin classes embedded into the native library
//! as DEX bytecode and loaded at runtime with a `DexClassLoader`.
//!
//! # Usage
//!
//! In your `build.rs`:
//!
//! ```ignore
//! fn main() {
//!     let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap();
//!
//!     if target_os == "android" {
//!         gpsview_build::build_kotlin(&["src/sys/android/Bridge.kt"]);
//!     }
//! }
//! ```
//!
//! The resulting `classes.dex` is written to `OUT_DIR` and can be embedded
//! with `include_bytes!(concat!(env!("OUT_DIR"), "/classes.dex"))`.

#![warn(missing_docs)]

mod android;

pub use android::{AndroidConfig, build_kotlin, find_android_jar, find_d8_jar};
