//! Build script for gpsview-location.

fn main() {
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap();

    if target_os == "android" {
        gpsview_build::build_kotlin(&["src/sys/android/LocationBridge.kt"]);
    }
}
