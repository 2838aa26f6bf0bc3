//! Build script for the control ECU firmware
//!
//! Handles:
//! - Linker search path for the embedded target

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Host builds link nothing special
    if std::env::var_os("CARGO_FEATURE_EMBEDDED").is_none() {
        return;
    }

    // Link memory.x from project directory (embassy-stm32 `memory-x` also emits one)
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rustc-link-search={}", std::env::var("CARGO_MANIFEST_DIR").unwrap());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
}
