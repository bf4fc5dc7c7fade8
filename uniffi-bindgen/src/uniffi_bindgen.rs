//! Generates Swift and Kotlin bindings for `badgekit-core`.
//!
//! ```sh
//! cargo run -p uniffi-bindgen -- generate --library target/release/libbadgekit_core.so \
//!     --language kotlin --out-dir kotlin/
//! ```

fn main() {
    uniffi::uniffi_bindgen_main();
}
