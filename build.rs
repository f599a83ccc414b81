//! Retrieves information about the version of the binary from Git and the
//! build environment. It is accessed at runtime through the `build` module.

fn main() -> shadow_rs::SdResult<()> {
    shadow_rs::new()
}
