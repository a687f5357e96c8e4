fn main() {
    println!("cargo:rerun-if-env-changed=ND_BUILD_VERSION");
    if let Ok(value) = std::env::var("ND_BUILD_VERSION") {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            println!("cargo:rustc-env=ND_BUILD_VERSION={trimmed}");
        }
    }
}
