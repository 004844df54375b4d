use chrono::Utc;

fn main() {
    // Build timestamp reported by /health / 构建时间
    let build_time = Utc::now().to_rfc3339();
    println!("cargo:rustc-env=BUILD_TIME={}", build_time);

    println!("cargo:rerun-if-changed=build.rs");
}
