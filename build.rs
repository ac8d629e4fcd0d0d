#[cfg(target_os = "windows")]
fn main() {
    let mut res = winres::WindowsResource::new();
    res.set("FileDescription", "Engine bootstrap");
    res.set("ProductName", env!("CARGO_PKG_NAME"));
    res.compile().expect("Failed to compile resources");
}

#[cfg(not(target_os = "windows"))]
fn main() {}
