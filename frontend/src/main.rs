#[cfg(target_arch = "wasm32")]
fn main() {
    usertable_ui::bootstrap::on_page_load();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!("usertable-ui runs in the browser, build it with `trunk build` from frontend/");
}
