use xr_core::fetcher::ENGINE_VERSION;

pub fn render() -> String {
    format!(
        "{} {} (Xray-core {ENGINE_VERSION}, {}/{})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH,
    )
}

pub fn run() {
    println!("{}", render());
}
