//! Command-line entry point (native).

#[cfg(feature = "native")]
fn main() -> std::process::ExitCode {
    use clap::Parser;

    env_logger::init();

    let cli = signpad_app::cli::Cli::parse();
    match cli.run(&mut std::io::stdout()) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {e}");
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
