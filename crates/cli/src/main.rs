use std::process::ExitCode;

fn main() -> ExitCode {
    greenearth_cli::run()
}
