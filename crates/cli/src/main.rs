use std::process::ExitCode;

fn main() -> ExitCode {
    hotelscout_cli::run()
}
