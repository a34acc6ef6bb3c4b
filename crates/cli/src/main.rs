use std::process::ExitCode;

fn main() -> ExitCode {
    dealscope_cli::run()
}
