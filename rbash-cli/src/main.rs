fn main() -> std::process::ExitCode {
    rbash_cli::run()
}
