fn main() {
    let cli = copyql::cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level().as_str())).init();
    let code = copyql::app::run_cli(cli);
    if code != 0 {
        std::process::exit(code);
    }
}
