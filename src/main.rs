fn main() -> ddr3gen::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    ddr3gen::cli::run()
}
