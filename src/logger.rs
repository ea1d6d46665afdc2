use env_logger::Env;

pub struct Logger {}

impl Logger {
    pub const DEFAULT_FILTER: &'static str = "info";

    /// Logs through `env_logger`, filtered by `RUST_LOG` when set.
    pub fn init() {
        env_logger::Builder::from_env(Env::default().default_filter_or(Self::DEFAULT_FILTER))
            .init();
    }
}
