/// Initializes the global `tracing` subscriber from `RUST_LOG`, matching the teacher's API
/// binaries (`api/bin/chainflip-lp-api/src/main.rs`).
pub fn init_logging() {
	tracing_subscriber::FmtSubscriber::builder()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.try_init()
		.expect("setting default subscriber failed");
}
