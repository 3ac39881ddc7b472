use timetable_engine::{GenerationConfig, ServerConfig, server};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = ServerConfig::from_env();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_filter.as_str()),
    )
    .init();

    server::run_server(config, GenerationConfig::from_env()).await
}
