use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("holdouts=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    holdouts::apps::run_prepare(std::env::args().skip(1))?;
    Ok(())
}
