#[tokio::main]
async fn main() -> anyhow::Result<()> {
    signalcheck_lib::init_logging();
    let args: Vec<String> = std::env::args().collect();
    signalcheck_lib::run(args).await
}
