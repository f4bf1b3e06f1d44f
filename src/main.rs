#[tokio::main]
async fn main() -> std::io::Result<()> {
    snowball_server::run_with_config().await
}
