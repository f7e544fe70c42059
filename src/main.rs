#[tokio::main]
async fn main() -> std::io::Result<()> {
    guest_directory::run_with_config().await
}
