#[tokio::main]
async fn main() {
    relay_token_server::run().await;
}
