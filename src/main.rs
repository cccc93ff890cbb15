#[tokio::main]
async fn main() {
    if let Err(err) = qolboard_lib::run().await {
        eprintln!("qolboard error: {err}");
        std::process::exit(1);
    }
}
