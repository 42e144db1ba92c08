//! Pokes the registry routes the way a service would on startup and shutdown.
//!
//! Start the service first (`cargo run -- -p 4214`), then:
//! `cargo run --example posterboy -- http://localhost:4214`

use rollcall::RegistryClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let base = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://localhost:4214".to_owned());
    let client = RegistryClient::new(base)?;

    let record = client.register("flardman", "127.0.0.1:4951").await?;
    println!("{}", serde_json::to_string(&record)?);

    let found = client.lookup("flardman").await?;
    println!("{}", serde_json::to_string(&found)?);

    let ack = client.deregister(record.id).await?;
    println!("{}", serde_json::to_string(&ack)?);

    match client.lookup("flardman").await {
        Err(e) if e.is_not_found() => println!("flardman is gone"),
        other => println!("unexpected: {other:?}"),
    }
    Ok(())
}
