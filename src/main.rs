#[tokio::main]
async fn main() {
    // the logger may not be up yet if configuration failed
    if let Err(err) = solax_rs485::app().await {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
