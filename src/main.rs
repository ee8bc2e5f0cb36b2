use goodwe_bridge::prelude::*;

#[tokio::main]
async fn main() {
    let options = Options::new();
    let config = Config::from_options(&options);

    let loglevel = match &config {
        Ok(config) => config.loglevel.clone(),
        Err(_) => "warn".to_string(),
    };
    goodwe_bridge::init_logging(&loglevel);

    let config = config.unwrap_or_else(|err| {
        error!("Failed to load config: {:#}", err);
        std::process::exit(255);
    });

    match goodwe_bridge::app(config).await {
        Ok(outcome) => debug!("finished: {:?}", outcome),
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}
