use dagger_sdk::{Directory, Query};

use crate::containers;

/// Build the runtime image; publish it when a registry address is given.
pub async fn run(client: &Query, source: Directory, publish: Option<&str>) -> eyre::Result<String> {
    let binary = containers::agent_binary(client, source);
    let image = containers::runtime(client, binary);

    match publish {
        Some(address) => {
            let reference = image.publish(address).await?;
            Ok(format!("[image] Published {reference}"))
        }
        None => {
            image.sync().await?;
            Ok("[image] Runtime image built.".to_string())
        }
    }
}
