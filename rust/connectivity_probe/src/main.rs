/*
Lambda entry point for the MongoDB Atlas connectivity probe.

Expects MONGODB_HOST_NAME, MONGODB_DB_NAME and MONGODB_SECRET_ARN in the
function environment; the deployment stack wires these up.
*/

use connectivity_probe::config::ExecutionContext;
use connectivity_probe::connection::MongoConnector;
use connectivity_probe::credentials::SecretsManagerStore;
use connectivity_probe::probe::ConnectivityProbe;
use connectivity_probe::response::ProbeResponse;
use dotenv::dotenv;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenv().ok();
    env_logger::init();

    let context = ExecutionContext::from_env();
    let secrets = SecretsManagerStore::new(context.region.clone()).await;
    let probe = Arc::new(ConnectivityProbe::new(secrets, MongoConnector));

    lambda_runtime::run(service_fn(move |_event: LambdaEvent<serde_json::Value>| {
        let probe = Arc::clone(&probe);
        async move { Ok::<ProbeResponse, Error>(probe.run_from_env().await) }
    }))
    .await
}
