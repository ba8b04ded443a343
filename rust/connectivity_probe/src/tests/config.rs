use super::lookup_from;
use crate::config::{
    ExecutionContext, ProbeConfig, ENV_DB_NAME, ENV_FUNCTION_NAME, ENV_HOST_NAME, ENV_REGION,
    ENV_SECRET_ARN,
};
use crate::errors::ProbeError;
use serial_test::serial;

#[test]
fn test_config_from_complete_lookup() {
    let config = ProbeConfig::from_lookup(lookup_from(&[
        (ENV_HOST_NAME, "cluster0.ab1cd.mongodb.net"),
        (ENV_DB_NAME, "my-app"),
        (ENV_SECRET_ARN, "arn:aws:secretsmanager:ap-southeast-2:1:secret:x"),
    ]))
    .unwrap();

    assert_eq!(config.host_name, "cluster0.ab1cd.mongodb.net");
    assert_eq!(config.db_name, "my-app");
    assert_eq!(config.secret_arn, "arn:aws:secretsmanager:ap-southeast-2:1:secret:x");
}

#[test]
fn test_missing_and_empty_values_are_reported() {
    let err = ProbeConfig::from_lookup(lookup_from(&[
        (ENV_HOST_NAME, ""),
        (ENV_DB_NAME, "my-app"),
    ]))
    .unwrap_err();

    match err {
        ProbeError::MissingConfiguration { missing } => {
            assert_eq!(missing, vec![ENV_HOST_NAME, ENV_SECRET_ARN]);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_execution_context_is_optional() {
    let context = ExecutionContext::from_lookup(lookup_from(&[(ENV_REGION, "ap-southeast-2")]));
    assert_eq!(context.region.as_deref(), Some("ap-southeast-2"));
    assert_eq!(context.function_name, None);
}

#[test]
#[serial]
fn test_config_from_process_environment() {
    std::env::set_var(ENV_HOST_NAME, "cluster0.ab1cd.mongodb.net");
    std::env::set_var(ENV_DB_NAME, "my-app");
    std::env::set_var(ENV_SECRET_ARN, "arn:aws:secretsmanager:ap-southeast-2:1:secret:x");
    std::env::set_var(ENV_FUNCTION_NAME, "MongoDBConnectivityTest");

    let config = ProbeConfig::from_env();
    let context = ExecutionContext::from_env();

    std::env::remove_var(ENV_HOST_NAME);
    std::env::remove_var(ENV_DB_NAME);
    std::env::remove_var(ENV_SECRET_ARN);
    std::env::remove_var(ENV_FUNCTION_NAME);

    assert_eq!(config.unwrap().db_name, "my-app");
    assert_eq!(context.function_name.as_deref(), Some("MongoDBConnectivityTest"));
}

#[test]
#[serial]
fn test_config_from_empty_environment() {
    std::env::remove_var(ENV_HOST_NAME);
    std::env::remove_var(ENV_DB_NAME);
    std::env::remove_var(ENV_SECRET_ARN);

    let err = ProbeConfig::from_env().unwrap_err();
    assert_eq!(err.status_code(), 400);
}
