use super::TestResolver;
use crate::defaults::SeededSuffix;
use crate::errors::TopologyError;
use crate::resources::{Declared, DependencyEdge, LogicalId, ResourceRef};
use crate::secret::PasswordPolicy;
use crate::stack::{
    dependency_order, synthesize, StackConfig, ENV_DB_NAME, ENV_HOST_NAME, ENV_SECRET_ARN,
    OUTPUT_FUNCTION_ARN, OUTPUT_FUNCTION_NAME, PROBE_MEMORY_MB, PROBE_TIMEOUT_SECS,
};

fn test_plan_config() -> StackConfig {
    StackConfig::new("MongodbAtlasVpcPeeringStack", "5f1b2c3d4e5f6a7b8c9d0e1f", "default")
        .expect("stack defaults are valid")
}

#[test]
fn test_synthesize_defaults() {
    let plan = synthesize(&test_plan_config(), &SeededSuffix::new("defaults")).unwrap();

    assert_eq!(plan.region, "ap-southeast-2");
    assert_eq!(plan.declarations.len(), plan.creation_order.len());
    assert_eq!(plan.atlas.routes.len(), 2);
    assert_eq!(plan.probe_function.subnets.len(), 2);
    assert_eq!(plan.probe_function.timeout_secs, PROBE_TIMEOUT_SECS);
    assert_eq!(plan.probe_function.memory_mb, PROBE_MEMORY_MB);
    assert_eq!(
        plan.atlas.secret.read_grants,
        vec![plan.probe_function.logical_id.clone()]
    );
}

#[test]
fn test_outputs_reference_the_function() {
    let plan = synthesize(&test_plan_config(), &SeededSuffix::new("outputs")).unwrap();

    let arn = plan.output(OUTPUT_FUNCTION_ARN).expect("arn output");
    assert_eq!(arn.value, plan.probe_function.function_arn());
    let name = plan.output(OUTPUT_FUNCTION_NAME).expect("name output");
    assert_eq!(name.value, plan.probe_function.function_name());
}

#[test]
fn test_function_environment_resolves_after_deploy() {
    let plan = synthesize(&test_plan_config(), &SeededSuffix::new("env")).unwrap();
    let env = &plan.probe_function.environment;

    let resolver = TestResolver::default()
        .with_attribute(
            &plan.atlas.cluster.logical_id,
            "ConnectionStrings.StandardSrv",
            "mongodb+srv://my-cluster.abc12.mongodb.net",
        )
        .with_attribute(
            &plan.atlas.secret.logical_id,
            "Arn",
            "arn:aws:secretsmanager:ap-southeast-2:123456789012:secret:db-AbCdEf",
        );

    assert_eq!(
        env[ENV_HOST_NAME].resolve(&resolver).unwrap(),
        "my-cluster.abc12.mongodb.net"
    );
    assert_eq!(env[ENV_DB_NAME], ResourceRef::literal("my-app"));
    assert!(env[ENV_SECRET_ARN]
        .resolve(&resolver)
        .unwrap()
        .starts_with("arn:aws:secretsmanager:"));
}

#[test]
fn test_creation_order_respects_edges() {
    let plan = synthesize(&test_plan_config(), &SeededSuffix::new("order")).unwrap();
    for edge in &plan.edges {
        let from = plan.position(&edge.from).expect("from is declared");
        let to = plan.position(&edge.to).expect("to is declared");
        assert!(to < from, "{} must come before {}", edge.to, edge.from);
    }

    let cluster = plan.position(&plan.atlas.cluster.logical_id).unwrap();
    let peering = plan.position(&plan.atlas.network_peering.logical_id).unwrap();
    let function = plan.position(&plan.probe_function.logical_id).unwrap();
    assert!(peering < cluster);
    assert!(cluster < function);
}

#[test]
fn test_shared_tier_produces_no_plan() {
    let mut config = test_plan_config();
    config.instance_size = "M0".to_string();
    let err = synthesize(&config, &SeededSuffix::new("m0")).unwrap_err();
    assert!(matches!(err, TopologyError::UnsupportedInstanceSize { .. }));
}

#[test]
fn test_plan_json_never_contains_password() {
    let plan = synthesize(&test_plan_config(), &SeededSuffix::new("json")).unwrap();
    let json = plan.to_json().unwrap();
    let password = PasswordPolicy::default().generate(&mut rand::rng());

    assert!(!json.contains(&password));
    assert!(json.contains("\"secretField\""));
    assert!(json.contains("my-app-user"));
}

#[test]
fn test_dependency_order_detects_cycles() {
    let a = LogicalId::new("A");
    let b = LogicalId::new("B");
    let declarations = vec![Declared::new(&a, "Test::A"), Declared::new(&b, "Test::B")];
    let edges = vec![DependencyEdge::new(&a, &b), DependencyEdge::new(&b, &a)];

    let err = dependency_order(&declarations, &edges).unwrap_err();
    assert!(matches!(err, TopologyError::DependencyCycle(_)));
}

#[test]
fn test_dependency_order_rejects_undeclared_targets() {
    let a = LogicalId::new("A");
    let declarations = vec![Declared::new(&a, "Test::A")];
    let edges = vec![DependencyEdge::new(&a, &LogicalId::new("Missing"))];

    let err = dependency_order(&declarations, &edges).unwrap_err();
    assert!(matches!(err, TopologyError::UnresolvedReference(_)));
}

#[test]
fn test_dependency_order_is_stable() {
    let ids: Vec<LogicalId> = ["C", "A", "B"].into_iter().map(LogicalId::new).collect();
    let declarations: Vec<Declared> = ids.iter().map(|id| Declared::new(id, "Test")).collect();

    let order = dependency_order(&declarations, &[]).unwrap();
    assert_eq!(order, ids);

    let edges = vec![DependencyEdge::new(&ids[0], &ids[2])];
    let order = dependency_order(&declarations, &edges).unwrap();
    assert_eq!(order, vec![ids[1].clone(), ids[2].clone(), ids[0].clone()]);
}
