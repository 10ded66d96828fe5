use super::*;

#[test]
fn splits_a_tagged_reference() {
    assert_eq!(split_repo_tag("ctz-build:abc123"), ("ctz-build", "abc123"));
}

#[test]
fn defaults_an_untagged_reference_to_latest() {
    assert_eq!(split_repo_tag("ctz-build"), ("ctz-build", "latest"));
}

#[test]
fn does_not_mistake_a_registry_port_for_a_tag() {
    assert_eq!(split_repo_tag("localhost:5000/app"), ("localhost:5000/app", "latest"));
}
