// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn total_steps_matches_graph_len_not_a_literal() {
    assert_eq!(total_steps(), 11);
    assert_eq!(total_steps(), STEP_GRAPH.len());
}

#[test]
fn every_step_name_round_trips_through_display_and_from_str() {
    for d in STEP_GRAPH {
        let s = d.name.to_string();
        let parsed: StepName = s.parse().expect("round trip");
        assert_eq!(parsed, d.name);
    }
}

#[test]
fn unknown_step_name_is_rejected() {
    assert!("not_a_step".parse::<StepName>().is_err());
}

#[test]
fn terminal_step_has_no_next() {
    assert_eq!(descriptor(StepName::VerifyDeployment).next, None);
}

#[test]
fn build_image_redirects_to_verify_dockerfile_on_failure() {
    let d = descriptor(StepName::BuildImage);
    assert_eq!(d.redirect, StepName::VerifyDockerfile);
    assert!(!d.is_self_redirect());
}

#[test]
fn analyze_repository_redirects_to_self() {
    let d = descriptor(StepName::AnalyzeRepository);
    assert!(d.is_self_redirect());
}

#[test]
fn prerequisite_of_resolve_base_images_is_analyze_repository() {
    assert_eq!(prerequisite(StepName::ResolveBaseImages), Some(StepName::AnalyzeRepository));
}

#[test]
fn analyze_repository_has_no_prerequisite() {
    assert_eq!(prerequisite(StepName::AnalyzeRepository), None);
}

#[test]
fn step_status_kind_display() {
    assert_eq!(StepStatusKind::NotStarted.to_string(), "not-started");
    assert_eq!(StepStatusKind::Running.to_string(), "running");
}
