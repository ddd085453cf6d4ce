//! Renderer Settings Tests
//!
//! Tests for:
//! - JSON loading (full, partial, invalid)
//! - Effective values and clamping
//! - Unbounded mesh policy serialization

use std::time::Duration;

use lumen::RenderError;
use lumen::renderer::settings::{RendererSettings, UnboundedMeshPolicy};
use lumen::resources::uniforms::MAX_CASCADES;

// ============================================================================
// JSON
// ============================================================================

#[test]
fn empty_json_yields_defaults() {
    let settings = RendererSettings::from_json("{}").unwrap();
    assert_eq!(settings, RendererSettings::default());
}

#[test]
fn partial_json_overrides_only_named_fields() {
    let settings = RendererSettings::from_json(
        r#"{ "shadows": false, "shadow_map_size": 4096, "unbounded_mesh_policy": "cull" }"#,
    )
    .unwrap();

    assert!(!settings.shadows);
    assert_eq!(settings.shadow_map_size, 4096);
    assert_eq!(settings.unbounded_mesh_policy, UnboundedMeshPolicy::Cull);
    assert!(settings.depth_prepass, "Unnamed fields keep their defaults");
    assert_eq!(settings.instance_capacity, 1024);
}

#[test]
fn json_round_trip_preserves_values() {
    let settings = RendererSettings {
        particles: false,
        cascade_lambda: 0.3,
        temporal_target_soft_cap: 8,
        ..RendererSettings::default()
    };
    let json = settings.to_json().unwrap();
    assert!(json.contains("\"always_visible\""), "policy is snake_case: {json}");
    assert_eq!(RendererSettings::from_json(&json).unwrap(), settings);
}

#[test]
fn invalid_json_is_a_config_error() {
    let err = RendererSettings::from_json(r#"{ "shadows": "yes" }"#).unwrap_err();
    assert!(matches!(err, RenderError::Config(_)));
    assert!(!err.is_camera_error());
}

#[test]
fn unknown_policy_is_rejected() {
    assert!(RendererSettings::from_json(r#"{ "unbounded_mesh_policy": "maybe" }"#).is_err());
}

// ============================================================================
// Effective Values
// ============================================================================

#[test]
fn defaults_match_documented_values() {
    let settings = RendererSettings::default();
    assert_eq!(settings.unbounded_mesh_policy, UnboundedMeshPolicy::AlwaysVisible);
    assert_eq!(settings.temporal_target_idle(), Duration::from_secs(10));
    assert_eq!(settings.temporal_target_soft_cap, 50);
    assert_eq!(settings.effective_cascade_count(), MAX_CASCADES as u32);
    assert!((settings.effective_cascade_lambda() - 0.75).abs() < 1e-6);
}

#[test]
fn cascade_parameters_are_clamped() {
    let mut settings = RendererSettings {
        shadow_cascades: 0,
        cascade_lambda: -1.0,
        ..RendererSettings::default()
    };
    assert_eq!(settings.effective_cascade_count(), 1);
    assert_eq!(settings.effective_cascade_lambda(), 0.0);

    settings.shadow_cascades = 12;
    settings.cascade_lambda = 3.0;
    assert_eq!(settings.effective_cascade_count(), MAX_CASCADES as u32);
    assert_eq!(settings.effective_cascade_lambda(), 1.0);
}

#[test]
fn zero_instance_capacity_becomes_one() {
    let settings = RendererSettings {
        instance_capacity: 0,
        ..RendererSettings::default()
    };
    assert_eq!(settings.effective_instance_capacity(), 1);
}

#[test]
fn negative_idle_time_evicts_immediately() {
    let settings = RendererSettings {
        temporal_target_idle_secs: -5.0,
        ..RendererSettings::default()
    };
    assert_eq!(settings.temporal_target_idle(), Duration::ZERO);
}
