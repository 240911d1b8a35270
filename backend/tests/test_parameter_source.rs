//! Correction parameter supply in both modes

mod common;

use jet_calib_core::correction::{
    CorrectionParameterSource, JsonConditionsSnapshot, ParameterOrigin, ResidualSource,
};
use jet_calib_core::selector::ActiveInputs;
use jet_calib_core::{CalibrationConfig, CalibrationError, CorrectionMode};

use common::write_file;

fn levels() -> Vec<String> {
    ["L1FastJet", "L2Relative", "L3Absolute"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn levels_with_residual() -> Vec<String> {
    let mut levels = levels();
    levels.push("L2L3Residual".to_string());
    levels
}

// ============================================================================
// File-list mode
// ============================================================================

#[test]
fn test_file_list_levels_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let files = vec![
        write_file(dir.path(), "Summer23_L1FastJet_AK4.txt", "1.0"),
        write_file(dir.path(), "Summer23_L2Relative_AK4.txt", "1.0"),
        write_file(dir.path(), "Summer23_L3Absolute_AK4.txt", "1.05"),
    ];
    let config = CalibrationConfig {
        apply_correction: true,
        levels: levels(),
        level_files: files.clone(),
        ..CalibrationConfig::default()
    };

    let inputs = ActiveInputs::from_config(&config);
    let mut source = CorrectionParameterSource::from_config(&config);
    let resolved = source.resolve(&inputs, None, 1).unwrap();

    assert_eq!(resolved.level_names(), levels());
    assert_eq!(resolved.residual_source, ResidualSource::NotRequested);
    assert_eq!(resolved.levels[2].content, "1.05");
    assert_eq!(
        resolved.levels[0].origin,
        ParameterOrigin::File(files[0].clone())
    );
}

#[test]
fn test_file_list_residual_per_run() {
    let dir = tempfile::tempdir().unwrap();
    let l1 = write_file(dir.path(), "L1FastJet.txt", "1.0");
    let res_a = write_file(dir.path(), "Residual_RunA.txt", "1.01");
    let res_b = write_file(dir.path(), "Residual_RunB.txt", "1.02");
    let config = CalibrationConfig {
        apply_correction: true,
        levels: levels_with_residual(),
        level_files: vec![l1],
        residual_by_run: true,
        residual_table: vec![format!("1:100:{}", res_a), format!("100:-1:{}", res_b)],
        ..CalibrationConfig::default()
    };

    let inputs = ActiveInputs::from_config(&config);
    let mut source = CorrectionParameterSource::from_config(&config);

    let key_50 = source.cache_key(&inputs, 50);
    let key_60 = source.cache_key(&inputs, 60);
    let key_150 = source.cache_key(&inputs, 150);
    assert_eq!(key_50, key_60);
    assert_ne!(key_50, key_150);
    assert_eq!(key_50.residual, res_a);

    let resolved = source.resolve(&inputs, None, 150).unwrap();
    assert_eq!(resolved.residual_source, ResidualSource::File);
    assert_eq!(resolved.levels.last().unwrap().level, "L2L3Residual");
    assert_eq!(resolved.levels.last().unwrap().content, "1.02");
    assert_eq!(resolved.key, key_150);
}

#[test]
fn test_file_list_run_outside_residual_table() {
    let dir = tempfile::tempdir().unwrap();
    let l1 = write_file(dir.path(), "L1FastJet.txt", "1.0");
    let res = write_file(dir.path(), "Residual.txt", "1.01");
    let config = CalibrationConfig {
        apply_correction: true,
        levels: levels_with_residual(),
        level_files: vec![l1],
        residual_by_run: true,
        residual_table: vec![format!("100:200:{}", res)],
        ..CalibrationConfig::default()
    };

    let inputs = ActiveInputs::from_config(&config);
    let mut source = CorrectionParameterSource::from_config(&config);

    assert!(source.cache_key(&inputs, 50).residual.is_empty());
    let resolved = source.resolve(&inputs, None, 50).unwrap();
    assert_eq!(resolved.levels.len(), 1);
}

#[test]
fn test_file_list_empty_is_fatal() {
    let config = CalibrationConfig {
        apply_correction: true,
        levels: levels(),
        ..CalibrationConfig::default()
    };
    let inputs = ActiveInputs::from_config(&config);
    let mut source = CorrectionParameterSource::from_config(&config);

    let err = source.resolve(&inputs, None, 362_000).unwrap_err();
    assert_eq!(
        err,
        CalibrationError::EmptyParameterSet {
            option: "levelFiles/residualTable".to_string(),
            run: 362_000,
        }
    );
    let message = err.to_string();
    assert!(message.contains("levelFiles"));
    assert!(message.contains("362000"));
}

#[test]
fn test_file_list_unreadable_file() {
    let config = CalibrationConfig {
        apply_correction: true,
        level_files: vec!["/nonexistent/L1FastJet.txt".to_string()],
        ..CalibrationConfig::default()
    };
    let inputs = ActiveInputs::from_config(&config);
    let mut source = CorrectionParameterSource::from_config(&config);

    let err = source.resolve(&inputs, None, 1).unwrap_err();
    assert!(matches!(err, CalibrationError::ParameterFile { .. }));
}

// ============================================================================
// Conditions-snapshot mode
// ============================================================================

fn snapshot_config(fallback: bool, residual_table: Vec<String>) -> CalibrationConfig {
    CalibrationConfig {
        apply_correction: true,
        mode: CorrectionMode::ConditionsSnapshot,
        payload_name: "AK4PFPuppi".to_string(),
        levels: levels_with_residual(),
        residual_by_run: !residual_table.is_empty(),
        residual_table,
        residual_fallback_allowed: fallback,
        ..CalibrationConfig::default()
    }
}

fn snapshot(with_residual: bool) -> JsonConditionsSnapshot {
    let mut snapshot = JsonConditionsSnapshot::new();
    snapshot.insert("AK4PFPuppi", "L1FastJet", "1.0");
    snapshot.insert("AK4PFPuppi", "L2Relative", "1.0");
    snapshot.insert("AK4PFPuppi", "L3Absolute", "1.1");
    if with_residual {
        snapshot.insert("AK4PFPuppi", "L2L3Residual", "0.99");
    }
    snapshot
}

#[test]
fn test_snapshot_all_levels_present() {
    let config = snapshot_config(false, vec![]);
    let inputs = ActiveInputs::from_config(&config);
    let mut source = CorrectionParameterSource::from_config(&config);
    let snapshot = snapshot(true);

    let resolved = source.resolve(&inputs, Some(&snapshot), 1).unwrap();
    assert_eq!(resolved.level_names(), levels_with_residual());
    assert_eq!(resolved.residual_source, ResidualSource::Snapshot);
    assert_eq!(
        resolved.levels[0].origin,
        ParameterOrigin::Snapshot {
            payload: "AK4PFPuppi".to_string()
        }
    );
}

#[test]
fn test_snapshot_residual_fallback_to_file() {
    let dir = tempfile::tempdir().unwrap();
    let res = write_file(dir.path(), "Summer23_Residual.txt", "1.02");
    let config = snapshot_config(true, vec![format!("1:-1:{}", res)]);
    let inputs = ActiveInputs::from_config(&config);
    let mut source = CorrectionParameterSource::from_config(&config);
    let snapshot = snapshot(false);

    let resolved = source.resolve(&inputs, Some(&snapshot), 10).unwrap();
    assert_eq!(resolved.residual_source, ResidualSource::FileFallback);
    let residual = resolved.levels.last().unwrap();
    assert_eq!(residual.level, "L2L3Residual");
    assert_eq!(residual.origin, ParameterOrigin::File(res.clone()));
    assert_eq!(resolved.key.residual, res);
}

#[test]
fn test_snapshot_residual_missing_is_not_fatal() {
    let config = snapshot_config(false, vec![]);
    let inputs = ActiveInputs::from_config(&config);
    let mut source = CorrectionParameterSource::from_config(&config);
    let snapshot = snapshot(false);

    let mut reports = 0;
    for run in [1, 2, 3] {
        let resolved = source.resolve(&inputs, Some(&snapshot), run).unwrap();
        assert_eq!(resolved.residual_source, ResidualSource::Missing);
        assert_eq!(resolved.level_names(), levels());
        if resolved.residual_first_missing {
            reports += 1;
        }
    }
    assert_eq!(reports, 1);
    assert!(source.missing_residual_reported());
}

#[test]
fn test_snapshot_fallback_enabled_but_no_rule_for_run() {
    let config = snapshot_config(true, vec!["500:600:/nonexistent/res.txt".to_string()]);
    let inputs = ActiveInputs::from_config(&config);
    let mut source = CorrectionParameterSource::from_config(&config);
    let snapshot = snapshot(false);

    let resolved = source.resolve(&inputs, Some(&snapshot), 10).unwrap();
    assert_eq!(resolved.residual_source, ResidualSource::Missing);
}

#[test]
fn test_snapshot_missing_mandatory_level_is_fatal() {
    let config = snapshot_config(false, vec![]);
    let inputs = ActiveInputs::from_config(&config);
    let mut source = CorrectionParameterSource::from_config(&config);
    let mut snapshot = JsonConditionsSnapshot::new();
    snapshot.insert("AK4PFPuppi", "L1FastJet", "1.0");

    let err = source.resolve(&inputs, Some(&snapshot), 1).unwrap_err();
    assert_eq!(
        err,
        CalibrationError::MissingLevel {
            payload: "AK4PFPuppi".to_string(),
            level: "L2Relative".to_string(),
        }
    );
}

#[test]
fn test_snapshot_without_provider_is_fatal() {
    let config = snapshot_config(false, vec![]);
    let inputs = ActiveInputs::from_config(&config);
    let mut source = CorrectionParameterSource::from_config(&config);

    let err = source.resolve(&inputs, None, 7).unwrap_err();
    assert!(matches!(
        err,
        CalibrationError::CorrectorBuildFailed { run: 7, .. }
    ));
}

#[test]
fn test_snapshot_key_ignores_residual_table_without_fallback() {
    let config = snapshot_config(false, vec!["1:100:a.txt".to_string(), "100:-1:b.txt".to_string()]);
    let inputs = ActiveInputs::from_config(&config);
    let source = CorrectionParameterSource::from_config(&config);

    assert_eq!(source.cache_key(&inputs, 50), source.cache_key(&inputs, 150));
}

#[test]
fn test_snapshot_key_follows_residual_table_with_fallback() {
    let config = snapshot_config(true, vec!["1:100:a.txt".to_string(), "100:-1:b.txt".to_string()]);
    let inputs = ActiveInputs::from_config(&config);
    let source = CorrectionParameterSource::from_config(&config);

    assert_ne!(source.cache_key(&inputs, 50), source.cache_key(&inputs, 150));
}

#[test]
fn test_snapshot_from_json_document() {
    let snapshot = JsonConditionsSnapshot::from_json_str(
        r#"{"payloads": {"AK4PFPuppi": {"L1FastJet": "1.0", "L2Relative": "1.0",
            "L3Absolute": "1.0", "L2L3Residual": "1.0"}}}"#,
    )
    .unwrap();
    assert_eq!(snapshot.levels("AK4PFPuppi").len(), 4);

    let config = snapshot_config(false, vec![]);
    let inputs = ActiveInputs::from_config(&config);
    let mut source = CorrectionParameterSource::from_config(&config);
    assert!(source.resolve(&inputs, Some(&snapshot), 1).is_ok());
}
