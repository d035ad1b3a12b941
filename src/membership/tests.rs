//! Membership Module Tests
//!
//! Validates the persisted membership record and its store.
//!
//! ## Test Scopes
//! - **Record format**: the on-disk JSON shape, comma-joined node lists, unknown keys.
//! - **Store reads**: empty and malformed files degrade to an empty record.
//! - **Store writes**: set-based change detection, idempotence, round-trips, file modes.

#[cfg(test)]
mod tests {
    use crate::membership::store::MembershipStore;
    use crate::membership::types::{MembershipRecord, TableDefinition};
    use crate::tables::TableKind;
    use std::collections::HashSet;
    use std::path::PathBuf;

    fn state_file() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("manticore.json");
        (dir, path)
    }

    fn addrs(list: &[&str]) -> Vec<String> {
        list.iter().map(|a| a.to_string()).collect()
    }

    // ============================================================
    // RECORD FORMAT TESTS
    // ============================================================

    #[test]
    fn test_record_parses_persisted_shape() {
        let json = r#"{
            "clusters": {
                "m_cluster": {
                    "nodes": "10.0.0.1:9312,10.0.0.2:9312",
                    "options": "",
                    "indexes": ["pq", "tests"]
                }
            },
            "indexes": {
                "pq": {"type": "percolate", "path": "pq"},
                "tests": {"type": "rt", "path": "tests"}
            }
        }"#;

        let record: MembershipRecord = serde_json::from_str(json).unwrap();

        assert_eq!(
            record.members("m_cluster"),
            &["10.0.0.1:9312".to_string(), "10.0.0.2:9312".to_string()]
        );
        assert_eq!(record.clusters["m_cluster"].indexes, vec!["pq", "tests"]);
        assert_eq!(
            record.indexes["tests"],
            TableDefinition {
                kind: TableKind::RealTime,
                path: "tests".to_string()
            }
        );
        assert!(record.members("other").is_empty());
    }

    #[test]
    fn test_record_keeps_unknown_keys() {
        let json = r#"{"clusters": {}, "indexes": {}, "engine_version": "6.2.0"}"#;

        let record: MembershipRecord = serde_json::from_str(json).unwrap();
        let written = serde_json::to_value(&record).unwrap();

        assert_eq!(written["engine_version"], "6.2.0");
        assert!(written["clusters"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_record_rejects_unknown_table_kind() {
        let json = r#"{"indexes": {"x": {"type": "plain", "path": "x"}}}"#;

        assert!(serde_json::from_str::<MembershipRecord>(json).is_err());
    }

    // ============================================================
    // STORE READ TESTS
    // ============================================================

    #[test]
    fn test_missing_file_is_empty_record() {
        let (_dir, path) = state_file();

        let store = MembershipStore::open(&path);

        assert_eq!(store.record(), &MembershipRecord::default());
        assert!(!store.has_cluster("m_cluster"));
        assert!(store.current_members("m_cluster").is_empty());
    }

    #[test]
    fn test_malformed_file_is_empty_record() {
        let (_dir, path) = state_file();
        std::fs::write(&path, "{ not json").unwrap();

        let store = MembershipStore::open(&path);

        assert_eq!(store.record(), &MembershipRecord::default());
    }

    #[test]
    fn test_cluster_with_empty_node_list_is_not_a_cluster() {
        let (_dir, path) = state_file();
        std::fs::write(
            &path,
            r#"{"clusters": {"m_cluster": {"nodes": "", "options": "", "indexes": []}}}"#,
        )
        .unwrap();

        let store = MembershipStore::open(&path);

        assert!(!store.has_cluster("m_cluster"));
    }

    // ============================================================
    // STORE WRITE TESTS
    // ============================================================

    #[test]
    fn test_update_writes_pretty_record() {
        let (_dir, path) = state_file();
        let mut store = MembershipStore::open(&path);

        let written = store
            .update_members("m_cluster", &addrs(&["a:9312", "b:9312"]))
            .unwrap();

        assert!(written);
        assert!(store.has_cluster("m_cluster"));

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains('\n'), "file should be pretty-printed");

        let on_disk: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(on_disk["clusters"]["m_cluster"]["nodes"], "a:9312,b:9312");
        assert_eq!(on_disk["clusters"]["m_cluster"]["options"], "");
        assert_eq!(
            on_disk["clusters"]["m_cluster"]["indexes"],
            serde_json::json!(["pq", "tests"])
        );
        assert_eq!(on_disk["indexes"]["pq"]["type"], "percolate");
        assert_eq!(on_disk["indexes"]["tests"]["path"], "tests");
    }

    #[test]
    fn test_update_is_idempotent() {
        let (_dir, path) = state_file();
        let mut store = MembershipStore::open(&path);
        store
            .update_members("m_cluster", &addrs(&["a:9312", "b:9312"]))
            .unwrap();
        let modified_before = std::fs::metadata(&path).unwrap().modified().unwrap();

        // Same set, different order and a duplicate
        let written = store
            .update_members("m_cluster", &addrs(&["b:9312", "a:9312", "b:9312"]))
            .unwrap();

        assert!(!written);
        let modified_after = std::fs::metadata(&path).unwrap().modified().unwrap();
        assert_eq!(modified_before, modified_after);
    }

    #[test]
    fn test_empty_update_is_noop() {
        let (_dir, path) = state_file();
        let mut store = MembershipStore::open(&path);
        store.update_members("m_cluster", &addrs(&["a:9312"])).unwrap();

        let written = store.update_members("m_cluster", &[]).unwrap();

        assert!(!written);
        assert_eq!(store.current_members("m_cluster"), addrs(&["a:9312"]));
    }

    #[test]
    fn test_empty_update_on_fresh_store_writes_nothing() {
        let (_dir, path) = state_file();
        let mut store = MembershipStore::open(&path);

        assert!(!store.update_members("m_cluster", &[]).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn test_update_deduplicates() {
        let (_dir, path) = state_file();
        let mut store = MembershipStore::open(&path);

        store
            .update_members("m_cluster", &addrs(&["a:9312", "a:9312", "c:9312"]))
            .unwrap();

        assert_eq!(store.current_members("m_cluster"), addrs(&["a:9312", "c:9312"]));
    }

    #[test]
    fn test_round_trip_through_disk() {
        let (_dir, path) = state_file();
        let mut store = MembershipStore::open(&path);
        store
            .update_members("m_cluster", &addrs(&["a:9312", "b:9312", "c:9312"]))
            .unwrap();

        let reloaded = MembershipStore::open(&path);

        let before: HashSet<String> = store.current_members("m_cluster").into_iter().collect();
        let after: HashSet<String> = reloaded.current_members("m_cluster").into_iter().collect();
        assert_eq!(before, after);
        assert_eq!(store.record().indexes, reloaded.record().indexes);
    }

    #[test]
    fn test_update_preserves_other_clusters_and_keys() {
        let (_dir, path) = state_file();
        std::fs::write(
            &path,
            r#"{
                "clusters": {"other": {"nodes": "x:9312", "options": "gcache.size=1G", "indexes": []}},
                "indexes": {},
                "engine_version": "6.2.0"
            }"#,
        )
        .unwrap();
        let mut store = MembershipStore::open(&path);

        store.update_members("m_cluster", &addrs(&["a:9312"])).unwrap();

        let reloaded = MembershipStore::open(&path);
        assert_eq!(reloaded.current_members("other"), addrs(&["x:9312"]));
        assert_eq!(reloaded.record().clusters["other"].options, "gcache.size=1G");
        assert_eq!(reloaded.record().extra["engine_version"], "6.2.0");
        assert_eq!(reloaded.current_members("m_cluster"), addrs(&["a:9312"]));
    }

    #[test]
    fn test_load_picks_up_external_changes() {
        let (_dir, path) = state_file();
        let mut store = MembershipStore::open(&path);
        assert!(!store.has_cluster("m_cluster"));

        std::fs::write(
            &path,
            r#"{"clusters": {"m_cluster": {"nodes": "z:9312"}}}"#,
        )
        .unwrap();
        store.load();

        assert_eq!(store.current_members("m_cluster"), addrs(&["z:9312"]));
    }

    // ============================================================
    // FILE MODE TESTS
    // ============================================================

    #[cfg(unix)]
    fn mode(path: &std::path::Path) -> u32 {
        use std::os::unix::fs::PermissionsExt;
        std::fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[cfg(unix)]
    #[test]
    fn test_rewrite_keeps_existing_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, path) = state_file();
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        let mut store = MembershipStore::open(&path);

        assert!(store.update_members("m_cluster", &addrs(&["a:9312"])).unwrap());
        assert_eq!(mode(&path), 0o644);

        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();
        assert!(store.update_members("m_cluster", &addrs(&["b:9312"])).unwrap());
        assert_eq!(mode(&path), 0o640);
    }

    #[cfg(unix)]
    #[test]
    fn test_new_file_is_world_readable() {
        let (_dir, path) = state_file();
        let mut store = MembershipStore::open(&path);

        assert!(store.update_members("m_cluster", &addrs(&["a:9312"])).unwrap());
        assert_eq!(mode(&path), 0o644);
    }
}
