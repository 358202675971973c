//! Property-based tests for upload paths

use std::collections::HashSet;

use proptest::prelude::*;
use uuid::Uuid;

use account_portal::services::object_path;

proptest! {
    #[test]
    fn test_path_stays_in_principal_folder(bytes in any::<[u8; 16]>(), file_name in ".*") {
        let principal = Uuid::from_bytes(bytes);
        let path = object_path(principal, &file_name);

        let (folder, file) = path.split_once('/').unwrap();
        prop_assert_eq!(folder, principal.to_string());
        prop_assert!(!file.contains('/'));
        prop_assert!(!file.contains('\\'));

        let (stem, ext) = file.rsplit_once('.').unwrap();
        prop_assert!(Uuid::parse_str(stem).is_ok());
        prop_assert!(!ext.is_empty() && ext.len() <= 10);
        prop_assert!(ext.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_paths_never_collide(file_name in "[a-z]{1,8}\\.(png|jpg|gif)", count in 2usize..50) {
        let principal = Uuid::new_v4();
        let paths: HashSet<String> = (0..count).map(|_| object_path(principal, &file_name)).collect();
        prop_assert_eq!(paths.len(), count);
    }
}
