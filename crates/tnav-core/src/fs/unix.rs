//! POSIX user/group name lookup.

/// Returns the login name for `uid`, if the user database knows it.
pub fn user_name(uid: u32) -> Option<String> {
    uzers::get_user_by_uid(uid).map(|user| user.name().to_string_lossy().into_owned())
}

/// Returns the group name for `gid`, if the group database knows it.
pub fn group_name(gid: u32) -> Option<String> {
    uzers::get_group_by_gid(gid).map(|group| group.name().to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_user_has_a_name() {
        assert_eq!(user_name(0).as_deref(), Some("root"));
    }

    #[test]
    fn unassigned_uid_has_no_name() {
        assert_eq!(user_name(u32::MAX - 7), None);
    }

    #[test]
    fn current_user_matches_metadata_owner() {
        use std::os::unix::fs::MetadataExt;

        let tmp = tempfile::TempDir::new().unwrap();
        let uid = std::fs::metadata(tmp.path()).unwrap().uid();
        let current = uzers::get_current_username().map(|name| name.to_string_lossy().into_owned());
        assert_eq!(user_name(uid), current);
    }
}
