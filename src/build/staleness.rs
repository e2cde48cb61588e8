use std::fs;
use std::path::Path;

/// Decide whether `object` has to be rebuilt from `source`.
///
/// Stale when the object is missing, when the source is strictly newer, or
/// when either timestamp cannot be read. Errors never count as fresh.
pub fn needs_recompile(source: &Path, object: &Path) -> bool {
    if !object.exists() {
        return true;
    }
    let src_time = fs::metadata(source).and_then(|m| m.modified());
    let obj_time = fs::metadata(object).and_then(|m| m.modified());
    match (src_time, obj_time) {
        (Ok(src), Ok(obj)) => src > obj,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::{Duration, SystemTime};

    fn set_mtime(path: &Path, time: SystemTime) {
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(time)
            .unwrap();
    }

    #[test]
    fn test_missing_object_is_stale() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("a.cpp");
        fs::write(&src, "int a;").unwrap();
        assert!(needs_recompile(&src, &tmp.path().join("a.o")));
    }

    #[test]
    fn test_object_newer_than_source_is_fresh() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("a.cpp");
        let obj = tmp.path().join("a.o");
        fs::write(&src, "int a;").unwrap();
        fs::write(&obj, "").unwrap();
        let now = SystemTime::now();
        set_mtime(&src, now - Duration::from_secs(60));
        set_mtime(&obj, now);
        assert!(!needs_recompile(&src, &obj));
    }

    #[test]
    fn test_equal_timestamps_are_fresh() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("a.cpp");
        let obj = tmp.path().join("a.o");
        fs::write(&src, "int a;").unwrap();
        fs::write(&obj, "").unwrap();
        let t = SystemTime::now() - Duration::from_secs(10);
        set_mtime(&src, t);
        set_mtime(&obj, t);
        assert!(!needs_recompile(&src, &obj));
    }

    #[test]
    fn test_touched_source_is_stale() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("a.cpp");
        let obj = tmp.path().join("a.o");
        fs::write(&src, "int a;").unwrap();
        fs::write(&obj, "").unwrap();
        let now = SystemTime::now();
        set_mtime(&obj, now - Duration::from_secs(60));
        set_mtime(&src, now);
        assert!(needs_recompile(&src, &obj));
    }

    #[test]
    fn test_unreadable_source_fails_open() {
        let tmp = tempfile::tempdir().unwrap();
        let obj = tmp.path().join("a.o");
        fs::write(&obj, "").unwrap();
        assert!(needs_recompile(&tmp.path().join("gone.cpp"), &obj));
    }
}
