//! Integration tests for primitive and mutation behavior across entry kinds.
//!
//! Each operation is exercised against:
//! - a regular file
//! - a directory (empty and non-empty)
//! - a symlink to a file, a symlink to a directory, and a dangling symlink
//!
//! Operations tested:
//! - stat / lstat / readdir / readlink
//! - write_file / append_file / truncate through links
//! - unlink / rmdir / rename
//! - resolution of `..`, relative targets and loops

use rusty_memfs_vfs::{ErrorCode, Filesystem, INodeType, Metadata, VfsError, VfsOptions};

/// Build the shared fixture.
///
/// ```text
/// /
/// ├── file        "content"
/// ├── dir/
/// │   └── inner   "x"
/// ├── empty/
/// ├── to_file  -> /file
/// ├── to_dir   -> dir
/// └── dangling -> /nowhere
/// ```
async fn create_test_env() -> Filesystem {
    let fs: Filesystem = Filesystem::new();
    fs.write_file("/file", "content").await.unwrap();
    fs.mkdir("/dir").await.unwrap();
    fs.write_file("/dir/inner", "x").await.unwrap();
    fs.mkdir("/empty").await.unwrap();
    fs.symlink("/file", "/to_file").await.unwrap();
    fs.symlink("dir", "/to_dir").await.unwrap();
    fs.symlink("/nowhere", "/dangling").await.unwrap();
    fs
}

fn code<T: std::fmt::Debug>(result: Result<T, VfsError>) -> ErrorCode {
    result.unwrap_err().code()
}

// ============================================================================
// Read primitives
// ============================================================================

#[tokio::test]
async fn stat_follows_every_link() {
    let fs: Filesystem = create_test_env().await;

    let file: Metadata = fs.stat("/to_file").await.unwrap();
    assert_eq!(file.kind, INodeType::File);
    assert_eq!(file.size, 7);
    assert_eq!(file.nlink, 1);

    let dir: Metadata = fs.stat("/to_dir").await.unwrap();
    assert_eq!(dir.kind, INodeType::Directory);
    assert_eq!(dir.ino, fs.stat("/dir").await.unwrap().ino);

    assert_eq!(code(fs.stat("/dangling").await), ErrorCode::NotFound);
}

#[tokio::test]
async fn lstat_reports_the_link_itself() {
    let fs: Filesystem = create_test_env().await;

    for (path, target) in [("/to_file", "/file"), ("/to_dir", "dir"), ("/dangling", "/nowhere")] {
        let meta: Metadata = fs.lstat(path).await.unwrap();
        assert_eq!(meta.kind, INodeType::Symlink, "{}", path);
        assert_eq!(meta.size, target.chars().count() as u64, "{}", path);
        assert_eq!(meta.target.as_deref(), Some(target), "{}", path);
        assert_eq!(fs.readlink(path).await.unwrap(), target);
    }
    assert_eq!(fs.lstat("/dir").await.unwrap().size, 0);
}

#[tokio::test]
async fn readdir_per_kind() {
    let fs: Filesystem = create_test_env().await;

    assert_eq!(
        fs.readdir("/").await.unwrap(),
        vec!["file", "dir", "empty", "to_file", "to_dir", "dangling"]
    );
    assert_eq!(fs.readdir("/to_dir").await.unwrap(), vec!["inner"]);
    assert!(fs.readdir("/empty").await.unwrap().is_empty());
    assert_eq!(code(fs.readdir("/file").await), ErrorCode::NotADirectory);
    assert_eq!(code(fs.readdir("/to_file").await), ErrorCode::NotADirectory);
    assert_eq!(code(fs.readdir("/dangling").await), ErrorCode::NotFound);
}

#[tokio::test]
async fn readlink_on_non_links() {
    let fs: Filesystem = create_test_env().await;

    assert_eq!(code(fs.readlink("/file").await), ErrorCode::NotASymlink);
    assert_eq!(code(fs.readlink("/dir").await), ErrorCode::NotASymlink);
    assert_eq!(code(fs.readlink("/missing").await), ErrorCode::NotFound);
    assert_eq!(fs.readlink("/to_dir/../to_file").await.unwrap(), "/file");
}

#[tokio::test]
async fn traversal_through_a_file_fails() {
    let fs: Filesystem = create_test_env().await;

    assert_eq!(code(fs.stat("/file/x").await), ErrorCode::NotADirectory);
    assert_eq!(code(fs.stat("/to_file/x").await), ErrorCode::NotADirectory);
    assert_eq!(code(fs.write_file("/file/x", "y").await), ErrorCode::NotADirectory);
}

// ============================================================================
// Content mutations
// ============================================================================

#[tokio::test]
async fn writes_go_through_links() {
    let fs: Filesystem = create_test_env().await;

    fs.write_file("/to_file", "new").await.unwrap();
    assert_eq!(fs.read_file("/file").await.unwrap(), b"new");
    assert_eq!(fs.lstat("/to_file").await.unwrap().kind, INodeType::Symlink);

    fs.append_file("/to_dir/inner", "yz").await.unwrap();
    assert_eq!(fs.read_file("/dir/inner").await.unwrap(), b"xyz");

    fs.truncate("/to_file", 1).await.unwrap();
    assert_eq!(fs.read_file("/file").await.unwrap(), b"n");

    assert_eq!(code(fs.write_file("/dangling", "z").await), ErrorCode::NotFound);
    assert_eq!(code(fs.write_file("/to_dir", "z").await), ErrorCode::IsADirectory);
    assert_eq!(code(fs.truncate("/dir", 0).await), ErrorCode::IsADirectory);
}

#[tokio::test]
async fn creating_over_existing_names() {
    let fs: Filesystem = create_test_env().await;

    for path in ["/file", "/dir", "/to_file", "/dangling", "/"] {
        assert_eq!(code(fs.mkdir(path).await), ErrorCode::AlreadyExists, "{}", path);
        assert_eq!(
            code(fs.symlink("/x", path).await),
            ErrorCode::AlreadyExists,
            "{}",
            path
        );
    }
    assert_eq!(code(fs.mkdir("/missing/child").await), ErrorCode::NotFound);
}

// ============================================================================
// Removal
// ============================================================================

#[tokio::test]
async fn unlink_matrix() {
    let fs: Filesystem = create_test_env().await;

    assert_eq!(code(fs.unlink("/dir").await), ErrorCode::IsADirectory);
    fs.unlink("/to_dir").await.unwrap();
    assert!(fs.exists("/dir/inner").await);
    fs.unlink("/dangling").await.unwrap();
    fs.unlink("/file").await.unwrap();
    assert_eq!(code(fs.stat("/to_file").await), ErrorCode::NotFound);
    assert_eq!(code(fs.unlink("/file").await), ErrorCode::NotFound);
}

#[tokio::test]
async fn rmdir_matrix() {
    let fs: Filesystem = create_test_env().await;

    assert_eq!(code(fs.rmdir("/dir").await), ErrorCode::DirectoryNotEmpty);
    assert_eq!(code(fs.rmdir("/file").await), ErrorCode::NotADirectory);
    assert_eq!(code(fs.rmdir("/to_dir").await), ErrorCode::NotADirectory);
    assert_eq!(code(fs.rmdir("/").await), ErrorCode::Busy);
    fs.rmdir("/empty").await.unwrap();
    assert!(!fs.exists("/empty").await);
}

#[tokio::test]
async fn hard_links_share_content_until_last_entry_goes() {
    let fs: Filesystem = create_test_env().await;
    let before: usize = fs.inode_count().await;

    fs.link("/file", "/dir/alias").await.unwrap();
    assert_eq!(fs.stat("/file").await.unwrap().nlink, 2);
    assert_eq!(fs.inode_count().await, before);

    fs.write_file("/dir/alias", "shared").await.unwrap();
    assert_eq!(fs.read_file("/file").await.unwrap(), b"shared");

    fs.unlink("/file").await.unwrap();
    assert_eq!(fs.read_file("/dir/alias").await.unwrap(), b"shared");
    assert_eq!(fs.stat("/dir/alias").await.unwrap().nlink, 1);

    fs.unlink("/dir/alias").await.unwrap();
    assert_eq!(fs.inode_count().await, before - 1);
    assert_eq!(code(fs.link("/dir", "/dir2").await), ErrorCode::IsADirectory);
}

// ============================================================================
// Rename
// ============================================================================

#[tokio::test]
async fn rename_matrix() {
    let fs: Filesystem = create_test_env().await;

    fs.rename("/file", "/dir/moved").await.unwrap();
    assert_eq!(fs.read_file("/dir/moved").await.unwrap(), b"content");
    assert!(!fs.exists("/file").await);

    assert_eq!(code(fs.rename("/dir", "/dir/sub").await), ErrorCode::InvalidPath);
    assert_eq!(code(fs.rename("/dir/moved", "/empty").await), ErrorCode::IsADirectory);
    assert_eq!(code(fs.rename("/empty", "/dir/moved").await), ErrorCode::NotADirectory);
    assert_eq!(code(fs.rename("/empty", "/dir").await), ErrorCode::DirectoryNotEmpty);
    assert_eq!(code(fs.rename("/", "/x").await), ErrorCode::Busy);

    fs.rename("/dir", "/empty").await.unwrap();
    assert_eq!(fs.readdir("/empty").await.unwrap(), vec!["inner", "moved"]);
    assert_eq!(fs.readlink("/to_dir").await.unwrap(), "dir");
    assert_eq!(code(fs.stat("/to_dir").await), ErrorCode::NotFound);
}

// ============================================================================
// Resolution
// ============================================================================

#[tokio::test]
async fn dot_dot_never_leaves_root() {
    let fs: Filesystem = create_test_env().await;

    assert_eq!(fs.read_file("/../../file").await.unwrap(), b"content");
    assert_eq!(fs.read_file("/dir/../../file").await.unwrap(), b"content");
    assert_eq!(fs.stat("/..").await.unwrap().ino, fs.stat("/").await.unwrap().ino);
}

#[tokio::test]
async fn non_ascii_link_target_size_is_in_characters() {
    let fs: Filesystem = create_test_env().await;
    fs.write_file("/é", "accent").await.unwrap();
    fs.symlink("/é", "/to_accent").await.unwrap();

    assert_eq!(fs.lstat("/to_accent").await.unwrap().size, 2);
    assert_eq!(fs.stat("/to_accent").await.unwrap().size, 6);
}

#[tokio::test]
async fn dot_dot_after_symlink_names_one_object_for_every_operation() {
    let fs: Filesystem = Filesystem::new();
    fs.mkdir("/x").await.unwrap();
    fs.mkdir("/x/y").await.unwrap();
    fs.mkdir("/a").await.unwrap();
    fs.symlink("/x/y", "/a/deep").await.unwrap();

    // /a/deep/.. is /x, not /a.
    fs.write_file("/a/deep/../f", "hello").await.unwrap();
    assert_eq!(fs.read_file("/a/deep/../f").await.unwrap(), b"hello");
    assert_eq!(fs.readdir("/x").await.unwrap(), vec!["y", "f"]);
    assert_eq!(fs.readdir("/a").await.unwrap(), vec!["deep"]);

    fs.mkdir("/a/deep/../sub").await.unwrap();
    assert!(fs.stat("/x/sub").await.unwrap().is_dir());
    fs.symlink("f", "/a/deep/../link").await.unwrap();
    assert_eq!(fs.read_file("/x/link").await.unwrap(), b"hello");

    fs.rename("/a/deep/../f", "/a/deep/../g").await.unwrap();
    assert_eq!(fs.read_file("/x/g").await.unwrap(), b"hello");

    fs.unlink("/a/deep/../g").await.unwrap();
    assert!(!fs.exists("/x/g").await);
    fs.rmdir("/a/deep/../sub").await.unwrap();
    assert!(!fs.exists("/x/sub").await);
    assert!(fs.exists("/a/deep").await);

    assert_eq!(code(fs.mkdir("/a/deep/..").await), ErrorCode::InvalidPath);
    assert_eq!(code(fs.unlink("/a/..").await), ErrorCode::InvalidPath);
    assert_eq!(code(fs.rmdir("/..").await), ErrorCode::Busy);
}

#[tokio::test]
async fn relative_targets_resolve_from_link_directory() {
    let fs: Filesystem = create_test_env().await;
    fs.symlink("../file", "/dir/up_file").await.unwrap();
    fs.symlink("inner", "/dir/sibling").await.unwrap();

    assert_eq!(fs.read_file("/dir/up_file").await.unwrap(), b"content");
    assert_eq!(fs.read_file("/to_dir/sibling").await.unwrap(), b"x");
}

#[tokio::test]
async fn loops_fail_with_the_configured_bound() {
    let fs: Filesystem = Filesystem::with_options(VfsOptions::default().with_max_symlink_expansions(3));
    fs.symlink("/b", "/a").await.unwrap();
    fs.symlink("/a", "/b").await.unwrap();
    fs.symlink("/c2", "/c1").await.unwrap();
    fs.symlink("/c3", "/c2").await.unwrap();
    fs.write_file("/c3", "end").await.unwrap();

    let err: VfsError = fs.stat("/a").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::SymlinkLoop);
    assert_eq!(err.code().errno(), "ELOOP");

    assert_eq!(fs.lstat("/a").await.unwrap().kind, INodeType::Symlink);
    assert_eq!(fs.read_file("/c1").await.unwrap(), b"end");
}
