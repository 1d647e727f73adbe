//! Shell utilities over the rusty-memfs virtual filesystem.
//!
//! The [`du`] module holds the disk-usage engine. It depends only on the
//! [`FsPrimitives`](rusty_memfs_vfs::FsPrimitives) contract, so it can run
//! against a live [`Filesystem`](rusty_memfs_vfs::Filesystem), a
//! [`Snapshot`](rusty_memfs_vfs::Snapshot), or any other implementation.
//! [`Shell`] adds a working directory and the usual file utilities.
//!
//! # Example
//!
//! ```ignore
//! use rusty_memfs_shell::{DuOptions, Shell, SizeUnit};
//! use rusty_memfs_vfs::Filesystem;
//!
//! let shell = Shell::new(Filesystem::new());
//! shell.mkdirp("/d1").await?;
//! shell.filesystem().write_file("/d1/f1", "hi").await?;
//!
//! let report = shell.du("/", &DuOptions::default().with_unit(SizeUnit::Kb)).await?;
//! assert_eq!(report.total, 0.002);
//! ```

pub mod du;
pub mod ls;
pub mod shell;

pub use du::{compute_usage, DuOptions, ParseSizeUnitError, SizeUnit, UsageEntry, UsageReport};
pub use ls::{list_dir, LsEntry};
pub use shell::Shell;
