//! Filesystem seam for the rotation engine.
//!
//! Rotation and recovery only touch the disk through [`FileSystem`], so the
//! whole engine runs unchanged against [`OsFs`] in production and against
//! [`MemoryFs`] in tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// The operations the rotation engine needs from a filesystem.
pub trait FileSystem {
    type File: Read + Write;

    fn exists(&self, path: &Path) -> bool;

    /// Names of the entries in `dir`. A missing directory lists as empty.
    fn list_dir(&self, dir: &Path) -> io::Result<Vec<OsString>>;

    fn remove_file(&self, path: &Path) -> io::Result<()>;

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Open `path` for writing, creating it or truncating it to empty.
    fn create(&self, path: &Path) -> io::Result<Self::File>;

    /// Open `path` for reading from the start and appending at the end,
    /// creating it if missing.
    fn open_append(&self, path: &Path) -> io::Result<Self::File>;
}

/// The host filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFs;

impl FileSystem for OsFs {
    type File = File;

    fn exists(&self, path: &Path) -> bool {
        fs::symlink_metadata(path).is_ok()
    }

    fn list_dir(&self, dir: &Path) -> io::Result<Vec<OsString>> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err),
        };
        let mut names = Vec::new();
        for entry in entries {
            names.push(entry?.file_name());
        }
        Ok(names)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn create(&self, path: &Path) -> io::Result<File> {
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
    }

    fn open_append(&self, path: &Path) -> io::Result<File> {
        OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)
    }
}

// ============================================================================
// In-memory filesystem
// ============================================================================

#[derive(Debug, Default)]
struct Node {
    data: Vec<u8>,
    fail_writes: bool,
    fail_flush: bool,
}

type NodeRef = Rc<RefCell<Node>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Op {
    List,
    Remove,
    Rename,
    Create,
}

#[derive(Debug, Default)]
struct State {
    files: BTreeMap<PathBuf, NodeRef>,
    failures: BTreeSet<(Op, PathBuf)>,
}

/// A single-threaded in-memory filesystem.
///
/// Clones share the same state. Open handles follow their node across
/// renames and keep it alive after removal, like inodes do. Failures can be
/// injected per path and per operation.
#[derive(Debug, Clone, Default)]
pub struct MemoryFs {
    state: Rc<RefCell<State>>,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace `path` with `contents`.
    pub fn write(&self, path: impl AsRef<Path>, contents: impl AsRef<[u8]>) {
        let node = Node {
            data: contents.as_ref().to_vec(),
            ..Node::default()
        };
        self.state
            .borrow_mut()
            .files
            .insert(path.as_ref().to_path_buf(), Rc::new(RefCell::new(node)));
    }

    /// Contents of `path`, or `None` if it does not exist.
    pub fn read(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.state
            .borrow()
            .files
            .get(path.as_ref())
            .map(|node| node.borrow().data.clone())
    }

    /// Every existing path, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.state.borrow().files.keys().cloned().collect()
    }

    /// Fail `list_dir` on `dir`.
    pub fn fail_list(&self, dir: impl AsRef<Path>) {
        self.inject(Op::List, dir.as_ref());
    }

    pub fn fail_remove(&self, path: impl AsRef<Path>) {
        self.inject(Op::Remove, path.as_ref());
    }

    /// Fail renames whose source is `path`.
    pub fn fail_rename(&self, path: impl AsRef<Path>) {
        self.inject(Op::Rename, path.as_ref());
    }

    /// Fail `create` and `open_append` on `path`.
    pub fn fail_create(&self, path: impl AsRef<Path>) {
        self.inject(Op::Create, path.as_ref());
    }

    /// Make writes through handles on the node currently at `path` fail.
    pub fn fail_writes(&self, path: impl AsRef<Path>) {
        if let Some(node) = self.state.borrow().files.get(path.as_ref()) {
            node.borrow_mut().fail_writes = true;
        }
    }

    /// Make flushes through handles on the node currently at `path` fail.
    pub fn fail_flush(&self, path: impl AsRef<Path>) {
        if let Some(node) = self.state.borrow().files.get(path.as_ref()) {
            node.borrow_mut().fail_flush = true;
        }
    }

    fn inject(&self, op: Op, path: &Path) {
        self.state
            .borrow_mut()
            .failures
            .insert((op, path.to_path_buf()));
    }

    fn check(&self, op: Op, path: &Path) -> io::Result<()> {
        if self
            .state
            .borrow()
            .failures
            .contains(&(op, path.to_path_buf()))
        {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("injected {op:?} failure: {}", path.display()),
            ));
        }
        Ok(())
    }
}

fn parent_or_dot(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("no such file: {}", path.display()),
    )
}

impl FileSystem for MemoryFs {
    type File = MemoryFile;

    fn exists(&self, path: &Path) -> bool {
        self.state.borrow().files.contains_key(path)
    }

    fn list_dir(&self, dir: &Path) -> io::Result<Vec<OsString>> {
        self.check(Op::List, dir)?;
        let state = self.state.borrow();
        Ok(state
            .files
            .keys()
            .filter(|path| parent_or_dot(path) == dir)
            .filter_map(|path| path.file_name().map(|name| name.to_os_string()))
            .collect())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.check(Op::Remove, path)?;
        self.state
            .borrow_mut()
            .files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| not_found(path))
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.check(Op::Rename, from)?;
        let mut state = self.state.borrow_mut();
        let node = state.files.remove(from).ok_or_else(|| not_found(from))?;
        state.files.insert(to.to_path_buf(), node);
        Ok(())
    }

    fn create(&self, path: &Path) -> io::Result<MemoryFile> {
        self.check(Op::Create, path)?;
        let node: NodeRef = Rc::new(RefCell::new(Node::default()));
        self.state
            .borrow_mut()
            .files
            .insert(path.to_path_buf(), Rc::clone(&node));
        Ok(MemoryFile { node, read_pos: 0 })
    }

    fn open_append(&self, path: &Path) -> io::Result<MemoryFile> {
        self.check(Op::Create, path)?;
        let node = Rc::clone(
            self.state
                .borrow_mut()
                .files
                .entry(path.to_path_buf())
                .or_default(),
        );
        Ok(MemoryFile { node, read_pos: 0 })
    }
}

/// Handle on a [`MemoryFs`] node. Reads advance from the start, writes
/// always append.
#[derive(Debug)]
pub struct MemoryFile {
    node: NodeRef,
    read_pos: usize,
}

impl Read for MemoryFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let node = self.node.borrow();
        let remaining = node.data.get(self.read_pos..).unwrap_or_default();
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.read_pos += n;
        Ok(n)
    }
}

impl Write for MemoryFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut node = self.node.borrow_mut();
        if node.fail_writes {
            return Err(io::Error::new(io::ErrorKind::Other, "injected write failure"));
        }
        node.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.node.borrow().fail_flush {
            return Err(io::Error::new(io::ErrorKind::Other, "injected flush failure"));
        }
        Ok(())
    }
}
