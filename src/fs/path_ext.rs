use std::{
    fs::{create_dir, create_dir_all, read_to_string, write},
    io,
    path::Path,
};

/// Options for controlling [`PathExt::mkdir`]
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum MkdirOptions {
    /// Equivalent of `mkdir $path`.
    WithoutParents,
    /// Equivalent of `mkdir -p $path`.
    WithParents,
}

mod sealed {
    use std::path::Path;

    pub trait Sealed {}
    impl Sealed for Path {}
}

/// Extension trait for [`Path`] with the filesystem operations used by this crate.
///
/// ```rust,no_run
/// # use fhs::fs::path_ext::*;
/// # use std::path::Path;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let path = Path::new("/tmp/fhs-demo/config.ini");
/// path.write_creating_parents("answer = 42\n")?;
/// assert_eq!(path.read_if_exists()?.as_deref(), Some("answer = 42\n"));
/// # Ok(())
/// # }
/// ```
pub trait PathExt: sealed::Sealed {
    /// Create directories at given [`Path`].
    ///
    /// # Returns
    /// [`Ok(())`](Ok) if created successfully, otherwise error, as reported by
    /// [`create_dir`], or [`create_dir_all`].
    ///
    /// Note that this function will return `Ok(())`, if [`create_dir`] returns `Err` with kind
    /// [`ErrorKind::AlreadyExists`](io::ErrorKind::AlreadyExists).
    fn mkdir(&self, opts: MkdirOptions) -> io::Result<()>;

    /// Read `self` as UTF-8 text, treating a missing file as [`None`].
    ///
    /// Every other error, including a directory in place of the file, is reported.
    fn read_if_exists(&self) -> io::Result<Option<String>>;

    /// Write `contents` into `self`, creating its parent directories first.
    fn write_creating_parents(&self, contents: impl AsRef<[u8]>) -> io::Result<()>;
}

impl PathExt for Path {
    fn mkdir(&self, opts: MkdirOptions) -> io::Result<()> {
        let result = match opts {
            MkdirOptions::WithoutParents => create_dir(self),
            MkdirOptions::WithParents => create_dir_all(self),
        };
        match result {
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && self.is_dir() => Ok(()),
            _ => result,
        }
    }

    fn read_if_exists(&self) -> io::Result<Option<String>> {
        match read_to_string(self) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write_creating_parents(&self, contents: impl AsRef<[u8]>) -> io::Result<()> {
        if let Some(parent) = self.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            parent.mkdir(MkdirOptions::WithParents)?;
        }
        write(self, contents)
    }
}
