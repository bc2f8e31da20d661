use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use tar::Archive;
use tempfile::TempDir;
use tracing::debug;

use crate::error::AstgenError;

/// Member of a `.gem` holding the packaged sources.
const GEM_DATA_MEMBER: &str = "data.tar.gz";

/// Packed inputs that are unpacked before discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// Plain tar with `metadata.gz`, `data.tar.gz` and checksums
    Gem,
    TarGz,
}

impl ArchiveKind {
    pub fn of(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_ascii_lowercase();
        if name.ends_with(".gem") {
            Some(ArchiveKind::Gem)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(ArchiveKind::TarGz)
        } else {
            None
        }
    }

    fn suffix_len(&self, name: &str) -> usize {
        let lower = name.to_ascii_lowercase();
        match self {
            ArchiveKind::Gem => ".gem".len(),
            ArchiveKind::TarGz if lower.ends_with(".tgz") => ".tgz".len(),
            ArchiveKind::TarGz => ".tar.gz".len(),
        }
    }

    /// File name without the archive suffix, e.g. `rack-3.0.8` for `rack-3.0.8.gem`.
    pub fn stem<'a>(&self, name: &'a str) -> &'a str {
        let len = self.suffix_len(name);
        name.get(..name.len().saturating_sub(len)).unwrap_or(name)
    }

    fn prefix(&self) -> &'static str {
        match self {
            ArchiveKind::Gem => "gem-",
            ArchiveKind::TarGz => "archive-",
        }
    }
}

/// Archive contents in a temporary directory, removed on drop.
#[derive(Debug)]
pub struct UnpackedArchive {
    dir: TempDir,
}

impl UnpackedArchive {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

pub fn unpack_archive(path: &Path, kind: ArchiveKind) -> Result<UnpackedArchive, AstgenError> {
    let unpack = || -> io::Result<TempDir> {
        let dir = tempfile::Builder::new().prefix(kind.prefix()).tempdir()?;
        let file = BufReader::new(File::open(path)?);
        match kind {
            ArchiveKind::TarGz => Archive::new(GzDecoder::new(file)).unpack(dir.path())?,
            ArchiveKind::Gem => unpack_gem_data(file, dir.path())?,
        }
        Ok(dir)
    };

    let dir = unpack().map_err(|source| AstgenError::Unpack {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Unpacked {} into {}", path.display(), dir.path().display());
    Ok(UnpackedArchive { dir })
}

fn unpack_gem_data(gem: impl io::Read, target: &Path) -> io::Result<()> {
    let mut outer = Archive::new(gem);
    for entry in outer.entries()? {
        let entry = entry?;
        let is_data = entry.path()?.as_ref() == Path::new(GEM_DATA_MEMBER);
        if is_data {
            return Archive::new(GzDecoder::new(entry)).unpack(target);
        }
    }
    Err(io::Error::new(
        io::ErrorKind::InvalidData,
        format!("no {} member", GEM_DATA_MEMBER),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::fs;

    fn append(builder: &mut tar::Builder<impl io::Write>, path: &str, content: &[u8]) {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        builder.append_data(&mut header, path, content).unwrap();
    }

    fn tar_gz(files: &[(&str, &str)]) -> Vec<u8> {
        let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
        for (path, content) in files {
            append(&mut builder, path, content.as_bytes());
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    #[test]
    fn test_kind_from_file_name() {
        assert_eq!(ArchiveKind::of(Path::new("/tmp/rack-3.0.8.gem")), Some(ArchiveKind::Gem));
        assert_eq!(ArchiveKind::of(Path::new("src.tar.gz")), Some(ArchiveKind::TarGz));
        assert_eq!(ArchiveKind::of(Path::new("SRC.TGZ")), Some(ArchiveKind::TarGz));
        assert_eq!(ArchiveKind::of(Path::new("lib/a.rb")), None);
        assert_eq!(ArchiveKind::Gem.stem("rack-3.0.8.gem"), "rack-3.0.8");
        assert_eq!(ArchiveKind::TarGz.stem("src.tar.gz"), "src");
        assert_eq!(ArchiveKind::TarGz.stem("src.tgz"), "src");
    }

    #[test]
    fn test_unpack_tar_gz() {
        let tmp = TempDir::new().unwrap();
        let archive = tmp.path().join("pkg.tar.gz");
        fs::write(&archive, tar_gz(&[("pkg/lib/a.rb", "puts 1\n")])).unwrap();

        let unpacked = unpack_archive(&archive, ArchiveKind::TarGz).unwrap();
        let content = fs::read_to_string(unpacked.path().join("pkg/lib/a.rb")).unwrap();
        assert_eq!(content, "puts 1\n");

        let dir = unpacked.path().to_path_buf();
        drop(unpacked);
        assert!(!dir.exists());
    }

    #[test]
    fn test_unpack_gem_takes_data_member() {
        let tmp = TempDir::new().unwrap();
        let data = tar_gz(&[("lib/demo.rb", "exit\n")]);
        let mut gem = tar::Builder::new(Vec::new());
        append(&mut gem, "metadata.gz", b"not inspected");
        append(&mut gem, GEM_DATA_MEMBER, &data);
        let archive = tmp.path().join("demo-1.0.gem");
        fs::write(&archive, gem.into_inner().unwrap()).unwrap();

        let unpacked = unpack_archive(&archive, ArchiveKind::Gem).unwrap();
        assert!(unpacked.path().join("lib/demo.rb").is_file());
        assert!(!unpacked.path().join("metadata.gz").exists());
    }

    #[test]
    fn test_gem_without_data_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let mut gem = tar::Builder::new(Vec::new());
        append(&mut gem, "metadata.gz", b"only metadata");
        let archive = tmp.path().join("empty-1.0.gem");
        fs::write(&archive, gem.into_inner().unwrap()).unwrap();

        let err = unpack_archive(&archive, ArchiveKind::Gem).unwrap_err();
        assert!(matches!(err, AstgenError::Unpack { .. }));
        assert!(err.is_fatal());
    }
}
