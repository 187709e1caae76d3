//! Generation driver: discover → assemble → emit → write.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::config::GenConfig;
use crate::discover::discover;
use crate::emit::render;
use crate::error::{SqlGenError, SqlGenResult};
use crate::group::{QueryGroup, assemble_all};

/// Output of a generation run.
#[derive(Debug, Clone)]
pub struct Generated {
    /// Rendered Rust source.
    pub source: String,
    pub groups: Vec<QueryGroup>,
}

/// Run the pipeline over `config.root` and render the result.
pub fn generate(config: &GenConfig) -> SqlGenResult<Generated> {
    let options = config.emit_options()?;
    let style = options.style;
    info!(
        root = %config.root.display(),
        style = %style,
        combine = config.combine_duplicates,
        "generating query structs"
    );

    let sources = discover(&config.root, &config.extension, config.max_file_bytes)?;
    let groups = assemble_all(&sources, style, config.combine_duplicates)?;
    let source = render(&groups, &options);

    info!(queries = groups.len(), "generation complete");
    Ok(Generated { source, groups })
}

/// Generate and write to `config.out`, or to `stdout` when no output is set.
pub fn run(config: &GenConfig, stdout: &mut impl Write) -> SqlGenResult<Generated> {
    // Fail on bad permissions before doing any work.
    let mode = config.mode()?;
    let generated = generate(config)?;

    match &config.out {
        Some(path) => write_output(path, &generated.source, mode)?,
        None => stdout.write_all(generated.source.as_bytes())?,
    }

    Ok(generated)
}

/// Write `contents` to `path` through a temporary file in the same
/// directory, so readers never observe a partial file.
pub fn write_output(path: &Path, contents: &str, mode: u32) -> SqlGenResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(|e| SqlGenError::write(dir, e))?;
    file.write_all(contents.as_bytes())
        .and_then(|()| file.as_file().sync_all())
        .and_then(|()| set_mode(file.as_file(), mode))
        .map_err(|e| SqlGenError::write(path, e))?;
    file.persist(path).map_err(|e| SqlGenError::write(path, e.error))?;

    debug!(path = %path.display(), mode = %format!("{:o}", mode), "wrote output");
    Ok(())
}

#[cfg(unix)]
fn set_mode(file: &std::fs::File, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(std::fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_file: &std::fs::File, _mode: u32) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_write_output_replaces_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.rs");
        fs::write(&path, "old").unwrap();

        write_output(&path, "new", 0o644).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_output_sets_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.rs");
        write_output(&path, "x", 0o600).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_run_rejects_bad_perms_first() {
        let config = GenConfig {
            root: "/definitely/not/here".into(),
            perms: "abc".to_string(),
            ..GenConfig::default()
        };
        let mut out = Vec::new();
        let err = run(&config, &mut out).unwrap_err();
        assert!(matches!(err, SqlGenError::InvalidPermissions(_)));
        assert!(out.is_empty());
    }
}
