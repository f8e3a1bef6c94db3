use crate::constants::DOWNLOAD_STEM;
use crate::models::ImageHandle;
use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::PathBuf;

/// Give up looking for a free file name after this many numbered candidates
const MAX_SUFFIX: usize = 999;

/// Saves generated images into the download directory
#[derive(Debug, Clone)]
pub struct Downloads {
    dir: PathBuf,
}

impl Downloads {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Downloads { dir: dir.into() }
    }

    /// Ensure download directory exists
    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)
                .with_context(|| format!("creating {}", self.dir.display()))?;
        }
        Ok(())
    }

    /// Write the image as `generated_image.<ext>`, or `generated_image (n).<ext>`
    /// when that name is taken. Existing files are never overwritten.
    pub fn save(&self, image: &ImageHandle) -> Result<PathBuf> {
        self.save_with(image, |file, bytes| file.write_all(bytes))
    }

    /// `save` with the write step supplied; a failed write removes the
    /// partially written file so its name stays free
    fn save_with<F>(&self, image: &ImageHandle, write: F) -> Result<PathBuf>
    where
        F: Fn(&mut File, &[u8]) -> io::Result<()>,
    {
        self.ensure_dir()?;
        let extension = image.format().extension();

        for n in 0..=MAX_SUFFIX {
            let path = self.dir.join(candidate_name(extension, n));
            // create_new makes the existence check and the create one step
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    if let Err(e) = write(&mut file, image.bytes()) {
                        drop(file);
                        let _ = fs::remove_file(&path);
                        return Err(e).with_context(|| format!("writing {}", path.display()));
                    }
                    return Ok(path);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(e).with_context(|| format!("creating {}", path.display()));
                }
            }
        }

        anyhow::bail!(
            "no free file name for {} in {}",
            DOWNLOAD_STEM,
            self.dir.display()
        )
    }
}

fn candidate_name(extension: &str, n: usize) -> String {
    if n == 0 {
        format!("{}.{}", DOWNLOAD_STEM, extension)
    } else {
        format!("{} ({}).{}", DOWNLOAD_STEM, n, extension)
    }
}
