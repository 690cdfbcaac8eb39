use rand::seq::SliceRandom;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("prediction source unavailable: {0}")]
    SourceUnavailable(#[from] std::io::Error),

    #[error("prediction source has no usable entries")]
    EmptySource,
}

/// Newline-delimited list of candidate phrases.
pub struct PhraseSource {
    path: PathBuf,
}

impl PhraseSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Picks one line uniformly at random. The file is re-read in full on
    /// every call so the phrase list can be edited without a restart.
    pub async fn pick(&self) -> Result<String, GenerateError> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .collect();

        let mut rng = rand::thread_rng();
        match lines.choose(&mut rng) {
            Some(line) => Ok((*line).to_string()),
            None => Err(GenerateError::EmptySource),
        }
    }
}

/// Directory of meme images. Entries are opaque file names; content is
/// never validated.
pub struct MemeDir {
    dir: PathBuf,
}

impl MemeDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Picks one entry's file name uniformly at random.
    pub async fn pick(&self) -> Result<String, GenerateError> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }

        let mut rng = rand::thread_rng();
        match names.choose(&mut rng) {
            Some(name) => Ok(name.clone()),
            None => Err(GenerateError::EmptySource),
        }
    }

    /// Full path for a previously picked file name, for the delivery side.
    pub fn resolve(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }
}
