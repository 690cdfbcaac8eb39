use crate::config::Config;
use crate::prediction::{cutoff_for, Prediction, PredictionContent, PredictionStore};
use crate::sources::{GenerateError, MemeDir, PhraseSource};
use chrono::{NaiveDateTime, NaiveTime};
use std::path::PathBuf;
use std::sync::Mutex;

/// A prediction handed to the delivery side, with a flag telling whether it
/// came from the cache or was generated for this request. The original bot
/// uses a different caption for each case.
pub struct Issued {
    pub prediction: Prediction,
    pub from_cache: bool,
}

/// Holds the per-user prediction cache and the two content sources. One
/// instance lives for the whole process; tests build their own.
pub struct PredictionService {
    store: Mutex<PredictionStore>,
    phrases: PhraseSource,
    memes: MemeDir,
    text_only: bool,
    reset_at: NaiveTime,
}

impl PredictionService {
    pub fn new(config: &Config) -> Self {
        Self {
            store: Mutex::new(PredictionStore::new()),
            phrases: PhraseSource::new(&config.phrases_file),
            memes: MemeDir::new(&config.memes_dir),
            text_only: config.text_only,
            reset_at: config.reset_at,
        }
    }

    /// Returns the user's stored prediction if it is still valid under the
    /// daily reset policy, otherwise generates a fresh one and stores it.
    /// On a generation failure the store keeps whatever it had for the user.
    pub async fn get_or_create(
        &self,
        user_id: u64,
        now: NaiveDateTime,
    ) -> Result<Issued, GenerateError> {
        let cutoff_today = cutoff_for(now, self.reset_at);

        {
            let store = self.store.lock().unwrap();
            if let Some(existing) = store.get(user_id) {
                if existing.is_valid_at(now, cutoff_today) {
                    return Ok(Issued {
                        prediction: existing.clone(),
                        from_cache: true,
                    });
                }
            }
        }

        // The lock is not held across the file reads, so two in-flight
        // requests from the same user may both generate; last write wins.
        let prediction = self.generate(now).await?;
        self.store
            .lock()
            .unwrap()
            .insert(user_id, prediction.clone());

        Ok(Issued {
            prediction,
            from_cache: false,
        })
    }

    async fn generate(&self, now: NaiveDateTime) -> Result<Prediction, GenerateError> {
        let content = if self.text_only || rand::random::<bool>() {
            PredictionContent::Phrase(self.phrases.pick().await?)
        } else {
            PredictionContent::Image(self.memes.pick().await?)
        };

        Ok(Prediction {
            created_at: now,
            content,
        })
    }

    /// Resolves an `Image` file name against the meme directory so the
    /// delivery side can attach it.
    pub fn image_path(&self, file_name: &str) -> PathBuf {
        self.memes.resolve(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Write;
    use std::path::Path;
    use tempfile::tempdir;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn service(phrases_file: &Path, memes_dir: &Path, text_only: bool) -> PredictionService {
        let config = Config {
            discord_token: String::new(),
            phrases_file: phrases_file.to_path_buf(),
            memes_dir: memes_dir.to_path_buf(),
            text_only,
            reset_at: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
        };
        PredictionService::new(&config)
    }

    fn write_phrases(dir: &Path, lines: &str) -> PathBuf {
        let path = dir.join("predictions.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{lines}").unwrap();
        path
    }

    #[tokio::test]
    async fn repeated_calls_in_the_same_window_return_the_same_prediction() {
        let dir = tempdir().unwrap();
        let phrases = write_phrases(dir.path(), "a\nb\nc\nd\ne\nf\n");
        let service = service(&phrases, dir.path(), true);

        let first = service.get_or_create(7, at(1, 10, 0)).await.unwrap();
        let second = service.get_or_create(7, at(1, 10, 0)).await.unwrap();

        assert!(!first.from_cache);
        assert!(second.from_cache);
        assert_eq!(first.prediction, second.prediction);
    }

    #[tokio::test]
    async fn regenerates_on_the_first_query_after_the_cutoff() {
        let dir = tempdir().unwrap();
        let phrases = write_phrases(dir.path(), "only\n");
        let service = service(&phrases, dir.path(), true);

        let early = service.get_or_create(7, at(1, 5, 0)).await.unwrap();
        assert!(!early.from_cache);

        let still_early = service.get_or_create(7, at(1, 5, 30)).await.unwrap();
        assert!(still_early.from_cache);

        let late = service.get_or_create(7, at(1, 6, 30)).await.unwrap();
        assert!(!late.from_cache);
        assert_eq!(late.prediction.created_at, at(1, 6, 30));
    }

    #[tokio::test]
    async fn post_cutoff_prediction_carries_over_to_the_next_morning() {
        let dir = tempdir().unwrap();
        let phrases = write_phrases(dir.path(), "a\nb\nc\n");
        let service = service(&phrases, dir.path(), true);

        let evening = service.get_or_create(7, at(1, 7, 0)).await.unwrap();
        let night = service.get_or_create(7, at(1, 23, 0)).await.unwrap();
        let next_morning = service.get_or_create(7, at(2, 5, 0)).await.unwrap();

        assert!(night.from_cache);
        assert!(next_morning.from_cache);
        assert_eq!(evening.prediction, next_morning.prediction);
    }

    #[tokio::test]
    async fn text_only_never_produces_an_image() {
        let dir = tempdir().unwrap();
        let phrases = write_phrases(dir.path(), "fate\n");
        // Point the meme dir somewhere that does not exist: an image pick
        // would fail loudly instead of slipping through.
        let service = service(&phrases, &dir.path().join("no-memes"), true);

        for user_id in 0..100u64 {
            let issued = service.get_or_create(user_id, at(1, 10, 0)).await.unwrap();
            assert!(matches!(
                issued.prediction.content,
                PredictionContent::Phrase(_)
            ));
        }
    }

    #[tokio::test]
    async fn failed_generation_leaves_the_stored_prediction_in_place() {
        let dir = tempdir().unwrap();
        let phrases = write_phrases(dir.path(), "keep me\n");
        let service = service(&phrases, dir.path(), true);

        let first = service.get_or_create(7, at(1, 5, 0)).await.unwrap();

        std::fs::remove_file(&phrases).unwrap();
        let failed = service.get_or_create(7, at(1, 6, 30)).await;
        assert!(matches!(failed, Err(GenerateError::SourceUnavailable(_))));

        // The stale entry was not evicted, so a pre-cutoff query the next
        // day still finds it (the sticky branch of the validity rule).
        let next_morning = service.get_or_create(7, at(2, 5, 0)).await.unwrap();
        assert!(next_morning.from_cache);
        assert_eq!(first.prediction, next_morning.prediction);
    }

    #[tokio::test]
    async fn distinct_users_get_independent_entries() {
        let dir = tempdir().unwrap();
        let phrases = write_phrases(dir.path(), "x\n");
        let service = service(&phrases, dir.path(), true);

        let a = service.get_or_create(1, at(1, 10, 0)).await.unwrap();
        let b = service.get_or_create(2, at(1, 10, 0)).await.unwrap();

        assert!(!a.from_cache);
        assert!(!b.from_cache);
    }

    #[tokio::test]
    async fn image_path_joins_the_meme_directory() {
        let dir = tempdir().unwrap();
        let phrases = write_phrases(dir.path(), "x\n");
        let service = service(&phrases, dir.path(), false);

        assert_eq!(service.image_path("cat.png"), dir.path().join("cat.png"));
    }
}
