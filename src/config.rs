use chrono::NaiveTime;
use std::env;
use std::path::PathBuf;

pub struct Config {
    pub discord_token: String,
    pub phrases_file: PathBuf,
    pub memes_dir: PathBuf,
    pub text_only: bool,
    /// Local time of day at which everyone's prediction resets.
    pub reset_at: NaiveTime,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let discord_token = env::var("DISCORD_TOKEN").map_err(|_| "DISCORD_TOKEN must be set")?;

        let phrases_file = env::var("PREDICTION_PHRASES_FILE")
            .unwrap_or_else(|_| "./predictions.txt".to_string())
            .into();
        let memes_dir = env::var("PREDICTION_MEMES_DIR")
            .unwrap_or_else(|_| "./prediction_memes".to_string())
            .into();

        let text_only = matches!(
            env::var("TEXT_ONLY").as_deref(),
            Ok("1") | Ok("true") | Ok("TRUE")
        );

        let reset_raw =
            env::var("PREDICTION_RESET_TIME").unwrap_or_else(|_| "06:00".to_string());
        let reset_at = NaiveTime::parse_from_str(&reset_raw, "%H:%M")
            .map_err(|_| "PREDICTION_RESET_TIME must be HH:MM")?;

        Ok(Self {
            discord_token,
            phrases_file,
            memes_dir,
            text_only,
            reset_at,
        })
    }
}
