//! services/client/src/adapters/preview.rs
//!
//! Local voice preview. Resolves the bundled sample for a voice and hands it to
//! the platform player; nothing here waits on the network.

use std::path::{Path, PathBuf};
use storybook_core::{Voice, VoicePreview};
use tracing::{info, warn};

type PlayerHook = Box<dyn Fn(&Path) + Send + Sync>;

pub struct AssetVoicePreview {
    assets_dir: PathBuf,
    player: PlayerHook,
}

impl AssetVoicePreview {
    pub fn new(assets_dir: impl Into<PathBuf>, player: impl Fn(&Path) + Send + Sync + 'static) -> Self {
        Self {
            assets_dir: assets_dir.into(),
            player: Box::new(player),
        }
    }

    /// A preview that only logs the sample it would play, for headless runs.
    pub fn logging(assets_dir: impl Into<PathBuf>) -> Self {
        Self::new(assets_dir, |sample| {
            info!(sample = %sample.display(), "Playing voice preview");
        })
    }

    pub fn sample_path(&self, voice: Voice) -> PathBuf {
        self.assets_dir.join(format!("voice_{}.wav", voice.as_str()))
    }
}

impl VoicePreview for AssetVoicePreview {
    fn play(&self, voice: Voice) {
        let sample = self.sample_path(voice);
        if !sample.exists() {
            warn!(sample = %sample.display(), "Voice preview sample is missing");
            return;
        }
        (self.player)(&sample);
    }
}
