use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::api::error::{EngineError, Result};

/// Handle to one playback started by [`SoundManager::play`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayerId(pub u32);

/// Audio output backend. The engine only passes play/stop/volume through.
pub trait AudioSink: Send {
    fn play(&mut self, player: PlayerId, clip: &[u8], looping: bool, volume: f32);
    fn stop(&mut self, player: PlayerId);
    fn set_volume(&mut self, player: PlayerId, volume: f32);
}

/// Sink that discards all audio. The default; the `audio` feature adds a
/// `RodioSink` that plays through the output device.
#[derive(Debug, Default)]
pub struct NullSink;

impl AudioSink for NullSink {
    fn play(&mut self, player: PlayerId, clip: &[u8], looping: bool, _volume: f32) {
        log::trace!("audio: play {:?} ({} bytes, looping={})", player, clip.len(), looping);
    }

    fn stop(&mut self, player: PlayerId) {
        log::trace!("audio: stop {:?}", player);
    }

    fn set_volume(&mut self, _player: PlayerId, _volume: f32) {}
}

struct Playback {
    clip: String,
    level: u8,
}

/// Named sound clips and the playbacks started from them.
pub struct SoundManager {
    clips: HashMap<String, Arc<[u8]>>,
    players: HashMap<PlayerId, Playback>,
    sink: Box<dyn AudioSink>,
    next_player: u32,
}

impl SoundManager {
    pub fn new() -> Self {
        Self::with_sink(Box::new(NullSink))
    }

    pub fn with_sink(sink: Box<dyn AudioSink>) -> Self {
        Self {
            clips: HashMap::new(),
            players: HashMap::new(),
            sink,
            next_player: 1,
        }
    }

    pub fn set_sink(&mut self, sink: Box<dyn AudioSink>) {
        self.stop_all();
        self.sink = sink;
    }

    /// Read a sound file into memory as `name`.
    pub fn load(&mut self, name: &str, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        log::debug!("sounds: loaded '{}' ({} bytes)", name, bytes.len());
        self.insert(name, bytes);
        Ok(())
    }

    pub fn insert(&mut self, name: &str, bytes: Vec<u8>) {
        self.clips.insert(name.to_string(), bytes.into());
    }

    /// Start playing `name` at `level` (0-100, clamped).
    pub fn play(&mut self, name: &str, looping: bool, level: i32) -> Result<PlayerId> {
        let clip = self.clips.get(name).ok_or_else(|| EngineError::AssetNotFound {
            kind: "sound",
            name: name.to_string(),
        })?;
        let level = clamp_level(level);
        let id = PlayerId(self.next_player);
        self.next_player += 1;

        self.sink.play(id, clip, looping, f32::from(level) / 100.0);
        self.players.insert(
            id,
            Playback {
                clip: name.to_string(),
                level,
            },
        );
        Ok(id)
    }

    /// Stop a playback. Unknown handles are ignored.
    pub fn stop(&mut self, player: PlayerId) {
        if self.players.remove(&player).is_some() {
            self.sink.stop(player);
        }
    }

    pub fn set_volume(&mut self, player: PlayerId, level: i32) {
        if let Some(playback) = self.players.get_mut(&player) {
            playback.level = clamp_level(level);
            self.sink.set_volume(player, f32::from(playback.level) / 100.0);
        }
    }

    /// Volume (0-100) of an active playback.
    pub fn volume(&self, player: PlayerId) -> Option<u8> {
        self.players.get(&player).map(|p| p.level)
    }

    /// Clip name of an active playback.
    pub fn clip_of(&self, player: PlayerId) -> Option<&str> {
        self.players.get(&player).map(|p| p.clip.as_str())
    }

    pub fn stop_all(&mut self) {
        for (id, _) in self.players.drain() {
            self.sink.stop(id);
        }
    }

    pub fn playing(&self) -> usize {
        self.players.len()
    }
}

impl Default for SoundManager {
    fn default() -> Self {
        Self::new()
    }
}

fn clamp_level(level: i32) -> u8 {
    level.clamp(0, 100) as u8
}
