//! Audio output through `rodio` (feature `audio`).
//!
//! Clips may be WAV, OGG Vorbis, MP3 or FLAC. Install the sink with
//! `ctx.sounds_mut().set_sink(Box::new(RodioSink::new()?))`.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::mpsc;
use std::thread;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

use crate::api::error::{EngineError, Result};
use crate::assets::sounds::{AudioSink, PlayerId};

/// Plays clips on the default output device, one `rodio::Sink` per player.
///
/// The device stream is not `Send`, so it lives on its own thread for as
/// long as this sink exists.
pub struct RodioSink {
    handle: OutputStreamHandle,
    players: HashMap<PlayerId, Sink>,
    _stream_owner: mpsc::Sender<()>,
}

impl RodioSink {
    /// Open the default output device.
    pub fn new() -> Result<Self> {
        let (ready_tx, ready_rx) = mpsc::channel();
        let (keep_tx, keep_rx) = mpsc::channel::<()>();
        thread::Builder::new()
            .name("lge-audio".to_string())
            .spawn(move || match OutputStream::try_default() {
                Ok((stream, handle)) => {
                    if ready_tx.send(Ok(handle)).is_ok() {
                        // Returns once the sink drops its sender.
                        let _ = keep_rx.recv();
                    }
                    drop(stream);
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e.to_string()));
                }
            })?;

        let handle = ready_rx
            .recv()
            .map_err(|_| EngineError::Audio("audio thread exited".to_string()))?
            .map_err(EngineError::Audio)?;
        log::info!("audio: rodio output opened");
        Ok(Self {
            handle,
            players: HashMap::new(),
            _stream_owner: keep_tx,
        })
    }

    /// Whether `player` still has audio queued.
    pub fn is_playing(&self, player: PlayerId) -> bool {
        self.players.get(&player).is_some_and(|sink| !sink.empty())
    }
}

impl AudioSink for RodioSink {
    fn play(&mut self, player: PlayerId, clip: &[u8], looping: bool, volume: f32) {
        let sink = match Sink::try_new(&self.handle) {
            Ok(sink) => sink,
            Err(e) => {
                log::warn!("audio: no sink for {:?}: {}", player, e);
                return;
            }
        };
        let source = match Decoder::new(Cursor::new(clip.to_vec())) {
            Ok(source) => source,
            Err(e) => {
                log::warn!("audio: cannot decode clip for {:?}: {}", player, e);
                return;
            }
        };

        sink.set_volume(volume);
        if looping {
            sink.append(source.repeat_infinite());
        } else {
            sink.append(source);
        }
        self.players.insert(player, sink);
    }

    fn stop(&mut self, player: PlayerId) {
        if let Some(sink) = self.players.remove(&player) {
            sink.stop();
        }
    }

    fn set_volume(&mut self, player: PlayerId, volume: f32) {
        if let Some(sink) = self.players.get(&player) {
            sink.set_volume(volume);
        }
    }
}
