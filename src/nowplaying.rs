//! Live radio now-playing metadata.
//!
//! Two inputs are normalized here:
//! - the station API payload (`now_playing.song` with title/artist/art)
//! - arbitrary now-playing values that may use `track` or `title`
//!
//! [`Poller`] keeps the last known-good value. A failed or incomplete poll
//! leaves it untouched. There is no retry or backoff; the next tick simply
//! tries again.

use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NowPlaying {
    pub track: String,
    pub artist: String,
    pub artwork: Option<String>,
}

/// Values shown while nothing usable is known.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Fallback {
    pub track: String,
    pub artist: String,
}

impl Default for Fallback {
    fn default() -> Self {
        Fallback {
            track: "Live Radio".to_string(),
            artist: "WaveNation".to_string(),
        }
    }
}

/// Normalize any value into displayable metadata, filling gaps from `fallback`.
pub fn normalize_with(value: &Value, fallback: &Fallback) -> NowPlaying {
    let Some(record) = value.as_object() else {
        return NowPlaying {
            track: fallback.track.clone(),
            artist: fallback.artist.clone(),
            artwork: None,
        };
    };

    let string_field = |name: &str| record.get(name).and_then(Value::as_str).map(str::to_string);

    NowPlaying {
        track: string_field("track")
            .or_else(|| string_field("title"))
            .unwrap_or_else(|| fallback.track.clone()),
        artist: string_field("artist").unwrap_or_else(|| fallback.artist.clone()),
        artwork: string_field("artwork"),
    }
}

pub fn normalize_now_playing(value: &Value) -> NowPlaying {
    normalize_with(value, &Fallback::default())
}

/// Station API payload; only the fields read here are modelled.
#[derive(Debug, Deserialize)]
pub struct StationPayload {
    pub now_playing: Option<StationNowPlaying>,
}

#[derive(Debug, Deserialize)]
pub struct StationNowPlaying {
    pub song: Option<StationSong>,
}

#[derive(Debug, Deserialize)]
pub struct StationSong {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub art: Option<String>,
}

/// Extract the current song from a station payload. Placeholder artwork is dropped.
pub fn from_station_payload(payload: &StationPayload) -> Option<NowPlaying> {
    let song = payload.now_playing.as_ref()?.song.as_ref()?;

    let artwork = song
        .art
        .as_ref()
        .filter(|url| !url.contains("generic_song"))
        .cloned();

    Some(NowPlaying {
        track: song.title.clone().unwrap_or_default(),
        artist: song.artist.clone().unwrap_or_default(),
        artwork,
    })
}

/// Accept a polled value only when it carries both a track and an artist.
fn accept_update(value: &Value) -> Option<NowPlaying> {
    let record = value.as_object()?;

    let track = record
        .get("track")
        .and_then(Value::as_str)
        .or_else(|| record.get("title").and_then(Value::as_str))
        .filter(|t| !t.is_empty())?;
    let artist = record
        .get("artist")
        .and_then(Value::as_str)
        .filter(|a| !a.is_empty())?;

    Some(NowPlaying {
        track: track.to_string(),
        artist: artist.to_string(),
        artwork: record.get("artwork").and_then(Value::as_str).map(str::to_string),
    })
}

/// Where polled values come from. `Ok(None)` means "nothing playing".
pub trait NowPlayingSource: Send {
    fn fetch(&mut self) -> Result<Option<Value>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    /// Already `{track|title, artist, artwork}` shaped.
    Normalized,
    /// Station API payload.
    Station,
}

/// Re-reads a JSON file on every poll.
pub struct FileSource {
    path: PathBuf,
    format: PayloadFormat,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>, format: PayloadFormat) -> Self {
        FileSource {
            path: path.into(),
            format,
        }
    }
}

impl NowPlayingSource for FileSource {
    fn fetch(&mut self) -> Result<Option<Value>> {
        let text = fs::read_to_string(&self.path)?;

        match self.format {
            PayloadFormat::Normalized => {
                let value: Value = serde_json::from_str(&text)?;
                Ok((!value.is_null()).then_some(value))
            }
            PayloadFormat::Station => {
                let payload: StationPayload = serde_json::from_str(&text)?;
                from_station_payload(&payload)
                    .map(serde_json::to_value)
                    .transpose()
                    .map_err(Into::into)
            }
        }
    }
}

struct Worker {
    stop: Sender<()>,
    handle: JoinHandle<()>,
}

/// Caller-owned now-playing state with an explicit start/stop lifecycle.
pub struct Poller {
    interval: Duration,
    current: Arc<Mutex<Option<NowPlaying>>>,
    worker: Option<Worker>,
}

impl Poller {
    pub fn new(interval: Duration) -> Self {
        Poller {
            interval,
            current: Arc::new(Mutex::new(None)),
            worker: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn current(&self) -> Option<NowPlaying> {
        lock(&self.current).clone()
    }

    /// Fetch once and update state. Returns true when the state changed.
    pub fn poll_once<S: NowPlayingSource + ?Sized>(&self, source: &mut S) -> bool {
        poll_into(&self.current, source)
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Poll immediately, then every `interval` on a background thread.
    /// Restarts the worker if one is already running.
    pub fn start<S: NowPlayingSource + 'static>(&mut self, mut source: S) {
        self.stop();

        let (stop, stop_rx) = mpsc::channel::<()>();
        let current = Arc::clone(&self.current);
        let interval = self.interval;

        let handle = thread::spawn(move || loop {
            poll_into(&current, &mut source);

            match stop_rx.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => continue,
                // stop requested, or the poller was dropped
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        });

        tracing::debug!(interval = ?self.interval, "now-playing poller started");
        self.worker = Some(Worker { stop, handle });
    }

    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else { return };

        let _ = worker.stop.send(());
        if worker.handle.join().is_err() {
            tracing::warn!("now-playing poller thread panicked");
        }
        tracing::debug!("now-playing poller stopped");
    }
}

impl Default for Poller {
    fn default() -> Self {
        Poller::new(DEFAULT_INTERVAL)
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock(state: &Mutex<Option<NowPlaying>>) -> MutexGuard<'_, Option<NowPlaying>> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn poll_into<S: NowPlayingSource + ?Sized>(state: &Mutex<Option<NowPlaying>>, source: &mut S) -> bool {
    let value = match source.fetch() {
        Ok(Some(value)) => value,
        Ok(None) => return false,
        Err(e) => {
            tracing::debug!(error = %e, "now-playing fetch failed, keeping previous state");
            return false;
        }
    };

    let Some(update) = accept_update(&value) else {
        tracing::debug!("incomplete now-playing payload, keeping previous state");
        return false;
    };

    let mut current = lock(state);
    if current.as_ref() == Some(&update) {
        return false;
    }

    tracing::info!(track = %update.track, artist = %update.artist, "now playing");
    *current = Some(update);
    true
}
