//! Background loader for POI detail content. Requests go over a channel to a
//! worker thread so a slow disk never stalls the frame loop.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::{path::PathBuf, thread};
use vista_core::{ContentError, ContentResult, PoiId, RequestId};

struct Request {
    id: RequestId,
    poi: PoiId,
    path: PathBuf,
}

/// Owns the worker thread and both channel ends visible to the UI.
pub struct ContentFetcher {
    requests: Sender<Request>,
    results: Receiver<ContentResult>,
    next_id: u64,
}

impl ContentFetcher {
    pub fn new() -> Self {
        let (req_tx, req_rx) = unbounded::<Request>();
        let (res_tx, res_rx) = unbounded::<ContentResult>();

        thread::spawn(move || {
            for req in req_rx.iter() {
                let outcome = fetch(&req.path);
                if res_tx
                    .send(ContentResult {
                        request: req.id,
                        poi: req.poi,
                        outcome,
                    })
                    .is_err()
                {
                    break;
                }
            }
        });

        Self {
            requests: req_tx,
            results: res_rx,
            next_id: 1,
        }
    }

    /// Queue a fetch and hand back the id used to match the result.
    pub fn request(&mut self, poi: PoiId, path: impl Into<PathBuf>) -> RequestId {
        let id = RequestId(self.next_id);
        self.next_id += 1;
        // The worker outlives every sender, send only fails at shutdown.
        let _ = self.requests.send(Request {
            id,
            poi,
            path: path.into(),
        });
        id
    }

    /// Drain whatever results have arrived since the last poll.
    pub fn poll(&self) -> Vec<ContentResult> {
        self.results.try_iter().collect()
    }
}

impl Default for ContentFetcher {
    fn default() -> Self {
        Self::new()
    }
}

fn fetch(path: &PathBuf) -> Result<String, ContentError> {
    let text = std::fs::read_to_string(path).map_err(|e| ContentError::Fetch {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    if text.trim().is_empty() {
        return Err(ContentError::Empty {
            path: path.display().to_string(),
        });
    }
    Ok(text)
}
