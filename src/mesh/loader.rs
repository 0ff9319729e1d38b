use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use crate::error::{ViewerError, ViewerResult};
use crate::mesh::normalize::normalize;
use crate::mesh::parser::parse_obj;
use crate::mesh::types::TriangleMesh;

/// Identifies one load request. A ticket stops being current as soon as a
/// newer request is submitted to the same loader.
#[derive(Clone, Debug)]
pub struct LoadTicket {
    generation: u64,
    latest: Arc<AtomicU64>,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::Acquire) == self.generation
    }
}

pub struct LoadedMesh {
    pub mesh: TriangleMesh,
    pub byte_len: usize,
}

pub struct LoadResult {
    pub ticket: LoadTicket,
    pub file_name: String,
    pub outcome: ViewerResult<LoadedMesh>,
}

enum LoadCommand {
    Load {
        ticket: LoadTicket,
        file_name: String,
        bytes: Vec<u8>,
    },
    Stop,
}

pub fn is_obj_file_name(file_name: &str) -> bool {
    file_name.to_ascii_lowercase().ends_with(".obj")
}

pub fn check_file_name(file_name: &str) -> ViewerResult<()> {
    if is_obj_file_name(file_name) {
        Ok(())
    } else {
        Err(ViewerError::FileType {
            file_name: file_name.to_string(),
        })
    }
}

/// Turns raw file bytes into text, rejecting anything that is clearly not a
/// text file.
pub fn decode_text(file_name: &str, bytes: &[u8]) -> ViewerResult<String> {
    let read_error = |reason: &str| ViewerError::Read {
        file_name: file_name.to_string(),
        reason: reason.to_string(),
    };

    if bytes.contains(&0) {
        return Err(read_error("file contains binary data"));
    }
    let text = std::str::from_utf8(bytes).map_err(|_| read_error("file is not valid UTF-8 text"))?;
    Ok(text.strip_prefix('\u{feff}').unwrap_or(text).to_string())
}

/// Decode, parse and normalize in one go. Runs on the loader thread.
pub fn build_mesh(file_name: &str, bytes: &[u8], reference_size: f32) -> ViewerResult<TriangleMesh> {
    let text = decode_text(file_name, bytes)?;
    let mut mesh = parse_obj(&text)?;
    normalize(&mut mesh, reference_size);
    Ok(mesh)
}

pub struct MeshLoader {
    tx_cmd: Sender<LoadCommand>,
    rx_result: Receiver<LoadResult>,
    latest: Arc<AtomicU64>,
    outstanding: Arc<AtomicUsize>,
    current_job: Arc<Mutex<Option<String>>>,
    thread_handle: Option<JoinHandle<()>>,
}

impl MeshLoader {
    pub fn new(reference_size: f32) -> Self {
        let (tx_cmd, rx_cmd) = channel::unbounded::<LoadCommand>();
        let (tx_result, rx_result) = channel::unbounded::<LoadResult>();
        let outstanding = Arc::new(AtomicUsize::new(0));
        let current_job = Arc::new(Mutex::new(None));

        let worker = Worker {
            rx_cmd,
            tx_result,
            outstanding: Arc::clone(&outstanding),
            current_job: Arc::clone(&current_job),
            reference_size,
        };
        let thread_handle = thread::Builder::new()
            .name("mesh-loader".into())
            .spawn(move || worker.run())
            .map_err(|e| log::error!("failed to spawn mesh loader thread: {}", e))
            .ok();

        Self {
            tx_cmd,
            rx_result,
            latest: Arc::new(AtomicU64::new(0)),
            outstanding,
            current_job,
            thread_handle,
        }
    }

    /// Queues a load. Every ticket handed out before this one goes stale.
    pub fn submit(&self, file_name: &str, bytes: Vec<u8>) -> LoadTicket {
        let ticket = self.next_ticket();
        self.outstanding.fetch_add(1, Ordering::AcqRel);
        let _ = self.tx_cmd.send(LoadCommand::Load {
            ticket: ticket.clone(),
            file_name: file_name.to_string(),
            bytes,
        });
        ticket
    }

    /// Invalidates whatever is in flight without queueing new work, for
    /// requests the host rejects before they reach the loader.
    pub fn supersede(&self) -> LoadTicket {
        self.next_ticket()
    }

    fn next_ticket(&self) -> LoadTicket {
        let generation = self.latest.fetch_add(1, Ordering::AcqRel) + 1;
        LoadTicket {
            generation,
            latest: Arc::clone(&self.latest),
        }
    }

    /// Whether submitted work has not been handed back yet, either queued,
    /// being built or waiting in the result channel.
    pub fn pending(&self) -> bool {
        self.outstanding.load(Ordering::Acquire) > 0 || !self.rx_result.is_empty()
    }

    /// Name of the file the worker is building right now.
    pub fn current_job(&self) -> Option<String> {
        self.current_job.lock().clone()
    }

    pub fn try_recv_result(&self) -> Option<LoadResult> {
        self.rx_result.try_recv().ok()
    }

    #[cfg(test)]
    pub(crate) fn recv_result_timeout(&self, timeout: std::time::Duration) -> Option<LoadResult> {
        self.rx_result.recv_timeout(timeout).ok()
    }

    pub fn stop(&mut self) {
        let _ = self.tx_cmd.send(LoadCommand::Stop);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MeshLoader {
    fn drop(&mut self) {
        self.stop();
    }
}

struct Worker {
    rx_cmd: Receiver<LoadCommand>,
    tx_result: Sender<LoadResult>,
    outstanding: Arc<AtomicUsize>,
    current_job: Arc<Mutex<Option<String>>>,
    reference_size: f32,
}

impl Worker {
    fn run(self) {
        while let Ok(cmd) = self.rx_cmd.recv() {
            match cmd {
                LoadCommand::Load {
                    ticket,
                    file_name,
                    bytes,
                } => {
                    let delivered = self.load(ticket, file_name, bytes);
                    self.outstanding.fetch_sub(1, Ordering::AcqRel);
                    if !delivered {
                        return;
                    }
                }
                LoadCommand::Stop => return,
            }
        }
    }

    /// Returns false once nobody is listening for results.
    fn load(&self, ticket: LoadTicket, file_name: String, bytes: Vec<u8>) -> bool {
        if !ticket.is_current() {
            log::debug!(
                "skipping superseded load of '{}' (generation {})",
                file_name,
                ticket.generation()
            );
            return true;
        }

        *self.current_job.lock() = Some(file_name.clone());
        let started = Instant::now();
        let byte_len = bytes.len();
        let outcome = build_mesh(&file_name, &bytes, self.reference_size)
            .map(|mesh| LoadedMesh { mesh, byte_len });

        match &outcome {
            Ok(loaded) => log::debug!(
                "built '{}': {} triangles, source extent {:.4}, scaled by {:.4} in {:.1} ms",
                file_name,
                loaded.mesh.triangle_count(),
                loaded.mesh.raw_bounds.map_or(0.0, |b| b.max_dim()),
                loaded.mesh.transform.scale,
                started.elapsed().as_secs_f64() * 1000.0
            ),
            Err(e) => log::debug!("load of '{}' failed: {}", file_name, e),
        }

        let sent = self
            .tx_result
            .send(LoadResult {
                ticket,
                file_name,
                outcome,
            })
            .is_ok();
        *self.current_job.lock() = None;
        sent
    }
}
