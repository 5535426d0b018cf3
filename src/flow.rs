//! Update flow from the producer into a session.
//!
//! The producer emits one stream of [`Update`]s per session. Updates for the
//! same entity are applied in the order they were sent, each completely before
//! the next; nothing is reordered or coalesced.
//!
//! # Lifecycle Flow
//!
//! 1. The producer holds an [`UpdateSender`] and sends updates at any time
//! 2. [`drive`] takes every update that is ready and applies it
//! 3. After each batch the session is flushed, so the renderer sees uploads
//!    only between batches
//! 4. When every sender is dropped, [`drive`] returns a summary
//!
//! Rejected updates are logged and skipped; they never stop the flow.

use futures::{
    StreamExt,
    channel::mpsc::{self, UnboundedReceiver, UnboundedSender},
};
use serde::{Deserialize, Serialize};

use crate::{
    camera::orbit::CameraInput,
    data_structures::scene_graph::{PlotId, SceneId},
    description::{CameraMatrices, RawValue},
    resources::RenderBackend,
    session::Session,
};

/// Most updates applied between two flushes.
const BATCH_SIZE: usize = 256;

/// One notification of one of the producer's reactive streams.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Update {
    Uniform {
        plot: PlotId,
        name: String,
        value: RawValue,
    },
    /// `length` is the new element count; `values` may be shorter than
    /// `length * item_size` for partial overwrites.
    Attribute {
        plot: PlotId,
        name: String,
        values: Vec<f32>,
        length: usize,
    },
    Visible {
        plot: PlotId,
        visible: bool,
    },
    Faces {
        plot: PlotId,
        faces: Vec<u32>,
    },
    Camera {
        scene: SceneId,
        matrices: CameraMatrices,
    },
    CameraInput {
        scene: SceneId,
        input: CameraInput,
    },
}

/// Producer side of the update channel. Cheap to clone.
#[derive(Clone, Debug)]
pub struct UpdateSender {
    tx: UnboundedSender<Update>,
}

impl UpdateSender {
    pub fn send(&self, update: Update) -> anyhow::Result<()> {
        self.tx
            .unbounded_send(update)
            .map_err(|e| anyhow::anyhow!("update channel closed: {}", e))
    }
}

pub type UpdateReceiver = UnboundedReceiver<Update>;

pub fn channel() -> (UpdateSender, UpdateReceiver) {
    let (tx, rx) = mpsc::unbounded();
    (UpdateSender { tx }, rx)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DriveSummary {
    pub applied: usize,
    pub rejected: usize,
    pub uploads: usize,
}

/// Applies every update from `rx` to `session` until all senders are gone.
pub async fn drive<B: RenderBackend>(session: &mut Session<B>, rx: UpdateReceiver) -> DriveSummary {
    let mut summary = DriveSummary::default();
    let mut batches = rx.ready_chunks(BATCH_SIZE);
    while let Some(batch) = batches.next().await {
        for update in batch {
            match session.apply(update) {
                Ok(()) => summary.applied += 1,
                Err(e) => {
                    log::warn!("update rejected: {}", e);
                    summary.rejected += 1;
                }
            }
        }
        summary.uploads += session.flush();
    }
    log::debug!(
        "update flow finished: {} applied, {} rejected",
        summary.applied,
        summary.rejected
    );
    summary
}
