//! Events serialized through a session's queue

use tokio::sync::oneshot;

use crate::domain::entities::{ChannelKind, SendStatus};
use crate::domain::value_objects::SessionSnapshot;
use crate::errors::OtpResult;

/// Everything that touches session state arrives as one of these
#[derive(Debug)]
pub(crate) enum SessionEvent {
    /// A sender finalized dispatch attempt `attempt` of channel `channel`
    SendCompleted {
        channel: usize,
        attempt: u64,
        status: SendStatus,
    },
    /// Countdown `generation` of channel `channel` elapsed
    TimerFired { channel: usize, generation: u64 },
    Submit {
        kind: ChannelKind,
        code: u32,
        reply: oneshot::Sender<OtpResult<bool>>,
    },
    Resend {
        kind: ChannelKind,
        reply: oneshot::Sender<OtpResult<()>>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Cancel {
        reply: oneshot::Sender<OtpResult<()>>,
    },
}
