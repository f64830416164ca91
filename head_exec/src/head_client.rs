//! # Head Client
//!
//! This module queues joint commands for delivery to the head actuator server. Delivery itself is
//! owned by the external command transport, which takes the receiving end of the queue and is
//! fire-and-forget - once a command is queued it cannot be recalled.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::warn;
use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TrySendError};

// Internal
use comms_if::eqpt::head::JointCommand;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Depth of the outbound command queue.
pub const CMD_QUEUE_DEPTH: usize = 10;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Client used by the control loop to send commands to the head actuator server.
pub struct HeadClient {
    cmd_sender: SyncSender<JointCommand>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum HeadClientError {
    #[error("The head server is no longer listening for commands")]
    Disconnected,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl HeadClient {
    /// Create a new client plus the receiving end to be handed to the command transport.
    pub fn new() -> (Self, Receiver<JointCommand>) {
        let (cmd_sender, cmd_receiver) = sync_channel(CMD_QUEUE_DEPTH);

        (Self { cmd_sender }, cmd_receiver)
    }

    /// Queue a command for delivery to the head server.
    ///
    /// If the queue is full the new command is dropped with a warning rather than blocking the
    /// control loop. At the 10 Hz command rate a full queue means the transport has wedged, and a
    /// stale step command is worse than a missed one.
    pub fn send_demands(&self, demands: &JointCommand) -> Result<(), HeadClientError> {
        match self.cmd_sender.try_send(demands.clone()) {
            Ok(_) => Ok(()),
            Err(TrySendError::Full(_)) => {
                warn!("Head command queue full, dropping the new command");
                Ok(())
            }
            Err(TrySendError::Disconnected(_)) => Err(HeadClientError::Disconnected),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_commands_delivered_in_order() {
        let (client, receiver) = HeadClient::new();

        client
            .send_demands(&JointCommand::for_head(2.0, -1.0, 0.02))
            .unwrap();
        client
            .send_demands(&JointCommand::for_head(-2.0, 1.0, 0.02))
            .unwrap();

        assert_eq!(
            receiver.try_recv().unwrap(),
            JointCommand::for_head(2.0, -1.0, 0.02)
        );
        assert_eq!(
            receiver.try_recv().unwrap(),
            JointCommand::for_head(-2.0, 1.0, 0.02)
        );
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_full_queue_drops_newest() {
        let (client, receiver) = HeadClient::new();

        for i in 0..CMD_QUEUE_DEPTH {
            client
                .send_demands(&JointCommand::for_head(i as f64, 0.0, 0.02))
                .unwrap();
        }

        // Queue is now full - this command is dropped, not an error
        client
            .send_demands(&JointCommand::for_head(99.0, 0.0, 0.02))
            .unwrap();

        // The queued commands are the original ten
        for i in 0..CMD_QUEUE_DEPTH {
            assert_eq!(
                receiver.try_recv().unwrap(),
                JointCommand::for_head(i as f64, 0.0, 0.02)
            );
        }
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_disconnected_transport_is_an_error() {
        let (client, receiver) = HeadClient::new();
        drop(receiver);

        assert!(matches!(
            client.send_demands(&JointCommand::for_head(2.0, 1.0, 0.02)),
            Err(HeadClientError::Disconnected)
        ));
    }
}
