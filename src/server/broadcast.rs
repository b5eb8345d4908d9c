//! Best-effort fan-out of serialized events to a snapshot of recipients.

use super::registry::Recipient;

/// Deliver each payload, in order, to every recipient.
///
/// Delivery is a push into the recipient's unbounded channel; the actual
/// socket write happens in that connection's own writer task, so one stuck
/// peer cannot stall the rest of the batch. A recipient whose channel has
/// closed (connection mid-teardown) is logged and skipped, never an error
/// for the caller. Returns how many recipients accepted the full batch.
pub fn fan_out(recipients: &[Recipient], payloads: &[String]) -> usize {
    let mut delivered = 0;
    for recipient in recipients {
        let mut failed = false;
        for payload in payloads {
            if recipient.sender.send(payload.clone()).is_err() {
                tracing::warn!("failed to send message to client '{}'", recipient.id);
                failed = true;
                break;
            }
        }
        if !failed {
            delivered += 1;
        }
    }
    delivered
}
