use std::path::PathBuf;
use std::sync::mpsc::Sender;

use crate::project::ProjectRecord;

/// Receiver of scanner notifications.
///
/// Calls arrive synchronously, in scan order, on the thread driving the
/// scanner. Implementations must not block.
pub trait ScanSink {
    /// Overall progress, from 0 to 100.
    fn on_progress(&mut self, percent: f64);

    /// A project root was found and appended to the store.
    fn on_project_found(&mut self, record: &ProjectRecord);

    /// The work stack is exhausted. Sent once, after the final 100% progress.
    fn on_scan_complete(&mut self);
}

/// Owned form of a sink notification.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    Progress(f64),
    ProjectFound(PathBuf),
    Complete,
}

impl ScanSink for () {
    fn on_progress(&mut self, _percent: f64) {}
    fn on_project_found(&mut self, _record: &ProjectRecord) {}
    fn on_scan_complete(&mut self) {}
}

/// Records every event, in order.
impl ScanSink for Vec<ScanEvent> {
    fn on_progress(&mut self, percent: f64) {
        self.push(ScanEvent::Progress(percent));
    }

    fn on_project_found(&mut self, record: &ProjectRecord) {
        self.push(ScanEvent::ProjectFound(record.path().to_path_buf()));
    }

    fn on_scan_complete(&mut self) {
        self.push(ScanEvent::Complete);
    }
}

/// Forwards events to another thread. A hung-up receiver is ignored.
impl ScanSink for Sender<ScanEvent> {
    fn on_progress(&mut self, percent: f64) {
        let _ = self.send(ScanEvent::Progress(percent));
    }

    fn on_project_found(&mut self, record: &ProjectRecord) {
        let _ = self.send(ScanEvent::ProjectFound(record.path().to_path_buf()));
    }

    fn on_scan_complete(&mut self) {
        let _ = self.send(ScanEvent::Complete);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_vec_sink_records_in_order() {
        let mut events: Vec<ScanEvent> = Vec::new();
        events.on_progress(0.0);
        events.on_project_found(&ProjectRecord::new(PathBuf::from("/p")));
        events.on_scan_complete();

        assert_eq!(
            events,
            vec![
                ScanEvent::Progress(0.0),
                ScanEvent::ProjectFound(PathBuf::from("/p")),
                ScanEvent::Complete,
            ]
        );
    }

    #[test]
    fn test_sender_sink_forwards() {
        let (mut tx, rx) = mpsc::channel();
        tx.on_progress(50.0);
        tx.on_scan_complete();
        drop(tx);

        let received: Vec<ScanEvent> = rx.iter().collect();
        assert_eq!(received, vec![ScanEvent::Progress(50.0), ScanEvent::Complete]);
    }

    #[test]
    fn test_sender_sink_ignores_closed_channel() {
        let (mut tx, rx) = mpsc::channel();
        drop(rx);
        tx.on_progress(10.0);
        tx.on_scan_complete();
    }
}
