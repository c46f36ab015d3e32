#![allow(dead_code)]

use std::sync::Mutex;

use trendstitch::{AttemptObserver, AttemptRecord, SearchPhase};

/// Observer that keeps every record and phase it is shown.
#[derive(Default)]
pub struct RecordingObserver {
    pub records: Mutex<Vec<AttemptRecord>>,
    pub phases: Mutex<Vec<SearchPhase>>,
}

impl RecordingObserver {
    pub fn records(&self) -> Vec<AttemptRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn phases(&self) -> Vec<SearchPhase> {
        self.phases.lock().unwrap().clone()
    }
}

impl AttemptObserver for RecordingObserver {
    fn on_attempt(&self, record: &AttemptRecord) {
        self.records.lock().unwrap().push(record.clone());
    }

    fn on_phase(&self, phase: SearchPhase) {
        self.phases.lock().unwrap().push(phase);
    }
}
