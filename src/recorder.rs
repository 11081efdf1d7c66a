//! Recording of spikes and synaptic weight changes.
//!
//! The network reports every spike and every non-negligible weight change to a [`Recorder`]
//! it owns for the duration of a run. [`MemoryRecorder`] keeps the records in memory and
//! exports them as CSV tables, a plain text report, or JSON.
use itertools::Itertools;
use log::info;
use serde::{Deserialize, Serialize, Serializer};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::core::neuron::NeuronId;
use crate::error::SNNError;

/// A sink for simulation records.
pub trait Recorder {
    /// Record a spike of the given neuron.
    fn record_spike(&mut self, neuron_id: NeuronId, time: f64);

    /// Record a weight change of the synapse labelled `pre_post`.
    fn record_weight_change(
        &mut self,
        synapse_label: &str,
        time: f64,
        old_weight: f64,
        new_weight: f64,
    );
}

/// A shared recorder. The mutex serializes access from multiple owners.
impl<R: Recorder> Recorder for Arc<Mutex<R>> {
    fn record_spike(&mut self, neuron_id: NeuronId, time: f64) {
        self.lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .record_spike(neuron_id, time);
    }

    fn record_weight_change(
        &mut self,
        synapse_label: &str,
        time: f64,
        old_weight: f64,
        new_weight: f64,
    ) {
        self.lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .record_weight_change(synapse_label, time, old_weight, new_weight);
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SpikeRecord {
    /// The ID of the neuron which fired.
    pub neuron_id: NeuronId,
    /// The firing time (ms).
    pub time: f64,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct WeightChangeRecord {
    /// The synapse label, formatted as `preId_postId`.
    pub synapse_id: String,
    /// The time of the change (ms).
    pub time: f64,
    pub old_weight: f64,
    pub new_weight: f64,
}

const SPIKES_HEADER: [&str; 2] = ["NeuronID", "Time(ms)"];
const WEIGHT_CHANGES_HEADER: [&str; 4] = ["SynapseID", "Time(ms)", "OldWeight", "NewWeight"];

/// A spike as written to CSV.
#[derive(Serialize)]
struct SpikeRow {
    neuron_id: NeuronId,
    #[serde(serialize_with = "three_decimals")]
    time: f64,
}

/// A weight change as written to CSV.
#[derive(Serialize)]
struct WeightChangeRow<'a> {
    synapse_id: &'a str,
    #[serde(serialize_with = "three_decimals")]
    time: f64,
    #[serde(serialize_with = "three_decimals")]
    old_weight: f64,
    #[serde(serialize_with = "three_decimals")]
    new_weight: f64,
}

fn three_decimals<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{:.3}", value))
}

/// A recorder keeping all records in memory.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecorder {
    spikes: Vec<SpikeRecord>,
    weight_changes: Vec<WeightChangeRecord>,
    /// Whether records are also logged as they arrive.
    #[serde(skip)]
    echo: bool,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        MemoryRecorder::default()
    }

    /// Enable or disable real-time logging of the records.
    pub fn set_echo(&mut self, echo: bool) {
        self.echo = echo;
    }

    pub fn spikes(&self) -> &[SpikeRecord] {
        &self.spikes
    }

    pub fn weight_changes(&self) -> &[WeightChangeRecord] {
        &self.weight_changes
    }

    pub fn num_spikes(&self) -> usize {
        self.spikes.len()
    }

    pub fn num_weight_changes(&self) -> usize {
        self.weight_changes.len()
    }

    /// Drop all records.
    pub fn clear(&mut self) {
        self.spikes.clear();
        self.weight_changes.clear();
    }

    /// Write the spike records as a CSV table with a header row.
    pub fn write_spikes_csv<W: Write>(&self, writer: W) -> Result<(), SNNError> {
        let rows = self.spikes.iter().map(|spike| SpikeRow {
            neuron_id: spike.neuron_id,
            time: spike.time,
        });
        write_csv(writer, &SPIKES_HEADER, rows)
    }

    /// Write the weight change records as a CSV table with a header row.
    pub fn write_weight_changes_csv<W: Write>(&self, writer: W) -> Result<(), SNNError> {
        let rows = self.weight_changes.iter().map(|change| WeightChangeRow {
            synapse_id: &change.synapse_id,
            time: change.time,
            old_weight: change.old_weight,
            new_weight: change.new_weight,
        });
        write_csv(writer, &WEIGHT_CHANGES_HEADER, rows)
    }

    /// The spike records as a CSV table.
    pub fn spikes_csv(&self) -> Result<String, SNNError> {
        let mut buffer = Vec::new();
        self.write_spikes_csv(&mut buffer)?;
        String::from_utf8(buffer).map_err(|e| SNNError::IOError(e.to_string()))
    }

    /// The weight change records as a CSV table.
    pub fn weight_changes_csv(&self) -> Result<String, SNNError> {
        let mut buffer = Vec::new();
        self.write_weight_changes_csv(&mut buffer)?;
        String::from_utf8(buffer).map_err(|e| SNNError::IOError(e.to_string()))
    }

    /// A human-readable report with one section per record stream.
    pub fn report(&self) -> String {
        let spikes = self
            .spikes
            .iter()
            .map(|spike| format!("Neuron {} fired at {:.3} ms", spike.neuron_id, spike.time))
            .join("\n");
        let weight_changes = self
            .weight_changes
            .iter()
            .map(|change| {
                format!(
                    "Synapse {}: weight changed from {:.3} to {:.3} at {:.3} ms",
                    change.synapse_id, change.old_weight, change.new_weight, change.time
                )
            })
            .join("\n");
        format!(
            "=== SPIKES ===\n{}\n\n=== WEIGHT CHANGES ===\n{}\n",
            spikes, weight_changes
        )
    }

    pub fn export_spikes_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), SNNError> {
        let file = File::create(path).map_err(|e| SNNError::IOError(e.to_string()))?;
        self.write_spikes_csv(file)
    }

    pub fn export_weight_changes_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), SNNError> {
        let file = File::create(path).map_err(|e| SNNError::IOError(e.to_string()))?;
        self.write_weight_changes_csv(file)
    }

    pub fn export_report<P: AsRef<Path>>(&self, path: P) -> Result<(), SNNError> {
        write_to(path, &self.report())
    }

    /// Save all records to a JSON file.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), SNNError> {
        let file = File::create(path).map_err(|e| SNNError::IOError(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|e| SNNError::IOError(e.to_string()))?;
        writer.flush().map_err(|e| SNNError::IOError(e.to_string()))
    }

    /// Load records from a JSON file.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, SNNError> {
        let file = File::open(path).map_err(|e| SNNError::IOError(e.to_string()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| SNNError::IOError(e.to_string()))
    }
}

impl Recorder for MemoryRecorder {
    fn record_spike(&mut self, neuron_id: NeuronId, time: f64) {
        if self.echo {
            info!("Neuron {} fired at {:.3} ms", neuron_id, time);
        }
        self.spikes.push(SpikeRecord { neuron_id, time });
    }

    fn record_weight_change(
        &mut self,
        synapse_label: &str,
        time: f64,
        old_weight: f64,
        new_weight: f64,
    ) {
        if self.echo {
            info!(
                "Synapse {}: weight changed from {:.3} to {:.3} at {:.3} ms",
                synapse_label,
                old_weight,
                new_weight,
                time
            );
        }
        self.weight_changes.push(WeightChangeRecord {
            synapse_id: synapse_label.to_string(),
            time,
            old_weight,
            new_weight,
        });
    }
}

fn write_csv<W, T, I>(writer: W, header: &[&str], rows: I) -> Result<(), SNNError>
where
    W: Write,
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    writer
        .write_record(header)
        .map_err(|e| SNNError::IOError(e.to_string()))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| SNNError::IOError(e.to_string()))?;
    }
    writer.flush().map_err(|e| SNNError::IOError(e.to_string()))
}

fn write_to<P: AsRef<Path>>(path: P, contents: &str) -> Result<(), SNNError> {
    let file = File::create(path).map_err(|e| SNNError::IOError(e.to_string()))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(contents.as_bytes())
        .map_err(|e| SNNError::IOError(e.to_string()))?;
    writer.flush().map_err(|e| SNNError::IOError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn sample_recorder() -> MemoryRecorder {
        let mut recorder = MemoryRecorder::new();
        recorder.record_spike(3, 1.0);
        recorder.record_spike(7, 2.5);
        recorder.record_weight_change("3_7", 3.5, 1.0, 1.0906);
        recorder
    }

    #[test]
    fn test_counts() {
        let mut recorder = sample_recorder();
        assert_eq!(recorder.num_spikes(), 2);
        assert_eq!(recorder.num_weight_changes(), 1);
        assert_eq!(recorder.spikes()[1], SpikeRecord { neuron_id: 7, time: 2.5 });
        assert_eq!(recorder.weight_changes()[0].synapse_id, "3_7");
        recorder.clear();
        assert_eq!(recorder.num_spikes(), 0);
        assert_eq!(recorder.num_weight_changes(), 0);
    }

    #[test]
    fn test_csv() {
        let recorder = sample_recorder();
        assert_eq!(
            recorder.spikes_csv().unwrap(),
            "NeuronID,Time(ms)\n3,1.000\n7,2.500\n"
        );
        assert_eq!(
            recorder.weight_changes_csv().unwrap(),
            "SynapseID,Time(ms),OldWeight,NewWeight\n3_7,3.500,1.000,1.091\n"
        );
    }

    #[test]
    fn test_csv_without_records() {
        let recorder = MemoryRecorder::new();
        assert_eq!(recorder.spikes_csv().unwrap(), "NeuronID,Time(ms)\n");
        assert_eq!(
            recorder.weight_changes_csv().unwrap(),
            "SynapseID,Time(ms),OldWeight,NewWeight\n"
        );
    }

    #[test]
    fn test_csv_is_readable() {
        let recorder = sample_recorder();
        let table = recorder.weight_changes_csv().unwrap();
        let mut reader = csv::Reader::from_reader(table.as_bytes());

        let header = reader.headers().unwrap().clone();
        assert_eq!(header, csv::StringRecord::from(WEIGHT_CHANGES_HEADER.to_vec()));
        let rows: Vec<csv::StringRecord> = reader.records().map(|row| row.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "3_7");
        assert_eq!(rows[0][3].parse::<f64>().unwrap(), 1.091);
    }

    #[test]
    fn test_report() {
        let report = sample_recorder().report();
        assert!(report.starts_with("=== SPIKES ===\nNeuron 3 fired at 1.000 ms\n"));
        assert!(report.contains("=== WEIGHT CHANGES ===\n"));
        assert!(report.contains("Synapse 3_7: weight changed from 1.000 to 1.091 at 3.500 ms"));
    }

    #[test]
    fn test_export_files() {
        let dir = tempdir().unwrap();
        let recorder = sample_recorder();

        recorder.export_spikes_csv(dir.path().join("spikes.csv")).unwrap();
        recorder
            .export_weight_changes_csv(dir.path().join("weight_changes.csv"))
            .unwrap();
        recorder.export_report(dir.path().join("report.txt")).unwrap();

        let spikes = fs::read_to_string(dir.path().join("spikes.csv")).unwrap();
        assert_eq!(spikes, "NeuronID,Time(ms)\n3,1.000\n7,2.500\n");
        let changes = fs::read_to_string(dir.path().join("weight_changes.csv")).unwrap();
        assert_eq!(
            changes,
            "SynapseID,Time(ms),OldWeight,NewWeight\n3_7,3.500,1.000,1.091\n"
        );
        let report = fs::read_to_string(dir.path().join("report.txt")).unwrap();
        assert_eq!(report, recorder.report());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("records.json");
        let recorder = sample_recorder();
        recorder.save_to(&path).unwrap();
        assert_eq!(MemoryRecorder::load_from(&path).unwrap(), recorder);
    }

    #[test]
    fn test_export_to_missing_directory() {
        let dir = tempdir().unwrap();
        let result = sample_recorder().export_spikes_csv(dir.path().join("missing").join("spikes.csv"));
        assert!(matches!(result, Err(SNNError::IOError(_))));
    }

    #[test]
    fn test_shared_recorder() {
        let shared = Arc::new(Mutex::new(MemoryRecorder::new()));
        let mut handle = Arc::clone(&shared);
        handle.record_spike(1, 0.0);
        handle.record_weight_change("1_2", 1.0, 0.5, 0.6);
        let recorder = shared.lock().unwrap();
        assert_eq!(recorder.num_spikes(), 1);
        assert_eq!(recorder.num_weight_changes(), 1);
    }
}
