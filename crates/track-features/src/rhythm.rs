use crate::record::FeatureRecord;
use crate::types::RhythmDescription;

pub fn rhythm_features(rhythm: &RhythmDescription) -> FeatureRecord {
    let mut record = FeatureRecord::new();
    record.insert_flag("ICB_Meter23", rhythm.meter == "23");
    record.insert_flag("ICB_Meter32", rhythm.meter == "32");
    record.insert("ICB_BPM_Mean", rhythm.bpm_mean);
    record.insert("ICB_BPM_SD", rhythm.bpm_std);
    record.insert("ICB_perc_norm", rhythm.percussivity);
    record.insert("ICB_complex_norm", rhythm.complexity);
    record.insert("ICB_speed_norm_A", rhythm.speed_a);
    record.insert("ICB_speed_norm_B", rhythm.speed_b);
    record.insert("ICB_periodicity", rhythm.periodicity);
    record
}
