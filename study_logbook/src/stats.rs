//! Aggregates over the whole study, as shown on the administration dashboard.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::{completion_percent, Entry, Participant, STUDY_DAYS};

/// The headline numbers of the study.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct StudyStats {
    pub total_participants: u32,
    /// Participants with at least one entry
    pub active_participants: u32,
    pub total_entries: u32,
    /// Percentage of the possible participant-days (participants x 28) that
    /// have a complete entry.
    pub completion_rate: u32,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParticipantProgress {
    pub code: String,
    pub completed_days: u32,
    pub percent: u32,
}

fn counts_as_done(e: &Entry) -> bool {
    e.is_complete() && (1..=STUDY_DAYS).contains(&e.day)
}

/// Computes the statistics of the study.
///
/// Entries whose participant is no longer in the roster are left out of the
/// completion rate.
pub fn study_stats(participants: &[Participant], entries: &[Entry]) -> StudyStats {
    let codes: HashSet<&str> = participants.iter().map(|p| p.code.as_str()).collect();
    let with_entries: HashSet<&str> = entries
        .iter()
        .map(|e| e.participant_code.as_str())
        .collect();
    let active = codes.intersection(&with_entries).count() as u32;

    let complete_known = entries
        .iter()
        .filter(|e| counts_as_done(e) && codes.contains(e.participant_code.as_str()))
        .count() as u32;

    let total = participants.len() as u32;
    debug!(
        "study_stats: participants: {} entries: {} complete: {}",
        total,
        entries.len(),
        complete_known
    );
    StudyStats {
        total_participants: total,
        active_participants: active,
        total_entries: entries.len() as u32,
        completion_rate: completion_percent(complete_known, total * STUDY_DAYS),
    }
}

/// The progress bar of each participant, in the order of the roster.
pub fn participant_progress(
    participants: &[Participant],
    entries: &[Entry],
) -> Vec<ParticipantProgress> {
    let mut completed: HashMap<&str, HashSet<u32>> = HashMap::new();
    for e in entries.iter().filter(|e| counts_as_done(e)) {
        completed
            .entry(e.participant_code.as_str())
            .or_default()
            .insert(e.day);
    }
    participants
        .iter()
        .map(|p| {
            let n = completed
                .get(p.code.as_str())
                .map(|days| days.len() as u32)
                .unwrap_or(0);
            ParticipantProgress {
                code: p.code.clone(),
                completed_days: n,
                percent: completion_percent(n, STUDY_DAYS),
            }
        })
        .collect()
}
