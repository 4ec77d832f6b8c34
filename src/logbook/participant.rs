// The participant side: login, calendar and daily questionnaire.

use chrono::{DateTime, NaiveDate, Utc};

use study_logbook::builder::EntryBuilder;

use crate::logbook::{store::Store, *};

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Session {
    Admin,
    Participant(Participant),
}

/// Logs in with a 4-digit code.
///
/// Unknown and malformed codes are reported the same way.
pub fn login(store: &impl Store, code: &str, admin_code: &str) -> LogbookResult<Session> {
    let code = code.trim();
    if code == admin_code {
        info!("Administrator login");
        return Ok(Session::Admin);
    }
    ensure!(is_valid_code(code), ParticipantNotFoundSnafu {});
    let participant = store.find_participant_by_code(code)?;
    info!("Participant {} logged in", participant.code);
    Ok(Session::Participant(participant))
}

/// The calendar of the participant, with their progress.
pub struct CalendarView {
    pub days: Vec<CalendarDay>,
    pub completed_days: u32,
    pub completion_percent: u32,
    pub days_since_start: i64,
}

pub fn calendar_view(
    participant: &Participant,
    snapshot: &Snapshot,
    today: NaiveDate,
) -> CalendarView {
    let cal = Calendar::for_participant(participant, &snapshot.settings, today, &snapshot.entries);
    CalendarView {
        days: cal.days(),
        completed_days: cal.completed_days(),
        completion_percent: cal.completion_percent(),
        days_since_start: cal.days_since_start(),
    }
}

/// The answers already given for a day, to prefill the questionnaire.
pub fn previous_answers(
    store: &impl Store,
    participant: &Participant,
    day: u32,
) -> LogbookResult<Option<Entry>> {
    let entries = store.list_entries(Some(participant.code.as_str()))?;
    Ok(entries.into_iter().find(|e| e.day == day))
}

/// Saves the questionnaire of a day.
///
/// Days that have not started yet cannot be filled in. Missed days can.
pub fn submit_entry(
    store: &mut impl Store,
    participant: &Participant,
    answers: EntryBuilder,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> LogbookResult<Entry> {
    let day = answers.day();
    if answers.participant_code() != participant.code {
        whatever!(
            "The questionnaire of {} cannot be saved for {}",
            answers.participant_code(),
            participant.code
        );
    }
    let settings = store.get_settings()?;
    let entries = store.list_entries(Some(participant.code.as_str()))?;
    let cal = Calendar::for_participant(participant, &settings, today, &entries);
    let status = cal.status(day).context(QuestionnaireSnafu {})?;
    ensure!(status.is_interactive(), FutureDaySnafu { day });
    if status == DayStatus::Missed {
        debug!(
            "submit_entry: {} fills the missed day {} (retroactive: {})",
            participant.code, day, settings.allow_retroactive
        );
    }
    let saved = store.upsert_entry(answers.build(now))?;
    info!("Saved day {} of {}", saved.day, saved.participant_code);
    Ok(saved)
}
