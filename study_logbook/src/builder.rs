pub use crate::config::*;

use chrono::{DateTime, Utc};

/// A builder for filling the daily questionnaire.
///
/// It starts from the blank form (or from a previous entry) and checks every
/// answer against its scale.
///
/// ```
/// use chrono::Utc;
/// use study_logbook::builder::EntryBuilder;
/// # use study_logbook::LogbookErrors;
///
/// let entry = EntryBuilder::new("1234", 1)?
///     .odor(7)?
///     .cause("Transpiration excessive")?
///     .no_symptoms()
///     .washed_hair(false)
///     .build(Utc::now());
///
/// assert_eq!(entry.answers.odor_intensity, Some(7));
///
/// # Ok::<(), LogbookErrors>(())
/// ```
pub struct EntryBuilder {
    pub(crate) _participant_code: String,
    pub(crate) _day: u32,
    pub(crate) _answers: Questionnaire,
}

impl EntryBuilder {
    pub fn new(participant_code: &str, day: u32) -> Result<EntryBuilder, LogbookErrors> {
        if !is_valid_code(participant_code) {
            return Err(LogbookErrors::InvalidCode(participant_code.to_string()));
        }
        if day == 0 || day > STUDY_DAYS {
            return Err(LogbookErrors::InvalidDay(day));
        }
        Ok(EntryBuilder {
            _participant_code: participant_code.to_string(),
            _day: day,
            _answers: Questionnaire::default(),
        })
    }

    /// Starts from a previous answer for the same day, to edit it.
    pub fn from_entry(entry: &Entry) -> EntryBuilder {
        EntryBuilder {
            _participant_code: entry.participant_code.clone(),
            _day: entry.day,
            _answers: entry.answers.clone(),
        }
    }

    pub fn day(&self) -> u32 {
        self._day
    }

    pub fn participant_code(&self) -> &str {
        &self._participant_code
    }

    /// Odor present, with an intensity between 1 and 10.
    pub fn odor(mut self, intensity: u8) -> Result<EntryBuilder, LogbookErrors> {
        check_range("odorIntensity", intensity, 1, 10)?;
        self._answers.has_odor = Some(true);
        self._answers.odor_intensity = Some(intensity);
        Ok(self)
    }

    pub fn no_odor(mut self) -> EntryBuilder {
        self._answers.has_odor = Some(false);
        self
    }

    /// Adds a cause from the vocabulary. Adding the same cause twice has no effect.
    pub fn cause(mut self, cause: &str) -> Result<EntryBuilder, LogbookErrors> {
        if !is_known_cause(cause) {
            return Err(LogbookErrors::UnknownCause(cause.to_string()));
        }
        if !self._answers.has_cause(cause) {
            self._answers.odor_causes.push(cause.to_string());
        }
        Ok(self)
    }

    /// Selects "Autre" with a free-text description.
    pub fn other_cause(mut self, description: &str) -> EntryBuilder {
        if !self._answers.has_cause(OTHER_CAUSE) {
            self._answers.odor_causes.push(OTHER_CAUSE.to_string());
        }
        self._answers.other_cause = Some(description.to_string());
        self
    }

    /// Symptoms present, with the severities between 0 and 10.
    pub fn symptoms(
        mut self,
        itching: u8,
        irritation: u8,
        redness: u8,
        dryness: u8,
    ) -> Result<EntryBuilder, LogbookErrors> {
        check_range("itching", itching, 0, 10)?;
        check_range("irritation", irritation, 0, 10)?;
        check_range("redness", redness, 0, 10)?;
        check_range("dryness", dryness, 0, 10)?;
        self._answers.has_symptoms = Some(true);
        self._answers.itching = Some(itching);
        self._answers.irritation = Some(irritation);
        self._answers.redness = Some(redness);
        self._answers.dryness = Some(dryness);
        Ok(self)
    }

    pub fn no_symptoms(mut self) -> EntryBuilder {
        self._answers.has_symptoms = Some(false);
        self
    }

    pub fn washed_hair(mut self, washed: bool) -> EntryBuilder {
        self._answers.washed_hair = Some(washed);
        self
    }

    /// The submitted entry. Saving the questionnaire always completes it.
    pub fn build(self, submitted_at: DateTime<Utc>) -> Entry {
        self.finish(submitted_at, EntryStatus::Complete)
    }

    pub fn build_draft(self, submitted_at: DateTime<Utc>) -> Entry {
        self.finish(submitted_at, EntryStatus::Draft)
    }

    fn finish(self, submitted_at: DateTime<Utc>, status: EntryStatus) -> Entry {
        let mut answers = self._answers;
        // The free text only makes sense with the "Autre" box ticked.
        if !answers.has_cause(OTHER_CAUSE) {
            answers.other_cause = None;
        }
        Entry {
            participant_code: self._participant_code,
            day: self._day,
            date: submitted_at,
            status,
            answers,
        }
    }
}

fn check_range(field: &'static str, value: u8, min: u8, max: u8) -> Result<(), LogbookErrors> {
    if value < min || value > max {
        return Err(LogbookErrors::OutOfRange { field, value });
    }
    Ok(())
}
