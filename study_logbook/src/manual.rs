/*!

This is the long-form manual for `study_logbook` and the `logbook` command.

## The study

Every participant follows the study for 28 days, starting on their own start date
(or on the study start date from the settings when they do not have one). Each day,
they fill a short questionnaire about the odor of their scalp, its possible causes,
their symptoms and whether they washed their hair.

## Day statuses

Each day of the calendar has exactly one status:

* `completed` a complete questionnaire exists for that day. This wins over the dates:
  a day filled in advance is still completed.
* `current` today's day of the study
* `missed` a past day without a complete questionnaire
* `future` a day that has not started yet. It cannot be opened.

The day of the study is `(today - start date) + 1`, so the start date itself is day 1.

Missed days can still be filled in. The `allowRetroactive` setting is kept for
compatibility but is not enforced.

## Progress

The progress of a participant is the number of completed days out of 28, as a rounded
percentage. The completion rate of the study is the number of complete questionnaires
out of `participants x 28`. Questionnaires left over from deleted participants are not
counted.

## Roster files

Rosters can be imported from CSV or Excel (`.xlsx`) files with the columns:

```text
prenom,nom,email,telephone,code,date_debut
Marie,Dupont,marie@example.com,0612345678,1234,2025-12-06
```

The first row is a header if its fifth cell is `code`. The start date is optional.
Each row is either created, ignored (the code is already used) or counted as an error
(fewer than 5 cells, a code that is not 4 digits, an invalid date).

## Exports

The export contains one row per complete questionnaire, with the participant details,
the day, the submission date (`dd/mm/yyyy`), and the answers flattened into `Oui`/`Non`
columns: one per cause of the vocabulary, then `Autre` and its description. The odor
intensity is left blank when there is no odor, and the severities are left blank when
there are no symptoms.

*/
