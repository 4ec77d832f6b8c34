use clap::{Parser, Subcommand};

/// This is the logbook of a 28-day scalp odor study.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON configuration file. It may set the storePath, the adminCode and
    /// the exportDirectory.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, optional) The JSON document holding the participants, the entries and the settings.
    /// Setting this option overrides the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub store: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Checks a code: the administrator code or the code of a participant.
    Login {
        #[clap(value_parser)]
        code: String,
    },

    /// Shows the 28 days of a participant and their progress.
    Calendar {
        #[clap(value_parser)]
        code: String,
        /// (YYYY-MM-DD, default today) The day to show the calendar for.
        #[clap(long, value_parser)]
        today: Option<String>,
    },

    /// Fills the questionnaire of one day. Only the given answers change.
    Record {
        #[clap(value_parser)]
        code: String,
        #[clap(value_parser)]
        day: u32,
        /// (1-10) Odor present, with this intensity.
        #[clap(long, value_parser, conflicts_with = "no-odor")]
        odor: Option<u8>,
        #[clap(long, takes_value = false)]
        no_odor: bool,
        /// (repeatable) A cause of the odor, from the list of causes.
        #[clap(long, value_parser)]
        cause: Vec<String>,
        /// A free-text cause. This ticks the "Autre" cause.
        #[clap(long, value_parser)]
        other_cause: Option<String>,
        /// (4 values from 0 to 10) Symptoms present: itching, irritation, redness, dryness.
        #[clap(long, value_parser, number_of_values = 4, conflicts_with = "no-symptoms")]
        symptoms: Option<Vec<u8>>,
        #[clap(long, takes_value = false)]
        no_symptoms: bool,
        /// (true or false) Whether the hair was washed that day.
        #[clap(long, value_parser)]
        washed_hair: Option<bool>,
        /// (YYYY-MM-DD, default today)
        #[clap(long, value_parser)]
        today: Option<String>,
    },

    /// Adds a participant.
    Add {
        #[clap(long, value_parser)]
        code: String,
        #[clap(long, value_parser)]
        first_name: String,
        #[clap(long, value_parser)]
        last_name: String,
        #[clap(long, value_parser, default_value = "")]
        email: String,
        #[clap(long, value_parser, default_value = "")]
        phone: String,
        /// (YYYY-MM-DD, default the study start date)
        #[clap(long, value_parser)]
        start_date: Option<String>,
    },

    /// Deletes a participant and all their entries.
    Delete {
        #[clap(value_parser)]
        code: String,
    },

    /// Lists the participants with their progress.
    List,

    /// Imports participants from a CSV or Excel (.xlsx) roster.
    Import {
        #[clap(value_parser)]
        file: String,
        /// (default: the first worksheet) When using an Excel file, the name of the worksheet to use.
        #[clap(long, value_parser)]
        excel_worksheet_name: Option<String>,
    },

    /// Writes the roster template.
    Template {
        /// (file path or empty) Where to write the template. Prints it when not specified.
        #[clap(short, long, value_parser)]
        out: Option<String>,
    },

    /// Exports the complete questionnaires to CSV.
    Export {
        /// Only export this participant.
        #[clap(long, value_parser)]
        code: Option<String>,
        /// (directory, 'stdout' or empty) Where to write export_<date>.csv. Overrides the
        /// exportDirectory of the configuration.
        #[clap(short, long, value_parser)]
        out: Option<String>,
        /// (file path) A reference export. If provided, the command fails when the export differs.
        #[clap(short, long, value_parser)]
        reference: Option<String>,
    },

    /// Shows the statistics of the study.
    Stats,

    /// Shows the settings, or changes the given ones.
    Settings {
        /// (YYYY-MM-DD)
        #[clap(long, value_parser)]
        study_start_date: Option<String>,
        #[clap(long, value_parser)]
        show_progress_bar: Option<bool>,
        #[clap(long, value_parser)]
        company_name: Option<String>,
        #[clap(long, value_parser)]
        primary_color: Option<String>,
        #[clap(long, value_parser)]
        allow_retroactive: Option<bool>,
        #[clap(long, value_parser)]
        auto_complete: Option<bool>,
    },
}
