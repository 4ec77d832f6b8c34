mod args;
mod logbook;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate, Utc};
use clap::Parser;
use log::{debug, info, warn};
use snafu::{prelude::*, ErrorCompat};
use text_diff::print_diff;

use study_logbook::builder::EntryBuilder;
use study_logbook::*;

use crate::args::{Args, Command};
use crate::logbook::admin::{self, NewParticipant};
use crate::logbook::config_reader::{read_config, LogbookConfig};
use crate::logbook::io_common::{is_excel_file, parse_date, simplify_file_name};
use crate::logbook::io_csv::{read_csv_roster_path, roster_template};
use crate::logbook::io_xlsx::read_xlsx_roster;
use crate::logbook::participant::{self as part, Session};
use crate::logbook::store::{JsonStore, Store};
use crate::logbook::{
    LogbookError, LogbookResult, OpeningFileSnafu, QuestionnaireSnafu, Snapshot, WritingFileSnafu,
};

fn today_or(value: &Option<String>) -> LogbookResult<NaiveDate> {
    match value {
        Some(s) => parse_date(s),
        None => Ok(Local::now().date_naive()),
    }
}

fn find_participant(store: &JsonStore, code: &str) -> LogbookResult<Participant> {
    store.find_participant_by_code(code.trim())
}

fn print_calendar(participant: &Participant, snapshot: &Snapshot, today: NaiveDate) {
    let view = part::calendar_view(participant, snapshot, today);
    println!(
        "{} ({}) - {}",
        participant.full_name(),
        participant.code,
        snapshot.settings.company_name
    );
    if snapshot.settings.show_progress_bar {
        println!(
            "Progress: {}/{} days ({}%)",
            view.completed_days, STUDY_DAYS, view.completion_percent
        );
    }
    for d in view.days.iter() {
        let marker = if d.status.is_interactive() { "*" } else { " " };
        println!(
            "{} Jour {:>2}  {:<9} {}",
            marker,
            d.day,
            day_label(d.date),
            d.status
        );
    }
}

fn record(
    store: &mut JsonStore,
    code: &str,
    day: u32,
    cmd: &Command,
    today: NaiveDate,
) -> LogbookResult<Entry> {
    let participant = find_participant(store, code)?;
    let mut q = match part::previous_answers(&*store, &participant, day)? {
        Some(previous) => {
            debug!("record: editing day {} of {}", day, participant.code);
            EntryBuilder::from_entry(&previous)
        }
        None => EntryBuilder::new(&participant.code, day).context(QuestionnaireSnafu {})?,
    };
    if let Command::Record {
        odor,
        no_odor,
        cause,
        other_cause,
        symptoms,
        no_symptoms,
        washed_hair,
        ..
    } = cmd
    {
        if let Some(intensity) = odor {
            q = q.odor(*intensity).context(QuestionnaireSnafu {})?;
        }
        if *no_odor {
            q = q.no_odor();
        }
        for c in cause.iter() {
            q = q.cause(c).context(QuestionnaireSnafu {})?;
        }
        if let Some(text) = other_cause {
            q = q.other_cause(text);
        }
        match symptoms.as_deref() {
            Some([itching, irritation, redness, dryness]) => {
                q = q
                    .symptoms(*itching, *irritation, *redness, *dryness)
                    .context(QuestionnaireSnafu {})?;
            }
            Some(other) => {
                whatever!("Expected 4 severities, got {:?}", other)
            }
            None => {}
        }
        if *no_symptoms {
            q = q.no_symptoms();
        }
        if let Some(washed) = washed_hair {
            q = q.washed_hair(*washed);
        }
    }
    part::submit_entry(store, &participant, q, today, Utc::now())
}

fn import(
    store: &mut JsonStore,
    file: &str,
    worksheet: Option<&str>,
    admin_code: &str,
) -> LogbookResult<admin::ImportSummary> {
    let rows = if is_excel_file(file) {
        read_xlsx_roster(file, worksheet)?
    } else {
        read_csv_roster_path(file)?
    };
    info!(
        "Importing {} rows from {}",
        rows.len(),
        simplify_file_name(file)
    );
    let default_start = Snapshot::load(&*store).settings.study_start_date;
    admin::import_roster(store, &rows, default_start, admin_code)
}

fn export(
    store: &JsonStore,
    config: &LogbookConfig,
    code: Option<&str>,
    out: Option<&str>,
    reference: Option<&str>,
) -> LogbookResult<()> {
    let snapshot = Snapshot::load(store);
    let res = admin::export(&snapshot, code, Local::now().date_naive(), &Local)?;

    let out_dir = out
        .map(|s| s.to_string())
        .unwrap_or_else(|| config.export_directory());
    if out_dir == "stdout" {
        print!("{}", res.content);
    } else {
        let p: PathBuf = [out_dir, res.file_name.clone()].iter().collect();
        let path_s = p.as_path().display().to_string();
        fs::write(&p, res.content.as_bytes()).context(WritingFileSnafu { path: path_s.clone() })?;
        println!("Exported {} rows to {}", res.rows, path_s);
    }

    // The reference export, if provided for comparison
    if let Some(reference_p) = reference {
        let reference_content =
            fs::read_to_string(reference_p).context(OpeningFileSnafu { path: reference_p })?;
        if reference_content != res.content {
            warn!("Found differences with the reference export");
            print_diff(reference_content.as_str(), res.content.as_str(), "\n");
            whatever!("Difference detected between the export and the reference export")
        }
    }
    Ok(())
}

fn settings(store: &mut JsonStore, cmd: &Command) -> LogbookResult<Settings> {
    if let Command::Settings {
        study_start_date,
        show_progress_bar,
        company_name,
        primary_color,
        allow_retroactive,
        auto_complete,
    } = cmd
    {
        let patch = SettingsPatch {
            study_start_date: study_start_date.as_deref().map(parse_date).transpose()?,
            show_progress_bar: *show_progress_bar,
            company_name: company_name.clone(),
            primary_color: primary_color.clone(),
            allow_retroactive: *allow_retroactive,
            auto_complete: *auto_complete,
        };
        if patch != SettingsPatch::default() {
            return store.update_settings(&patch);
        }
    }
    store.get_settings()
}

fn run(args: &Args) -> LogbookResult<()> {
    let config = match &args.config {
        Some(path) => read_config(path)?,
        None => LogbookConfig::default(),
    };
    let store_path = args.store.clone().unwrap_or_else(|| config.store_path());
    let mut store = JsonStore::open(Path::new(&store_path))?;
    let admin_code = config.admin_code();

    match &args.command {
        Command::Login { code } => match part::login(&store, code, &admin_code)? {
            Session::Admin => println!("Administrator"),
            Session::Participant(p) => println!("Welcome {} ({})", p.full_name(), p.code),
        },
        Command::Calendar { code, today } => {
            let participant = find_participant(&store, code)?;
            let snapshot = Snapshot::load(&store);
            print_calendar(&participant, &snapshot, today_or(today)?);
        }
        cmd @ Command::Record {
            code, day, today, ..
        } => {
            let e = record(&mut store, code, *day, cmd, today_or(today)?)?;
            println!("Saved day {} of {}", e.day, e.participant_code);
        }
        Command::Add {
            code,
            first_name,
            last_name,
            email,
            phone,
            start_date,
        } => {
            let new = NewParticipant {
                code: code.clone(),
                first_name: first_name.clone(),
                last_name: last_name.clone(),
                email: email.clone(),
                phone: phone.clone(),
                start_date: start_date.as_deref().map(parse_date).transpose()?,
            };
            let p = admin::add_participant(&mut store, new, &admin_code)?;
            println!("Added {} ({})", p.full_name(), p.code);
        }
        Command::Delete { code } => {
            admin::delete_participant(&mut store, code.trim())?;
            println!("Deleted {}", code.trim());
        }
        Command::List => {
            let snapshot = Snapshot::load(&store);
            let (_, progress) = admin::dashboard(&snapshot);
            for (p, prog) in snapshot.participants.iter().zip(progress.iter()) {
                println!(
                    "{}  {:<30} {:<30} {:<14} {:>2}/{} ({}%)",
                    p.code,
                    p.full_name(),
                    p.email,
                    p.phone,
                    prog.completed_days,
                    STUDY_DAYS,
                    prog.percent
                );
            }
        }
        Command::Import {
            file,
            excel_worksheet_name,
        } => {
            let s = import(
                &mut store,
                file,
                excel_worksheet_name.as_deref(),
                &admin_code,
            )?;
            println!(
                "{} created, {} ignored (duplicates), {} errors",
                s.created, s.ignored, s.errors
            );
        }
        Command::Template { out } => match out {
            Some(path) => {
                fs::write(path, roster_template()).context(WritingFileSnafu { path })?;
                println!("Template written to {}", path);
            }
            None => println!("{}", roster_template()),
        },
        Command::Export {
            code,
            out,
            reference,
        } => export(
            &store,
            &config,
            code.as_deref(),
            out.as_deref(),
            reference.as_deref(),
        )?,
        Command::Stats => {
            let snapshot = Snapshot::load(&store);
            let (stats, _) = admin::dashboard(&snapshot);
            println!("Participants:        {}", stats.total_participants);
            println!("Active participants: {}", stats.active_participants);
            println!("Entries:             {}", stats.total_entries);
            println!("Completion rate:     {}%", stats.completion_rate);
        }
        cmd @ Command::Settings { .. } => {
            let s = settings(&mut store, cmd)?;
            println!("studyStartDate:   {}", s.study_start_date);
            println!("showProgressBar:  {}", s.show_progress_bar);
            println!("companyName:      {}", s.company_name);
            println!("primaryColor:     {}", s.primary_color);
            println!("allowRetroactive: {}", s.allow_retroactive);
            println!("autoComplete:     {}", s.auto_complete);
        }
    }
    Ok(())
}

fn report(e: &LogbookError) {
    warn!("Error occured {:?}", e);
    eprintln!("An error occured: {}", e);
    if let Some(bt) = ErrorCompat::backtrace(e) {
        eprintln!("trace: {}", bt);
    }
}

fn main() {
    let args = Args::parse();
    if args.verbose {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }
    debug!("args: {:?}", args);

    if let Err(e) = run(&args) {
        report(&e);
        std::process::exit(1);
    }
}
