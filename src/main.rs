use std::path::PathBuf;

use anyhow::Context;
use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use attendance_tracker::config::{CheckInSettings, Config};
use attendance_tracker::deprivation::DeprivationMonitor;
use attendance_tracker::models::AttendanceStatus;
use attendance_tracker::store::RecordFilter;
use attendance_tracker::{export, import, report, seed, AttendanceStore};

#[derive(Parser)]
#[command(name = "attendance-tracker")]
#[command(about = "Course attendance, excuse and deprivation tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Present,
    Absent,
    Late,
}

impl From<StatusArg> for AttendanceStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Present => AttendanceStatus::Present,
            StatusArg::Absent => AttendanceStatus::Absent,
            StatusArg::Late => AttendanceStatus::Late,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Write the sample term's attendance records to a CSV file
    Seed {
        #[arg(long, default_value = "attendance.csv")]
        out: PathBuf,
    },
    /// Show attendance rates per student and course
    Rates {
        #[arg(long)]
        records: PathBuf,
        #[arg(long)]
        course: Option<String>,
        /// Also export the standings as a spreadsheet
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Record a face-recognition check-in and save the records back
    CheckIn {
        #[arg(long)]
        records: PathBuf,
        #[arg(long)]
        student: String,
        #[arg(long)]
        course: String,
        #[arg(long)]
        date: NaiveDate,
        /// Arrival time, HH:MM:SS
        #[arg(long)]
        arrived: NaiveTime,
        /// Session start time, HH:MM:SS
        #[arg(long)]
        start: NaiveTime,
    },
    /// Evaluate deprivation against the configured threshold
    Deprivation {
        #[arg(long)]
        records: PathBuf,
        #[arg(long)]
        course: Option<String>,
        #[arg(long)]
        threshold: Option<f64>,
        #[arg(long)]
        total_sessions: Option<u32>,
    },
    /// Export the selected records as a spreadsheet
    Export {
        #[arg(long)]
        records: PathBuf,
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        course: Option<String>,
        #[arg(long)]
        student: Option<String>,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        /// Column mapping as `Header=field,...`
        #[arg(long)]
        columns: Option<String>,
    },
    /// Generate a markdown report for a course
    Report {
        #[arg(long)]
        records: PathBuf,
        #[arg(long)]
        course: String,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env().context("invalid attendance configuration")?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Seed { out } => {
            import::write_records(&out, &seed::sample_records())?;
            println!("Sample records written to {}.", out.display());
        }
        Commands::Rates {
            records,
            course,
            out,
        } => {
            let store = load(&records)?;
            let standings = store.standings(course.as_deref(), &config.deprivation);

            if standings.is_empty() {
                println!("No attendance recorded.");
                return Ok(());
            }

            for standing in &standings {
                println!(
                    "- {} in {}: {}% attended ({} of {} sessions)",
                    standing.student_name,
                    standing.course_id,
                    standing.attendance_rate,
                    standing.attended_sessions,
                    standing.recorded_sessions
                );
            }

            if let Some(out) = out {
                let file = std::fs::File::create(&out)
                    .with_context(|| format!("failed to create {}", out.display()))?;
                export::write_rows(file, &standings, &export::standing_columns())?;
                println!("Standings written to {}.", out.display());
            }
        }
        Commands::CheckIn {
            records,
            student,
            course,
            date,
            arrived,
            start,
        } => {
            let mut store = load(&records)?;
            let settings = CheckInSettings::new(start, config.late_grace_minutes);
            let status = store
                .check_in(&student, &course, date, arrived, &settings)
                .with_context(|| format!("failed to check in {student} for {course}"))?
                .status;
            import::write_records(&records, store.records())?;
            println!(
                "Checked in {student} for {course} on {date}: {}.",
                status.as_str()
            );
        }
        Commands::Deprivation {
            records,
            course,
            threshold,
            total_sessions,
        } => {
            let mut settings = config.deprivation.clone();
            if let Some(value) = threshold {
                settings.threshold_percentage = value;
            }
            if let Some(value) = total_sessions {
                settings.total_sessions = value;
            }
            settings.validate()?;

            let store = load(&records)?;
            let standings = store.standings(course.as_deref(), &settings);
            let mut monitor = DeprivationMonitor::new();
            let deprived = monitor.observe(&standings, &settings);

            if deprived.is_empty() {
                println!(
                    "No students above {:.1}% absence.",
                    settings.threshold_percentage
                );
                return Ok(());
            }

            println!("Deprived students:");
            for standing in deprived {
                println!(
                    "- {} in {}: {:.1}% absence ({} unexcused)",
                    standing.student_name,
                    standing.course_id,
                    standing.absence_percentage,
                    standing.counted_absences
                );
            }
            for (student_id, course_id) in monitor.pending() {
                println!("Awaiting confirmation: {student_id} in {course_id}");
            }
            for notification in monitor.notifications() {
                info!(recipient = ?notification.recipient, "{}", notification.message);
            }
        }
        Commands::Export {
            records,
            out,
            course,
            student,
            status,
            columns,
        } => {
            let store = load(&records)?;
            let filter = RecordFilter {
                course_id: course.as_deref(),
                student_id: student.as_deref(),
                status: status.map(AttendanceStatus::from),
            };
            let rows = store.filtered(&filter);
            let columns = columns
                .as_deref()
                .map(export::parse_columns)
                .unwrap_or_else(export::record_columns);
            let file = std::fs::File::create(&out)
                .with_context(|| format!("failed to create {}", out.display()))?;
            export::write_rows(file, &rows, &columns)?;
            println!("Exported {} records to {}.", rows.len(), out.display());
        }
        Commands::Report {
            records,
            course,
            out,
        } => {
            let store = load(&records)?;
            let report = report::build_report(&store, &course, &config.deprivation);
            std::fs::write(&out, report)?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

fn load(path: &std::path::Path) -> anyhow::Result<AttendanceStore> {
    let records = import::read_records(path)?;
    Ok(AttendanceStore::with_rosters(
        seed::sample_students(),
        seed::sample_courses(),
        records,
    ))
}
