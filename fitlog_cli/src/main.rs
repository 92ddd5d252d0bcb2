use clap::{Parser, Subcommand};
use fitlog_core::*;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "fitlog")]
#[command(about = "Personal workout log and statistics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Storage layout (delimited, tabular)
    #[arg(long, global = true)]
    format: Option<StorageFormat>,

    /// Skip unreadable rows in the workout file instead of failing
    #[arg(long, global = true)]
    skip_malformed: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a workout
    Add {
        /// Workout date (YYYY-MM-DD or MM/DD/YY), defaults to today
        #[arg(long)]
        date: Option<String>,

        /// Exercise type, e.g. Running
        #[arg(long)]
        exercise: String,

        /// Duration in whole minutes (at least 1)
        #[arg(long)]
        duration: String,

        /// Calories burned (at least 1)
        #[arg(long)]
        calories: String,
    },

    /// Show workout history (default)
    List {
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete the workout at the index shown by `list`
    Remove { index: usize },

    /// Delete all workouts
    Clear,

    /// Show aggregate statistics
    Stats {
        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    fitlog_core::logging::init_with_level(fitlog_core::logging::level_for_verbosity(cli.verbose));

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("Command failed: {:?}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(data_dir) = cli.data_dir {
        config.data.data_dir = data_dir;
    }
    if let Some(format) = cli.format {
        config.storage.format = format;
    }
    if cli.skip_malformed {
        config.storage.on_malformed = MalformedRowPolicy::Skip;
    }

    let mut store = WorkoutStore::initialize(config.open_storage())?;

    match cli.command {
        Some(Commands::Add {
            date,
            exercise,
            duration,
            calories,
        }) => cmd_add(&mut store, date, &exercise, &duration, &calories),
        Some(Commands::List { json }) => cmd_list(&store, json),
        Some(Commands::Remove { index }) => cmd_remove(&mut store, index),
        Some(Commands::Clear) => cmd_clear(&mut store),
        Some(Commands::Stats { json }) => cmd_stats(&store, json),
        None => cmd_list(&store, false),
    }
}

fn cmd_add<S: RecordStorage>(
    store: &mut WorkoutStore<S>,
    date: Option<String>,
    exercise: &str,
    duration: &str,
    calories: &str,
) -> Result<()> {
    let date = date.unwrap_or_else(|| {
        chrono::Local::now()
            .date_naive()
            .format(DATE_FORMAT)
            .to_string()
    });

    let input = NewWorkout::parse(&date, exercise, duration, calories)?;
    let index = store.add_new(input)?;
    store.persist()?;

    let record = &store.list()[index];
    println!(
        "✓ Workout added: {} {} ({} min, {} kcal) at index {}",
        record.date_string(),
        record.exercise_type,
        record.duration_minutes,
        record.calories_burned,
        index
    );
    Ok(())
}

fn cmd_list<S: RecordStorage>(store: &WorkoutStore<S>, json: bool) -> Result<()> {
    if json {
        return print_json(&store.list());
    }

    if store.is_empty() {
        println!("No workouts recorded yet.");
        return Ok(());
    }

    println!(
        "{:>5}  {:<10}  {:<20}  {:>14}  {:>15}",
        "#", "Date", "Exercise", "Duration (min)", "Calories Burned"
    );
    for (index, record) in store.list().iter().enumerate() {
        println!(
            "{:>5}  {:<10}  {:<20}  {:>14}  {:>15}",
            index,
            record.date_string(),
            record.exercise_type,
            record.duration_minutes,
            record.calories_burned
        );
    }
    Ok(())
}

fn cmd_remove<S: RecordStorage>(store: &mut WorkoutStore<S>, index: usize) -> Result<()> {
    let removed = store.remove_at(index)?;
    store.persist()?;

    println!(
        "✓ Workout removed: {} {}",
        removed.date_string(),
        removed.exercise_type
    );
    Ok(())
}

fn cmd_clear<S: RecordStorage>(store: &mut WorkoutStore<S>) -> Result<()> {
    let count = store.len();
    store.clear();
    store.persist()?;

    println!("✓ All workouts cleared ({} removed)", count);
    Ok(())
}

fn cmd_stats<S: RecordStorage>(store: &WorkoutStore<S>, json: bool) -> Result<()> {
    let stats = compute_stats(store.list());
    if json {
        return print_json(&stats);
    }

    if stats.total_workouts == 0 {
        println!("No workouts recorded yet.");
        return Ok(());
    }
    println!("{}", stats);
    Ok(())
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).map_err(io::Error::from)?;
    writeln!(stdout)?;
    Ok(())
}
