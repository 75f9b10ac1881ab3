use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use expense_ledger::{Category, NewExpense, create_expense, initialize_db};

/// A utility for creating a test database for the expense_ledger server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// The number of days of sample expenses to create.
    #[arg(long, short, default_value_t = 30)]
    days: i64,
}

const DESCRIPTIONS: [&str; 5] = ["Lunch", "Bus fare", "Power bill", "Cinema", "Birthday gift"];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating sample expenses...");

    let today = OffsetDateTime::now_utc().date();

    for day in 0..args.days {
        let date = today - Duration::days(day);
        let index = day as usize % Category::ALL.len();
        let category = Category::ALL[index];
        let amount_minor_units = 250 + (day * 137) % 5000;

        let expense = NewExpense::new(
            amount_minor_units,
            category.as_str(),
            DESCRIPTIONS[index],
            &date.to_string(),
            &format!("sample-{day}"),
        )?;

        create_expense(expense, &conn)?;
    }

    println!("Success!");

    Ok(())
}
