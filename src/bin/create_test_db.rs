use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::macros::date;

use expense_tracker::{
    BillReminderFields, CategoryFields, ExpenseFields, IncomeFields, NewUser, PasswordHash,
    ValidatedPassword, create_record, create_user, initialize_db, parse_email,
};

/// The credentials of the demo user.
const DEMO_EMAIL: &str = "test@example.com";
const DEMO_PASSWORD: &str = "test";

/// A utility for creating a test database for the expense tracker server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

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

    println!("Creating test user {DEMO_EMAIL} with the password \"{DEMO_PASSWORD}\"...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked(DEMO_PASSWORD),
        PasswordHash::DEFAULT_COST,
    )?;

    let user = create_user(
        NewUser {
            name: "Test User".to_owned(),
            phone_number: "0211234567".to_owned(),
            email: parse_email(DEMO_EMAIL)?,
            password_hash,
            profile_image: None,
            address: Some("1 Example Street".to_owned()),
        },
        &conn,
    )?;

    println!("Creating categories...");

    for (name, color) in [("Housing", "#4e79a7"), ("Groceries", "#59a14f"), ("Utilities", "#f28e2b")] {
        create_record(
            user.id,
            CategoryFields {
                name: name.to_owned(),
                color: Some(color.to_owned()),
            },
            &conn,
        )?;
    }

    println!("Creating incomes...");

    for received_date in [date!(2024 - 01 - 15), date!(2024 - 02 - 15), date!(2024 - 03 - 15)] {
        create_record(
            user.id,
            IncomeFields {
                amount: Decimal::new(500_000, 2),
                source: Some("Salary".to_owned()),
                received_date,
            },
            &conn,
        )?;
    }

    create_record(
        user.id,
        IncomeFields {
            amount: Decimal::new(25_050, 2),
            source: None,
            received_date: date!(2024 - 02 - 03),
        },
        &conn,
    )?;

    println!("Creating expenses...");

    let expenses = [
        ("Rent", 120_000, "Housing", date!(2024 - 01 - 01)),
        ("Groceries", 18_745, "Groceries", date!(2024 - 01 - 07)),
        ("Power", 15_000, "Utilities", date!(2024 - 01 - 20)),
        ("Rent", 120_000, "Housing", date!(2024 - 02 - 01)),
        ("Groceries", 20_310, "Groceries", date!(2024 - 02 - 09)),
        ("Rent", 120_000, "Housing", date!(2024 - 03 - 01)),
    ];

    for (title, cents, category, expense_date) in expenses {
        create_record(
            user.id,
            ExpenseFields {
                title: title.to_owned(),
                amount: Decimal::new(cents, 2),
                category: Some(category.to_owned()),
                expense_date,
            },
            &conn,
        )?;
    }

    println!("Creating bill reminders...");

    create_record(
        user.id,
        BillReminderFields {
            title: "Rent".to_owned(),
            amount: Decimal::new(120_000, 2),
            due_date: date!(2024 - 04 - 01),
            repeat_cycle: Some("monthly".to_owned()),
            status: "pending".to_owned(),
            notes: None,
        },
        &conn,
    )?;
    create_record(
        user.id,
        BillReminderFields {
            title: "Car insurance".to_owned(),
            amount: Decimal::new(64_999, 2),
            due_date: date!(2024 - 03 - 20),
            repeat_cycle: Some("yearly".to_owned()),
            status: "paid".to_owned(),
            notes: Some("Paid online".to_owned()),
        },
        &conn,
    )?;

    println!("Success!");

    Ok(())
}
