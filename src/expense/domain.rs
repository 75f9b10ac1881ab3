//! Core expense domain types.
//!
//! Every value that reaches the store goes through one of the validated
//! constructors here, so the database functions can assume well-formed input.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, macros::format_description};

/// Database identifier for an expense.
pub type ExpenseId = i64;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// The ways input to the expense operations can be malformed.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Amounts must be a positive number of minor currency units.
    #[error("{0} is not a positive amount")]
    NonPositiveAmount(i64),

    /// The category is not one of the known categories.
    #[error("\"{0}\" is not a known category")]
    UnknownCategory(String),

    /// The description was empty or only whitespace.
    #[error("description cannot be empty")]
    EmptyDescription,

    /// The date was not a valid calendar date in the form `YYYY-MM-DD`.
    #[error("\"{0}\" is not a valid date in the form YYYY-MM-DD")]
    InvalidDate(String),

    /// The idempotency key was empty or only whitespace.
    #[error("idempotency key cannot be empty")]
    EmptyIdempotencyKey,
}

/// A monetary amount in the currency's smallest unit, e.g. cents or paise.
///
/// Always greater than zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AmountMinorUnits(i64);

impl AmountMinorUnits {
    /// Create an amount.
    ///
    /// # Errors
    ///
    /// Returns [ValidationError::NonPositiveAmount] if `amount` is zero or negative.
    pub fn new(amount: i64) -> Result<Self, ValidationError> {
        if amount > 0 {
            Ok(Self(amount))
        } else {
            Err(ValidationError::NonPositiveAmount(amount))
        }
    }

    /// The raw number of minor units.
    pub fn get(self) -> i64 {
        self.0
    }
}

/// The fixed set of categories an expense can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Groceries, meals and snacks.
    Food,
    /// Fares, fuel and parking.
    Transport,
    /// Power, water, internet and phone bills.
    Utilities,
    /// Outings, subscriptions and hobbies.
    Entertainment,
    /// Anything else.
    Other,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Category; 5] = [
        Category::Food,
        Category::Transport,
        Category::Utilities,
        Category::Entertainment,
        Category::Other,
    ];

    /// The category's name as shown to users and stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Utilities => "Utilities",
            Category::Entertainment => "Entertainment",
            Category::Other => "Other",
        }
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownCategory(s.to_owned()))
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let name = value.as_str()?;

        name.parse()
            .map_err(|error: ValidationError| FromSqlError::Other(Box::new(error)))
    }
}

/// A validated, non-empty expense description.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(transparent)]
pub struct ExpenseDescription(String);

impl ExpenseDescription {
    /// Create a description, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [ValidationError::EmptyDescription] if `description` is empty
    /// after trimming.
    pub fn new(description: &str) -> Result<Self, ValidationError> {
        let description = description.trim();

        if description.is_empty() {
            Err(ValidationError::EmptyDescription)
        } else {
            Ok(Self(description.to_owned()))
        }
    }
}

impl AsRef<str> for ExpenseDescription {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A validated, non-empty token the client sends with a create request.
///
/// Requests that carry the same key are collapsed into a single expense.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(transparent)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Create an idempotency key.
    ///
    /// The key is kept exactly as given, so keys that differ only in
    /// surrounding whitespace are different keys.
    ///
    /// # Errors
    ///
    /// Returns [ValidationError::EmptyIdempotencyKey] if `key` is empty or
    /// only whitespace.
    pub fn new(key: &str) -> Result<Self, ValidationError> {
        if key.trim().is_empty() {
            Err(ValidationError::EmptyIdempotencyKey)
        } else {
            Ok(Self(key.to_owned()))
        }
    }
}

impl AsRef<str> for IdempotencyKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for IdempotencyKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parse a calendar date in the form `YYYY-MM-DD`.
///
/// # Errors
///
/// Returns [ValidationError::InvalidDate] if `date` is not zero-padded ISO
/// format or is not a real date, e.g. `2024-02-30`.
pub fn parse_expense_date(date: &str) -> Result<Date, ValidationError> {
    let date = date.trim();

    Date::parse(date, format_description!("[year]-[month]-[day]"))
        .map_err(|_| ValidationError::InvalidDate(date.to_owned()))
}

/// An amount of money spent on something.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// The ID assigned by the store.
    pub id: ExpenseId,
    /// How much was spent, in minor currency units.
    pub amount_minor_units: AmountMinorUnits,
    /// What kind of thing the money was spent on.
    pub category: Category,
    /// What the money was spent on, in the user's words.
    pub description: ExpenseDescription,
    /// The day the money was spent.
    #[serde(with = "iso_date")]
    pub date: Date,
    /// The key the expense was created with.
    pub idempotency_key: IdempotencyKey,
    /// When the store inserted the expense. Only used to break ties between
    /// expenses on the same date.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// A validated expense that has not been stored yet.
///
/// To create a new `NewExpense`, use [NewExpense::new].
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct NewExpense {
    pub amount_minor_units: AmountMinorUnits,
    pub category: Category,
    pub description: ExpenseDescription,
    pub date: Date,
    pub idempotency_key: IdempotencyKey,
}

impl NewExpense {
    /// Validate the raw fields of a create request.
    ///
    /// # Errors
    ///
    /// Returns the [ValidationError] for the first field that is invalid,
    /// checked in argument order.
    pub fn new(
        amount_minor_units: i64,
        category: &str,
        description: &str,
        date: &str,
        idempotency_key: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            amount_minor_units: AmountMinorUnits::new(amount_minor_units)?,
            category: category.trim().parse()?,
            description: ExpenseDescription::new(description)?,
            date: parse_expense_date(date)?,
            idempotency_key: IdempotencyKey::new(idempotency_key)?,
        })
    }
}

/// Restricts which expenses are listed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    /// Every expense.
    #[default]
    All,
    /// Only expenses in the given category.
    Only(Category),
}

impl CategoryFilter {
    /// The value clients send to ask for every category.
    pub const ALL_SENTINEL: &'static str = "All";

    /// Build a filter from an optional query parameter.
    ///
    /// A missing or empty value, or [CategoryFilter::ALL_SENTINEL], means no
    /// filter.
    ///
    /// # Errors
    ///
    /// Returns [ValidationError::UnknownCategory] for any other value that is
    /// not a category name.
    pub fn from_param(param: Option<&str>) -> Result<Self, ValidationError> {
        match param.map(str::trim) {
            None | Some("") | Some(Self::ALL_SENTINEL) => Ok(CategoryFilter::All),
            Some(name) => name.parse().map(CategoryFilter::Only),
        }
    }

    /// Whether `expense` passes the filter.
    pub fn matches(&self, expense: &Expense) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => expense.category == *category,
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::{
        AmountMinorUnits, Category, CategoryFilter, ExpenseDescription, IdempotencyKey,
        NewExpense, ValidationError, parse_expense_date,
    };

    #[test]
    fn amount_must_be_positive() {
        assert_eq!(
            AmountMinorUnits::new(-5),
            Err(ValidationError::NonPositiveAmount(-5))
        );
        assert_eq!(
            AmountMinorUnits::new(0),
            Err(ValidationError::NonPositiveAmount(0))
        );
        assert_eq!(AmountMinorUnits::new(1).map(AmountMinorUnits::get), Ok(1));
    }

    #[test]
    fn category_parses_known_names_only() {
        assert_eq!("Food".parse::<Category>(), Ok(Category::Food));
        assert_eq!(
            "food".parse::<Category>(),
            Err(ValidationError::UnknownCategory("food".to_owned()))
        );
    }

    #[test]
    fn category_names_round_trip() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>(), Ok(category));
        }
    }

    #[test]
    fn description_fails_on_just_whitespace() {
        assert_eq!(
            ExpenseDescription::new("\n\t \r"),
            Err(ValidationError::EmptyDescription)
        );
    }

    #[test]
    fn idempotency_key_fails_on_empty_string() {
        assert_eq!(
            IdempotencyKey::new(""),
            Err(ValidationError::EmptyIdempotencyKey)
        );
    }

    #[test]
    fn idempotency_key_fails_on_just_whitespace() {
        assert_eq!(
            IdempotencyKey::new(" \t"),
            Err(ValidationError::EmptyIdempotencyKey)
        );
    }

    #[test]
    fn idempotency_key_is_kept_verbatim() {
        let key = IdempotencyKey::new(" k1 ").expect("Could not create key");

        assert_eq!(key.as_ref(), " k1 ");
    }

    #[test]
    fn parse_date_accepts_iso_dates() {
        assert_eq!(parse_expense_date("2024-05-01"), Ok(date!(2024 - 05 - 01)));
    }

    #[test]
    fn parse_date_rejects_invalid_dates() {
        for input in ["2024-02-30", "2024-5-1", "01/05/2024", ""] {
            assert_eq!(
                parse_expense_date(input),
                Err(ValidationError::InvalidDate(input.to_owned())),
                "input {input:?} should be rejected"
            );
        }
    }

    #[test]
    fn new_expense_validates_every_field() {
        let got = NewExpense::new(1050, "Food", "  Lunch ", "2024-05-01", "k1")
            .expect("Could not validate expense");

        assert_eq!(got.amount_minor_units.get(), 1050);
        assert_eq!(got.category, Category::Food);
        assert_eq!(got.description.as_ref(), "Lunch");
        assert_eq!(got.date, date!(2024 - 05 - 01));
        assert_eq!(got.idempotency_key.as_ref(), "k1");
    }

    #[test]
    fn new_expense_fails_on_empty_description() {
        let got = NewExpense::new(1050, "Food", "", "2024-05-01", "k1");

        assert_eq!(got, Err(ValidationError::EmptyDescription));
    }

    #[test]
    fn filter_from_param() {
        assert_eq!(CategoryFilter::from_param(None), Ok(CategoryFilter::All));
        assert_eq!(CategoryFilter::from_param(Some("")), Ok(CategoryFilter::All));
        assert_eq!(
            CategoryFilter::from_param(Some("All")),
            Ok(CategoryFilter::All)
        );
        assert_eq!(
            CategoryFilter::from_param(Some("Transport")),
            Ok(CategoryFilter::Only(Category::Transport))
        );
        assert_eq!(
            CategoryFilter::from_param(Some("Rent")),
            Err(ValidationError::UnknownCategory("Rent".to_owned()))
        );
    }
}
