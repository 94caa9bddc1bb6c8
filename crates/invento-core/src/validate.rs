//! Validation of dashboard form input.
//!
//! Handlers hand raw `Option<String>` form fields to these parsers and only
//! reach the database with the typed result.

use crate::error::ValidationError;
use crate::model::Role;

/// Longest accepted username on the login form.
pub const MAX_USERNAME_LEN: usize = 50;

/// Longest accepted item name.
pub const MAX_ITEM_NAME_LEN: usize = 100;

/// Credentials submitted on the login form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginAttempt {
    pub username: String,
    pub password: String,
    pub role: Role,
}

impl LoginAttempt {
    pub fn parse(
        username: Option<&str>,
        password: Option<&str>,
        role: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let username = non_empty(username).ok_or(ValidationError::INVALID_LOGIN)?;
        let password = password
            .filter(|p| !p.is_empty())
            .ok_or(ValidationError::INVALID_LOGIN)?;
        let role: Role = non_empty(role)
            .ok_or(ValidationError::INVALID_LOGIN)?
            .parse()?;

        if username.chars().count() > MAX_USERNAME_LEN {
            return Err(ValidationError::INVALID_LOGIN);
        }

        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
            role,
        })
    }
}

/// A new inventory row.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub quantity: i64,
    /// Rounded to cents.
    pub price: f64,
}

impl NewItem {
    pub fn parse(
        name: Option<&str>,
        quantity: Option<&str>,
        price: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let (Some(name), Some(quantity), Some(price)) =
            (non_empty(name), non_empty(quantity), non_empty(price))
        else {
            return Err(ValidationError::MISSING_FIELDS);
        };
        if name.chars().count() > MAX_ITEM_NAME_LEN {
            return Err(ValidationError::MISSING_FIELDS);
        }

        let quantity: i64 = quantity.parse().map_err(|_| ValidationError::ITEM_FORMAT)?;
        let price = parse_finite(price).ok_or(ValidationError::ITEM_FORMAT)?;
        if quantity < 0 || price < 0.0 {
            return Err(ValidationError::ITEM_NEGATIVE);
        }

        Ok(Self {
            name: name.to_string(),
            quantity,
            price: round_cents(price),
        })
    }
}

/// A restock request submitted by any logged-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRequest {
    pub item_name: String,
    pub quantity: i64,
}

impl NewRequest {
    pub fn parse(item_name: Option<&str>, quantity: Option<&str>) -> Result<Self, ValidationError> {
        let (Some(item_name), Some(quantity)) = (non_empty(item_name), non_empty(quantity)) else {
            return Err(ValidationError::MISSING_FIELDS);
        };
        if item_name.chars().count() > MAX_ITEM_NAME_LEN {
            return Err(ValidationError::MISSING_FIELDS);
        }

        let quantity: i64 = quantity
            .parse()
            .map_err(|_| ValidationError::QUANTITY_FORMAT)?;
        if quantity <= 0 {
            return Err(ValidationError::QUANTITY_NOT_POSITIVE);
        }

        Ok(Self {
            item_name: item_name.to_string(),
            quantity,
        })
    }
}

/// Price submitted with an approval, rounded to cents.
pub fn parse_approval_price(price: Option<&str>) -> Result<f64, ValidationError> {
    let price = non_empty(price).ok_or(ValidationError::PRICE_REQUIRED)?;
    let price = parse_finite(price).ok_or(ValidationError::PRICE_FORMAT)?;
    if price < 0.0 {
        return Err(ValidationError::PRICE_NEGATIVE);
    }
    Ok(round_cents(price))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_finite(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Values this large carry no cents, and scaling them could overflow.
const ROUNDING_LIMIT: f64 = 1e15;

fn round_cents(value: f64) -> f64 {
    if value.abs() >= ROUNDING_LIMIT {
        return value;
    }
    (value * 100.0).round() / 100.0
}
